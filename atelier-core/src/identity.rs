use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role carried by the JWT issued by the external identity service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,
    Staff,
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn customer(user_id: Uuid) -> Self {
        Self { user_id, role: Role::Customer }
    }

    pub fn staff(user_id: Uuid) -> Self {
        Self { user_id, role: Role::Staff }
    }

    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }

    /// Customers may only touch their own orders; staff may touch any.
    pub fn may_access_order(&self, order_owner: Uuid) -> bool {
        self.is_staff() || self.user_id == order_owner
    }
}

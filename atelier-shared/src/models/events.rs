use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct OrderCreatedEvent {
    pub order_id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub price_list_id: Option<Uuid>,
    pub total_amount: i64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct OrderStatusChangedEvent {
    pub order_id: Uuid,
    pub order_number: String,
    pub from_status: String,
    pub to_status: String,
    pub actor: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct PaymentReceivedEvent {
    pub order_id: Uuid,
    pub transaction_id: String,
    pub transaction_status: String,
    pub gross_amount: i64,
    pub currency: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ComplaintOpenedEvent {
    pub complaint_id: Uuid,
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub timestamp: i64,
}

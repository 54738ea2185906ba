use async_trait::async_trait;
use atelier_shared::models::site::{ContactMessage, NewContactMessage, Project, TeamMember};
use uuid::Uuid;

/// Repository trait for marketing-site content and the contact form.
#[async_trait]
pub trait SiteRepository: Send + Sync {
    async fn list_projects(
        &self,
    ) -> Result<Vec<Project>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_team_members(
        &self,
    ) -> Result<Vec<TeamMember>, Box<dyn std::error::Error + Send + Sync>>;

    async fn create_contact_message(
        &self,
        message: &NewContactMessage,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_contact_messages(
        &self,
    ) -> Result<Vec<ContactMessage>, Box<dyn std::error::Error + Send + Sync>>;
}

//! Template Repository Interface

use async_trait::async_trait;

use crate::entities::Template;
use crate::error::Result;

/// Versioned template storage
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Insert a new template; fails if the id already exists
    async fn save(&self, template: &Template) -> Result<Template>;

    /// Fetch a template by id
    async fn get(&self, template_id: &str) -> Result<Option<Template>>;

    /// Replace a template if `template.version` matches the stored version
    async fn update(&self, template: &Template) -> Result<Template>;

    /// All templates ordered by id
    async fn list(&self) -> Result<Vec<Template>>;
}

//! Time block persistence port

use async_trait::async_trait;
use goalpro_domain::{Result, TimeBlock};

/// Every lookup is scoped by owner; a block owned by someone else is
/// indistinguishable from a missing one.
#[async_trait]
pub trait TimeBlockRepository: Send + Sync {
    async fn find(&self, user_id: &str, id: &str) -> Result<Option<TimeBlock>>;

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<TimeBlock>>;

    async fn insert(&self, block: &TimeBlock) -> Result<()>;

    /// Overwrite every mutable column of an existing block.
    async fn update(&self, block: &TimeBlock) -> Result<()>;

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool>;
}

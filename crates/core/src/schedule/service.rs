use std::sync::Arc;

use chrono::Utc;
use goalpro_domain::{GoalProError, NewTimeBlock, Result, TimeBlock};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::ports::TimeBlockRepository;

/// Create and list a user's time blocks.
pub struct TimeBlockService {
    repository: Arc<dyn TimeBlockRepository>,
}

impl TimeBlockService {
    pub fn new(repository: Arc<dyn TimeBlockRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<TimeBlock>> {
        self.repository.list_for_user(user_id).await
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Result<TimeBlock> {
        self.repository
            .find(user_id, id)
            .await?
            .ok_or_else(|| GoalProError::NotFound(format!("time block {id} not found")))
    }

    #[instrument(skip(self, new_block), fields(title = %new_block.title))]
    pub async fn create(&self, user_id: &str, new_block: NewTimeBlock) -> Result<TimeBlock> {
        new_block.validate()?;

        let block = TimeBlock {
            id: Uuid::now_v7().to_string(),
            user_id: user_id.to_string(),
            title: new_block.title.trim().to_string(),
            description: new_block.description,
            start_time: new_block.start_time,
            end_time: new_block.end_time,
            google_event_id: None,
            updated_at: Utc::now(),
        };
        self.repository.insert(&block).await?;

        debug!(block_id = %block.id, "time block created");
        Ok(block)
    }
}

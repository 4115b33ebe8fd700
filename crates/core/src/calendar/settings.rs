//! Per-user sync settings.

use std::sync::Arc;

use goalpro_domain::{Result, SyncSettings, SyncSettingsPatch};
use tracing::{debug, instrument};

use super::ports::SyncSettingsRepository;

/// Reads and patches per-user sync settings.
pub struct SyncSettingsService {
    repository: Arc<dyn SyncSettingsRepository>,
}

impl SyncSettingsService {
    pub fn new(repository: Arc<dyn SyncSettingsRepository>) -> Self {
        Self { repository }
    }

    /// Stored settings, or the defaults when the user never saved any.
    /// Reading never creates a row.
    pub async fn get(&self, user_id: &str) -> Result<SyncSettings> {
        Ok(self
            .repository
            .find(user_id)
            .await?
            .unwrap_or_else(|| SyncSettings::defaults_for(user_id)))
    }

    /// Merge the present keys of `patch` over the current settings and
    /// upsert the full row.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, user_id: &str, patch: SyncSettingsPatch) -> Result<SyncSettings> {
        patch.validate()?;

        let mut settings = self.get(user_id).await?;
        patch.apply_to(&mut settings);
        self.repository.upsert(&settings).await?;

        debug!(user_id, "sync settings saved");
        Ok(settings)
    }
}

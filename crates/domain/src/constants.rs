//! Domain constants shared by the sync service and its adapters.

/// Provider key stored on integration credentials for Google Calendar.
pub const GOOGLE_PROVIDER: &str = "google";

/// Calendar used for every sync operation.
pub const PRIMARY_CALENDAR_ID: &str = "primary";

/// Local entity type linked by sync records.
pub const TIME_BLOCK_ENTITY: &str = "time_block";

/// Access tokens expiring within this window are refreshed before use.
pub const TOKEN_REFRESH_THRESHOLD_SECS: i64 = 300;

// Sync settings defaults
pub const DEFAULT_SYNC_INTERVAL_MINUTES: u32 = 15;
pub const MIN_SYNC_INTERVAL_MINUTES: u32 = 5;
pub const MAX_SYNC_INTERVAL_MINUTES: u32 = 1440;

// OAuth callback redirect flags
pub const OAUTH_SUCCESS_FLAG: &str = "google_calendar_connected";
pub const OAUTH_ERROR_NOT_CONFIGURED: &str = "not_configured";
pub const OAUTH_ERROR_MISSING_CODE: &str = "missing_code";
pub const OAUTH_ERROR_INVALID_STATE: &str = "invalid_state";
pub const OAUTH_ERROR_TOKEN_EXCHANGE: &str = "token_exchange_failed";
pub const OAUTH_ERROR_STORAGE: &str = "storage_failed";

/// Google OAuth scopes requested on connect.
pub const GOOGLE_CALENDAR_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar.events",
    "https://www.googleapis.com/auth/userinfo.email",
    "openid",
];

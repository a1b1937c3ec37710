/// Months shown before the current month in a rolling window
pub const DEFAULT_MONTHS_BEFORE: i32 = 3;

/// Months shown after the current month in a rolling window
pub const DEFAULT_MONTHS_AFTER: i32 = 35;

/// Months per display period (tab)
pub const DEFAULT_PERIOD_SIZE: usize = 12;

/// Upper bound for a single row-update call
pub const DEFAULT_SAVE_TIMEOUT_MS: u64 = 10_000;

/// Attempts per edit, including the first one
pub const DEFAULT_MAX_SAVE_ATTEMPTS: u32 = 3;

/// Base delay between save attempts, doubled after each retry
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// Column holding the row identifier in fetched rows
pub const DEFAULT_ID_COLUMN: &str = "id";

/// Column holding the row display name in fetched rows
pub const DEFAULT_NAME_COLUMN: &str = "concepto";

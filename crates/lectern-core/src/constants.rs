/// Default interval between schedule sweeps.
pub const DEFAULT_SWEEP_INTERVAL_MINUTES: u32 = 30;

/// Default delay before the first sweep after process start.
pub const DEFAULT_STARTUP_DELAY_SECONDS: u32 = 10;

/// Default trailing window searched when resolving a series template.
///
/// Series whose last clean occurrence is older than this fall back to the
/// series root.
pub const DEFAULT_LINEAGE_LOOKBACK_DAYS: u32 = 30;

/// Default civil timezone when none is configured.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Upper bound on the forward scan for a custom-day recurrence.
///
/// Covers any non-empty subset of a week twice over.
pub const CUSTOM_DAY_SCAN_LIMIT: u32 = 14;

//! Application-wide constants
//!
//! Magic numbers and defaults shared by the adapters, the stores and the
//! collector live here so they are easy to find and adjust.

/// Planar ("fictitious") grid used by networks that publish map offsets
/// instead of geographic coordinates.
pub mod planar {
    /// Longitude origin of the grid, in thousandths of a degree
    pub const LON_ORIGIN: f64 = 8260.0;

    /// Horizontal grid units per thousandth of a degree of longitude
    pub const X_SCALE: f64 = 1.18;

    /// Latitude origin of the grid, in thousandths of a degree
    pub const LAT_ORIGIN: f64 = 46730.0;

    /// Vertical grid units per thousandth of a degree of latitude
    pub const Y_SCALE: f64 = 1.72;

    /// Divisor turning thousandths of a degree into degrees
    pub const DEGREE_DIVISOR: f64 = 1000.0;

    /// Decimal places kept on converted coordinates
    pub const COORDINATE_DECIMALS: i32 = 3;
}

/// Durable storage constants
pub mod storage {
    /// Rolling log capacity: 24 hours of samples at 10-minute granularity
    pub const DEFAULT_ROLLING_CAPACITY: usize = 144;

    /// Sub-directory of the data dir holding the date/hour archives
    pub const DAILY_DIR: &str = "daily";

    /// Sub-directory of the data dir holding the rolling logs
    pub const ROLLING_DIR: &str = "rolling";

    /// Default root for persisted station history
    pub const DEFAULT_DATA_DIR: &str = "./data";

    /// Calendar used for archive date and hour keys
    pub const DEFAULT_TIMEZONE: &str = "Europe/Rome";

    /// Date key format inside a daily archive
    pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";
}

/// Time-related constants
pub mod time {
    /// Default interval between aggregation cycles (in seconds)
    pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;

    /// How long a served snapshot may be reused (in seconds)
    pub const DEFAULT_SNAPSHOT_CACHE_TTL_SECS: u64 = 60;

    /// Default cron schedule of the archive retention job (daily at 03:30)
    pub const DEFAULT_RETENTION_SCHEDULE: &str = "0 30 3 * * *";

    /// Default number of calendar days kept by the retention job
    pub const DEFAULT_RETENTION_DAYS: u32 = 30;
}

/// Network-related constants
pub mod network {
    /// Default per-fetch timeout (in seconds)
    pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

    /// Default number of concurrent per-station fetches
    pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

    /// User agent sent to upstream networks
    pub const USER_AGENT: &str = concat!("meteolink/", env!("CARGO_PKG_VERSION"));
}

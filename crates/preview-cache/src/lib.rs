//! Short-lived artifact cache for report previews
//!
//! Rows are stored in memory under random handles and removed by two coarse
//! sweeps that run before every insertion: one by age, one by total size.

mod clock;
mod error;
mod eviction;
mod store;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CacheError, Result};
pub use eviction::{
    EvictionPolicy, SweepReport, DEFAULT_MAX_TOTAL_BYTES, DEFAULT_PRESSURE_RETENTION_SECS,
    DEFAULT_RETENTION_SECS,
};
pub use store::ArtifactStore;
pub use types::{CacheRow, CacheStats, Handle, HANDLE_LEN};

//! Host resource readings: memory, logical CPUs, and filesystem usage.

mod disk;
mod error;
mod meminfo;
mod provider;
mod types;

pub use error::{MetricsError, Result};
pub use meminfo::parse_meminfo;
pub use provider::{HostMetrics, MetricsProvider};
pub use types::{DiskUsage, HostSnapshot, MemoryStats};

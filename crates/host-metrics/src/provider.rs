use nix::unistd::{SysconfVar, sysconf};

use crate::disk::{ROOT_PATH, disk_usage};
use crate::error::{MetricsError, Result};
use crate::meminfo::{MEMINFO_PATH, read_meminfo};
use crate::types::{DiskUsage, HostSnapshot, MemoryStats};

/// Source of host resource readings.
///
/// Implementations are queried on every call; nothing is cached.
pub trait MetricsProvider: Send + Sync {
    fn memory(&self) -> Result<MemoryStats>;
    /// Logical cores, hyperthreads included.
    fn cpu_count(&self) -> Result<u64>;
    fn disk(&self) -> Result<DiskUsage>;

    /// All three readings together, or an error if any one of them fails.
    fn snapshot(&self) -> Result<HostSnapshot> {
        let available_cpus = self.cpu_count()?;
        let memory = self.memory()?;
        let disk = self.disk()?;
        Ok(HostSnapshot {
            available_cpus,
            available_memory_bytes: memory.available,
            available_disk_bytes: disk.free,
        })
    }
}

/// Reads the local host via procfs and `statvfs(2)`.
#[derive(Debug, Clone)]
pub struct HostMetrics {
    meminfo_path: String,
    disk_path: String,
}

impl Default for HostMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl HostMetrics {
    pub fn new() -> Self {
        Self {
            meminfo_path: MEMINFO_PATH.to_string(),
            disk_path: ROOT_PATH.to_string(),
        }
    }

    /// Measure a different filesystem than `/` (e.g. the docker data root).
    pub fn with_disk_path(mut self, path: impl Into<String>) -> Self {
        self.disk_path = path.into();
        self
    }

    pub fn with_meminfo_path(mut self, path: impl Into<String>) -> Self {
        self.meminfo_path = path.into();
        self
    }
}

impl MetricsProvider for HostMetrics {
    fn memory(&self) -> Result<MemoryStats> {
        read_meminfo(&self.meminfo_path)
    }

    /// Online CPUs on the host. Unlike `available_parallelism`, this ignores
    /// the process's affinity mask and cgroup quota.
    fn cpu_count(&self) -> Result<u64> {
        let online = sysconf(SysconfVar::_NPROCESSORS_ONLN)
            .map_err(|e| MetricsError::CpuCount(e.to_string()))?
            .ok_or_else(|| MetricsError::CpuCount("_SC_NPROCESSORS_ONLN not supported".into()))?;
        u64::try_from(online).map_err(|_| MetricsError::CpuCount(format!("invalid count {online}")))
    }

    fn disk(&self) -> Result<DiskUsage> {
        disk_usage(&self.disk_path)
    }
}

//! Accept/reject decision for a resource request against a host snapshot.

use std::fmt;

use host_metrics::HostSnapshot;

use crate::types::ResourceRequest;

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accept,
    Reject(RejectReason),
}

/// The first dimension that did not fit, checked in the order CPU, memory,
/// storage. Memory and storage are in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Cpu { requested: u64, available: u64 },
    Memory { requested: u64, available: u64 },
    Storage { requested: u64, available: u64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu {
                requested,
                available,
            } => write!(f, "cpus: requested {requested}, available {available}"),
            Self::Memory {
                requested,
                available,
            } => write!(f, "memory: requested {requested} B, available {available} B"),
            Self::Storage {
                requested,
                available,
            } => write!(f, "storage: requested {requested} B, available {available} B"),
        }
    }
}

/// Decide whether `request` fits in `snapshot`. Equality fits.
///
/// Pure: no I/O, no state. Oversized MiB values saturate instead of
/// overflowing, so they always reject.
pub fn admit(request: &ResourceRequest, snapshot: &HostSnapshot) -> Admission {
    let cpus = u64::from(request.cpus);
    if cpus > snapshot.available_cpus {
        return Admission::Reject(RejectReason::Cpu {
            requested: cpus,
            available: snapshot.available_cpus,
        });
    }

    let memory = request.memory_mb.saturating_mul(MIB);
    if memory > snapshot.available_memory_bytes {
        return Admission::Reject(RejectReason::Memory {
            requested: memory,
            available: snapshot.available_memory_bytes,
        });
    }

    let storage = request.storage_mb.saturating_mul(MIB);
    if storage > snapshot.available_disk_bytes {
        return Admission::Reject(RejectReason::Storage {
            requested: storage,
            available: snapshot.available_disk_bytes,
        });
    }

    Admission::Accept
}

use nix::sys::statvfs::statvfs;

use crate::error::{MetricsError, Result};
use crate::types::{DiskUsage, percent};

pub const ROOT_PATH: &str = "/";

/// Usage of the filesystem containing `path`.
///
/// `free` counts blocks available to unprivileged users (`f_bavail`), which is
/// what a container's writable layer can actually consume.
pub(crate) fn disk_usage(path: &str) -> Result<DiskUsage> {
    let stat = statvfs(path).map_err(|source| MetricsError::Statvfs {
        path: path.to_string(),
        source,
    })?;

    let fragment = u64::from(stat.fragment_size());
    let blocks = u64::from(stat.blocks());
    let blocks_free = u64::from(stat.blocks_free());
    let blocks_available = u64::from(stat.blocks_available());

    let total = blocks.saturating_mul(fragment);
    let free = blocks_available.saturating_mul(fragment);
    let used = blocks.saturating_sub(blocks_free).saturating_mul(fragment);

    let inodes_total = u64::from(stat.files());
    let inodes_free = u64::from(stat.files_free());
    let inodes_used = inodes_total.saturating_sub(inodes_free);

    Ok(DiskUsage {
        path: path.to_string(),
        total,
        free,
        used,
        used_percent: percent(used, used.saturating_add(free)),
        inodes_total,
        inodes_free,
        inodes_used,
        inodes_used_percent: percent(inodes_used, inodes_total),
    })
}

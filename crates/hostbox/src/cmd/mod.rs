mod check;
mod init;
mod serve;
mod snapshot;

pub use check::{CheckArgs, run_check};
pub use init::{InitArgs, run_init};
pub use serve::{ServeArgs, run_serve};
pub use snapshot::{SnapshotArgs, run_snapshot};

//! In-process fakes for the metrics provider and the container runtime.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use host_metrics::{DiskUsage, MemoryStats, MetricsError, MetricsProvider};
use sandbox::{ContainerRuntime, ImageBuild, SandboxError, ServiceUp};

pub const UP_OUTPUT: &str = "Creating network \"hostbox_default\"\nCreating hostbox_sshd_1 ... done\n";

pub struct FakeMetrics {
    pub cpus: u64,
    pub memory_bytes: u64,
    pub disk_bytes: u64,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeMetrics {
    pub fn new(cpus: u64, memory_bytes: u64, disk_bytes: u64) -> Self {
        Self {
            cpus,
            memory_bytes,
            disk_bytes,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(0, 0, 0)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) -> host_metrics::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MetricsError::Parse {
                path: "/proc/meminfo".into(),
                detail: "MemAvailable missing".into(),
            });
        }
        Ok(())
    }
}

impl MetricsProvider for FakeMetrics {
    fn memory(&self) -> host_metrics::Result<MemoryStats> {
        self.touch()?;
        Ok(MemoryStats {
            total: self.memory_bytes * 2,
            available: self.memory_bytes,
            used: self.memory_bytes,
            used_percent: 50.0,
            free: self.memory_bytes,
            buffers: 0,
            cached: 0,
            swap_total: 0,
            swap_free: 0,
            swap_used: 0,
        })
    }

    fn cpu_count(&self) -> host_metrics::Result<u64> {
        self.touch()?;
        Ok(self.cpus)
    }

    fn disk(&self) -> host_metrics::Result<DiskUsage> {
        self.touch()?;
        Ok(DiskUsage {
            path: "/".into(),
            total: self.disk_bytes * 2,
            free: self.disk_bytes,
            used: self.disk_bytes,
            used_percent: 50.0,
            inodes_total: 100,
            inodes_free: 50,
            inodes_used: 50,
            inodes_used_percent: 50.0,
        })
    }
}

/// Records every call and checks the definition files are in place before
/// each runtime step.
#[derive(Default)]
pub struct FakeRuntime {
    pub fail_build: bool,
    pub fail_up: Option<String>,
    pub unavailable: bool,
    /// Time each build takes.
    pub build_delay: Option<Duration>,
    pub calls: Mutex<Vec<String>>,
    pub(crate) building: AtomicUsize,
    pub(crate) peak_building: AtomicUsize,
}

impl FakeRuntime {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Most builds ever observed running at the same time.
    pub fn peak_builds(&self) -> usize {
        self.peak_building.load(Ordering::SeqCst)
    }

    fn push(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    fn name(&self) -> &str {
        "fake"
    }

    fn image_definition_file(&self) -> &str {
        "Dockerfile"
    }

    fn service_definition_file(&self) -> &str {
        "docker-compose.yml"
    }

    async fn check(&self) -> sandbox::Result<()> {
        if self.unavailable {
            return Err(SandboxError::BackendNotAvailable(
                "required command not found: docker".into(),
            ));
        }
        Ok(())
    }

    async fn build_image(&self, request: &ImageBuild<'_>) -> sandbox::Result<()> {
        assert!(request.context_dir.join("Dockerfile").is_file());
        self.push(format!("build:{}", request.tag));
        if let Some(delay) = self.build_delay {
            let now = self.building.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_building.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            self.building.fetch_sub(1, Ordering::SeqCst);
        }
        if self.unavailable {
            return Err(SandboxError::BackendNotAvailable(
                "spawn docker: No such file or directory (os error 2)".into(),
            ));
        }
        if self.fail_build {
            return Err(SandboxError::BuildFailed(
                "docker build exited with exit status: 1".into(),
            ));
        }
        Ok(())
    }

    async fn bring_up(&self, request: &ServiceUp<'_>) -> sandbox::Result<String> {
        assert!(request.project_dir.join("docker-compose.yml").is_file());
        self.push(format!("up:{}", request.project));
        match &self.fail_up {
            Some(output) => Err(SandboxError::UpFailed {
                detail: "docker-compose exited with exit status: 1".into(),
                output: output.clone(),
            }),
            None => Ok(UP_OUTPUT.to_string()),
        }
    }
}

//! Host metric collection.
//!
//! [`MetricSource`] is the seam between the threshold logic and the
//! operating system. [`SysinfoCollector`] reads real values through
//! `sysinfo`.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sysinfo::System;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("system metrics are not available on {0}")]
    Unsupported(&'static str),
    #[error("cannot read filesystem usage for {}: {source}", path.display())]
    DiskStat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Source of host utilization readings.
pub trait MetricSource {
    /// Average CPU utilization over `window`. Blocks for at least the
    /// full window.
    fn cpu_percent(&mut self, window: Duration) -> f64;

    /// Used memory as a percentage of total.
    fn memory_percent(&mut self) -> f64;

    /// Used space on the filesystem holding `path`, in percent.
    fn disk_percent(&mut self, path: &Path) -> Result<f64, SampleError>;

    /// Number of live process identifiers.
    fn process_count(&mut self) -> usize;

    /// Host name, empty if it cannot be determined.
    fn host_name(&self) -> String;
}

/// Root filesystem path for the current platform.
pub fn root_mount() -> &'static Path {
    if cfg!(windows) {
        Path::new("C:\\")
    } else {
        Path::new("/")
    }
}

/// `used / total` in percent, where used is `total - available`.
pub fn percent_used(total: u64, available: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    total.saturating_sub(available) as f64 / total as f64 * 100.0
}

/// Disk usage as seen by unprivileged users: `used / (used + avail)`,
/// where `used = blocks - free`. Reserved blocks count as neither.
pub fn disk_usage_percent(blocks: u64, free: u64, avail: u64) -> f64 {
    let used = blocks.saturating_sub(free);
    let total_user = used + avail;
    if total_user == 0 {
        return 0.0;
    }
    used as f64 / total_user as f64 * 100.0
}

#[cfg(unix)]
fn stat_disk(path: &Path) -> Result<f64, SampleError> {
    use std::ffi::CString;
    use std::mem::MaybeUninit;
    use std::os::unix::ffi::OsStrExt;

    let stat_err = |source| SampleError::DiskStat {
        path: path.to_path_buf(),
        source,
    };
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| stat_err(io::Error::new(io::ErrorKind::InvalidInput, e)))?;

    let mut stat = MaybeUninit::<libc::statvfs>::uninit();
    // SAFETY: `c_path` is NUL-terminated and `stat` is a valid out pointer.
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
    if rc != 0 {
        return Err(stat_err(io::Error::last_os_error()));
    }
    // SAFETY: statvfs returned 0, so the struct is initialised.
    let stat = unsafe { stat.assume_init() };

    // Block counts are in units of the fragment size; the ratio does not
    // depend on it.
    Ok(disk_usage_percent(
        stat.f_blocks as u64,
        stat.f_bfree as u64,
        stat.f_bavail as u64,
    ))
}

#[cfg(not(unix))]
fn stat_disk(path: &Path) -> Result<f64, SampleError> {
    let disks = sysinfo::Disks::new_with_refreshed_list();
    disks
        .list()
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(|disk| {
            let (total, avail) = (disk.total_space(), disk.available_space());
            disk_usage_percent(total, avail, avail)
        })
        .ok_or_else(|| SampleError::DiskStat {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "no mounted filesystem"),
        })
}

/// Reads metrics from the running host.
pub struct SysinfoCollector {
    system: System,
}

impl SysinfoCollector {
    /// Fails if `sysinfo` has no backend for this platform.
    pub fn new() -> Result<Self, SampleError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(SampleError::Unsupported(std::env::consts::OS));
        }
        Ok(Self {
            system: System::new(),
        })
    }
}

impl MetricSource for SysinfoCollector {
    fn cpu_percent(&mut self, window: Duration) -> f64 {
        // Usage is the delta between two refreshes; shorter windows
        // than the backend minimum read as zero.
        let window = window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        self.system.refresh_cpu();
        std::thread::sleep(window);
        self.system.refresh_cpu();
        let usage = f64::from(self.system.global_cpu_info().cpu_usage());
        debug!(?window, usage, "cpu sampled");
        usage
    }

    fn memory_percent(&mut self) -> f64 {
        self.system.refresh_memory();
        percent_used(self.system.total_memory(), self.system.available_memory())
    }

    fn disk_percent(&mut self, path: &Path) -> Result<f64, SampleError> {
        stat_disk(path)
    }

    fn process_count(&mut self) -> usize {
        self.system.refresh_processes();
        // Threads show up as their own entries on Linux.
        self.system
            .processes()
            .values()
            .filter(|process| process.thread_kind().is_none())
            .count()
    }

    fn host_name(&self) -> String {
        System::host_name().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn percent_used_basic() {
        assert_eq!(percent_used(200, 50), 75.0);
        assert_eq!(percent_used(100, 100), 0.0);
    }

    #[test]
    fn percent_used_empty_and_overfull() {
        assert_eq!(percent_used(0, 0), 0.0);
        assert_eq!(percent_used(100, 150), 0.0);
    }

    #[test]
    fn disk_usage_excludes_reserved_blocks() {
        // 100 blocks, 20 free, 10 of those available to users.
        let percent = disk_usage_percent(100, 20, 10);
        assert!((percent - 80.0 / 90.0 * 100.0).abs() < 1e-9);
        assert_eq!(disk_usage_percent(0, 0, 0), 0.0);
        assert_eq!(disk_usage_percent(100, 100, 100), 0.0);
    }

    #[test]
    fn root_mount_is_platform_root() {
        if cfg!(windows) {
            assert_eq!(root_mount(), Path::new("C:\\"));
        } else {
            assert_eq!(root_mount(), Path::new("/"));
        }
    }

    #[test]
    fn disk_reading_for_any_path_on_a_filesystem() {
        let mut collector = SysinfoCollector::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        for path in [root_mount(), dir.path()] {
            let percent = collector.disk_percent(path).unwrap();
            assert!((0.0..=100.0).contains(&percent), "{}: {percent}", path.display());
        }
    }

    #[test]
    fn missing_path_is_an_error() {
        let mut collector = SysinfoCollector::new().unwrap();
        let err = collector
            .disk_percent(Path::new("/definitely/not/a/mount/point"))
            .unwrap_err();
        assert!(matches!(err, SampleError::DiskStat { .. }));
    }

    #[test]
    fn live_readings_are_in_range() {
        let mut collector = SysinfoCollector::new().unwrap();
        let mem = collector.memory_percent();
        assert!((0.0..=100.0).contains(&mem));
        assert!(collector.process_count() > 0);

        let cpu = collector.cpu_percent(Duration::ZERO);
        assert!((0.0..=100.0).contains(&cpu));
    }

    #[test]
    fn cpu_window_blocks_for_full_duration() {
        let mut collector = SysinfoCollector::new().unwrap();
        let window = Duration::from_millis(500);
        let start = Instant::now();
        collector.cpu_percent(window);
        assert!(start.elapsed() >= window, "returned after {:?}", start.elapsed());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn process_count_ignores_threads() {
        use std::sync::mpsc;
        use std::thread;

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let stop_rx = std::sync::Arc::new(std::sync::Mutex::new(stop_rx));
        let threads: Vec<_> = (0..20)
            .map(|_| {
                let rx = stop_rx.clone();
                thread::spawn(move || {
                    let _ = rx.lock().map(|rx| rx.recv());
                })
            })
            .collect();

        let mut collector = SysinfoCollector::new().unwrap();
        let counted = collector.process_count();
        let pids = std::fs::read_dir("/proc")
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| {
                let name = entry.file_name();
                !name.is_empty() && name.to_string_lossy().bytes().all(|b| b.is_ascii_digit())
            })
            .count();

        drop(stop_tx);
        for handle in threads {
            handle.join().unwrap();
        }

        // Unrelated processes may come and go between the two reads.
        assert!(
            counted.abs_diff(pids) < 10,
            "process_count={counted} /proc pids={pids}"
        );
    }
}

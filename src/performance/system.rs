//! Host-wide resource usage, sampled off the request path.

use chrono::{DateTime, Utc};
use crossbeam::channel::{bounded, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use sysinfo::{Disks, System};

use super::memory::bytes_to_mb;
use crate::clock::Clock;

/// CPU, memory and disk usage of the host at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub memory_available_mb: f64,
    pub disk_percent: f64,
    pub sampled_at: DateTime<Utc>,
}

pub(crate) type SystemStatsSlot = Arc<Mutex<Option<SystemStats>>>;

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Used share of a volume given its total and available bytes
pub fn disk_usage_percent(total: u64, available: u64) -> f64 {
    percent(total.saturating_sub(available), total)
}

/// Reads host usage through `sysinfo`.
///
/// CPU usage is measured between consecutive refreshes, so the first sample
/// reports zero.
#[derive(Debug)]
pub struct SystemSampler {
    system: System,
}

impl SystemSampler {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    pub fn sample(&mut self, now: DateTime<Utc>) -> SystemStats {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        let disks = Disks::new_with_refreshed_list();
        let root = disks
            .list()
            .iter()
            .find(|disk| disk.mount_point() == Path::new("/"))
            .or_else(|| disks.list().iter().max_by_key(|disk| disk.total_space()));

        SystemStats {
            cpu_percent: f64::from(self.system.global_cpu_usage()),
            memory_percent: percent(self.system.used_memory(), self.system.total_memory()),
            memory_available_mb: bytes_to_mb(self.system.available_memory() as f64),
            disk_percent: root
                .map(|disk| disk_usage_percent(disk.total_space(), disk.available_space()))
                .unwrap_or(0.0),
            sampled_at: now,
        }
    }
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Background thread that refreshes the monitor's [`SystemStats`] on a fixed
/// interval. Stops when dropped.
pub struct SystemStatsRefresher {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SystemStatsRefresher {
    pub(crate) fn spawn(
        slot: SystemStatsSlot,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let interval = interval.max(Duration::from_millis(10));

        let handle = thread::Builder::new()
            .name("sentiscope-system-stats".to_string())
            .spawn(move || {
                let mut sampler = SystemSampler::new();
                loop {
                    let stats = sampler.sample(clock.now());
                    tracing::trace!(
                        cpu = stats.cpu_percent,
                        memory = stats.memory_percent,
                        disk = stats.disk_percent,
                        "system stats refreshed"
                    );
                    *slot.lock() = Some(stats);
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })?;

        Ok(Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for SystemStatsRefresher {
    fn drop(&mut self) {
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("system stats thread panicked");
            }
        }
    }
}

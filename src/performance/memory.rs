use parking_lot::Mutex;
use sysinfo::{Pid, ProcessesToUpdate, System};

/// Source of the process's resident memory
pub trait MemoryProbe: Send + Sync {
    /// Resident set size in bytes; zero when unknown
    fn resident_bytes(&self) -> u64;
}

/// Resident memory of the current process, read through `sysinfo`
#[derive(Debug)]
pub struct ProcessMemoryProbe {
    pid: Option<Pid>,
    system: Mutex<System>,
}

impl ProcessMemoryProbe {
    pub fn new() -> Self {
        let pid = sysinfo::get_current_pid().ok();
        if pid.is_none() {
            tracing::warn!("current process id unavailable; memory will read as zero");
        }
        Self {
            pid,
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for ProcessMemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for ProcessMemoryProbe {
    fn resident_bytes(&self) -> u64 {
        let Some(pid) = self.pid else {
            return 0;
        };
        let mut system = self.system.lock();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        system.process(pid).map(|process| process.memory()).unwrap_or(0)
    }
}

pub fn bytes_to_mb(bytes: f64) -> f64 {
    bytes / (1024.0 * 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_bytes_to_megabytes() {
        assert_eq!(bytes_to_mb(1536.0 * 1024.0), 1.5);
        assert_eq!(bytes_to_mb(0.0), 0.0);
    }

    #[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
    #[test]
    fn current_process_has_resident_memory() {
        let probe = ProcessMemoryProbe::new();
        assert!(probe.resident_bytes() > 0);
        assert!(probe.resident_bytes() > 0);
    }
}

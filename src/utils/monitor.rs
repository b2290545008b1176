#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::Instant;
#[cfg(feature = "cli")]
use sysinfo::{Pid, System};

/// 排行榜更新期間的行程資源監控
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    inner: Option<MonitorState>,
}

#[cfg(feature = "cli")]
struct MonitorState {
    system: Mutex<System>,
    pid: Pid,
    started: Instant,
    peak_memory_mb: Mutex<u64>,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self { inner: None };
        }

        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => pid,
            Err(e) => {
                tracing::warn!("⚠️ System monitor disabled, cannot resolve PID: {}", e);
                return Self { inner: None };
            }
        };

        let mut system = System::new_all();
        system.refresh_all();

        Self {
            inner: Some(MonitorState {
                system: Mutex::new(system),
                pid,
                started: Instant::now(),
                peak_memory_mb: Mutex::new(0),
            }),
        }
    }

    pub fn log_stats(&self, phase: &str) {
        let Some(state) = &self.inner else {
            return;
        };
        let Ok(mut system) = state.system.lock() else {
            return;
        };
        system.refresh_all();

        let Some(process) = system.process(state.pid) else {
            return;
        };
        let memory_mb = process.memory() / 1024 / 1024;
        let peak = match state.peak_memory_mb.lock() {
            Ok(mut peak) => {
                *peak = (*peak).max(memory_mb);
                *peak
            }
            Err(_) => memory_mb,
        };

        tracing::info!(
            "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Elapsed: {:?}",
            phase,
            process.cpu_usage(),
            memory_mb,
            peak,
            state.started.elapsed()
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 建置（例如 lambda）不帶 sysinfo
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}

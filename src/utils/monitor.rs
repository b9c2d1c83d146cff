//! 各階段耗時與記憶體追蹤 (--monitor)

#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

#[cfg(feature = "cli")]
struct PhaseSample {
    phase: String,
    at: Duration,
    rss_mb: u64,
}

#[cfg(feature = "cli")]
struct MonitorState {
    system: System,
    pid: Pid,
    started: Instant,
    samples: Vec<PhaseSample>,
}

#[cfg(feature = "cli")]
impl MonitorState {
    fn sample(&mut self, phase: &str) -> Option<(&PhaseSample, f32)> {
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);
        let process = self.system.process(self.pid)?;
        let cpu = process.cpu_usage();
        let rss_mb = process.memory() / 1024 / 1024;

        self.samples.push(PhaseSample {
            phase: phase.to_string(),
            at: self.started.elapsed(),
            rss_mb,
        });
        self.samples.last().map(|s| (s, cpu))
    }
}

/// 停用或無法取得目前行程時不做任何事
#[cfg(feature = "cli")]
#[derive(Default)]
pub struct SystemMonitor {
    state: Option<Mutex<MonitorState>>,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self::default();
        }

        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => pid,
            Err(e) => {
                tracing::warn!("System monitoring unavailable: {}", e);
                return Self::default();
            }
        };

        Self {
            state: Some(Mutex::new(MonitorState {
                system: System::new(),
                pid,
                started: Instant::now(),
                samples: Vec::new(),
            })),
        }
    }

    /// 記錄某階段結束時的狀態
    pub fn log_stats(&self, phase: &str) {
        let Some(mut state) = self.state.as_ref().and_then(|s| s.lock().ok()) else {
            return;
        };
        if let Some((sample, cpu)) = state.sample(phase) {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, RSS: {}MB, at {:.2?}",
                sample.phase,
                cpu,
                sample.rss_mb,
                sample.at
            );
        }
    }

    /// 列出各階段耗時與峰值 RSS
    pub fn log_final_stats(&self) {
        let Some(state) = self.state.as_ref().and_then(|s| s.lock().ok()) else {
            return;
        };

        let mut previous = Duration::ZERO;
        for sample in &state.samples {
            tracing::info!(
                "⏱️ {:<10} {:>10.2?}",
                sample.phase,
                sample.at.saturating_sub(previous)
            );
            previous = sample.at;
        }

        let peak = state.samples.iter().map(|s| s.rss_mb).max().unwrap_or(0);
        tracing::info!(
            "📊 Final Stats - Total Time: {:.2?}, Peak RSS: {}MB",
            state.started.elapsed(),
            peak
        );
    }
}

// 非 CLI 環境提供空實現
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}
}

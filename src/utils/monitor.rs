use std::time::{Duration, Instant};

#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub phase: String,
    pub elapsed: Duration,
    pub memory_mb: Option<u64>,
}

/// Records per-phase timings for one audit run; resident memory is sampled
/// through `sysinfo` when the `cli` feature is on.
pub struct SystemMonitor {
    enabled: bool,
    started: Instant,
    last: Instant,
    phases: Vec<PhaseStats>,
    #[cfg(feature = "cli")]
    sampler: Option<(System, Pid)>,
}

impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let now = Instant::now();
        Self {
            enabled,
            started: now,
            last: now,
            phases: Vec::new(),
            #[cfg(feature = "cli")]
            sampler: if enabled {
                sysinfo::get_current_pid()
                    .ok()
                    .map(|pid| (System::new_with_specifics(RefreshKind::everything()), pid))
            } else {
                None
            },
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[cfg(feature = "cli")]
    fn memory_mb(&mut self) -> Option<u64> {
        let (system, pid) = self.sampler.as_mut()?;
        system.refresh_all();
        system.process(*pid).map(|p| p.memory() / 1024 / 1024)
    }

    #[cfg(not(feature = "cli"))]
    fn memory_mb(&mut self) -> Option<u64> {
        None
    }

    /// Closes the current phase and logs how long it took.
    pub fn mark(&mut self, phase: &str) {
        if !self.enabled {
            return;
        }
        let now = Instant::now();
        let stats = PhaseStats {
            phase: phase.to_string(),
            elapsed: now - self.last,
            memory_mb: self.memory_mb(),
        };
        self.last = now;

        match stats.memory_mb {
            Some(mb) => tracing::info!("📊 {} - Time: {:?}, Memory: {}MB", stats.phase, stats.elapsed, mb),
            None => tracing::info!("📊 {} - Time: {:?}", stats.phase, stats.elapsed),
        }
        self.phases.push(stats);
    }

    pub fn phases(&self) -> &[PhaseStats] {
        &self.phases
    }

    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }
        let peak = self.phases.iter().filter_map(|p| p.memory_mb).max();
        match peak {
            Some(mb) => tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
                self.started.elapsed(),
                mb
            ),
            None => tracing::info!("📊 Final Stats - Total Time: {:?}", self.started.elapsed()),
        }
    }
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

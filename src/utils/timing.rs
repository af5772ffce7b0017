use std::sync::Mutex;
use std::time::Instant;

/// 可選的階段計時，--monitor 開啟
pub struct StageTimer {
    enabled: bool,
    started: Instant,
    last: Mutex<Instant>,
}

impl StageTimer {
    pub fn new(enabled: bool) -> Self {
        let now = Instant::now();
        Self {
            enabled,
            started: now,
            last: Mutex::new(now),
        }
    }

    pub fn mark(&self, stage: &str) {
        if !self.enabled {
            return;
        }
        let now = Instant::now();
        if let Ok(mut last) = self.last.lock() {
            tracing::info!("📊 {} finished in {:?}", stage, now.duration_since(*last));
            *last = now;
        }
    }

    pub fn finish(&self) {
        if self.enabled {
            tracing::info!("📊 Total run time: {:?}", self.started.elapsed());
        }
    }
}

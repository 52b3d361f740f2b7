//! Human pacing: keystroke delays and inter-action jitter

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;

#[derive(Debug, Clone)]
pub struct Pacer {
    typing_delay_ms: RangeInclusive<u64>,
    action_jitter_ms: RangeInclusive<u64>,
}

impl Default for Pacer {
    fn default() -> Self {
        Self {
            typing_delay_ms: 50..=150,
            action_jitter_ms: 1_000..=2_000,
        }
    }
}

impl Pacer {
    pub fn new(typing_delay_ms: RangeInclusive<u64>, action_jitter_ms: RangeInclusive<u64>) -> Self {
        Self {
            typing_delay_ms,
            action_jitter_ms,
        }
    }

    /// No delays at all (tests, dry runs against local fixtures)
    pub fn instant() -> Self {
        Self::new(0..=0, 0..=0)
    }

    pub fn keystroke_delay(&self) -> Duration {
        Duration::from_millis(pick(&self.typing_delay_ms))
    }

    /// Sleep between two interactions
    pub async fn jitter(&self) {
        pause(pick(&self.action_jitter_ms)).await;
    }

    /// Sleep a random duration in `[min_ms, max_ms]`
    pub async fn between(&self, min_ms: u64, max_ms: u64) {
        if self.action_jitter_ms.end() == &0 {
            return;
        }
        pause(pick(&(min_ms..=max_ms.max(min_ms)))).await;
    }
}

fn pick(range: &RangeInclusive<u64>) -> u64 {
    if range.start() >= range.end() {
        *range.start()
    } else {
        rand::thread_rng().gen_range(range.clone())
    }
}

async fn pause(ms: u64) {
    if ms > 0 {
        sleep(Duration::from_millis(ms)).await;
    }
}

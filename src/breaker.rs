use crate::types::StepStatus;

/// Halts the run after a configured number of consecutive step failures,
/// regardless of which endpoint they came from. Any success resets the count.
#[derive(Debug)]
pub struct ConsecutiveFailureBreaker {
    consecutive_failures: u32,
    threshold: u32,
}

impl ConsecutiveFailureBreaker {
    pub fn new(threshold: u32) -> Self {
        Self {
            consecutive_failures: 0,
            threshold,
        }
    }

    pub fn record(&mut self, status: &StepStatus) {
        if status.is_success() {
            self.consecutive_failures = 0;
        } else {
            self.consecutive_failures += 1;
        }
    }

    pub fn should_halt(&self) -> bool {
        self.consecutive_failures >= self.threshold
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

//! Session configuration.

use std::time::Duration;

use algoviz_player::PlaybackSpeed;
use algoviz_steps::{AlgorithmInput, DEFAULT_BAR_COUNT, DEFAULT_DELETE_VALUE, DEFAULT_INSERT_VALUE};

/// Default delay between steps at normal speed.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Settings for a learning session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Bars in the sorting demos.
    pub bar_count: usize,
    /// Step delay at 1x.
    pub base_delay: Duration,
    pub speed: PlaybackSpeed,
    /// Seed for random bars and sampled ML data.
    pub seed: u64,
    /// Graph start node.
    pub start: usize,
    /// A* goal node. `None` means the last node.
    pub goal: Option<usize>,
    pub insert_value: i64,
    pub delete_value: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bar_count: DEFAULT_BAR_COUNT,
            base_delay: DEFAULT_BASE_DELAY,
            speed: PlaybackSpeed::Normal,
            seed: 42,
            start: 0,
            goal: None,
            insert_value: DEFAULT_INSERT_VALUE,
            delete_value: DEFAULT_DELETE_VALUE,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_bar_count(mut self, bar_count: usize) -> Self {
        self.bar_count = bar_count;
        self
    }

    #[must_use]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    #[must_use]
    pub fn with_speed(mut self, speed: PlaybackSpeed) -> Self {
        self.speed = speed;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    #[must_use]
    pub fn with_goal(mut self, goal: Option<usize>) -> Self {
        self.goal = goal;
        self
    }

    #[must_use]
    pub fn with_insert_value(mut self, value: i64) -> Self {
        self.insert_value = value;
        self
    }

    #[must_use]
    pub fn with_delete_value(mut self, value: i64) -> Self {
        self.delete_value = value;
        self
    }

    /// Delay between delivered steps.
    pub fn step_delay(&self) -> Duration {
        self.speed.delay(self.base_delay)
    }

    /// Generator input built from these settings.
    pub fn algorithm_input(&self) -> AlgorithmInput {
        let input = AlgorithmInput::default()
            .with_random_bars(self.bar_count, self.seed)
            .with_start(self.start)
            .with_insert_value(self.insert_value)
            .with_delete_value(self.delete_value)
            .with_seed(self.seed);
        match self.goal {
            Some(goal) => input.with_goal(goal),
            None => input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo_data() {
        let config = SessionConfig::default();
        let input = config.algorithm_input();
        assert_eq!(input.array.len(), DEFAULT_BAR_COUNT);
        assert_eq!(input.insert_value, 65);
        assert_eq!(input.delete_value, 30);
        assert_eq!(input.goal, None);
        assert_eq!(config.step_delay(), DEFAULT_BASE_DELAY);
    }

    #[test]
    fn builders_flow_into_input() {
        let config = SessionConfig::default()
            .with_bar_count(4)
            .with_seed(7)
            .with_goal(Some(3))
            .with_insert_value(10)
            .with_speed(PlaybackSpeed::Double)
            .with_base_delay(Duration::from_millis(200));
        let input = config.algorithm_input();
        assert_eq!(input.array.len(), 4);
        assert_eq!(input.seed, 7);
        assert_eq!(input.goal, Some(3));
        assert_eq!(input.insert_value, 10);
        assert_eq!(config.step_delay(), Duration::from_millis(100));
    }
}

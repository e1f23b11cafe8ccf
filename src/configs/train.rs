use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    // The total number of episodes.
    max_episodes: usize,
    // Number of random actions to take at very beginning of training.
    initial_random_actions: usize,
    // The seed for the run's episode-reset randomness.
    seed: u64,
}
impl TrainConfig {
    pub fn new(
        max_episodes: usize,
        initial_random_actions: usize,
        seed: u64,
    ) -> Self {
        Self {
            max_episodes,
            initial_random_actions,
            seed,
        }
    }

    pub fn highway() -> Self {
        Self {
            max_episodes: 1000,
            initial_random_actions: 0,
            seed: 42,
        }
    }

    pub fn lane() -> Self {
        Self {
            max_episodes: 100,
            initial_random_actions: 100,
            seed: 42,
        }
    }

    pub fn max_episodes(&self) -> usize {
        self.max_episodes
    }
    pub fn initial_random_actions(&self) -> usize {
        self.initial_random_actions
    }
    pub fn seed(&self) -> u64 {
        self.seed
    }
    pub fn set_max_episodes(&mut self, max_episodes: usize) {
        self.max_episodes = max_episodes;
    }
    pub fn set_initial_random_actions(&mut self, initial_random_actions: usize) {
        self.initial_random_actions = initial_random_actions;
    }
}

use serde::{
    Deserialize,
    Serialize,
};

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DDPG_Config {
    // The learning rates for the Actor and Critic networks
    pub actor_learning_rate: f64,
    pub critic_learning_rate: f64,
    // The impact of the q value of the next state on the current state's q value.
    pub gamma: f64,
    // The weight for updating the target networks.
    pub tau: f64,
    // The number of neurons in the hidden layers of the Actor and Critic networks.
    pub hidden_1_size: usize,
    pub hidden_2_size: usize,
    // The capacity of the replay buffer used for sampling training data.
    pub replay_buffer_capacity: usize,
    // The training batch size for each training iteration.
    pub training_batch_size: usize,
    // The bounds applied to the bootstrapped regression target.
    pub min_value: f64,
    pub max_value: f64,
    // The half-range of the uniform init for the network output layers.
    pub init_weight: f64,
    // Ornstein-Uhlenbeck process parameters.
    pub ou_mu: f64,
    pub ou_theta: f64,
    pub ou_max_sigma: f64,
    pub ou_min_sigma: f64,
    pub ou_decay_period: usize,
    // The seed for the agent's own randomness (noise and batch sampling).
    pub seed: u64,
}
impl DDPG_Config {
    pub fn highway() -> Self {
        Self {
            actor_learning_rate: 5e-4,
            critic_learning_rate: 5e-3,
            gamma: 0.9,
            tau: 0.02,
            hidden_1_size: 256,
            hidden_2_size: 256,
            replay_buffer_capacity: 5000,
            training_batch_size: 30,
            min_value: f64::NEG_INFINITY,
            max_value: f64::INFINITY,
            init_weight: 3e-3,
            ou_mu: 0.0,
            ou_theta: 0.15,
            ou_max_sigma: 0.3,
            ou_min_sigma: 0.3,
            ou_decay_period: 10_000,
            seed: 42,
        }
    }

    pub fn lane() -> Self {
        Self {
            hidden_1_size: 64,
            hidden_2_size: 64,
            ..Self::highway()
        }
    }
}

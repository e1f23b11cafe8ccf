mod ddpg;

pub use ddpg::DDPG;


use {
    crate::components::ReplayBuffer,
    candle_core::{
        Device,
        Result,
        Tensor,
    },
    std::fmt::Display,
};


/// The execution mode of an agent is either training or testing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Train,
    Test,
}

impl Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Train => write!(f, "Train"),
            RunMode::Test => write!(f, "Test"),
        }
    }
}

pub trait Algorithm {
    type Config;

    fn config(&self) -> &Self::Config;
    fn from_config(
        device: &Device,
        config: &Self::Config,
        size_state: usize,
        size_action: usize,
    ) -> Result<Box<Self>>;

    /// Select an action for the given state.
    ///
    /// In [`RunMode::Train`] this includes exploration noise, in
    /// [`RunMode::Test`] it is the raw policy output.
    fn actions(
        &mut self,
        state: &Tensor,
    ) -> Result<Tensor>;

    /// Run one training update, a no-op until enough experience is stored.
    fn train(&mut self) -> Result<()>;

    /// Notify the agent that a fresh episode is starting.
    fn begin_episode(&mut self) -> Result<()>;

    fn run_mode(&self) -> RunMode;
    fn set_run_mode(&mut self, mode: RunMode);
}

pub trait OffPolicyAlgorithm: Algorithm {
    fn remember(
        &mut self,
        state: &Tensor,
        action: &Tensor,
        reward: &Tensor,
        next_state: &Tensor,
        done: &Tensor,
    );

    fn replay_buffer(&self) -> &ReplayBuffer;
}

mod action;
mod config;
mod lane_env;
mod state;

pub use {
    action::LaneAction,
    config::LaneEnvConfig,
    lane_env::LaneEnv,
    state::LaneObs,
};

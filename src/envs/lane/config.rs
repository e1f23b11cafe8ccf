use {
    super::super::RewardShaping,
    anyhow::Result,
    serde::{
        Deserialize,
        Serialize,
    },
};

/// The configuration struct for the [`LaneEnv`](super::lane_env::LaneEnv)
/// environment.
///
/// # Fields
/// * `road_length` - The length of the straight road segment.
/// * `half_width` - The distance from the lane center to the road edge.
/// * `dt` - The integration timestep in seconds.
/// * `wheelbase` - The distance between the vehicle axles.
/// * `initial_speed` - The speed the vehicle starts every episode with.
/// * `max_speed` - The speed the vehicle cannot accelerate beyond.
/// * `max_steering` - The steering angle bound in radians.
/// * `max_acceleration` - The acceleration bound.
/// * `timelimit` - The maximum number of steps before the episode is truncated.
/// * `centering_cost` - How sharply the reward falls off with lateral offset.
/// * `steering_cost` - How sharply the reward falls off with steering effort.
/// * `reward_shaping` - The policy applied to raw rewards, see [`RewardShaping`].
/// * `seed` - The seed for the random number generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneEnvConfig {
    pub road_length: f64,
    pub half_width: f64,
    pub dt: f64,
    pub wheelbase: f64,
    pub initial_speed: f64,
    pub max_speed: f64,
    pub max_steering: f64,
    pub max_acceleration: f64,
    pub timelimit: usize,
    pub centering_cost: f64,
    pub steering_cost: f64,
    pub reward_shaping: RewardShaping,
    pub seed: u64,
}
impl Default for LaneEnvConfig {
    fn default() -> Self {
        Self {
            road_length: 200.0,
            half_width: 4.0,
            dt: 0.1,
            wheelbase: 2.5,
            initial_speed: 8.0,
            max_speed: 12.0,
            max_steering: 0.4,
            max_acceleration: 3.0,
            timelimit: 500,
            centering_cost: 4.0,
            steering_cost: 0.6,
            reward_shaping: RewardShaping::OutOfBounds {
                sentinel: 0.0,
                penalty: -1000.0,
            },
            seed: 42,
        }
    }
}
impl LaneEnvConfig {
    pub fn check(&self) -> Result<()> {
        if !(self.dt > 0.0) {
            return Err(anyhow::anyhow!("Timestep must be positive"));
        }

        if !(self.road_length > 0.0 && self.half_width > 0.0) {
            return Err(anyhow::anyhow!("Road dimensions must be positive"));
        }

        if !(self.max_steering > 0.0 && self.max_steering < std::f64::consts::FRAC_PI_2) {
            return Err(anyhow::anyhow!(
                "Steering bound must be in the range (0.0, pi/2)"
            ));
        }

        if !(self.initial_speed >= 0.0 && self.initial_speed <= self.max_speed) {
            return Err(anyhow::anyhow!(
                "Initial speed must be in the range [0.0, max_speed]"
            ));
        }

        if self.timelimit == 0 {
            return Err(anyhow::anyhow!("Timelimit must be at least one step"));
        }

        Ok(())
    }
}

use {
    super::{
        gym_wrappers::{
            gym_create_env,
            gym_env_spaces,
            gym_reset_env,
            gym_step_env,
        },
        Environment,
        RewardShaping,
        Sampleable,
        Step,
        TensorConvertible,
        VectorConvertible,
    },
    anyhow::Result,
    candle_core::{
        Device,
        Tensor,
    },
    pyo3::{
        types::PyDict,
        PyObject,
        Python,
    },
    rand::{
        Rng,
        RngCore,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    std::ops::RangeInclusive,
};

/// A Gymnasium driving simulator with an occupancy-grid observation and a
/// continuous longitudinal/lateral control action.
pub struct HighwayEnv {
    env: PyObject,
    config: HighwayConfig,
    action_space: Vec<usize>,
    observation_space: Vec<usize>,
    current_observation: HighwayObs,
}

/// The configuration pushed into the simulator before the first reset.
///
/// Mirrors the simulator's own config surface: an `OccupancyGrid` observation
/// of the listed per-cell features and a `ContinuousAction` controlling both
/// throttle and steering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighwayConfig {
    pub name: String,
    pub grid_features: Vec<String>,
    pub grid_size: [[f64; 2]; 2],
    pub grid_step: [f64; 2],
    pub align_to_vehicle_axes: bool,
    pub simulation_frequency: usize,
    pub policy_frequency: usize,
    pub duration: usize,
    pub collision_reward: f64,
    pub lane_centering_cost: f64,
    pub action_reward: f64,
    pub controlled_vehicles: usize,
    pub other_vehicles: usize,
    pub reward_shaping: RewardShaping,
}
impl Default for HighwayConfig {
    fn default() -> Self {
        Self {
            name: "racetrack-v0".to_owned(),
            grid_features: vec![
                "presence".to_owned(),
                "on_road".to_owned(),
                "vx".to_owned(),
                "vy".to_owned(),
            ],
            grid_size: [[-6.0, 6.0], [-9.0, 9.0]],
            grid_step: [3.0, 3.0],
            align_to_vehicle_axes: true,
            simulation_frequency: 20,
            policy_frequency: 5,
            duration: 500,
            collision_reward: -200.0,
            lane_centering_cost: 4.0,
            action_reward: -0.6,
            controlled_vehicles: 1,
            other_vehicles: 1,
            // the simulator reports leaving the road as a bare zero reward
            reward_shaping: RewardShaping::OutOfBounds {
                sentinel: 0.0,
                penalty: -1000.0,
            },
        }
    }
}

fn gym_configure_env(
    env: &PyObject,
    config: &HighwayConfig,
) -> Result<()> {
    Python::with_gil(|py| -> pyo3::PyResult<()> {
        let observation = PyDict::new(py);
        observation.set_item("type", "OccupancyGrid")?;
        observation.set_item("features", config.grid_features.clone())?;
        observation.set_item(
            "grid_size",
            config
                .grid_size
                .iter()
                .map(|range| range.to_vec())
                .collect::<Vec<Vec<f64>>>(),
        )?;
        observation.set_item("grid_step", config.grid_step.to_vec())?;
        observation.set_item("as_image", false)?;
        observation.set_item("align_to_vehicle_axes", config.align_to_vehicle_axes)?;

        let action = PyDict::new(py);
        action.set_item("type", "ContinuousAction")?;
        action.set_item("longitudinal", true)?;
        action.set_item("lateral", true)?;

        let options = PyDict::new(py);
        options.set_item("observation", observation)?;
        options.set_item("action", action)?;
        options.set_item("simulation_frequency", config.simulation_frequency)?;
        options.set_item("policy_frequency", config.policy_frequency)?;
        options.set_item("duration", config.duration)?;
        options.set_item("collision_reward", config.collision_reward)?;
        options.set_item("lane_centering_cost", config.lane_centering_cost)?;
        options.set_item("action_reward", config.action_reward)?;
        options.set_item("controlled_vehicles", config.controlled_vehicles)?;
        options.set_item("other_vehicles", config.other_vehicles)?;

        env.call_method1(py, "configure", (options,))?;
        Ok(())
    })?;
    Ok(())
}

/// The continuous control action: `[longitudinal, lateral]`, both in the
/// simulator's normalized `[-1, 1]` range.
#[derive(Clone, Debug)]
pub struct HighwayAction {
    longitudinal: f64,
    lateral: f64,
}
impl HighwayAction {
    pub fn longitudinal(&self) -> f64 {
        self.longitudinal
    }

    pub fn lateral(&self) -> f64 {
        self.lateral
    }
}

impl Sampleable for HighwayAction {
    fn sample(
        rng: &mut dyn RngCore,
        domain: &[RangeInclusive<f64>],
    ) -> Self {
        assert!(domain.len() == 2);
        Self {
            longitudinal: rng.gen_range(domain[0].clone()),
            lateral: rng.gen_range(domain[1].clone()),
        }
    }
}

impl VectorConvertible for HighwayAction {
    fn from_vec_pp(value: Vec<f64>) -> Self {
        Self::from_vec(value)
    }

    fn from_vec(value: Vec<f64>) -> Self {
        assert!(value.len() == 2);
        Self {
            longitudinal: value[0],
            lateral: value[1],
        }
    }

    fn to_vec(value: Self) -> Vec<f64> {
        vec![value.longitudinal, value.lateral]
    }
}

impl TensorConvertible for HighwayAction {
    fn from_tensor_pp(value: Tensor) -> Self {
        Self::from_tensor(value)
    }

    fn from_tensor(value: Tensor) -> Self {
        Self::from_vec(value.to_vec1::<f64>().unwrap())
    }

    fn to_tensor(
        value: Self,
        device: &Device,
    ) -> candle_core::Result<Tensor> {
        Tensor::new(Self::to_vec(value), device)
    }
}

/// The occupancy grid around the controlled vehicle, flattened to a vector
/// of one value per (feature, cell) pair.
#[derive(Clone, Debug)]
pub struct HighwayObs {
    grid: Vec<f64>,
}

impl VectorConvertible for HighwayObs {
    fn from_vec_pp(value: Vec<f64>) -> Self {
        Self::from_vec(value)
    }

    fn from_vec(value: Vec<f64>) -> Self {
        Self { grid: value }
    }

    fn to_vec(value: Self) -> Vec<f64> {
        value.grid
    }
}

impl TensorConvertible for HighwayObs {
    fn from_tensor_pp(value: Tensor) -> Self {
        Self::from_tensor(value)
    }

    fn from_tensor(value: Tensor) -> Self {
        Self::from_vec(value.to_vec1::<f64>().unwrap())
    }

    fn to_tensor(
        value: Self,
        device: &Device,
    ) -> candle_core::Result<Tensor> {
        Tensor::new(Self::to_vec(value), device)
    }
}

impl Environment for HighwayEnv {
    type Config = HighwayConfig;
    type Action = HighwayAction;
    type Observation = HighwayObs;

    fn config(&self) -> &HighwayConfig {
        &self.config
    }

    fn new(config: Self::Config) -> Result<Box<Self>> {
        let env = gym_create_env(&config.name)?;
        gym_configure_env(&env, &config)?;
        // the new configuration only takes effect on the next reset, and the
        // spaces can only be read truthfully after that
        let current_observation = gym_reset_env(&env, 0, true)?;
        let (action_space, observation_space) = gym_env_spaces(&env)?;
        Ok(Box::new(Self {
            env,
            config,
            action_space,
            observation_space,
            current_observation,
        }))
    }

    fn reset(
        &mut self,
        seed: u64,
    ) -> Result<Self::Observation> {
        let observation: HighwayObs = gym_reset_env(&self.env, seed, true)?;
        self.current_observation = observation.clone();
        Ok(observation)
    }

    fn step(
        &mut self,
        action: Self::Action,
    ) -> Result<Step<Self::Observation, Self::Action>> {
        let mut step = gym_step_env(&self.env, action, true)?;

        let (reward, out_of_bounds) = self.config.reward_shaping.apply(step.reward);
        step.reward = reward;
        step.terminated = step.terminated || out_of_bounds;

        self.current_observation = step.observation.clone();
        Ok(step)
    }

    fn timelimit(&self) -> usize {
        self.config.duration
    }

    fn action_space(&self) -> Vec<usize> {
        self.action_space.clone()
    }

    fn action_domain(&self) -> Vec<RangeInclusive<f64>> {
        vec![-1.0..=1.0; self.action_space.iter().product()]
    }

    fn observation_space(&self) -> Vec<usize> {
        self.observation_space.clone()
    }

    fn current_observation(&self) -> Self::Observation {
        self.current_observation.clone()
    }
}

use {
    super::{
        Environment,
        Step,
        VectorConvertible,
    },
    anyhow::Result,
    std::ops::RangeInclusive,
};

/// Wraps an environment so that the agent acts in the normalized `[-1, 1]`
/// action space regardless of the inner environment's raw action bounds.
///
/// A tanh policy head produces actions in `[-1, 1]`; the wrapper applies the
/// affine map into the raw bounds on the way in, so neither the agent nor
/// the engine ever see the environment's own scale.
pub struct NormalizedEnv<E: Environment> {
    env: E,
    low: Vec<f64>,
    high: Vec<f64>,
}

impl<E: Environment> NormalizedEnv<E> {
    pub fn wrap(env: E) -> Self {
        let (low, high) = env
            .action_domain()
            .iter()
            .map(|range| (*range.start(), *range.end()))
            .unzip();

        Self { env, low, high }
    }

    pub fn inner(&self) -> &E {
        &self.env
    }

    /// Map an action from `[-1, 1]` into the raw bounds:
    /// `low + (a + 1) / 2 * (high - low)`, clipped to `[low, high]`.
    pub fn to_env(
        &self,
        action: &[f64],
    ) -> Vec<f64> {
        action
            .iter()
            .zip(self.low.iter().zip(&self.high))
            .map(|(a, (lo, hi))| (lo + (a + 1.0) * 0.5 * (hi - lo)).clamp(*lo, *hi))
            .collect()
    }

    /// Map a raw action back into `[-1, 1]`:
    /// `2 * (a - low) / (high - low) - 1`, clipped to `[-1, 1]`.
    pub fn from_env(
        &self,
        action: &[f64],
    ) -> Vec<f64> {
        action
            .iter()
            .zip(self.low.iter().zip(&self.high))
            .map(|(a, (lo, hi))| (2.0 * (a - lo) / (hi - lo) - 1.0).clamp(-1.0, 1.0))
            .collect()
    }
}

impl<E> Environment for NormalizedEnv<E>
where
    E: Environment,
    E::Action: VectorConvertible,
{
    type Config = E::Config;
    type Action = E::Action;
    type Observation = E::Observation;

    fn config(&self) -> &Self::Config {
        self.env.config()
    }

    fn new(config: Self::Config) -> Result<Box<Self>> {
        Ok(Box::new(Self::wrap(*E::new(config)?)))
    }

    fn reset(
        &mut self,
        seed: u64,
    ) -> Result<Self::Observation> {
        self.env.reset(seed)
    }

    fn step(
        &mut self,
        action: Self::Action,
    ) -> Result<Step<Self::Observation, Self::Action>> {
        let raw = <E::Action>::from_vec(self.to_env(&<E::Action>::to_vec(action)));
        self.env.step(raw)
    }

    fn timelimit(&self) -> usize {
        self.env.timelimit()
    }

    fn action_space(&self) -> Vec<usize> {
        self.env.action_space()
    }

    fn action_domain(&self) -> Vec<RangeInclusive<f64>> {
        vec![-1.0..=1.0; self.action_space().iter().product()]
    }

    fn observation_space(&self) -> Vec<usize> {
        self.env.observation_space()
    }

    fn current_observation(&self) -> Self::Observation {
        self.env.current_observation()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::envs::{
            LaneEnv,
            LaneEnvConfig,
        },
    };

    fn wrapped_lane() -> NormalizedEnv<LaneEnv> {
        NormalizedEnv::wrap(*LaneEnv::new(LaneEnvConfig::default()).unwrap())
    }

    #[test]
    fn to_env_maps_unit_interval_onto_raw_bounds() {
        let env = wrapped_lane();
        let (low, high) = (env.low.clone(), env.high.clone());

        assert_eq!(env.to_env(&[-1.0, -1.0]), low);
        assert_eq!(env.to_env(&[1.0, 1.0]), high);

        let mid = env.to_env(&[0.0, 0.0]);
        for ((m, lo), hi) in mid.iter().zip(&low).zip(&high) {
            assert!((m - (lo + hi) / 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn round_trip_is_identity_inside_the_bounds() {
        let env = wrapped_lane();
        for action in [[-1.0, -1.0], [-0.3, 0.9], [0.0, 0.0], [0.5, -0.5], [1.0, 1.0]] {
            let there_and_back = env.from_env(&env.to_env(&action));
            for (a, b) in action.iter().zip(&there_and_back) {
                assert!((a - b).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn out_of_bounds_actions_are_clipped() {
        let env = wrapped_lane();
        assert_eq!(env.to_env(&[-5.0, 7.0]), env.to_env(&[-1.0, 1.0]));

        let raw_beyond: Vec<f64> = env.high.iter().map(|hi| hi + 1.0).collect();
        assert_eq!(env.from_env(&raw_beyond), vec![1.0, 1.0]);
    }

    #[test]
    fn wrapped_env_reports_the_unit_action_domain() {
        let env = wrapped_lane();
        assert_eq!(env.action_domain(), vec![-1.0..=1.0, -1.0..=1.0]);
    }
}

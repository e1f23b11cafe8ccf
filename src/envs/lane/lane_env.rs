use {
    super::{
        super::{
            Environment,
            Step,
        },
        action::LaneAction,
        config::LaneEnvConfig,
        state::LaneObs,
    },
    anyhow::Result,
    derive_getters::Getters,
    rand::{
        rngs::StdRng,
        Rng,
        RngCore,
        SeedableRng,
    },
    std::{
        f64::consts::FRAC_PI_2,
        ops::RangeInclusive,
    },
    tracing::info,
};

/// The reward the simulator reports once the vehicle is off the road; the
/// configured [`RewardShaping`](super::super::RewardShaping) policy decides
/// what to make of it.
const OUT_OF_ROAD_REWARD: f64 = 0.0;

/// Generate the start of an episode: on the lane center give or take a small
/// random offset, roughly aligned with the road axis, at cruising speed.
fn start_observation(
    initial_speed: f64,
    rng: &mut dyn RngCore,
) -> LaneObs {
    LaneObs::new(
        rng.gen_range(-0.5..=0.5),
        rng.gen_range(-0.05..=0.05),
        initial_speed,
        0.0,
    )
}

/// A minimal kinematic lane-keeping task on a straight road.
///
/// The vehicle starts near the lane center and is rewarded for staying
/// centered while it covers the road; the reward falls off with lateral
/// offset and steering effort. Leaving the road yields the bare sentinel
/// reward, which the configured shaping policy turns into a penalized,
/// forced episode end. Reaching the end of the road terminates the episode.
#[derive(Getters)]
pub struct LaneEnv {
    config: LaneEnvConfig,
    observation: LaneObs,
    timestep: usize,
    rng: StdRng,
}

impl Environment for LaneEnv {
    type Config = LaneEnvConfig;
    type Action = LaneAction;
    type Observation = LaneObs;

    fn config(&self) -> &LaneEnvConfig {
        &self.config
    }

    fn new(config: Self::Config) -> Result<Box<Self>> {
        config.check()?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let observation = start_observation(config.initial_speed, &mut rng);

        Ok(Box::new(Self {
            config,
            observation,
            timestep: 0,
            rng,
        }))
    }

    fn reset(
        &mut self,
        seed: u64,
    ) -> Result<Self::Observation> {
        self.timestep = 0;
        self.rng = StdRng::seed_from_u64(seed);
        self.observation = start_observation(self.config.initial_speed, &mut self.rng);
        Ok(self.observation)
    }

    fn step(
        &mut self,
        action: Self::Action,
    ) -> Result<Step<Self::Observation, Self::Action>> {
        // bounds on the incoming action
        let action = action.restrict(self.config.max_steering, self.config.max_acceleration);
        self.timestep += 1;

        // kinematic bicycle step, with the heading capped so the vehicle
        // keeps making progress along the road axis
        let dt = self.config.dt;
        let speed = (self.observation.speed() + action.acceleration() * dt)
            .clamp(0.0, self.config.max_speed);
        let heading = (self.observation.heading()
            + speed / self.config.wheelbase * action.steering().tan() * dt)
            .clamp(-FRAC_PI_2, FRAC_PI_2);
        let lateral = self.observation.lateral() + speed * heading.sin() * dt;
        let position = self.observation.progress() * self.config.road_length
            + speed * heading.cos() * dt;

        self.observation = LaneObs::new(lateral, heading, speed, position / self.config.road_length);

        let off_road = lateral.abs() > self.config.half_width;
        let raw_reward = if off_road {
            OUT_OF_ROAD_REWARD
        } else {
            1.0 / (1.0 + self.config.centering_cost * lateral.powi(2))
                / (1.0 + self.config.steering_cost * action.steering().powi(2))
        };
        let (reward, out_of_bounds) = self.config.reward_shaping.apply(raw_reward);

        let terminated = out_of_bounds || self.observation.progress() >= 1.0;
        let truncated = !terminated && (self.timestep == self.config.timelimit);

        info!(
            concat!(
                "\nLaneEnv Step:",
                "\nS(y: {:.3}, psi: {:.3}, v: {:.3}, p: {:.3})",
                "\nA(steer: {:.3}, accel: {:.3})",
                "\nR: {:?}",
            ),
            lateral,
            heading,
            speed,
            self.observation.progress(),
            action.steering(),
            action.acceleration(),
            reward,
        );

        Ok(Step {
            observation: self.observation,
            action,
            reward,
            terminated,
            truncated,
        })
    }

    fn timelimit(&self) -> usize {
        self.config.timelimit
    }

    fn action_space(&self) -> Vec<usize> {
        vec![2]
    }

    fn action_domain(&self) -> Vec<RangeInclusive<f64>> {
        vec![
            -self.config.max_steering..=self.config.max_steering,
            -self.config.max_acceleration..=self.config.max_acceleration,
        ]
    }

    fn observation_space(&self) -> Vec<usize> {
        vec![4]
    }

    fn current_observation(&self) -> Self::Observation {
        self.observation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_is_deterministic_per_seed() {
        let mut env = *LaneEnv::new(LaneEnvConfig::default()).unwrap();

        let first = env.reset(7).unwrap();
        let second = env.reset(7).unwrap();
        assert_eq!(first, second);

        let other = env.reset(8).unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn coasting_straight_stays_on_the_road() {
        let mut env = *LaneEnv::new(LaneEnvConfig::default()).unwrap();
        env.reset(0).unwrap();

        let mut progress = 0.0;
        for _ in 0..20 {
            let step = env.step(LaneAction::new(0.0, 0.0)).unwrap();
            assert!(step.reward > 0.0);
            assert!(!step.terminated);
            assert!(step.observation.progress() > progress);
            progress = step.observation.progress();
        }
    }

    #[test]
    fn hard_steering_forces_a_penalized_termination() {
        let config = LaneEnvConfig::default();
        let penalty = -1000.0;
        let mut env = *LaneEnv::new(config.clone()).unwrap();
        env.reset(0).unwrap();

        let mut last = None;
        for _ in 0..config.timelimit {
            let step = env.step(LaneAction::new(config.max_steering, 0.0)).unwrap();
            let done = step.terminated;
            last = Some(step);
            if done {
                break;
            }
        }

        let last = last.unwrap();
        assert!(last.terminated);
        assert_eq!(last.reward, penalty);
        assert!(last.observation.lateral().abs() > config.half_width);
    }

    #[test]
    fn truncates_at_the_timelimit() {
        let config = LaneEnvConfig {
            timelimit: 5,
            road_length: 10_000.0,
            ..Default::default()
        };
        let mut env = *LaneEnv::new(config).unwrap();
        env.reset(0).unwrap();

        for _ in 0..4 {
            let step = env.step(LaneAction::new(0.0, 0.0)).unwrap();
            assert!(!step.terminated && !step.truncated);
        }
        let step = env.step(LaneAction::new(0.0, 0.0)).unwrap();
        assert!(step.truncated);
        assert!(!step.terminated);
    }
}

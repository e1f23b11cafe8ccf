use {
    super::{
        Algorithm,
        OffPolicyAlgorithm,
        RunMode,
    },
    crate::{
        components::{
            OuNoise,
            ReplayBuffer,
            Transition,
        },
        configs::DDPG_Config,
    },
    candle_core::{
        DType,
        Device,
        Error,
        Module,
        Result,
        Tensor,
        Var,
    },
    candle_nn::{
        func,
        init::Init,
        linear,
        sequential::seq,
        Activation,
        AdamW,
        Linear,
        Optimizer,
        ParamsAdamW,
        Sequential,
        VarBuilder,
        VarMap,
    },
    rand::{
        rngs::StdRng,
        Rng,
        SeedableRng,
    },
    tracing::info,
};

/// A linear layer with weights and biases drawn uniformly from
/// `[-init_w, init_w]`.
///
/// Used for the output layers of both networks: starting the policy (and the
/// value head) near zero keeps the tanh output away from its saturated
/// plateaus early in training.
fn linear_uniform(
    in_dim: usize,
    out_dim: usize,
    init_w: f64,
    vb: VarBuilder,
) -> Result<Linear> {
    let init = Init::Uniform {
        lo: -init_w,
        up: init_w,
    };
    let ws = vb.get_with_hints((out_dim, in_dim), "weight", init)?;
    let bs = vb.get_with_hints(out_dim, "bias", init)?;
    Ok(Linear::new(ws, Some(bs)))
}

/// Nudge every target parameter toward its live counterpart:
/// `target = target * (1 - tau) + live * tau`.
///
/// Each parameter pair is read in full before the target is written, so the
/// update never observes its own partial writes.
fn track(
    varmap: &mut VarMap,
    vb: &VarBuilder,
    target_prefix: &str,
    network_prefix: &str,
    dims: &[(usize, usize)],
    tau: f64,
) -> Result<()> {
    for (i, &(in_dim, out_dim)) in dims.iter().enumerate() {
        let target_w = vb.get((out_dim, in_dim), &format!("{target_prefix}-fc{i}.weight"))?;
        let network_w = vb.get((out_dim, in_dim), &format!("{network_prefix}-fc{i}.weight"))?;
        varmap.set_one(
            format!("{target_prefix}-fc{i}.weight"),
            ((tau * network_w)? + ((1.0 - tau) * target_w)?)?,
        )?;

        let target_b = vb.get(out_dim, &format!("{target_prefix}-fc{i}.bias"))?;
        let network_b = vb.get(out_dim, &format!("{network_prefix}-fc{i}.bias"))?;
        varmap.set_one(
            format!("{target_prefix}-fc{i}.bias"),
            ((tau * network_b)? + ((1.0 - tau) * target_b)?)?,
        )?;
    }
    Ok(())
}

/// The deterministic policy: state in, action in `[-1, 1]` out.
///
/// The target copy lives in the same varmap under a `target-` prefix and is
/// only ever written by [`Actor::track`].
struct Actor<'a> {
    varmap: VarMap,
    vb: VarBuilder<'a>,
    network: Sequential,
    target_network: Sequential,
    dims: Vec<(usize, usize)>,
}

impl Actor<'_> {
    fn new(
        device: &Device,
        dtype: DType,
        dims: &[(usize, usize)],
        init_w: f64,
    ) -> Result<Self> {
        let mut varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, dtype, device);

        let make_network = |prefix: &str| {
            let seq = seq()
                .add(linear(
                    dims[0].0,
                    dims[0].1,
                    vb.pp(format!("{prefix}-fc0")),
                )?)
                .add(Activation::Relu)
                .add(linear(
                    dims[1].0,
                    dims[1].1,
                    vb.pp(format!("{prefix}-fc1")),
                )?)
                .add(Activation::Relu)
                .add(linear_uniform(
                    dims[2].0,
                    dims[2].1,
                    init_w,
                    vb.pp(format!("{prefix}-fc2")),
                )?)
                .add(func(|xs| xs.tanh()));
            Ok::<Sequential, Error>(seq)
        };

        let network = make_network("actor")?;
        let target_network = make_network("target-actor")?;

        // this sets the two networks to be equal to each other using tau = 1.0
        track(&mut varmap, &vb, "target-actor", "actor", dims, 1.0)?;

        Ok(Self {
            varmap,
            vb,
            network,
            target_network,
            dims: dims.to_vec(),
        })
    }

    fn forward(
        &self,
        state: &Tensor,
    ) -> Result<Tensor> {
        self.network.forward(state)
    }

    fn target_forward(
        &self,
        state: &Tensor,
    ) -> Result<Tensor> {
        self.target_network.forward(state)
    }

    fn track(
        &mut self,
        tau: f64,
    ) -> Result<()> {
        track(
            &mut self.varmap,
            &self.vb,
            "target-actor",
            "actor",
            &self.dims,
            tau,
        )
    }
}

/// The value estimator: `(state, action)` in, one unbounded scalar out.
struct Critic<'a> {
    varmap: VarMap,
    vb: VarBuilder<'a>,
    network: Sequential,
    target_network: Sequential,
    dims: Vec<(usize, usize)>,
}

impl Critic<'_> {
    fn new(
        device: &Device,
        dtype: DType,
        dims: &[(usize, usize)],
        init_w: f64,
    ) -> Result<Self> {
        let mut varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, dtype, device);

        let make_network = |prefix: &str| {
            let seq = seq()
                .add(linear(
                    dims[0].0,
                    dims[0].1,
                    vb.pp(format!("{prefix}-fc0")),
                )?)
                .add(Activation::Relu)
                .add(linear(
                    dims[1].0,
                    dims[1].1,
                    vb.pp(format!("{prefix}-fc1")),
                )?)
                .add(Activation::Relu)
                .add(linear_uniform(
                    dims[2].0,
                    dims[2].1,
                    init_w,
                    vb.pp(format!("{prefix}-fc2")),
                )?);
            Ok::<Sequential, Error>(seq)
        };

        let network = make_network("critic")?;
        let target_network = make_network("target-critic")?;

        // this sets the two networks to be equal to each other using tau = 1.0
        track(&mut varmap, &vb, "target-critic", "critic", dims, 1.0)?;

        Ok(Self {
            varmap,
            vb,
            network,
            target_network,
            dims: dims.to_vec(),
        })
    }

    fn forward(
        &self,
        state: &Tensor,
        action: &Tensor,
    ) -> Result<Tensor> {
        let xs = Tensor::cat(&[state, action], 1)?;
        self.network.forward(&xs)
    }

    fn target_forward(
        &self,
        state: &Tensor,
        action: &Tensor,
    ) -> Result<Tensor> {
        let xs = Tensor::cat(&[state, action], 1)?;
        self.target_network.forward(&xs)
    }

    fn track(
        &mut self,
        tau: f64,
    ) -> Result<()> {
        track(
            &mut self.varmap,
            &self.vb,
            "target-critic",
            "critic",
            &self.dims,
            tau,
        )
    }
}

#[allow(clippy::upper_case_acronyms)]
pub struct DDPG<'a> {
    actor: Actor<'a>,
    actor_optim: AdamW,
    critic: Critic<'a>,
    critic_optim: AdamW,
    gamma: f64,
    tau: f64,
    min_value: f64,
    max_value: f64,
    replay_buffer: ReplayBuffer,
    batch_size: usize,
    ou_noise: OuNoise,
    rng: StdRng,
    steps_taken: usize,

    config: DDPG_Config,
    size_state: usize,
    size_action: usize,
    run_mode: RunMode,
}

impl DDPG<'_> {
    pub fn new(
        device: &Device,
        config: &DDPG_Config,
        size_state: usize,
        size_action: usize,
    ) -> Result<Self> {
        let filter_by_prefix = |varmap: &VarMap, prefix: &str| {
            varmap
                .data()
                .lock()
                .unwrap()
                .iter()
                .filter_map(|(name, var)| name.starts_with(prefix).then_some(var.clone()))
                .collect::<Vec<Var>>()
        };

        let actor = Actor::new(
            device,
            DType::F64,
            &[
                (size_state, config.hidden_1_size),
                (config.hidden_1_size, config.hidden_2_size),
                (config.hidden_2_size, size_action),
            ],
            config.init_weight,
        )?;
        let actor_optim = AdamW::new(
            filter_by_prefix(&actor.varmap, "actor"),
            ParamsAdamW {
                lr: config.actor_learning_rate,
                ..Default::default()
            },
        )?;

        let critic = Critic::new(
            device,
            DType::F64,
            &[
                (size_state + size_action, config.hidden_1_size),
                (config.hidden_1_size, config.hidden_2_size),
                (config.hidden_2_size, 1),
            ],
            config.init_weight,
        )?;
        let critic_optim = AdamW::new(
            filter_by_prefix(&critic.varmap, "critic"),
            ParamsAdamW {
                lr: config.critic_learning_rate,
                ..Default::default()
            },
        )?;

        let mut rng = StdRng::seed_from_u64(config.seed);

        // the policy always acts in the normalized [-1, 1] action space, so
        // those are the clipping bounds for the noisy actions as well
        let ou_noise = OuNoise::new(
            config.ou_mu,
            config.ou_theta,
            config.ou_max_sigma,
            config.ou_min_sigma,
            config.ou_decay_period,
            size_action,
            vec![-1.0; size_action],
            vec![1.0; size_action],
            rng.gen::<u64>(),
            device,
        )?;

        Ok(Self {
            actor,
            actor_optim,
            critic,
            critic_optim,
            gamma: config.gamma,
            tau: config.tau,
            min_value: config.min_value,
            max_value: config.max_value,
            replay_buffer: ReplayBuffer::new(config.replay_buffer_capacity),
            batch_size: config.training_batch_size,
            ou_noise,
            rng,
            steps_taken: 0,
            config: config.clone(),
            size_state,
            size_action,
            run_mode: RunMode::Train,
        })
    }

    pub fn size_state(&self) -> usize {
        self.size_state
    }

    pub fn size_action(&self) -> usize {
        self.size_action
    }
}

impl Algorithm for DDPG<'_> {
    type Config = DDPG_Config;

    fn config(&self) -> &DDPG_Config {
        &self.config
    }

    fn from_config(
        device: &Device,
        config: &DDPG_Config,
        size_state: usize,
        size_action: usize,
    ) -> Result<Box<Self>> {
        Ok(Box::new(Self::new(device, config, size_state, size_action)?))
    }

    fn actions(
        &mut self,
        state: &Tensor,
    ) -> Result<Tensor> {
        // Candle assumes a batch dimension, so when we don't have one we need
        // to pretend we do by un- and resqueezing the state tensor.
        let actions = self
            .actor
            .forward(&state.detach().unsqueeze(0)?)?
            .squeeze(0)?;

        Ok(if let RunMode::Train = self.run_mode {
            let noisy = self.ou_noise.get_action(&actions, self.steps_taken)?;
            self.steps_taken += 1;
            noisy
        } else {
            actions
        })
    }

    fn train(&mut self) -> Result<()> {
        if self.replay_buffer.len() < self.batch_size {
            return Ok(());
        }
        let (states, actions, rewards, next_states, dones) = self
            .replay_buffer
            .random_batch(self.batch_size, &mut self.rng)?;

        // The bootstrapped regression target is a fixed quantity for this
        // step: the target networks are never trained, so nothing here may
        // carry gradients.
        let next_actions = self.actor.target_forward(&next_states)?;
        let target_q = self.critic.target_forward(&next_states, &next_actions)?;
        let expected_q = (rewards + ((1.0 - &dones)? * self.gamma)?.mul(&target_q)?)?
            .clamp(self.min_value, self.max_value)?
            .detach();

        let q = self.critic.forward(&states, &actions)?;
        let critic_loss = (expected_q - q)?.sqr()?.mean_all()?;
        self.critic_optim.backward_step(&critic_loss)?;

        // The critic serves purely as a differentiable score here: the
        // actor optimizer only holds actor parameters, so the critic is
        // read but never stepped.
        let actor_loss = self
            .critic
            .forward(&states, &self.actor.forward(&states)?)?
            .mean_all()?
            .neg()?;
        self.actor_optim.backward_step(&actor_loss)?;

        self.critic.track(self.tau)?;
        self.actor.track(self.tau)?;

        Ok(())
    }

    fn begin_episode(&mut self) -> Result<()> {
        self.ou_noise.reset()
    }

    fn run_mode(&self) -> RunMode {
        self.run_mode
    }

    fn set_run_mode(&mut self, mode: RunMode) {
        self.run_mode = mode;
    }
}

impl OffPolicyAlgorithm for DDPG<'_> {
    fn remember(
        &mut self,
        state: &Tensor,
        action: &Tensor,
        reward: &Tensor,
        next_state: &Tensor,
        done: &Tensor,
    ) {
        info!(
            concat!(
                "\nPushing to replay buffer:",
                "\n{state:?}",
                "\n{action:?}",
                "\n{reward:?}",
                "\n{next_state:?}",
            ),
            state = state,
            action = action,
            reward = reward,
            next_state = next_state,
        );
        self.replay_buffer
            .push(Transition::new(state, action, reward, next_state, done));
    }

    fn replay_buffer(&self) -> &ReplayBuffer {
        &self.replay_buffer
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        std::collections::HashMap,
    };

    fn small_config() -> DDPG_Config {
        DDPG_Config {
            hidden_1_size: 8,
            hidden_2_size: 8,
            training_batch_size: 3,
            ..DDPG_Config::highway()
        }
    }

    fn snapshot(varmap: &VarMap) -> HashMap<String, Vec<f64>> {
        varmap
            .data()
            .lock()
            .unwrap()
            .iter()
            .map(|(name, var)| {
                (
                    name.clone(),
                    var.as_tensor()
                        .flatten_all()
                        .unwrap()
                        .to_vec1::<f64>()
                        .unwrap(),
                )
            })
            .collect()
    }

    fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn targets_start_as_exact_copies() {
        let agent = DDPG::new(&Device::Cpu, &small_config(), 4, 1).unwrap();

        for (varmap, prefix) in [(&agent.actor.varmap, "actor"), (&agent.critic.varmap, "critic")]
        {
            let params = snapshot(varmap);
            for (name, values) in &params {
                if let Some(live_name) = name.strip_prefix("target-") {
                    assert!(live_name.starts_with(prefix));
                    assert_eq!(values, &params[live_name], "{name} differs from {live_name}");
                }
            }
        }
    }

    #[test]
    fn soft_update_converges_geometrically() {
        let mut agent = DDPG::new(&Device::Cpu, &small_config(), 3, 2).unwrap();

        // move every live actor parameter one unit away from its target
        let updates: Vec<(String, Tensor)> = {
            let data = agent.actor.varmap.data().lock().unwrap();
            data.iter()
                .filter(|(name, _)| name.starts_with("actor"))
                .map(|(name, var)| (name.clone(), (var.as_tensor() + 1.0).unwrap()))
                .collect()
        };
        for (name, tensor) in updates {
            agent.actor.varmap.set_one(name, tensor).unwrap();
        }

        let tau = 0.1;
        let steps = 10;
        for _ in 0..steps {
            agent.actor.track(tau).unwrap();
        }

        // |target - live| = |target_0 - live| * (1 - tau)^t, elementwise,
        // and the initial gap is exactly 1.0 everywhere
        let expected_gap = (1.0 - tau).powi(steps);
        let params = snapshot(&agent.actor.varmap);
        for (name, target) in &params {
            let Some(live_name) = name.strip_prefix("target-") else {
                continue;
            };
            for (t, l) in target.iter().zip(&params[live_name]) {
                assert!(((l - t) - expected_gap).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn actions_stay_within_unit_bounds() {
        let mut agent = DDPG::new(&Device::Cpu, &small_config(), 4, 2).unwrap();
        let state = Tensor::new(vec![0.3, -1.2, 0.7, 2.0], &Device::Cpu).unwrap();

        for _ in 0..50 {
            let action = agent.actions(&state).unwrap();
            for value in action.to_vec1::<f64>().unwrap() {
                assert!((-1.0..=1.0).contains(&value));
            }
        }

        agent.set_run_mode(RunMode::Test);
        let action = agent.actions(&state).unwrap();
        for value in action.to_vec1::<f64>().unwrap() {
            assert!((-1.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn one_update_step_moves_live_and_target_parameters() {
        let device = Device::Cpu;
        let config = small_config();
        let mut agent = DDPG::new(&device, &config, 4, 1).unwrap();

        for i in 0..3 {
            let state = Tensor::new(
                vec![i as f64, 0.5, -0.5, 1.0],
                &device,
            )
            .unwrap();
            let action = Tensor::new(vec![0.1 * i as f64], &device).unwrap();
            let reward = Tensor::new(vec![1.0], &device).unwrap();
            let next_state = Tensor::new(
                vec![i as f64 + 1.0, 0.5, -0.5, 1.0],
                &device,
            )
            .unwrap();
            let done = Tensor::new(vec![0.0], &device).unwrap();
            agent.remember(&state, &action, &reward, &next_state, &done);
        }

        let actor_before = snapshot(&agent.actor.varmap);
        let critic_before = snapshot(&agent.critic.varmap);

        agent.train().unwrap();

        let actor_after = snapshot(&agent.actor.varmap);
        let critic_after = snapshot(&agent.critic.varmap);

        // the optimizers moved the live networks
        assert!(
            max_abs_diff(
                &actor_before["actor-fc0.weight"],
                &actor_after["actor-fc0.weight"]
            ) > 0.0
        );
        assert!(
            max_abs_diff(
                &critic_before["critic-fc0.weight"],
                &critic_after["critic-fc0.weight"]
            ) > 0.0
        );

        // the targets moved by exactly the tau fraction of the live-target
        // delta, no further
        for (before, after) in [
            (&actor_before, &actor_after),
            (&critic_before, &critic_after),
        ] {
            for (name, target_after) in after {
                let Some(live_name) = name.strip_prefix("target-") else {
                    continue;
                };
                let target_old = &before[name];
                let live_new = &after[live_name];
                for ((t_new, t_old), live) in
                    target_after.iter().zip(target_old).zip(live_new)
                {
                    let expected = t_old * (1.0 - config.tau) + live * config.tau;
                    assert!((t_new - expected).abs() < 1e-9);
                }
            }
        }
    }
}

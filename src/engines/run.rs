use {
    crate::{
        agents::{
            Algorithm,
            OffPolicyAlgorithm,
            RunMode,
        },
        configs::TrainConfig,
        envs::{
            Environment,
            Sampleable,
            TensorConvertible,
        },
    },
    anyhow::Result,
    candle_core::{
        Device,
        Tensor,
    },
    rand::{
        rngs::StdRng,
        Rng,
        SeedableRng,
    },
    tracing::warn,
};


/// Train a single run on an environment with an off-policy algorithm.
///
/// Every environment step feeds the replay buffer and is followed by one
/// training update, which stays a no-op until the buffer holds a full batch.
///
/// # Arguments
///
/// * `env` - The environment to train on.
/// * `alg` - The agent to train with.
/// * `config` - The configuration for the run.
/// * `device` - The device to run on.
pub fn loop_off_policy<Alg, Env, Obs, Act>(
    env: &mut Env,
    alg: &mut Alg,
    config: TrainConfig,
    device: &Device,
) -> Result<(Vec<f64>, Vec<bool>)>
where
    Env: Environment<Action = Act, Observation = Obs>,
    Alg: Algorithm + OffPolicyAlgorithm,
    Obs: Clone + TensorConvertible,
    Act: Clone + TensorConvertible + Sampleable,
{
    warn!("action space: {:?}", env.action_space());
    warn!("observation space: {:?}", env.observation_space());

    let mut steps_taken = 0;
    let mut mc_returns = Vec::new();
    let mut successes = Vec::new();
    let mut rng = StdRng::seed_from_u64(config.seed());

    for episode in 0..config.max_episodes() {
        let mut total_reward = 0.0;
        env.reset(rng.gen::<u64>())?;
        alg.begin_episode()?;

        loop {
            let state = &<Obs>::to_tensor(env.current_observation(), device)?;

            // select an action, or randomly sample one
            let action = &if steps_taken < config.initial_random_actions() {
                <Act>::to_tensor(<Act>::sample(&mut rng, &env.action_domain()), device)?
            } else {
                alg.actions(state)?
            };

            let step = env.step(<Act>::from_tensor_pp(action.clone()))?;
            total_reward += step.reward;
            steps_taken += 1;

            let done = step.terminated || step.truncated;
            alg.remember(
                state,
                action,
                &Tensor::new(vec![step.reward], device)?,
                &<Obs>::to_tensor(step.observation, device)?,
                &Tensor::new(vec![done as u8 as f64], device)?,
            );

            if let RunMode::Train = alg.run_mode() {
                alg.train()?;
            }

            if done {
                successes.push(step.terminated);
                break;
            }
        }

        warn!("episode {episode} with total reward of {total_reward}");
        mc_returns.push(total_reward);
    }
    Ok((mc_returns, successes))
}

use {
    anyhow::Result,
    candle_core::Device,
    drive_rl::{
        agents::{
            Algorithm,
            OffPolicyAlgorithm,
            RunMode,
            DDPG,
        },
        configs::{
            DDPG_Config,
            TrainConfig,
        },
        engines::loop_off_policy,
        envs::{
            Environment,
            LaneEnv,
            LaneEnvConfig,
            NormalizedEnv,
            TensorConvertible,
        },
    },
};

#[test]
fn ddpg_trains_on_the_lane_env() -> Result<()> {
    let device = Device::Cpu;

    let env_config = LaneEnvConfig {
        timelimit: 30,
        ..Default::default()
    };
    let mut env = *NormalizedEnv::<LaneEnv>::new(env_config)?;

    let alg_config = DDPG_Config {
        hidden_1_size: 16,
        hidden_2_size: 16,
        training_batch_size: 4,
        replay_buffer_capacity: 100,
        ..DDPG_Config::lane()
    };
    let mut agent = *DDPG::from_config(
        &device,
        &alg_config,
        env.observation_space().iter().product(),
        env.action_space().iter().product(),
    )?;

    let (returns, successes) = loop_off_policy(
        &mut env,
        &mut agent,
        TrainConfig::new(2, 5, 42),
        &device,
    )?;

    assert_eq!(returns.len(), 2);
    assert_eq!(successes.len(), 2);
    assert!(returns.iter().all(|r| r.is_finite()));
    assert!(!agent.replay_buffer().is_empty());

    // the trained policy still produces actions within the normalized bounds
    agent.set_run_mode(RunMode::Test);
    let state = TensorConvertible::to_tensor(env.current_observation(), &device)?;
    let action = agent.actions(&state)?;
    for value in action.to_vec1::<f64>()? {
        assert!((-1.0..=1.0).contains(&value));
    }

    Ok(())
}

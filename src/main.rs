use {
    anyhow::Result,
    candle_core::Device,
    clap::{
        Parser,
        ValueEnum,
    },
    drive_rl::{
        agents::DDPG,
        configs::{
            DDPG_Config,
            TrainConfig,
        },
        engines::run_experiment_off_policy,
        envs::{
            HighwayConfig,
            HighwayEnv,
            LaneEnv,
            LaneEnvConfig,
            NormalizedEnv,
        },
        logging::setup_logging,
    },
    tracing::Level,
};

#[derive(ValueEnum, Debug, Clone)]
enum Env {
    Highway,
    Lane,
}
impl Env {
    fn name(&self) -> &str {
        match self {
            Env::Highway => "highway",
            Env::Lane => "lane",
        }
    }
}

#[derive(ValueEnum, Debug, Clone)]
enum Loglevel {
    Error, // put these only during active debugging and then downgrade later
    Warn,  // main events in the program
    Info,  // all the little details
    None,  // don't log anything
}
impl Loglevel {
    fn level(&self) -> Option<Level> {
        match self {
            Loglevel::Error => Some(Level::ERROR),
            Loglevel::Warn => Some(Level::WARN),
            Loglevel::Info => Some(Level::INFO),
            Loglevel::None => None,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run on CPU rather than on GPU.
    #[arg(long)]
    cpu: bool,

    /// Setup logging
    #[arg(long, value_enum, default_value_t=Loglevel::Warn)]
    log: Loglevel,

    /// The environment to run.
    #[arg(long, value_enum)]
    env: Env,

    /// Directory under data/ to write the results to.
    #[arg(long)]
    output: Option<String>,

    /// The number of repeated, identical runs to perform.
    #[arg(long, default_value_t = 10)]
    runs: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(level) = args.log.level() {
        setup_logging(
            &format!("{}.log", args.env.name()),
            Some(level),
            Some(level),
        )?;
    }

    let device = if args.cpu {
        Device::Cpu
    } else {
        Device::cuda_if_available(0)?
    };
    let output = args.output.unwrap_or_else(|| args.env.name().to_owned());

    match args.env {
        Env::Highway => run_experiment_off_policy::<DDPG, NormalizedEnv<HighwayEnv>, _, _>(
            &output,
            args.runs,
            HighwayConfig::default(),
            DDPG_Config::highway(),
            TrainConfig::highway(),
            &device,
        )?,

        Env::Lane => run_experiment_off_policy::<DDPG, NormalizedEnv<LaneEnv>, _, _>(
            &output,
            args.runs,
            LaneEnvConfig::default(),
            DDPG_Config::lane(),
            TrainConfig::lane(),
            &device,
        )?,
    }
    Ok(())
}

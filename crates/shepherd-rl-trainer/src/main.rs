//! `shepherd-train`: train the sheep-herding agent against the simulated farm

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use shepherd_rl_agent::MlpQNetwork;
use shepherd_rl_core::{EpisodeOutcome, QModel, TokioClock, World};
use shepherd_rl_env::{FarmHost, FarmMission, FarmWorld};
use shepherd_rl_trainer::{fatal_exit_code, Cli, TrainingOrchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = cli.load_config().context("loading configuration")?;
    let mut mission = config.load_mission().context("loading mission")?;
    if cli.seed.is_some() {
        mission.seed = cli.seed;
    }

    let world = FarmWorld::new(mission.clone());
    let layout = config.network_config(world.observation_len(), world.num_actions());
    let mut model = MlpQNetwork::new(layout)?;
    if let Some(path) = &cli.resume {
        model
            .load(path)
            .await
            .with_context(|| format!("loading model from {}", path.display()))?;
        info!(path = %path.display(), "resumed model");
    }

    let host = FarmHost::new(mission.seed);
    let mut orchestrator = TrainingOrchestrator::new(
        host,
        world,
        model,
        TokioClock,
        &config,
        FarmMission::action_table(),
        mission.to_spec()?,
    )?;
    if let Some(seed) = cli.seed {
        orchestrator = orchestrator.with_seed(seed);
    }

    info!(repeats = config.num_repeats, epsilon = config.epsilon, "starting training");
    match orchestrator.run().await {
        Ok(report) => {
            info!(
                episodes = report.episodes.len(),
                won = report.count(EpisodeOutcome::Won),
                lost = report.count(EpisodeOutcome::Lost),
                mean_reward = report.mean_reward().unwrap_or(0.0),
                "training complete"
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(e) => match fatal_exit_code(&e) {
            Some(code) => {
                error!(error = %e, "aborting");
                std::process::exit(code);
            }
            None => Err(e.into()),
        },
    }
}

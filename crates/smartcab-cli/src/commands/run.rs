//! Training run

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use smartcab_rl::export::load_snapshot;
use smartcab_rl::{ExportFormat, Knowledge, LearningAgent};
use smartcab_sim::{GridRoutePlanner, RunSummary, Simulator, World};

use crate::config::Config;

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Number of trials to run
    #[arg(short = 'n', long)]
    pub trials: Option<u32>,

    /// Seed for the world and the agent
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Pause between timesteps in milliseconds
    #[arg(long = "delay-ms")]
    pub delay_ms: Option<u64>,

    /// Where to write the value table at each trial start
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Table export format (csv or json)
    #[arg(short, long)]
    pub format: Option<ExportFormat>,

    /// Let trials run past the deadline until the hard time limit
    #[arg(long)]
    pub no_deadline: bool,

    /// Start from a JSON snapshot written by an earlier run
    #[arg(long)]
    pub warm_start: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Fold command-line overrides into the loaded configuration
fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(trials) = args.trials {
        config.simulation.trials = trials;
    }
    if let Some(seed) = args.seed {
        config.world.seed = Some(seed);
        config.learning.seed = Some(seed.wrapping_add(1));
    }
    if let Some(delay) = args.delay_ms {
        config.simulation.update_delay_ms = delay;
    }
    if let Some(output) = &args.output {
        config.export.enabled = true;
        config.export.path = output.clone();
    }
    if let Some(format) = args.format {
        config.export.format = format;
    }
    if args.no_deadline {
        config.world.enforce_deadline = false;
    }
}

fn build_simulator(config: &Config, warm_start: Option<&PathBuf>) -> Result<Simulator> {
    let world = World::new(config.world.clone()).context("Failed to build the world")?;
    let agent = LearningAgent::new(GridRoutePlanner::new(), &config.learning)
        .context("Failed to build the agent")?
        .with_sink(config.export.build_sink());

    let mut knowledge = Knowledge::new(config.learning.initial_value);
    if let Some(path) = warm_start {
        let snapshot = load_snapshot(path)
            .with_context(|| format!("Failed to load warm-start table from {}", path.display()))?;
        knowledge.warm_start(&snapshot.table);
        info!(
            "Warm start from {} (trial {}, {} states)",
            path.display(),
            snapshot.trial,
            snapshot.table.rows.len()
        );
    }

    Ok(Simulator::new(world, agent, knowledge, config.simulation.clone()))
}

pub async fn run(args: RunArgs, mut config: Config) -> Result<()> {
    apply_overrides(&mut config, &args);
    config.validate()?;

    let mut simulator = build_simulator(&config, args.warm_start.as_ref())?;
    let summary = simulator.run().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if config.export.enabled {
        println!("\nValue table: {}", config.export.path.display());
    }

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("Run Summary");
    println!("===========\n");
    println!("Trials:          {}", summary.trials);
    println!(
        "Reached:         {} ({:.1}%)",
        summary.successes,
        summary.success_rate * 100.0
    );
    println!("Failed:          {}", summary.failures);
    println!("Mean net reward: {:.2}", summary.mean_net_reward);
    println!(
        "Recent success:  {:.1}%",
        summary.recent_success_rate * 100.0
    );
    println!("States learned:  {}", summary.agent.table_size);
    println!("States visited:  {}", summary.agent.visited_states);
    println!("Final epsilon:   {:.3}", summary.agent.epsilon);
}

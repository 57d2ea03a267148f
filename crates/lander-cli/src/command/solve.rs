use std::{path::PathBuf, time::Instant};

use anyhow::Context as _;
use tracing::info;

use lander_training::driver::EvolutionDriver;

use crate::{
    config::{SOLVE_TIME_BUDGET_MS, SolverArg},
    schema::solution::{Solution, SolutionContext},
    util::{self, Output},
};

/// Generations between two progress reports.
const REPORT_INTERVAL: usize = 50;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SolveArg {
    /// Episode file (terrain followed by the initial telemetry); read from stdin if omitted
    #[arg(long)]
    input: Option<PathBuf>,
    #[clap(flatten)]
    solver: SolverArg,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SolveArg) -> anyhow::Result<()> {
    let SolveArg {
        input,
        solver,
        output,
    } = arg;
    let config = solver.load()?;
    let episode = util::read_episode(input.as_deref(), config.landing_zone)?;
    let initial_state = *episode.initial_state();
    let seed = config.seed_or_random();
    info!(%seed, "starting search");

    let mut driver =
        EvolutionDriver::new(config.evaluator(episode), config.evolution_params(), seed)?;
    let budget = config.time_budget(SOLVE_TIME_BUDGET_MS);
    let start = Instant::now();
    while driver.generation() < config.max_generations && start.elapsed() < budget {
        let report = driver.run_generation()?;
        if report.generation % REPORT_INTERVAL == 0 || driver.is_solved() {
            let stats = report.stats;
            eprintln!(
                "Generation #{}: best {} ({:?}), mean {:.1}, median {}, stddev {:.1}",
                report.generation,
                stats.min,
                report.best.flight.outcome,
                stats.mean,
                stats.median,
                stats.std_dev,
            );
        }
        if driver.is_solved() {
            break;
        }
    }

    let (evaluation, trajectory) = driver
        .best_trajectory()
        .context("No generation completed within the search budget")?;
    eprintln!();
    eprintln!("Search finished:");
    eprintln!("  Seed:        {seed}");
    eprintln!("  Generations: {}", driver.generation());
    eprintln!("  Elapsed:     {:.2?}", start.elapsed());
    eprintln!("  Outcome:     {:?}", evaluation.flight.outcome);
    eprintln!("  Score:       {}", evaluation.score);
    eprintln!("  Turns:       {}", evaluation.flight.turns);
    eprintln!("  Fuel left:   {}", evaluation.flight.last.fuel);

    let context = SolutionContext {
        seed,
        generations: driver.generation(),
        fitness: config.fitness,
        fitness_weights: config.fitness_weights,
        landing_zone: config.landing_zone,
        policy: config.actuator_policy(),
        initial_state,
    };
    let solution = Solution::new(context, &evaluation, trajectory);
    Output::save_json(&solution, output.clone())?;
    Ok(())
}

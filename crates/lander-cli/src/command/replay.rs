use std::path::PathBuf;

use anyhow::bail;

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Solution file written by `solve`
    #[arg(long)]
    solution: PathBuf,
    /// Episode file the solution was searched on; read from stdin if omitted
    #[arg(long)]
    input: Option<PathBuf>,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg { solution, input } = arg;
    let solution = util::read_solution_file(solution)?;

    let episode = util::read_episode(input.as_deref(), solution.landing_zone)?;
    if *episode.initial_state() != solution.initial_state {
        bail!("Solution was searched from a different initial state than the episode");
    }
    let evaluator = solution.evaluator(episode);
    let (evaluation, trajectory) = evaluator.evaluate_with_trajectory(&solution.to_chromosome());
    let path = &trajectory.path[..=evaluation.flight.turns];
    let policy = evaluator.policy();

    eprintln!("Replay:");
    eprintln!("  Seed:     {}", solution.seed);
    eprintln!("  Policy:   clamp_absolute={}", policy.clamp_absolute);
    eprintln!(
        "  Outcome:  {:?} (stored {:?})",
        evaluation.flight.outcome, solution.outcome
    );
    eprintln!(
        "  Score:    {} (stored {})",
        evaluation.score, solution.score
    );
    eprintln!("  Turns:    {}", evaluation.flight.turns);

    if path != solution.path.as_slice() || evaluation.flight.last != solution.terminal_state {
        bail!("Replayed flight does not reproduce the stored path");
    }
    eprintln!("  Path:     reproduced ({} positions)", path.len());
    Ok(())
}

//! Turn-by-turn control over stdin/stdout.
//!
//! Input: the terrain (point count, then one `x y` pair per line) followed by one
//! telemetry line per turn (`X Y HS VS F R P`). Output: one `rotate power` line per
//! turn. Logs and the final report go to stderr.

use std::{
    io::{self, BufRead, Write as _},
    time::Instant,
};

use anyhow::{Context as _, bail};
use tracing::{debug, info, warn};

use lander_engine::{Episode, LanderState, LandingZonePolicy, Telemetry, Terrain};
use lander_training::driver::EvolutionDriver;

use crate::config::{PLAY_TIME_BUDGET_MS, SolverArg};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    solver: SolverArg,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let config = arg.solver.load()?;
    let mut input = Input::new(io::stdin().lock());
    let terrain = input.read_terrain(config.landing_zone)?;
    let Some(telemetry) = input.read_telemetry()? else {
        bail!("Input ended before the first telemetry line");
    };

    let policy = config.actuator_policy();
    let seed = config.seed_or_random();
    info!(%seed, ?telemetry, "episode started");
    let episode = Episode::new(terrain, telemetry.into());
    let mut driver =
        EvolutionDriver::new(config.evaluator(episode), config.evolution_params(), seed)?;
    let budget = config.time_budget(PLAY_TIME_BUDGET_MS);

    let mut stdout = io::stdout().lock();
    loop {
        let start = Instant::now();
        let mut generations = 0;
        // at least one generation per turn, so there is always a command to send
        while generations == 0
            || (generations < config.max_generations
                && start.elapsed() < budget
                && !driver.is_solved())
        {
            driver.run_generation()?;
            generations += 1;
        }
        let command = driver
            .next_command()
            .context("Population has no chromosome to follow")?;
        debug!(
            turn = driver.turn(),
            generations,
            solved = driver.is_solved(),
            rotate = command.rotate,
            power = command.power,
            "command chosen"
        );
        writeln!(stdout, "{} {}", command.rotate, command.power)
            .and_then(|()| stdout.flush())
            .context("Failed to write command to stdout")?;

        let predicted = driver
            .evaluator()
            .episode()
            .initial_state()
            .step(command, policy);
        let Some(observed) = input.read_telemetry()? else {
            break;
        };
        let next = reconcile(predicted, observed);
        driver.advance_turn(next);
    }

    eprintln!("Episode finished:");
    eprintln!("  Turns:       {}", driver.turn() + 1);
    eprintln!("  Generations: {}", driver.generation());
    Ok(())
}

/// Picks the state to continue the search from.
///
/// The simulated state keeps full precision, so it is preferred whenever it rounds to
/// the observed telemetry.
fn reconcile(predicted: LanderState, observed: Telemetry) -> LanderState {
    let expected = predicted.telemetry();
    if expected == observed {
        predicted
    } else {
        warn!(?expected, ?observed, "simulation does not match telemetry");
        observed.into()
    }
}

struct Input<R> {
    lines: io::Lines<R>,
}

impl<R: BufRead> Input<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    fn next_line(&mut self) -> anyhow::Result<Option<String>> {
        loop {
            match self.lines.next() {
                None => return Ok(None),
                Some(line) => {
                    let line = line.context("Failed to read from stdin")?;
                    if !line.trim().is_empty() {
                        return Ok(Some(line));
                    }
                }
            }
        }
    }

    fn read_terrain(&mut self, policy: LandingZonePolicy) -> anyhow::Result<Terrain> {
        let count_line = self
            .next_line()?
            .context("Input ended before the terrain point count")?;
        let count: usize = count_line
            .trim()
            .parse()
            .with_context(|| format!("Invalid terrain point count: {count_line:?}"))?;
        let mut text = count_line;
        for i in 0..count {
            let line = self
                .next_line()?
                .with_context(|| format!("Input ended before terrain point #{i}"))?;
            text.push('\n');
            text.push_str(&line);
        }
        Terrain::parse(&text, policy).context("Failed to parse terrain")
    }

    fn read_telemetry(&mut self) -> anyhow::Result<Option<Telemetry>> {
        let Some(line) = self.next_line()? else {
            return Ok(None);
        };
        let telemetry = line
            .parse()
            .with_context(|| format!("Failed to parse telemetry line: {line:?}"))?;
        Ok(Some(telemetry))
    }
}

#[cfg(test)]
mod tests {
    use lander_engine::{ActuatorPolicy, Command, GridPoint, LandingZone};

    use super::*;

    #[test]
    fn test_input_reads_terrain_then_telemetry() {
        let text = "\n3\n0 100\n\n1000 50\n  \n2000 50\n500 900 0 0 400 0 0\n\n";
        let mut input = Input::new(text.as_bytes());

        let terrain = input.read_terrain(LandingZonePolicy::ColumnHeights).unwrap();
        assert_eq!(terrain.points().len(), 3);
        assert_eq!(
            terrain.landing_zone(),
            LandingZone {
                x0: 1000,
                x1: 2000,
                y: 50,
            }
        );

        let telemetry = input.read_telemetry().unwrap().unwrap();
        assert_eq!(
            telemetry,
            Telemetry {
                x: 500,
                y: 900,
                h_speed: 0,
                v_speed: 0,
                fuel: 400,
                rotate: 0,
                power: 0,
            }
        );
        assert!(input.read_telemetry().unwrap().is_none());
    }

    #[test]
    fn test_input_reports_truncated_or_invalid_lines() {
        let mut input = Input::new("2\n0 100\n".as_bytes());
        assert!(input.read_terrain(LandingZonePolicy::ColumnHeights).is_err());

        let mut input = Input::new("many\n0 100\n".as_bytes());
        assert!(input.read_terrain(LandingZonePolicy::ColumnHeights).is_err());

        let mut input = Input::new("".as_bytes());
        assert!(input.read_terrain(LandingZonePolicy::ColumnHeights).is_err());

        let mut input = Input::new("500 900 0 0\n".as_bytes());
        assert!(input.read_telemetry().is_err());
    }

    #[test]
    fn test_reconcile_prefers_matching_prediction() {
        let state: LanderState = Telemetry {
            x: 2500,
            y: 2700,
            h_speed: 0,
            v_speed: 0,
            fuel: 550,
            rotate: 0,
            power: 0,
        }
        .into();
        let predicted = state.step(Command::new(-15, 1), ActuatorPolicy::default());
        assert_eq!(reconcile(predicted, predicted.telemetry()), predicted);

        let mut observed = predicted.telemetry();
        observed.x += 3;
        let next = reconcile(predicted, observed);
        assert_eq!(next.grid_position(), GridPoint::new(observed.x, observed.y));
        assert_eq!(next.telemetry(), observed);
    }
}

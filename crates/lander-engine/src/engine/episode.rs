use std::{str::FromStr, sync::Arc};

use crate::{
    ParseEpisodeError,
    core::{GridPoint, LandingZonePolicy, Terrain},
};

use super::lander::{LanderState, Telemetry};

/// The immutable world of one search: the terrain and the lander's starting state.
///
/// The terrain is reference counted so that re-seeding the episode each turn with
/// fresh telemetry never copies the ground data.
///
/// # Input Format
///
/// Whitespace separated integers:
///
/// ```text
/// N
/// x₁ y₁
/// ...
/// xₙ yₙ
/// X Y HS VS F R P
/// ```
///
/// # Example
///
/// ```
/// use lander_engine::Episode;
///
/// let input = "4\n0 1500\n1000 500\n2000 500\n6999 2000\n1500 2700 0 0 550 0 0\n";
/// let episode: Episode = input.parse().unwrap();
///
/// assert_eq!(episode.terrain().landing_zone().x0, 1000);
/// assert_eq!(episode.initial_state().fuel, 550);
/// ```
#[derive(Debug, Clone)]
pub struct Episode {
    terrain: Arc<Terrain>,
    initial_state: LanderState,
}

impl Episode {
    #[must_use]
    pub fn new(terrain: Terrain, initial_state: LanderState) -> Self {
        Self {
            terrain: Arc::new(terrain),
            initial_state,
        }
    }

    /// Parses the terrain section followed by the first telemetry line.
    pub fn parse_with_policy(
        input: &str,
        policy: LandingZonePolicy,
    ) -> Result<Self, ParseEpisodeError> {
        let mut tokens = Tokens::new(input);
        let terrain = tokens.terrain(policy)?;
        let telemetry = tokens.telemetry()?;
        Ok(Self::new(terrain, telemetry.into()))
    }

    #[must_use]
    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    #[must_use]
    pub fn initial_state(&self) -> &LanderState {
        &self.initial_state
    }

    /// The same terrain with a different starting state.
    #[must_use]
    pub fn with_initial_state(&self, initial_state: LanderState) -> Self {
        Self {
            terrain: Arc::clone(&self.terrain),
            initial_state,
        }
    }
}

impl FromStr for Episode {
    type Err = ParseEpisodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_policy(s, LandingZonePolicy::default())
    }
}

impl Terrain {
    /// Parses the terrain section (`N` followed by `N` points) of the episode input.
    pub fn parse(input: &str, policy: LandingZonePolicy) -> Result<Self, ParseEpisodeError> {
        Tokens::new(input).terrain(policy)
    }
}

impl FromStr for Telemetry {
    type Err = ParseEpisodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tokens::new(s).telemetry()
    }
}

struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            inner: input.split_whitespace(),
        }
    }

    fn int(&mut self, what: &'static str) -> Result<i32, ParseEpisodeError> {
        let token = self
            .inner
            .next()
            .ok_or(ParseEpisodeError::MissingToken { what })?;
        token
            .parse()
            .map_err(|_| ParseEpisodeError::InvalidInteger {
                what,
                token: token.to_owned(),
            })
    }

    fn terrain(&mut self, policy: LandingZonePolicy) -> Result<Terrain, ParseEpisodeError> {
        let count = self.int("surface point count")?;
        let count = usize::try_from(count).map_err(|_| ParseEpisodeError::InvalidInteger {
            what: "surface point count",
            token: count.to_string(),
        })?;
        let points = (0..count)
            .map(|_| Ok(GridPoint::new(self.int("land x")?, self.int("land y")?)))
            .collect::<Result<Vec<_>, ParseEpisodeError>>()?;
        Ok(Terrain::with_policy(points, policy)?)
    }

    fn telemetry(&mut self) -> Result<Telemetry, ParseEpisodeError> {
        Ok(Telemetry {
            x: self.int("X")?,
            y: self.int("Y")?,
            h_speed: self.int("HS")?,
            v_speed: self.int("VS")?,
            fuel: self.int("F")?,
            rotate: self.int("R")?,
            power: self.int("P")?,
        })
    }
}

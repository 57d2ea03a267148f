use std::{
    fmt,
    fs::{self, File},
    io::{self, BufWriter, Read as _, StdoutLock},
    path::{Path, PathBuf},
};

use anyhow::Context;
use lander_engine::{Episode, LandingZonePolicy};

use crate::schema::solution::Solution;

/// Destination of a JSON document: stdout, or a file created on open.
#[derive(Debug)]
pub enum Output {
    Stdout(StdoutLock<'static>),
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = match output_path {
            Some(path) => Output::create(path)?,
            None => Output::Stdout(io::stdout().lock()),
        };
        output.write_json(value)
    }

    fn create(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let result = match self {
            Output::Stdout(writer) => write_pretty(writer, value),
            Output::File { writer, .. } => write_pretty(writer, value),
        };
        result.with_context(|| format!("Failed to write JSON to {self}"))
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stdout(_) => f.write_str("stdout"),
            Output::File { path, .. } => write!(f, "{}", path.display()),
        }
    }
}

fn write_pretty<W, T>(mut writer: W, value: &T) -> anyhow::Result<()>
where
    W: io::Write,
    T: serde::Serialize,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read a solution document written by `lander solve`
pub fn read_solution_file<P>(path: P) -> anyhow::Result<Solution>
where
    P: AsRef<Path>,
{
    read_json_file("solution", path)
}

/// Read an episode (terrain followed by the initial telemetry) from a file, or from
/// stdin when no path is given
pub fn read_episode(input: Option<&Path>, policy: LandingZonePolicy) -> anyhow::Result<Episode> {
    let (text, source) = match input {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read episode file: {}", path.display()))?;
            (text, path.display().to_string())
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read episode from stdin")?;
            (text, "stdin".to_string())
        }
    };
    Episode::parse_with_policy(&text, policy)
        .with_context(|| format!("Failed to parse episode from {source}"))
}

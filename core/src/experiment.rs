use std::{
    fmt::Write,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::pipeline::{GenerationParams, TrialLists};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RunMode {
    /// Generate lists and write them out.
    Full,
    /// Also compare the output against a recorded snapshot.
    Check,
}

impl RunMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Check => "check",
        }
    }
}

impl FromStr for RunMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "full" => Ok(Self::Full),
            "check" => Ok(Self::Check),
            other => Err(anyhow!("invalid mode: {}", other)),
        }
    }
}

/// Files written into an output directory.
#[derive(Clone, Debug)]
pub struct OutputPaths {
    pub encoding: PathBuf,
    pub test: PathBuf,
    pub trials: PathBuf,
    pub report: PathBuf,
    pub snapshot: PathBuf,
}

impl OutputPaths {
    pub fn prepare(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;

        Ok(Self {
            encoding: dir.join("encoding.txt"),
            test: dir.join("test.tsv"),
            trials: dir.join("trials.json"),
            report: dir.join("report.md"),
            snapshot: dir.join("snapshot.json"),
        })
    }
}

/// A run's parameters and output, recorded to detect drift under a fixed seed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub seed: u64,
    pub params: GenerationParams,
    pub lists: TrialLists,
}

impl RunSnapshot {
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot from {}", path.display()))?;
        let snapshot = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse snapshot at {}", path.display()))?;
        Ok(Some(snapshot))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    /// Fail if `self` was produced from the same inputs as `reference` but differs from it.
    pub fn verify_against(&self, reference: &Self) -> Result<()> {
        if self.seed != reference.seed || self.params != reference.params {
            return Err(anyhow!(
                "snapshot was recorded with seed {} and {:?}; delete it to record a new one",
                reference.seed,
                reference.params
            ));
        }
        if self.lists.encoding != reference.lists.encoding {
            return Err(anyhow!("encoding list deviated from snapshot"));
        }
        if self.lists.test != reference.lists.test {
            return Err(anyhow!("test list deviated from snapshot"));
        }
        if self.lists != reference.lists {
            return Err(anyhow!("condition grid deviated from snapshot"));
        }
        Ok(())
    }
}

/// What a run did with the snapshot file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SnapshotOutcome {
    Skipped,
    Matched,
    Recorded,
}

/// Write a run's output files.
///
/// In check mode the run is compared against the recorded snapshot first;
/// a deviating run fails without touching the existing outputs.
pub fn commit_run(
    paths: &OutputPaths,
    mode: RunMode,
    snapshot: &RunSnapshot,
) -> Result<SnapshotOutcome> {
    let outcome = match mode {
        RunMode::Full => SnapshotOutcome::Skipped,
        RunMode::Check => match RunSnapshot::load(&paths.snapshot)? {
            Some(reference) => {
                snapshot.verify_against(&reference)?;
                SnapshotOutcome::Matched
            }
            None => SnapshotOutcome::Recorded,
        },
    };

    write_outputs(paths, snapshot.seed, &snapshot.params, &snapshot.lists)?;
    if outcome == SnapshotOutcome::Recorded {
        snapshot.save(&paths.snapshot)?;
    }
    Ok(outcome)
}

pub fn render_encoding(lists: &TrialLists) -> String {
    let mut output = String::with_capacity(lists.encoding.len() * 9);
    for name in &lists.encoding {
        output.push_str(name);
        output.push('\n');
    }
    output
}

pub fn render_test_table(lists: &TrialLists) -> String {
    let mut output = String::from("left\tright\ttrial_type\tlure_bin\n");
    for trial in &lists.test {
        let _ = writeln!(
            &mut output,
            "{}\t{}\t{}\t{}",
            trial.left, trial.right, trial.trial_type, trial.lure_bin
        );
    }
    output
}

#[derive(Serialize)]
struct TrialsDocument<'a> {
    seed: u64,
    params: &'a GenerationParams,
    bins: &'a [i64],
    encoding: &'a [String],
    test: &'a [crate::retrieval::TestTrial],
}

/// Write the encoding list, the test table and the combined JSON document.
pub fn write_outputs(
    paths: &OutputPaths,
    seed: u64,
    params: &GenerationParams,
    lists: &TrialLists,
) -> Result<()> {
    fs::write(&paths.encoding, render_encoding(lists))
        .with_context(|| format!("failed to write {}", paths.encoding.display()))?;
    fs::write(&paths.test, render_test_table(lists))
        .with_context(|| format!("failed to write {}", paths.test.display()))?;

    let document = TrialsDocument {
        seed,
        params,
        bins: lists.bins.as_slice(),
        encoding: &lists.encoding,
        test: &lists.test,
    };
    write_json(&paths.trials, &document)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let serialized = serde_json::to_string_pretty(value)?;
    fs::write(path, serialized).with_context(|| format!("failed to write {}", path.display()))
}

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::econ::RawReport;
use crate::timeline::{PlanetId, SparseTimeline, TurnId};

/// A game's worth of planet reports as seen by one player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSet {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub player: Option<u32>,
    #[serde(default)]
    pub turns: Vec<TurnEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnEntry {
    pub turn: TurnId,
    /// Planet id to its 14-glyph report.
    #[serde(default)]
    pub planets: BTreeMap<u32, String>,
}

pub struct ReportLoader {
    base_dir: PathBuf,
}

impl ReportLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<ReportSet> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read report file {}", path.display()))?;
        let set: ReportSet = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        info!(
            game = %set.name,
            turns = set.turns.len(),
            path = %path.display(),
            "loaded report set"
        );
        Ok(set)
    }
}

impl ReportSet {
    pub fn from_yaml_str(data: &str) -> Result<Self> {
        serde_yaml::from_str(data).context("Failed to parse report set")
    }

    /// Replays every turn into a fresh timeline.
    pub fn build_timeline(&self) -> Result<SparseTimeline> {
        let mut timeline = SparseTimeline::new();
        for entry in &self.turns {
            for (planet, code) in &entry.planets {
                let report: RawReport = code.parse().with_context(|| {
                    format!(
                        "Bad report for planet {} on turn {} in '{}'",
                        planet, entry.turn, self.name
                    )
                })?;
                timeline
                    .record(entry.turn, PlanetId::new(*planet), report)
                    .with_context(|| {
                        format!("Cannot record turn {} in '{}'", entry.turn, self.name)
                    })?;
            }
            debug!(turn = entry.turn, planets = entry.planets.len(), "replayed turn");
        }
        Ok(timeline)
    }
}

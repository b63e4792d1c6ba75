//! Turn reconstruction: query the timeline, decode, then encode glyphs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RadialConfig;
use crate::econ::{build_state_with, EconState, RawReport};
use crate::glyphs::EconGlyphs;
use crate::tables::CodeBook;
use crate::timeline::{Observation, PlanetId, SharedTimeline, SparseTimeline, TurnId};

pub struct EngineSettings {
    pub game: String,
    pub radial: RadialConfig,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    codebook: Option<CodeBook>,
    timeline: SharedTimeline,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            codebook: None,
            timeline: SharedTimeline::default(),
        }
    }

    pub fn with_codebook(mut self, codebook: CodeBook) -> Self {
        self.codebook = Some(codebook);
        self
    }

    pub fn with_timeline(mut self, timeline: SparseTimeline) -> Self {
        self.timeline = SharedTimeline::new(timeline);
        self
    }

    pub fn with_shared_timeline(mut self, timeline: SharedTimeline) -> Self {
        self.timeline = timeline;
        self
    }

    pub fn build(self) -> IntelEngine {
        IntelEngine {
            game: self.settings.game,
            radial: self.settings.radial,
            codebook: Arc::new(self.codebook.unwrap_or_default()),
            timeline: self.timeline,
        }
    }
}

/// One decoded planet as known on the requested turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetFrame {
    pub planet: PlanetId,
    pub observed_turn: TurnId,
    /// Turns since the report was taken; 0 when it is current.
    pub age: u64,
    pub state: EconState,
    pub glyphs: EconGlyphs,
}

/// A report that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetIssue {
    pub planet: PlanetId,
    pub observed_turn: TurnId,
    pub report: RawReport,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnFrame {
    pub game: String,
    pub turn: i64,
    pub generated_at: DateTime<Utc>,
    pub planets: Vec<PlanetFrame>,
    /// Planets seen at some point but not yet by this turn.
    pub unknown: Vec<PlanetId>,
    pub issues: Vec<PlanetIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanetView {
    Unknown { planet: PlanetId, turn: i64 },
    Decoded(PlanetFrame),
    Failed(PlanetIssue),
}

pub struct IntelEngine {
    game: String,
    radial: RadialConfig,
    codebook: Arc<CodeBook>,
    timeline: SharedTimeline,
}

impl IntelEngine {
    pub fn frame(&self, turn: i64) -> TurnFrame {
        let timeline = self.timeline.read();
        let mut frame = TurnFrame {
            game: self.game.clone(),
            turn,
            generated_at: Utc::now(),
            planets: Vec::new(),
            unknown: Vec::new(),
            issues: Vec::new(),
        };

        for planet in timeline.planets() {
            match self.resolve(planet, turn, timeline.query(planet, turn)) {
                PlanetView::Unknown { planet, .. } => frame.unknown.push(planet),
                PlanetView::Decoded(planet_frame) => frame.planets.push(planet_frame),
                PlanetView::Failed(issue) => frame.issues.push(issue),
            }
        }

        debug!(
            game = %self.game,
            turn,
            decoded = frame.planets.len(),
            unknown = frame.unknown.len(),
            issues = frame.issues.len(),
            "reconstructed turn"
        );
        frame
    }

    pub fn planet(&self, planet: PlanetId, turn: i64) -> PlanetView {
        let observation = self.timeline.query(planet, turn);
        self.resolve(planet, turn, observation)
    }

    fn resolve(&self, planet: PlanetId, turn: i64, observation: Observation) -> PlanetView {
        let Observation::Known {
            turn: observed_turn,
            report,
        } = observation
        else {
            return PlanetView::Unknown { planet, turn };
        };

        match build_state_with(&report, &self.codebook) {
            Ok(state) => {
                let glyphs = EconGlyphs::from_state(&state, &self.radial);
                PlanetView::Decoded(PlanetFrame {
                    planet,
                    observed_turn,
                    age: observation.age(turn).unwrap_or_default(),
                    state,
                    glyphs,
                })
            }
            Err(err) => {
                warn!(%planet, turn, observed_turn, %report, error = %err, "undecodable report");
                PlanetView::Failed(PlanetIssue {
                    planet,
                    observed_turn,
                    report,
                    error: err.to_string(),
                })
            }
        }
    }

    pub fn last_turn(&self) -> TurnId {
        self.timeline.read().last_turn()
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn codebook(&self) -> &CodeBook {
        &self.codebook
    }

    pub fn timeline(&self) -> &SharedTimeline {
        &self.timeline
    }
}

//! Turn-indexed store of sparse planet reports.
//!
//! Reports exist only for turns on which a planet was seen. A query for any
//! other turn falls back to the most recent earlier observation.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::econ::RawReport;

/// Turn numbers start at 1.
pub type TurnId = u32;

/// Opaque planet key; planet identity lives with the game model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanetId(u32);

impl PlanetId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PlanetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Observation {
    /// No report at or before the requested turn. Distinct from an all-zero report.
    Unknown,
    Known { turn: TurnId, report: RawReport },
}

impl Observation {
    pub fn report(&self) -> Option<&RawReport> {
        match self {
            Observation::Unknown => None,
            Observation::Known { report, .. } => Some(report),
        }
    }

    pub fn observed_turn(&self) -> Option<TurnId> {
        match self {
            Observation::Unknown => None,
            Observation::Known { turn, .. } => Some(*turn),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Observation::Unknown)
    }

    /// Turns elapsed between the observation and `requested`.
    pub fn age(&self, requested: i64) -> Option<u64> {
        self.observed_turn()
            .map(|turn| requested.saturating_sub(i64::from(turn)).max(0) as u64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimelineError {
    #[error("turn 0 cannot hold reports; turns start at 1")]
    TurnZero,
}

#[derive(Debug, Default, Clone)]
struct TurnReports {
    planets: HashMap<PlanetId, RawReport>,
}

/// Only turns with at least one report are stored; each holds the planets
/// observed that turn. `observed` indexes the same entries per planet.
#[derive(Debug, Default, Clone)]
pub struct SparseTimeline {
    turns: BTreeMap<TurnId, TurnReports>,
    observed: BTreeMap<PlanetId, BTreeSet<TurnId>>,
}

impl SparseTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores or overwrites one report, returning the one it replaced.
    pub fn record(
        &mut self,
        turn: TurnId,
        planet: PlanetId,
        report: RawReport,
    ) -> Result<Option<RawReport>, TimelineError> {
        if turn == 0 {
            return Err(TimelineError::TurnZero);
        }
        let previous = self
            .turns
            .entry(turn)
            .or_default()
            .planets
            .insert(planet, report);
        self.observed.entry(planet).or_default().insert(turn);
        Ok(previous)
    }

    /// Latest report for `planet` at or before `turn`.
    pub fn query(&self, planet: PlanetId, turn: i64) -> Observation {
        let Some(upper) = self.clamp_turn(turn) else {
            return Observation::Unknown;
        };
        self.observed
            .get(&planet)
            .and_then(|turns| turns.range(..=upper).next_back().copied())
            .and_then(|found| self.known(found, planet))
            .unwrap_or(Observation::Unknown)
    }

    /// Walks turn storage backwards from `turn`; the reference for `query`.
    pub fn scan_back(&self, planet: PlanetId, turn: i64) -> Observation {
        let Some(upper) = self.clamp_turn(turn) else {
            return Observation::Unknown;
        };
        self.turns
            .range(..=upper)
            .rev()
            .find_map(|(candidate, _)| self.known(*candidate, planet))
            .unwrap_or(Observation::Unknown)
    }

    /// Report recorded at exactly this turn, without backward fill.
    pub fn observed_at(&self, turn: TurnId, planet: PlanetId) -> Option<&RawReport> {
        self.turns.get(&turn)?.planets.get(&planet)
    }

    pub fn observed_turns(&self, planet: PlanetId) -> impl Iterator<Item = TurnId> + '_ {
        self.observed
            .get(&planet)
            .into_iter()
            .flat_map(|turns| turns.iter().copied())
    }

    /// Every planet with at least one report, in id order.
    pub fn planets(&self) -> impl Iterator<Item = PlanetId> + '_ {
        self.observed.keys().copied()
    }

    /// Latest turn holding any report, or 0 when empty.
    pub fn last_turn(&self) -> TurnId {
        self.turns.keys().next_back().copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.turns.values().map(|turn| turn.planets.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    fn clamp_turn(&self, turn: i64) -> Option<TurnId> {
        if turn < 1 || self.turns.is_empty() {
            return None;
        }
        Some(turn.min(i64::from(self.last_turn())) as TurnId)
    }

    fn known(&self, turn: TurnId, planet: PlanetId) -> Option<Observation> {
        self.observed_at(turn, planet)
            .map(|report| Observation::Known {
                turn,
                report: *report,
            })
    }
}

/// Timeline shared between ingestion and readers.
///
/// Writers hold the write lock for a whole batch, so readers never see a
/// half-applied turn.
#[derive(Debug, Clone, Default)]
pub struct SharedTimeline {
    inner: Arc<RwLock<SparseTimeline>>,
}

impl SharedTimeline {
    pub fn new(timeline: SparseTimeline) -> Self {
        Self {
            inner: Arc::new(RwLock::new(timeline)),
        }
    }

    pub fn record(
        &self,
        turn: TurnId,
        planet: PlanetId,
        report: RawReport,
    ) -> Result<Option<RawReport>, TimelineError> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.record(turn, planet, report)
    }

    /// Records a whole turn under one write lock.
    pub fn record_batch(
        &self,
        turn: TurnId,
        reports: impl IntoIterator<Item = (PlanetId, RawReport)>,
    ) -> Result<usize, TimelineError> {
        if turn == 0 {
            return Err(TimelineError::TurnZero);
        }
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let mut count = 0;
        for (planet, report) in reports {
            guard.record(turn, planet, report)?;
            count += 1;
        }
        Ok(count)
    }

    pub fn query(&self, planet: PlanetId, turn: i64) -> Observation {
        self.read().query(planet, turn)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, SparseTimeline> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(text: &str) -> RawReport {
        text.parse().expect("valid report")
    }

    #[test]
    fn exact_turn_is_returned() {
        let mut timeline = SparseTimeline::new();
        let r = report("5163ab00000000");
        timeline.record(3, PlanetId::new(7), r).unwrap();
        assert_eq!(
            timeline.query(PlanetId::new(7), 3),
            Observation::Known { turn: 3, report: r }
        );
    }

    #[test]
    fn gaps_fill_from_latest_earlier_turn() {
        let mut timeline = SparseTimeline::new();
        let early = report("5163ab00000000");
        let late = report("61630b00000000");
        let planet = PlanetId::new(7);
        timeline.record(2, planet, early).unwrap();
        timeline.record(5, planet, late).unwrap();
        timeline.record(9, PlanetId::new(8), early).unwrap();

        assert_eq!(timeline.query(planet, 1), Observation::Unknown);
        assert_eq!(timeline.query(planet, 4).observed_turn(), Some(2));
        assert_eq!(timeline.query(planet, 5).observed_turn(), Some(5));
        assert_eq!(timeline.query(planet, 9).report(), Some(&late));
        // past the last stored turn
        assert_eq!(timeline.query(planet, 40).observed_turn(), Some(5));
        assert_eq!(timeline.query(planet, 40).age(40), Some(35));
    }

    #[test]
    fn never_fills_forward() {
        let mut timeline = SparseTimeline::new();
        timeline
            .record(6, PlanetId::new(1), report("00000000000000"))
            .unwrap();
        for turn in 1..6 {
            assert!(timeline.query(PlanetId::new(1), turn).is_unknown());
        }
    }

    #[test]
    fn non_positive_turns_are_unknown() {
        let mut timeline = SparseTimeline::new();
        timeline
            .record(1, PlanetId::new(1), report("00000000000000"))
            .unwrap();
        assert!(timeline.query(PlanetId::new(1), 0).is_unknown());
        assert!(timeline.query(PlanetId::new(1), -5).is_unknown());
        assert!(timeline.scan_back(PlanetId::new(1), -5).is_unknown());
    }

    #[test]
    fn all_zero_report_is_not_unknown() {
        let mut timeline = SparseTimeline::new();
        let zero = report("00000000000000");
        timeline.record(1, PlanetId::new(4), zero).unwrap();
        let observation = timeline.query(PlanetId::new(4), 3);
        assert!(!observation.is_unknown());
        assert_eq!(observation.report(), Some(&zero));
    }

    #[test]
    fn turn_zero_is_rejected() {
        let mut timeline = SparseTimeline::new();
        assert_eq!(
            timeline.record(0, PlanetId::new(1), report("00000000000000")),
            Err(TimelineError::TurnZero)
        );
        assert!(timeline.is_empty());
    }

    #[test]
    fn largest_turn_is_recorded_without_filling_gaps() {
        let mut timeline = SparseTimeline::new();
        let planet = PlanetId::new(1);
        let early = report("10000000000000");
        let last = report("20000000000000");
        timeline.record(3, planet, early).unwrap();
        assert_eq!(timeline.record(u32::MAX, planet, last), Ok(None));

        assert_eq!(timeline.last_turn(), u32::MAX);
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.query(planet, i64::MAX).report(), Some(&last));
        assert_eq!(
            timeline.query(planet, i64::from(u32::MAX) - 1).observed_turn(),
            Some(3)
        );
        assert_eq!(
            timeline.scan_back(planet, i64::from(u32::MAX) - 1),
            timeline.query(planet, i64::from(u32::MAX) - 1)
        );
    }

    #[test]
    fn overwrite_replaces_entry() {
        let mut timeline = SparseTimeline::new();
        let first = report("10000000000000");
        let second = report("20000000000000");
        assert_eq!(timeline.record(4, PlanetId::new(2), first), Ok(None));
        assert_eq!(timeline.record(4, PlanetId::new(2), second), Ok(Some(first)));
        assert_eq!(timeline.last_turn(), 4);
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.observed_at(3, PlanetId::new(2)), None);
        assert_eq!(
            timeline.observed_turns(PlanetId::new(2)).collect::<Vec<_>>(),
            vec![4]
        );
    }

    #[test]
    fn late_backfill_of_earlier_turn_is_visible() {
        let mut timeline = SparseTimeline::new();
        let planet = PlanetId::new(3);
        timeline.record(8, planet, report("80000000000000")).unwrap();
        assert!(timeline.query(planet, 6).is_unknown());
        timeline.record(5, planet, report("50000000000000")).unwrap();
        assert_eq!(timeline.query(planet, 6).observed_turn(), Some(5));
        assert_eq!(timeline.query(planet, 6), timeline.scan_back(planet, 6));
    }

    #[test]
    fn shared_timeline_records_batches() {
        let shared = SharedTimeline::default();
        let reports = vec![
            (PlanetId::new(1), report("10000000000000")),
            (PlanetId::new(2), report("20000000000000")),
        ];
        assert_eq!(shared.record_batch(2, reports), Ok(2));
        assert_eq!(shared.query(PlanetId::new(2), 7).observed_turn(), Some(2));
        assert_eq!(
            shared.record_batch(0, Vec::new()),
            Err(TimelineError::TurnZero)
        );

        let reader = shared.clone();
        let handle = std::thread::spawn(move || reader.query(PlanetId::new(1), 2));
        assert_eq!(handle.join().unwrap().observed_turn(), Some(2));
    }
}

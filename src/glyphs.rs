//! Order-of-magnitude glyph descriptors.
//!
//! Nothing here draws. A renderer turns wedges into arcs and tallies into
//! stacked blocks; this module only decides how many of each.

use serde::{Deserialize, Serialize};

use crate::config::RadialConfig;
use crate::econ::EconState;
use crate::tables::temperature_colour;

pub const WEDGES_PER_CIRCLE: u32 = 24;
pub const WEDGE_DEGREES: f64 = 360.0 / WEDGES_PER_CIRCLE as f64;

const MAX_WEDGE_WIDTH: u32 = 3;
const MAX_WEDGE_HEIGHT: u64 = 10;
const MAX_TALLY_MAGNITUDE: u32 = 5;
const MAX_TALLY_BLOCKS: u64 = 12;

/// Arc width in 15 degree units and radial height in steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Wedge {
    pub width_units: u32,
    pub height_units: u32,
}

impl Wedge {
    pub fn is_empty(&self) -> bool {
        self.width_units == 0
    }
}

/// Width is the decimal order of `value - 1` (capped at 3), height its leading
/// magnitude within that order (rounded, capped at 10). Values up to 10 are
/// too small to draw.
pub fn wedge(value: u64) -> Wedge {
    if value < 11 {
        return Wedge::default();
    }
    let n = value - 1;
    let width_units = n.ilog10().min(MAX_WEDGE_WIDTH);
    let divisor = 10u64.pow(width_units);
    let height_units = round_div(n, divisor).min(MAX_WEDGE_HEIGHT);
    Wedge {
        width_units,
        height_units: height_units as u32,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Tally {
    Empty,
    /// One or two short rank markers.
    Ranks { count: u32 },
    Blocks(BlockTally),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTally {
    /// Decimal order of the count, capped at 5.
    pub magnitude: u32,
    pub blocks: u32,
    /// Internal partition lines drawn in every block.
    pub partitions: u32,
    /// Blocks followed by a group separator (every third block).
    pub separators: Vec<u32>,
}

impl BlockTally {
    pub fn is_separator(&self, block: u32) -> bool {
        block < self.blocks && block % 3 == 2
    }
}

pub fn tally(count: u64) -> Tally {
    match count {
        0 => Tally::Empty,
        1 => Tally::Ranks { count: 1 },
        2..=9 => Tally::Ranks { count: 2 },
        _ => {
            let magnitude = count.ilog10().min(MAX_TALLY_MAGNITUDE);
            let divisor = 10u64.pow(magnitude);
            let blocks = round_div(count, divisor).min(MAX_TALLY_BLOCKS) as u32;
            Tally::Blocks(BlockTally {
                magnitude,
                blocks,
                partitions: magnitude - 1,
                separators: (0..blocks).filter(|block| block % 3 == 2).collect(),
            })
        }
    }
}

/// `n / d` rounded half up.
fn round_div(n: u64, d: u64) -> u64 {
    n / d + u64::from((n % d) * 2 >= d)
}

/// Direction successive slices advance in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sweep {
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcSlice {
    pub label: String,
    pub wedge: Wedge,
    pub start_deg: f64,
    pub end_deg: f64,
    pub radius: f64,
}

/// Lays quantities out as consecutive slices centred on the anchor angle.
///
/// A clockwise layout is the mirror image of the counter-clockwise one about
/// the anchor. Quantities too small for a wedge get no slice.
pub fn layout_arcs(
    quantities: &[(&str, u64)],
    sweep: Sweep,
    config: &RadialConfig,
) -> Vec<ArcSlice> {
    let wedges: Vec<(&str, Wedge)> = quantities
        .iter()
        .map(|(label, value)| (*label, wedge(*value)))
        .filter(|(_, w)| !w.is_empty())
        .collect();
    let total_deg: f64 = wedges
        .iter()
        .map(|(_, w)| w.width_units as f64 * WEDGE_DEGREES)
        .sum();
    let direction = match sweep {
        Sweep::CounterClockwise => 1.0,
        Sweep::Clockwise => -1.0,
    };

    let mut cursor = config.anchor_deg - direction * total_deg / 2.0;
    wedges
        .into_iter()
        .map(|(label, w)| {
            let span = w.width_units as f64 * WEDGE_DEGREES;
            let start = cursor;
            cursor += direction * span;
            ArcSlice {
                label: label.to_string(),
                wedge: w,
                start_deg: normalise_deg(start),
                end_deg: normalise_deg(cursor),
                radius: config.base_radius + w.height_units as f64 * config.radius_step,
            }
        })
        .collect()
}

fn normalise_deg(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

/// Everything a renderer needs to draw one planet's economy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconGlyphs {
    pub temperature_colour: String,
    pub orbital: Vec<ArcSlice>,
    pub ground: Vec<ArcSlice>,
    pub colonists: Tally,
    pub natives: Tally,
    pub megacredits: Tally,
}

impl EconGlyphs {
    pub fn from_state(state: &EconState, config: &RadialConfig) -> Self {
        Self {
            temperature_colour: temperature_colour(state.temperature).to_string(),
            orbital: layout_arcs(&state.minerals.named(), Sweep::CounterClockwise, config),
            ground: layout_arcs(&state.ground.named(), Sweep::Clockwise, config),
            colonists: tally(state.colonist_clans),
            natives: tally(state.native_clans),
            megacredits: tally(state.megacredits),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::econ::{build_state, RawReport};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn wedge_is_empty_up_to_ten() {
        for value in 0..=10 {
            assert_eq!(wedge(value), Wedge::default(), "value {value}");
        }
    }

    #[test]
    fn wedge_jumps_at_eleven() {
        assert_eq!(
            wedge(11),
            Wedge {
                width_units: 1,
                height_units: 1
            }
        );
    }

    #[test]
    fn wedge_caps_both_axes() {
        assert_eq!(
            wedge(100_000),
            Wedge {
                width_units: 3,
                height_units: 10
            }
        );
        assert_eq!(
            wedge(u64::MAX),
            Wedge {
                width_units: 3,
                height_units: 10
            }
        );
    }

    #[test]
    fn wedge_rounds_within_order() {
        // n = 149 -> 1.49 -> 1
        assert_eq!(wedge(150).height_units, 1);
        // n = 150 -> 1.5 -> 2
        assert_eq!(wedge(151).height_units, 2);
        // n = 99 -> 9.9 -> 10 at width 1
        assert_eq!(
            wedge(100),
            Wedge {
                width_units: 1,
                height_units: 10
            }
        );
        assert_eq!(
            wedge(2_501),
            Wedge {
                width_units: 3,
                height_units: 3
            }
        );
    }

    #[test]
    fn tally_ranks_for_small_counts() {
        assert_eq!(tally(0), Tally::Empty);
        assert_eq!(tally(1), Tally::Ranks { count: 1 });
        assert_eq!(tally(2), Tally::Ranks { count: 2 });
        assert_eq!(tally(9), Tally::Ranks { count: 2 });
    }

    #[test]
    fn tally_blocks_for_9999() {
        let Tally::Blocks(blocks) = tally(9_999) else {
            panic!("expected blocks");
        };
        assert_eq!(blocks.magnitude, 3);
        assert_eq!(blocks.blocks, 10);
        assert_eq!(blocks.partitions, 2);
        assert_eq!(blocks.separators, vec![2, 5, 8]);
        assert!(blocks.is_separator(5));
        assert!(!blocks.is_separator(6));
        assert!(!blocks.is_separator(11));
    }

    #[test]
    fn tally_caps_blocks_and_magnitude() {
        let Tally::Blocks(blocks) = tally(150_000) else {
            panic!("expected blocks");
        };
        assert_eq!(blocks.magnitude, 5);
        assert_eq!(blocks.blocks, 2);
        assert_eq!(blocks.partitions, 4);

        let Tally::Blocks(blocks) = tally(50_000_000) else {
            panic!("expected blocks");
        };
        assert_eq!(blocks.magnitude, 5);
        assert_eq!(blocks.blocks, 12);
        assert_eq!(blocks.separators, vec![2, 5, 8, 11]);
    }

    #[test]
    fn tally_ten_has_no_partitions() {
        assert_eq!(
            tally(10),
            Tally::Blocks(BlockTally {
                magnitude: 1,
                blocks: 1,
                partitions: 0,
                separators: Vec::new(),
            })
        );
    }

    #[test]
    fn arcs_are_centred_on_anchor() {
        let config = RadialConfig::default();
        let slices = layout_arcs(
            &[("a", 20), ("b", 5), ("c", 2_000)],
            Sweep::CounterClockwise,
            &config,
        );
        assert_eq!(slices.len(), 2);
        // widths 1 and 3 -> 60 degrees total around 90
        assert!(approx(slices[0].start_deg, 60.0));
        assert!(approx(slices[0].end_deg, 75.0));
        assert!(approx(slices[1].start_deg, 75.0));
        assert!(approx(slices[1].end_deg, 120.0));
        assert_eq!(slices[1].label, "c");
        assert!(approx(slices[0].radius, 1.0 + 2.0 * 0.25));
    }

    #[test]
    fn clockwise_layout_mirrors_counter_clockwise() {
        let config = RadialConfig {
            anchor_deg: 0.0,
            ..RadialConfig::default()
        };
        let quantities = [("n", 500), ("d", 40), ("t", 12_000)];
        let ccw = layout_arcs(&quantities, Sweep::CounterClockwise, &config);
        let cw = layout_arcs(&quantities, Sweep::Clockwise, &config);
        assert_eq!(ccw.len(), cw.len());
        for (a, b) in ccw.iter().zip(&cw) {
            assert_eq!(a.label, b.label);
            assert_eq!(a.wedge, b.wedge);
            assert!(approx((a.start_deg + b.start_deg).rem_euclid(360.0), 0.0));
            assert!(approx((a.end_deg + b.end_deg).rem_euclid(360.0), 0.0));
        }
        // starts below zero and wraps
        assert!(approx(ccw[0].start_deg, 315.0));
    }

    #[test]
    fn glyphs_follow_decoded_state() {
        let report: RawReport = "5163ab9ac0e000".parse().unwrap();
        let state = build_state(&report).unwrap();
        let glyphs = EconGlyphs::from_state(&state, &RadialConfig::default());
        assert_eq!(glyphs.temperature_colour, "#9abbff");
        assert_eq!(glyphs.orbital.len(), 3);
        assert_eq!(glyphs.ground.len(), 1);
        assert_eq!(glyphs.ground[0].label, "neutronium");
        assert!(matches!(glyphs.colonists, Tally::Blocks(_)));
        assert_eq!(glyphs.natives, Tally::Blocks(tally_blocks(50)));
    }

    fn tally_blocks(count: u64) -> BlockTally {
        match tally(count) {
            Tally::Blocks(blocks) => blocks,
            other => panic!("expected blocks, got {other:?}"),
        }
    }
}

pub mod config;
pub mod decode;
pub mod econ;
pub mod engine;
pub mod glyphs;
pub mod reports;
pub mod snapshot;
pub mod tables;
pub mod timeline;
pub mod web;

pub use config::AppConfig;
pub use decode::{decode_name, decode_threshold, DecodeError};
pub use econ::{build_state, EconState, RawReport};
pub use engine::{IntelEngine, TurnFrame};
pub use glyphs::{tally, wedge, Tally, Wedge};
pub use timeline::{Observation, PlanetId, SparseTimeline};

//! Raw planet reports and their decoded economic state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{decode_name, decode_threshold, DecodeError};
use crate::tables::{CodeBook, Label, NameTable, ThresholdTable};

pub const FIELD_COUNT: usize = 14;

/// Positional fields of a raw report, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EconField {
    Temperature,
    NativeSpecies,
    NativeGovernment,
    NativeClans,
    ColonistClans,
    Megacredits,
    Neutronium,
    Duranium,
    Tritanium,
    Molybdenum,
    GroundNeutronium,
    GroundDuranium,
    GroundTritanium,
    GroundMolybdenum,
}

impl EconField {
    pub const ALL: [EconField; FIELD_COUNT] = [
        EconField::Temperature,
        EconField::NativeSpecies,
        EconField::NativeGovernment,
        EconField::NativeClans,
        EconField::ColonistClans,
        EconField::Megacredits,
        EconField::Neutronium,
        EconField::Duranium,
        EconField::Tritanium,
        EconField::Molybdenum,
        EconField::GroundNeutronium,
        EconField::GroundDuranium,
        EconField::GroundTritanium,
        EconField::GroundMolybdenum,
    ];

    pub fn position(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            EconField::Temperature => "temperature",
            EconField::NativeSpecies => "native_species",
            EconField::NativeGovernment => "native_government",
            EconField::NativeClans => "native_clans",
            EconField::ColonistClans => "colonist_clans",
            EconField::Megacredits => "megacredits",
            EconField::Neutronium => "neutronium",
            EconField::Duranium => "duranium",
            EconField::Tritanium => "tritanium",
            EconField::Molybdenum => "molybdenum",
            EconField::GroundNeutronium => "ground_neutronium",
            EconField::GroundDuranium => "ground_duranium",
            EconField::GroundTritanium => "ground_tritanium",
            EconField::GroundMolybdenum => "ground_molybdenum",
        }
    }
}

impl fmt::Display for EconField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("report has {found} codes, expected 14")]
    WrongArity { found: usize },
    #[error("code {glyph:?} at position {position} is not a base-36 digit")]
    InvalidGlyph { position: usize, glyph: char },
}

/// Fourteen base-36 codes as reported for one planet on one turn.
///
/// Glyphs are normalised to lower case. Whether each code fits its table is
/// only checked when the report is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RawReport {
    codes: [char; FIELD_COUNT],
}

impl RawReport {
    pub fn new(codes: [char; FIELD_COUNT]) -> Result<Self, ReportError> {
        let mut normalised = codes;
        for (position, glyph) in normalised.iter_mut().enumerate() {
            if !glyph.is_ascii_alphanumeric() {
                return Err(ReportError::InvalidGlyph {
                    position,
                    glyph: *glyph,
                });
            }
            *glyph = glyph.to_ascii_lowercase();
        }
        Ok(Self { codes: normalised })
    }

    pub fn code(&self, field: EconField) -> char {
        self.codes[field.position()]
    }

    pub fn codes(&self) -> &[char; FIELD_COUNT] {
        &self.codes
    }
}

/// Accepts `5163ab00000000` as well as separated forms such as
/// `5,1,6,3,a,b,0,0,0,0,0,0,0,0`.
impl FromStr for RawReport {
    type Err = ReportError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let glyphs: Vec<char> = text
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .collect();
        let codes: [char; FIELD_COUNT] = glyphs
            .as_slice()
            .try_into()
            .map_err(|_| ReportError::WrongArity {
                found: glyphs.len(),
            })?;
        Self::new(codes)
    }
}

impl TryFrom<String> for RawReport {
    type Error = ReportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RawReport> for String {
    fn from(value: RawReport) -> Self {
        value.to_string()
    }
}

impl fmt::Display for RawReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.codes.iter().try_for_each(|c| write!(f, "{c}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Minerals {
    pub neutronium: u64,
    pub duranium: u64,
    pub tritanium: u64,
    pub molybdenum: u64,
}

impl Minerals {
    pub fn named(&self) -> [(&'static str, u64); 4] {
        [
            ("neutronium", self.neutronium),
            ("duranium", self.duranium),
            ("tritanium", self.tritanium),
            ("molybdenum", self.molybdenum),
        ]
    }

    pub fn total(&self) -> u64 {
        self.named()
            .iter()
            .fold(0u64, |sum, (_, amount)| sum.saturating_add(*amount))
    }
}

/// Fully decoded report. Every numeric field is a bucket lower bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconState {
    pub temperature: u64,
    pub native_species: Label,
    pub native_government: Label,
    pub native_clans: u64,
    pub colonist_clans: u64,
    pub megacredits: u64,
    pub minerals: Minerals,
    pub ground: Minerals,
}

/// Decodes against the standard code book.
pub fn build_state(report: &RawReport) -> Result<EconState, DecodeError> {
    build_state_with(report, CodeBook::standard())
}

pub fn build_state_with(report: &RawReport, book: &CodeBook) -> Result<EconState, DecodeError> {
    let level = |field: EconField, table: &ThresholdTable| {
        decode_threshold(report.code(field), table).map_err(|err| err.in_field(field))
    };
    let label = |field: EconField, table: &NameTable| {
        decode_name(report.code(field), table)
            .cloned()
            .map_err(|err| err.in_field(field))
    };

    Ok(EconState {
        temperature: level(EconField::Temperature, &book.temperature)?,
        native_species: label(EconField::NativeSpecies, &book.native_species)?,
        native_government: label(EconField::NativeGovernment, &book.native_government)?,
        native_clans: level(EconField::NativeClans, &book.clans)?,
        colonist_clans: level(EconField::ColonistClans, &book.clans)?,
        megacredits: level(EconField::Megacredits, &book.megacredits)?,
        minerals: Minerals {
            neutronium: level(EconField::Neutronium, &book.neutronium)?,
            duranium: level(EconField::Duranium, &book.duranium)?,
            tritanium: level(EconField::Tritanium, &book.tritanium)?,
            molybdenum: level(EconField::Molybdenum, &book.molybdenum)?,
        },
        ground: Minerals {
            neutronium: level(EconField::GroundNeutronium, &book.neutronium)?,
            duranium: level(EconField::GroundDuranium, &book.duranium)?,
            tritanium: level(EconField::GroundTritanium, &book.tritanium)?,
            molybdenum: level(EconField::GroundMolybdenum, &book.molybdenum)?,
        },
    })
}

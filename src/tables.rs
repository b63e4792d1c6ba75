//! Code tables for quantized planet reports.
//!
//! Every field of a report is a single base-36 glyph. Threshold tables map the
//! glyph's integer value to the lower bound of a bucket; name tables map the
//! literal glyph to a label and display colour.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One base-36 digit addresses at most this many entries.
pub const MAX_CODES: usize = 36;

const TEMPERATURE: [u64; 21] = [
    0, 5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60, 65, 70, 75, 80, 85, 90, 95, 100,
];

const CLANS: [u64; 20] = [
    0, 1, 10, 50, 100, 250, 500, 1_000, 2_500, 5_000, 10_000, 15_000, 20_000, 30_000, 40_000,
    50_000, 65_000, 80_000, 100_000, 150_000,
];

const MEGACREDITS: [u64; 16] = [
    0, 1, 10, 25, 50, 100, 250, 500, 1_000, 2_500, 5_000, 10_000, 15_000, 20_000, 30_000, 50_000,
];

const NEUTRONIUM: [u64; 18] = [
    0, 1, 10, 25, 50, 100, 250, 500, 1_000, 2_000, 3_000, 5_000, 7_500, 10_000, 15_000, 20_000,
    30_000, 50_000,
];

const DURANIUM: [u64; 16] = [
    0, 1, 10, 25, 50, 100, 250, 500, 1_000, 2_000, 3_000, 5_000, 7_500, 10_000, 15_000, 20_000,
];

const TRITANIUM: [u64; 16] = [
    0, 1, 10, 25, 50, 100, 250, 500, 1_000, 2_000, 3_000, 5_000, 7_500, 10_000, 15_000, 20_000,
];

const MOLYBDENUM: [u64; 15] = [
    0, 1, 10, 25, 50, 100, 250, 500, 1_000, 1_500, 2_000, 3_000, 5_000, 7_500, 10_000,
];

const NATIVE_SPECIES: [(&str, &str); 10] = [
    ("none", "#808080"),
    ("Hum", "#e3d9d3"),
    ("Bov", "#c9a66b"),
    ("Rep", "#6fae5b"),
    ("Avi", "#88abfd"),
    ("Amo", "#b07cc6"),
    ("Ins", "#d5b942"),
    ("Amp", "#4fb8a8"),
    ("Ghi", "#e26952"),
    ("Sil", "#aac7fd"),
];

const NATIVE_GOVERNMENT: [(&str, &str); 10] = [
    ("none", "#808080"),
    ("Anarchy", "#c53334"),
    ("Pre-Tribal", "#e26952"),
    ("Early-Tribal", "#f39475"),
    ("Tribal", "#f7b89c"),
    ("Feudal", "#edd1c2"),
    ("Monarchy", "#d6dce4"),
    ("Representative", "#aac7fd"),
    ("Participatory", "#88abfd"),
    ("Unity", "#6788ee"),
];

/// Blue-to-red bands, one per 5 degrees of temperature.
const TEMPERATURE_COLOURS: [&str; 20] = [
    "#4961d2", "#5875e1", "#6788ee", "#779af7", "#88abfd", "#9abbff", "#aac7fd", "#bad0f8",
    "#c9d7f0", "#d6dce4", "#e3d9d3", "#edd1c2", "#f4c6af", "#f7b89c", "#f7a889", "#f39475",
    "#ec7f63", "#e26952", "#d55042", "#c53334",
];

static STANDARD: Lazy<CodeBook> = Lazy::new(|| CodeBook {
    temperature: ThresholdTable::new(TEMPERATURE.to_vec()),
    native_species: NameTable::from_pairs(&NATIVE_SPECIES),
    native_government: NameTable::from_pairs(&NATIVE_GOVERNMENT),
    clans: ThresholdTable::new(CLANS.to_vec()),
    megacredits: ThresholdTable::new(MEGACREDITS.to_vec()),
    neutronium: ThresholdTable::new(NEUTRONIUM.to_vec()),
    duranium: ThresholdTable::new(DURANIUM.to_vec()),
    tritanium: ThresholdTable::new(TRITANIUM.to_vec()),
    molybdenum: ThresholdTable::new(MOLYBDENUM.to_vec()),
});

/// Ordered bucket lower bounds, indexed by a code's integer value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdTable {
    values: Vec<u64>,
}

impl ThresholdTable {
    pub fn new(values: Vec<u64>) -> Self {
        Self { values }
    }

    pub fn get(&self, index: usize) -> Option<u64> {
        self.values.get(index).copied()
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub colour: String,
}

/// Labels keyed by the literal code glyph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameTable {
    entries: BTreeMap<char, Label>,
}

impl NameTable {
    pub fn new(entries: BTreeMap<char, Label>) -> Self {
        Self { entries }
    }

    fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let entries = pairs
            .iter()
            .enumerate()
            .filter_map(|(index, (name, colour))| {
                let glyph = char::from_digit(index as u32, 36)?;
                Some((
                    glyph,
                    Label {
                        name: (*name).to_string(),
                        colour: (*colour).to_string(),
                    },
                ))
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, glyph: char) -> Option<&Label> {
        self.entries.get(&glyph)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &Label)> {
        self.entries.iter().map(|(glyph, label)| (*glyph, label))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Borrowed view of one table, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeTable<'a> {
    Threshold(&'a ThresholdTable),
    Name(&'a NameTable),
}

impl CodeTable<'_> {
    pub fn len(&self) -> usize {
        match self {
            CodeTable::Threshold(table) => table.len(),
            CodeTable::Name(table) => table.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Error)]
pub enum CodeBookError {
    #[error("code book io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("code book parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("table '{table}' is empty")]
    Empty { table: &'static str },
    #[error("table '{table}' has {len} entries, more than one base-36 digit can address")]
    TooLarge { table: &'static str, len: usize },
    #[error("table '{table}' decreases at level {index}")]
    Decreasing { table: &'static str, index: usize },
    #[error("table '{table}' needs glyph keys in order from '0', found '{found}' at {index}")]
    Keys {
        table: &'static str,
        index: usize,
        found: char,
    },
}

/// The complete set of tables needed to decode a report.
///
/// Native and colonist populations share `clans`; each mineral table serves
/// both the orbital and the ground field of that mineral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBook {
    pub temperature: ThresholdTable,
    pub native_species: NameTable,
    pub native_government: NameTable,
    pub clans: ThresholdTable,
    pub megacredits: ThresholdTable,
    pub neutronium: ThresholdTable,
    pub duranium: ThresholdTable,
    pub tritanium: ThresholdTable,
    pub molybdenum: ThresholdTable,
}

impl CodeBook {
    /// Built-in tables, shared for the lifetime of the process.
    pub fn standard() -> &'static CodeBook {
        &STANDARD
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CodeBookError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, CodeBookError> {
        let book: CodeBook = serde_yaml::from_str(text)?;
        book.validate()?;
        Ok(book)
    }

    pub fn tables(&self) -> [(&'static str, CodeTable<'_>); 9] {
        [
            ("temperature", CodeTable::Threshold(&self.temperature)),
            ("native_species", CodeTable::Name(&self.native_species)),
            ("native_government", CodeTable::Name(&self.native_government)),
            ("clans", CodeTable::Threshold(&self.clans)),
            ("megacredits", CodeTable::Threshold(&self.megacredits)),
            ("neutronium", CodeTable::Threshold(&self.neutronium)),
            ("duranium", CodeTable::Threshold(&self.duranium)),
            ("tritanium", CodeTable::Threshold(&self.tritanium)),
            ("molybdenum", CodeTable::Threshold(&self.molybdenum)),
        ]
    }

    pub fn validate(&self) -> Result<(), CodeBookError> {
        for (table_name, table) in self.tables() {
            if table.is_empty() {
                return Err(CodeBookError::Empty { table: table_name });
            }
            if table.len() > MAX_CODES {
                return Err(CodeBookError::TooLarge {
                    table: table_name,
                    len: table.len(),
                });
            }
            match table {
                CodeTable::Threshold(thresholds) => {
                    if let Some(index) = thresholds
                        .values()
                        .windows(2)
                        .position(|pair| pair[1] < pair[0])
                    {
                        return Err(CodeBookError::Decreasing {
                            table: table_name,
                            index: index + 1,
                        });
                    }
                }
                CodeTable::Name(names) => {
                    for (index, (glyph, _)) in names.iter().enumerate() {
                        if char::from_digit(index as u32, 36) != Some(glyph) {
                            return Err(CodeBookError::Keys {
                                table: table_name,
                                index,
                                found: glyph,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for CodeBook {
    fn default() -> Self {
        Self::standard().clone()
    }
}

/// Display colour for a decoded temperature.
pub fn temperature_colour(temperature: u64) -> &'static str {
    let index = ((temperature / 5) as usize).min(TEMPERATURE_COLOURS.len() - 1);
    TEMPERATURE_COLOURS[index]
}

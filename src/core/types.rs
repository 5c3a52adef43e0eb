// src/core/types.rs
use crate::error::{CommError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Number of sticker positions every supported piece type has.
pub const POSITIONS: usize = 24;

// Sticker labels in canonical letter order: index 0 is 'A'.
const CORNER_STICKERS: [&str; POSITIONS] = [
    "ubl", "ubr", "ufr", "ufl", "lub", "luf", "ldf", "ldb", "ful", "fur", "fdr", "fdl",
    "ruf", "rub", "rdb", "rdf", "bur", "bul", "bdl", "bdr", "dfl", "dfr", "dbr", "dbl",
];

const EDGE_STICKERS: [&str; POSITIONS] = [
    "ub", "ur", "uf", "ul", "lu", "lf", "ld", "lb", "fu", "fr", "fd", "fl",
    "ru", "rb", "rd", "rf", "bu", "bl", "bd", "br", "df", "dr", "db", "dl",
];

/// The piece families the dataset is partitioned by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceType {
    Corner,
    Edge,
    Wing,
    Midge,
    XCenter,
    TCenter,
    LeftOblique,
    RightOblique,
}

impl PieceType {
    pub const ALL: [PieceType; 8] = [
        PieceType::Corner,
        PieceType::Edge,
        PieceType::Wing,
        PieceType::Midge,
        PieceType::XCenter,
        PieceType::TCenter,
        PieceType::LeftOblique,
        PieceType::RightOblique,
    ];

    /// Name of the per-piece-type dataset document, without extension.
    pub fn resource_name(self) -> &'static str {
        match self {
            PieceType::Corner => "Corner3Cycle",
            PieceType::Edge => "Edge3Cycle",
            PieceType::Wing => "Wing3Cycle",
            PieceType::Midge => "Midge3Cycle",
            PieceType::XCenter => "XCenter3Cycle",
            PieceType::TCenter => "TCenter3Cycle",
            PieceType::LeftOblique => "LeftOblique3Cycle",
            PieceType::RightOblique => "RightOblique3Cycle",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PieceType::Corner => "Corners",
            PieceType::Edge => "Edges",
            PieceType::Wing => "Wings",
            PieceType::Midge => "Midges",
            PieceType::XCenter => "X-centers",
            PieceType::TCenter => "T-centers",
            PieceType::LeftOblique => "Left obliques",
            PieceType::RightOblique => "Right obliques",
        }
    }

    /// X-centers sit next to corners, every other family next to edges.
    pub fn position_labels(self) -> &'static [&'static str; POSITIONS] {
        match self {
            PieceType::Corner | PieceType::XCenter => &CORNER_STICKERS,
            _ => &EDGE_STICKERS,
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource_name())
    }
}

impl FromStr for PieceType {
    type Err = CommError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        if let Some(found) = PieceType::ALL
            .iter()
            .find(|p| p.resource_name().eq_ignore_ascii_case(&lowered))
        {
            return Ok(*found);
        }
        let alias = lowered.trim_end_matches('s').replace(['-', '_', ' '], "");
        match alias.as_str() {
            "corner" => Ok(PieceType::Corner),
            "edge" => Ok(PieceType::Edge),
            "wing" => Ok(PieceType::Wing),
            "midge" => Ok(PieceType::Midge),
            "xcenter" => Ok(PieceType::XCenter),
            "tcenter" => Ok(PieceType::TCenter),
            "leftoblique" => Ok(PieceType::LeftOblique),
            "rightoblique" => Ok(PieceType::RightOblique),
            _ => Err(CommError::UnknownPieceType(s.to_string())),
        }
    }
}

/// An ordered triple of canonical position indices (0..24), always distinct.
/// Displayed as the three canonical letters, which is also the dataset key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern([u8; 3]);

impl Pattern {
    /// Builds a pattern from raw indices. Repeated positions do not describe a
    /// three-cycle and are rejected.
    pub fn new(indices: [u8; 3]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= POSITIONS) {
            return Err(CommError::InvalidLetter(format!("position {} is out of range", bad)));
        }
        let [a, b, c] = indices;
        if a == b || b == c || a == c {
            return Err(CommError::invalid_query(&letters_of(indices)));
        }
        Ok(Self(indices))
    }

    /// Parses three canonical letters (`A` through `X`).
    pub fn parse(s: &str) -> Result<Self> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 3 {
            return Err(CommError::invalid_query(s));
        }
        let mut indices = [0u8; 3];
        for (slot, &c) in indices.iter_mut().zip(&chars) {
            *slot = index_of_letter(c)
                .ok_or_else(|| CommError::InvalidLetter(format!("'{}' is not a canonical letter", c)))?;
        }
        Self::new(indices)
    }

    pub fn indices(self) -> [u8; 3] {
        self.0
    }

    pub fn letters(self) -> [char; 3] {
        self.0.map(letter)
    }

    /// Rotates left by `n` positions; `rotate(1)` turns `ABC` into `BCA`.
    pub fn rotate(self, n: usize) -> Self {
        let [a, b, c] = self.0;
        match n % 3 {
            0 => self,
            1 => Self([b, c, a]),
            _ => Self([c, a, b]),
        }
    }

    /// Human readable sticker names, e.g. `UBL UBR UFR` for corners `ABC`.
    pub fn notation(self, piece_type: PieceType) -> String {
        let labels = piece_type.position_labels();
        self.0
            .iter()
            .map(|&i| labels[i as usize].to_uppercase())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn from_indices_unchecked(indices: [u8; 3]) -> Self {
        Self(indices)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&letters_of(self.0))
    }
}

impl FromStr for Pattern {
    type Err = CommError;

    fn from_str(s: &str) -> Result<Self> {
        Pattern::parse(s)
    }
}

impl TryFrom<String> for Pattern {
    type Error = CommError;

    fn try_from(s: String) -> Result<Self> {
        Pattern::parse(&s)
    }
}

impl From<Pattern> for String {
    fn from(p: Pattern) -> String {
        p.to_string()
    }
}

/// Canonical letter for a position index: 0 is 'A'.
pub fn letter(index: u8) -> char {
    (b'A' + index) as char
}

pub fn index_of_letter(c: char) -> Option<u8> {
    if c.is_ascii_uppercase() && ((c as u8 - b'A') as usize) < POSITIONS {
        Some(c as u8 - b'A')
    } else {
        None
    }
}

fn letters_of(indices: [u8; 3]) -> String {
    indices.iter().map(|&i| (b'A'.wrapping_add(i)) as char).collect()
}

/// A spreadsheet cell an algorithm was scraped from. `x` is the 0-based row
/// and `y` the 0-based column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SheetCell {
    pub workbook_id: String,
    pub sheet_name: String,
    pub x: u32,
    pub y: u32,
}

impl SheetCell {
    pub fn workbook_url(&self) -> String {
        format!("https://docs.google.com/spreadsheets/d/{}/edit", self.workbook_id)
    }

    /// A1-style reference, e.g. column 27 row 4 is `AB5`.
    pub fn cell_reference(&self) -> String {
        format!("{}{}", column_name(self.y), self.x + 1)
    }
}

/// Bijective base-26 spreadsheet column name: 0 is `A`, 26 is `AA`.
pub fn column_name(column: u32) -> String {
    let mut n = column as u64 + 1;
    let mut name = Vec::new();
    while n > 0 {
        n -= 1;
        name.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomLink {
    pub url: String,
    pub name: String,
}

/// Where a contributor's use of a variant was found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    GoogleSheets(SheetCell),
    Custom(CustomLink),
}

impl Source {
    pub fn url(&self) -> String {
        match self {
            Source::GoogleSheets(cell) => cell.workbook_url(),
            Source::Custom(link) => link.url.clone(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Source::GoogleSheets(cell) => format!("{}, {}", cell.sheet_name, cell.cell_reference()),
            Source::Custom(link) => link.name.clone(),
        }
    }
}

/// Who uses a variant, and where each of them was seen using it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub users: IndexMap<String, Vec<Source>>,
}

/// Variant text to its usage record, in document order.
pub type VariantMap = IndexMap<String, Usage>;

/// The published JSON wraps variants in `{"variants": ...}` in some revisions.
#[derive(Deserialize)]
#[serde(untagged)]
enum AlgorithmEntry {
    Wrapped(WrappedVariants),
    Bare(VariantMap),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WrappedVariants {
    variants: VariantMap,
}

impl AlgorithmEntry {
    fn into_variants(self) -> VariantMap {
        match self {
            AlgorithmEntry::Wrapped(w) => w.variants,
            AlgorithmEntry::Bare(v) => v,
        }
    }
}

/// All algorithms known for one pattern: algorithm text to its variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AlgorithmGroup(IndexMap<String, VariantMap>);

impl AlgorithmGroup {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariantMap)> {
        self.0.iter().map(|(alg, variants)| (alg.as_str(), variants))
    }

    pub fn get(&self, alg: &str) -> Option<&VariantMap> {
        self.0.get(alg)
    }
}

impl<'de> Deserialize<'de> for AlgorithmGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let entries = IndexMap::<String, AlgorithmEntry>::deserialize(deserializer)?;
        Ok(AlgorithmGroup(
            entries
                .into_iter()
                .map(|(alg, entry)| (alg, entry.into_variants()))
                .collect(),
        ))
    }
}

/// One piece type's dataset, keyed by canonical pattern. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    cases: HashMap<Pattern, AlgorithmGroup>,
}

impl Dataset {
    /// Exact key match, no fuzzy matching.
    pub fn lookup(&self, pattern: Pattern) -> Option<&AlgorithmGroup> {
        self.cases.get(&pattern)
    }

    pub fn contains(&self, pattern: Pattern) -> bool {
        self.cases.contains_key(&pattern)
    }

    /// All keys, sorted.
    pub fn patterns(&self) -> Vec<Pattern> {
        let mut keys: Vec<Pattern> = self.cases.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

impl FromIterator<(Pattern, AlgorithmGroup)> for Dataset {
    fn from_iter<I: IntoIterator<Item = (Pattern, AlgorithmGroup)>>(iter: I) -> Self {
        Dataset { cases: iter.into_iter().collect() }
    }
}

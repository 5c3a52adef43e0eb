// src/core/lettering.rs
use crate::core::types::{letter, Pattern, POSITIONS};
use crate::error::{CommError, Result};
use std::fmt;
use std::str::FromStr;

/// A bijection between the 24 canonical positions and 24 letters the user
/// finds memorable. Position `i` of the sequence is the letter for index `i`.
/// Built once from user input and replaced wholesale, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LetteringScheme {
    letters: [char; POSITIONS],
}

impl LetteringScheme {
    /// Validates a scheme string: exactly 24 uppercase `A`-`Z` letters, no
    /// letter twice.
    pub fn new(scheme: &str) -> Result<Self> {
        let chars: Vec<char> = scheme.chars().collect();
        if chars.len() != POSITIONS {
            return Err(CommError::InvalidLetter(format!(
                "lettering must have {} letters, got {}",
                POSITIONS,
                chars.len()
            )));
        }
        let mut letters = ['A'; POSITIONS];
        for (i, &c) in chars.iter().enumerate() {
            if !c.is_ascii_uppercase() {
                return Err(CommError::InvalidLetter(format!("'{}' is not an uppercase letter", c)));
            }
            if letters[..i].contains(&c) {
                return Err(CommError::InvalidLetter(format!("'{}' appears more than once", c)));
            }
            letters[i] = c;
        }
        Ok(Self { letters })
    }

    /// The Speffz-style identity lettering the dataset is indexed by.
    pub fn canonical() -> Self {
        let mut letters = ['A'; POSITIONS];
        for (i, slot) in letters.iter_mut().enumerate() {
            *slot = letter(i as u8);
        }
        Self { letters }
    }

    pub fn is_canonical(&self) -> bool {
        *self == Self::canonical()
    }

    /// User letter for a canonical position index.
    pub fn letter_for(&self, index: u8) -> Option<char> {
        self.letters.get(index as usize).copied()
    }

    /// Canonical position index of a user letter.
    pub fn index_of(&self, c: char) -> Option<u8> {
        self.letters.iter().position(|&l| l == c).map(|i| i as u8)
    }

    /// Maps three user letters to the canonical pattern they name.
    pub fn translate_to_canonical(&self, custom: &str) -> Result<Pattern> {
        let chars: Vec<char> = custom.chars().collect();
        if chars.len() != 3 {
            return Err(CommError::invalid_query(custom));
        }
        let mut indices = [0u8; 3];
        for (slot, &c) in indices.iter_mut().zip(&chars) {
            *slot = self.index_of(c).ok_or_else(|| {
                CommError::InvalidLetter(format!("'{}' is not in the lettering {}", c, self))
            })?;
        }
        Pattern::new(indices)
    }

    /// Spells a canonical pattern in the user's letters.
    pub fn translate_to_custom(&self, pattern: Pattern) -> String {
        pattern.indices().iter().map(|&i| self.letters[i as usize]).collect()
    }
}

impl Default for LetteringScheme {
    fn default() -> Self {
        Self::canonical()
    }
}

impl fmt::Display for LetteringScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.letters.iter().try_for_each(|c| write!(f, "{}", c))
    }
}

impl FromStr for LetteringScheme {
    type Err = CommError;

    fn from_str(s: &str) -> Result<Self> {
        LetteringScheme::new(s)
    }
}

/// Translation with an optional scheme: no scheme means the letters already
/// are canonical.
pub fn to_canonical(scheme: Option<&LetteringScheme>, custom: &str) -> Result<Pattern> {
    match scheme {
        Some(scheme) => scheme.translate_to_canonical(custom),
        None => Pattern::parse(custom),
    }
}

pub fn to_custom(scheme: Option<&LetteringScheme>, pattern: Pattern) -> String {
    match scheme {
        Some(scheme) => scheme.translate_to_custom(pattern),
        None => pattern.to_string(),
    }
}

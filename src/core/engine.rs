// src/core/engine.rs
use crate::core::canonical::{canonicalize, invert};
use crate::core::lettering::{to_canonical, LetteringScheme};
use crate::core::ranking::{rank, RankedAlgorithm};
use crate::core::types::{Pattern, PieceType};
use crate::error::{CommError, Result};
use crate::repository::DatasetRepository;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Both sides of a successful lookup. At least one of `direct` and `inverse`
/// is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupResult {
    pub piece_type: PieceType,
    /// Canonical pattern the query reduced to.
    pub queried: Pattern,
    /// The reverse cycle of `queried`.
    pub inverse_queried: Pattern,
    /// What the user typed, upper-cased.
    pub label: String,
    /// `label` with its last two letters swapped.
    pub inverse_label: String,
    pub direct: Option<Vec<RankedAlgorithm>>,
    pub inverse: Option<Vec<RankedAlgorithm>>,
}

impl LookupResult {
    pub fn found(&self) -> bool {
        self.direct.is_some()
    }

    pub fn inverse_found(&self) -> bool {
        self.inverse.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LookupOutcome {
    Found(LookupResult),
    /// Neither the pattern nor its inverse is in the dataset.
    NotFound { queried: Pattern, inverse_queried: Pattern },
}

impl LookupOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found(_))
    }

    pub fn result(&self) -> Option<&LookupResult> {
        match self {
            LookupOutcome::Found(result) => Some(result),
            LookupOutcome::NotFound { .. } => None,
        }
    }
}

/// Upper-cases a raw query and checks it is exactly three letters.
pub fn normalize_query(raw: &str) -> Result<String> {
    let upper = raw.to_uppercase();
    if upper.chars().count() == 3 && upper.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(upper)
    } else {
        Err(CommError::invalid_query(raw))
    }
}

/// Turns a user's three-letter search into ranked commutators.
///
/// The dataset is keyed by the rotation whose first position is smallest.
/// The inverse side is looked up under the canonical form of the swapped
/// pattern, which for a canonical query is the swap itself.
pub struct CommutatorLookup {
    repository: Arc<DatasetRepository>,
}

impl CommutatorLookup {
    pub fn new(repository: Arc<DatasetRepository>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &DatasetRepository {
        &self.repository
    }

    pub async fn query(
        &self,
        piece_type: PieceType,
        raw_query: &str,
        lettering: Option<&LetteringScheme>,
    ) -> Result<LookupOutcome> {
        // 1. Validate
        let label = normalize_query(raw_query)?;

        // 2. Translate the user's letters, then 3. canonicalize
        let queried = canonicalize(to_canonical(lettering, &label)?);
        let inverse_queried = canonicalize(invert(queried));

        // 4. Load (suspends on the first fetch for this piece type)
        let dataset = self.repository.load(piece_type).await?;

        // 5. Look up both directions
        let direct = dataset.lookup(queried).map(rank);
        let inverse = dataset.lookup(inverse_queried).map(rank);
        debug!(
            %piece_type,
            query = %label,
            %queried,
            direct = direct.is_some(),
            inverse = inverse.is_some(),
            "lookup"
        );

        // 6. Not found only when both sides are missing
        if direct.is_none() && inverse.is_none() {
            return Ok(LookupOutcome::NotFound { queried, inverse_queried });
        }

        let inverse_label = swap_last_two(&label);
        Ok(LookupOutcome::Found(LookupResult {
            piece_type,
            queried,
            inverse_queried,
            label,
            inverse_label,
            direct,
            inverse,
        }))
    }

    /// Every pattern the dataset has algorithms for, sorted.
    pub async fn cases(&self, piece_type: PieceType) -> Result<Vec<Pattern>> {
        Ok(self.repository.load(piece_type).await?.patterns())
    }
}

fn swap_last_two(label: &str) -> String {
    let mut chars: Vec<char> = label.chars().collect();
    chars.swap(1, 2);
    chars.into_iter().collect()
}

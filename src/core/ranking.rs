// src/core/ranking.rs
use crate::core::types::{AlgorithmGroup, Source};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashSet;

/// A contributor using a variant, with every place they were seen using it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contributor {
    pub name: String,
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedVariant {
    pub variant: String,
    pub users: Vec<Contributor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RankedVariant {
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedAlgorithm {
    pub alg: String,
    /// Distinct contributors across all variants. Someone using two variants
    /// of the same algorithm counts once.
    pub user_count: usize,
    pub variants: Vec<RankedVariant>,
}

impl RankedAlgorithm {
    /// Distinct sources cited across all variants.
    pub fn source_count(&self) -> usize {
        self.variants
            .iter()
            .flat_map(|v| v.users.iter())
            .flat_map(|u| u.sources.iter())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Orders a pattern's algorithms by popularity.
///
/// Algorithms sort by descending distinct-contributor count, ties by algorithm
/// text. Variants sort by descending contributor count; the sort is stable so
/// exact ties keep dataset order. Never touches the input.
pub fn rank(group: &AlgorithmGroup) -> Vec<RankedAlgorithm> {
    let mut ranked: Vec<RankedAlgorithm> = group
        .iter()
        .map(|(alg, variants)| {
            let user_count = variants
                .values()
                .flat_map(|usage| usage.users.keys())
                .collect::<HashSet<_>>()
                .len();

            let mut variants: Vec<RankedVariant> = variants
                .iter()
                .map(|(variant, usage)| RankedVariant {
                    variant: variant.to_string(),
                    users: usage
                        .users
                        .iter()
                        .map(|(name, sources)| Contributor {
                            name: name.to_string(),
                            sources: sources.clone(),
                        })
                        .collect(),
                    notes: usage.notes.clone(),
                })
                .collect();
            variants.sort_by_key(|v| Reverse(v.user_count()));

            RankedAlgorithm {
                alg: alg.to_string(),
                user_count,
                variants,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.user_count
            .cmp(&a.user_count)
            .then_with(|| a.alg.cmp(&b.alg))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(json: &str) -> AlgorithmGroup {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_user_count_is_union_not_sum() {
        let g = group(
            r#"{
                "[R, U]": {
                    "solo": {"users": {"carol": []}},
                    "shared": {"users": {"alice": [], "carol": []}}
                }
            }"#,
        );
        let ranked = rank(&g);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].user_count, 2);
        assert_eq!(ranked[0].variants[0].variant, "shared");
        assert_eq!(ranked[0].variants[0].user_count(), 2);
        assert_eq!(ranked[0].variants[1].variant, "solo");
    }

    #[test]
    fn test_algorithms_order_by_count_then_text() {
        let g = group(
            r#"{
                "zeta": {"v": {"users": {"a": []}}},
                "beta": {"v": {"users": {"a": [], "b": []}}},
                "alpha": {"v": {"users": {"c": []}}}
            }"#,
        );
        let algs: Vec<String> = rank(&g).into_iter().map(|a| a.alg).collect();
        assert_eq!(algs, vec!["beta", "alpha", "zeta"]);
    }

    #[test]
    fn test_variant_ties_keep_dataset_order() {
        let g = group(
            r#"{
                "[R, U]": {
                    "second": {"users": {"a": []}},
                    "first": {"users": {"b": []}},
                    "popular": {"users": {"c": [], "d": []}}
                }
            }"#,
        );
        let variants: Vec<String> = rank(&g)[0].variants.iter().map(|v| v.variant.clone()).collect();
        assert_eq!(variants, vec!["popular", "second", "first"]);
    }

    #[test]
    fn test_rank_is_deterministic_and_keeps_notes() {
        let g = group(
            r#"{
                "[R, U]": {"R U R' U'": {"notes": "sexy move", "users": {
                    "alice": [{"custom": {"url": "https://example.org", "name": "site"}}],
                    "bob": [{"custom": {"url": "https://example.org", "name": "site"}},
                            {"google_sheets": {"workbook_id": "w", "sheet_name": "s", "x": 0, "y": 0}}]
                }}},
                "[U, R]": {"U R U' R'": {"users": {"carol": []}}}
            }"#,
        );
        let first = rank(&g);
        assert_eq!(first, rank(&g));
        assert_eq!(first[0].variants[0].notes.as_deref(), Some("sexy move"));
        assert_eq!(first[0].source_count(), 2);
        assert_eq!(first[0].variants[0].users[1].sources.len(), 2);
    }
}

use comm_core::core::canonical::canonicalize;
use comm_core::core::ranking::rank;
use comm_core::core::types::Dataset;
use comm_core::repository::{DirectorySource, MemorySource};
use comm_core::{
    CommError, CommutatorLookup, DatasetRepository, LetteringScheme, LookupOutcome, Pattern,
    PieceType,
};
use std::sync::Arc;

// Lettering where X, Y and Z name the first three corner stickers.
const XYZ_FIRST: &str = "XYZABCDEFGHIJKLMNOPQRSTU";

const CORNERS: &str = r#"{
    "ABC": {
        "[R U R', D]": {
            "R U R' D R U' R' D'": {"users": {
                "alice": [{"google_sheets": {"workbook_id": "wb1", "sheet_name": "UFR", "x": 2, "y": 1}}],
                "bob": [{"custom": {"url": "https://example.org/bob", "name": "Bob's list"}}]
            }},
            "R U R' D R U' R' D' (alt)": {"users": {"alice": []}}
        },
        "[D, R U R']": {
            "D R U R' D' R U' R'": {"notes": "regrip", "users": {"carol": []}}
        }
    },
    "ADE": {
        "[U, R D R']": {"variants": {"U R D R' U' R D' R'": {"users": {"dave": []}}}}
    }
}"#;

fn engine_over_directory() -> (tempfile::TempDir, CommutatorLookup) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Corner3Cycle.json"), CORNERS).unwrap();
    let repo = DatasetRepository::new(Arc::new(DirectorySource::new(dir.path())));
    (dir, CommutatorLookup::new(Arc::new(repo)))
}

#[tokio::test]
async fn cab_is_found_under_abc() {
    let (_dir, engine) = engine_over_directory();
    let outcome = engine.query(PieceType::Corner, "CAB", None).await.unwrap();
    let result = outcome.result().expect("CAB should be found");
    assert_eq!(result.queried.to_string(), "ABC");
    assert!(result.found());
    assert!(!result.inverse_found());

    let algs = result.direct.as_ref().unwrap();
    assert_eq!(algs[0].alg, "[R U R', D]");
    assert_eq!(algs[0].user_count, 2);
    assert_eq!(algs[0].variants[0].variant, "R U R' D R U' R' D'");
    assert_eq!(algs[1].alg, "[D, R U R']");
    assert_eq!(algs[1].variants[0].notes.as_deref(), Some("regrip"));
}

#[tokio::test]
async fn rotation_of_query_is_found_directly() {
    // ZXY is a rotation of XYZ, so both land on the same canonical key.
    let (_dir, engine) = engine_over_directory();
    let scheme = LetteringScheme::new(XYZ_FIRST).unwrap();
    for query in ["XYZ", "ZXY", "yzx"] {
        let outcome = engine.query(PieceType::Corner, query, Some(&scheme)).await.unwrap();
        let result = outcome.result().unwrap();
        assert_eq!(result.queried.to_string(), "ABC", "query {}", query);
        assert!(result.found());
    }
}

#[tokio::test]
async fn swapped_query_is_found_through_inverse() {
    // XZY is the reverse cycle of XYZ: only the inverse side exists.
    let (_dir, engine) = engine_over_directory();
    let scheme = LetteringScheme::new(XYZ_FIRST).unwrap();
    let outcome = engine.query(PieceType::Corner, "XZY", Some(&scheme)).await.unwrap();
    let result = outcome.result().unwrap();
    assert_eq!(result.queried.to_string(), "ACB");
    assert_eq!(result.inverse_queried.to_string(), "ABC");
    assert!(!result.found());
    assert!(result.inverse_found());
    assert_eq!(result.inverse_label, "XYZ");
}

#[tokio::test]
async fn wrapped_variants_are_understood() {
    let (_dir, engine) = engine_over_directory();
    let outcome = engine.query(PieceType::Corner, "eda", None).await.unwrap();
    let result = outcome.result().unwrap();
    assert_eq!(result.queried.to_string(), "AED");
    assert_eq!(result.inverse.as_ref().unwrap()[0].alg, "[U, R D R']");
}

#[tokio::test]
async fn unknown_case_is_not_found() {
    let (_dir, engine) = engine_over_directory();
    let outcome = engine.query(PieceType::Corner, "KLM", None).await.unwrap();
    assert!(matches!(outcome, LookupOutcome::NotFound { .. }));
}

#[tokio::test]
async fn short_query_is_invalid_search() {
    let (_dir, engine) = engine_over_directory();
    let err = engine.query(PieceType::Corner, "ab", None).await.unwrap_err();
    assert!(matches!(err, CommError::InvalidQuery { .. }));
    assert_eq!(err.to_string(), "invalid search");
}

#[test]
fn repeated_letter_in_scheme_is_rejected() {
    let err = LetteringScheme::new("AACDEFGHIJKLMNOPQRSTUVWX").unwrap_err();
    assert!(matches!(err, CommError::InvalidLetter(_)));
}

#[tokio::test]
async fn failed_load_recovers_once_data_appears() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Arc::new(DatasetRepository::new(Arc::new(DirectorySource::new(dir.path()))));
    let engine = CommutatorLookup::new(repo.clone());

    let err = engine.query(PieceType::Corner, "ABC", None).await.unwrap_err();
    assert!(matches!(err, CommError::DatasetUnavailable { .. }));

    std::fs::write(dir.path().join("Corner3Cycle.json"), CORNERS).unwrap();
    let outcome = engine.query(PieceType::Corner, "ABC", None).await.unwrap();
    assert!(outcome.is_found());
    assert!(repo.is_cached(PieceType::Corner).await);
}

#[tokio::test]
async fn piece_types_use_separate_documents() {
    let source = MemorySource::new()
        .with_document(PieceType::Corner, CORNERS)
        .with_document(PieceType::Edge, r#"{"BCD": {"M2": {"M2": {"users": {"eve": []}}}}}"#);
    let engine = CommutatorLookup::new(Arc::new(DatasetRepository::new(Arc::new(source))));

    assert!(engine.query(PieceType::Edge, "CDB", None).await.unwrap().is_found());
    assert!(!engine.query(PieceType::Edge, "ABC", None).await.unwrap().is_found());
    assert!(engine.query(PieceType::Corner, "ABC", None).await.unwrap().is_found());
}

#[test]
fn every_dataset_key_is_canonical_and_rank_keeps_contributors() {
    let dataset: Dataset = serde_json::from_str(CORNERS).unwrap();
    for pattern in dataset.patterns() {
        assert_eq!(canonicalize(pattern), pattern);
        let group = dataset.lookup(pattern).unwrap();
        let ranked = rank(group);
        for alg in &ranked {
            let mut names: Vec<&str> = alg
                .variants
                .iter()
                .flat_map(|v| v.users.iter().map(|u| u.name.as_str()))
                .collect();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), alg.user_count);
        }
    }
    assert_eq!(Pattern::parse("ADE").unwrap().notation(PieceType::Corner), "UBL UFL LUB");
}

#[tokio::test]
async fn json_output_is_tagged() {
    let (_dir, engine) = engine_over_directory();
    let outcome = engine.query(PieceType::Corner, "ABC", None).await.unwrap();
    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value["outcome"], "found");
    assert_eq!(value["queried"], "ABC");
    assert_eq!(value["piece_type"], "Corner");

    let missing = engine.query(PieceType::Corner, "KLM", None).await.unwrap();
    let value = serde_json::to_value(&missing).unwrap();
    assert_eq!(value["outcome"], "not_found");
}

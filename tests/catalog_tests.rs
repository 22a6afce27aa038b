use cardforge::api::{recommend, Session};
use cardforge::catalog::{BaselineState, CardCatalog, RawCard};
use cardforge::config::Config;
use cardforge::consts::DEFAULT_BASELINE;
use cardforge::error::CardForgeError;
use cardforge::snapshot::{FileStateSource, GameSnapshot, StateSource};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_empty_catalog_is_config_error() {
    let res = CardCatalog::from_records(Vec::<Vec<i64>>::new(), 8);
    assert!(matches!(res, Err(CardForgeError::Config(_))));
}

#[test]
fn test_empty_catalog_fails_before_search() {
    let res = recommend(Vec::<Vec<i64>>::new(), &[0; 8], Config::default(), Some(1));
    assert!(matches!(res, Err(CardForgeError::Config(_))));
}

#[test]
fn test_zero_dimensions_is_config_error() {
    assert!(matches!(
        CardCatalog::from_records(vec![vec![1]], 0),
        Err(CardForgeError::Config(_))
    ));
    assert!(matches!(
        BaselineState::from_raw(&[1], 0),
        Err(CardForgeError::Config(_))
    ));
}

#[test]
fn test_short_records_are_zero_padded() {
    let catalog = CardCatalog::from_records(vec![vec![1, 2], vec![], vec![3; 8]], 8).unwrap();
    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.card(0).delta.as_slice(), &[1, 2, 0, 0, 0, 0, 0, 0]);
    assert_eq!(catalog.card(1).delta.as_slice(), &[0; 8]);
    assert_eq!(catalog.card(2).delta.as_slice(), &[3; 8]);
}

#[test]
fn test_ids_are_positions_and_source_ids_are_kept() {
    let records = vec![
        RawCard {
            source_id: Some(900),
            attributes: vec![1],
        },
        RawCard {
            source_id: None,
            attributes: vec![2],
        },
    ];
    let catalog = CardCatalog::from_records(records, 4).unwrap();
    assert_eq!(catalog.card(0).id, 0);
    assert_eq!(catalog.card(0).source_id, Some(900));
    assert_eq!(catalog.card(1).id, 1);
    assert_eq!(catalog.card(1).source_id, None);
}

#[test]
fn test_snapshot_without_local_uses_default_baseline() {
    let json = r#"{ "cards": [ { "attributes": [1, 1] } ] }"#;
    let snap = GameSnapshot::from_reader(json.as_bytes()).unwrap();
    let (catalog, baseline) = snap.into_inputs(8).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(baseline.state().as_slice(), &DEFAULT_BASELINE);
}

#[test]
fn test_snapshot_local_is_padded() {
    let json = r#"{ "cards": [ { "id": 5, "attributes": [1] } ], "local": [7, 7] }"#;
    let snap = GameSnapshot::from_reader(json.as_bytes()).unwrap();
    let (_, baseline) = snap.into_inputs(8).unwrap();
    assert_eq!(baseline.state().as_slice(), &[7, 7, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_file_source_reads_json() {
    let mut file = NamedTempFile::with_suffix(".json").unwrap();
    writeln!(
        file,
        r#"{{ "local": [30, 30, 0, 0, 2, 0, 0, 0], "cards": [ {{ "id": 1, "attributes": [1, 1] }} ] }}"#
    )
    .unwrap();

    let source = FileStateSource::new(file.path());
    let session = Session::from_source(&source, Config::default()).unwrap();
    assert_eq!(session.catalog().len(), 1);
    assert_eq!(session.baseline().state()[0], 30);
}

#[test]
fn test_file_source_reads_csv_with_baseline_override() {
    let mut file = NamedTempFile::with_suffix(".csv").unwrap();
    writeln!(file, "a0,a1,a2").unwrap();
    writeln!(file, "1,1,0").unwrap();
    writeln!(file, "-2,0,3").unwrap();

    let source = FileStateSource::new(file.path()).with_baseline(Some(vec![5, 5]));
    let snapshot = source.fetch().unwrap();
    assert_eq!(snapshot.cards.len(), 2);
    assert_eq!(snapshot.local, Some(vec![5, 5]));

    let (catalog, baseline) = snapshot.into_inputs(8).unwrap();
    assert_eq!(catalog.card(1).delta.as_slice(), &[-2, 0, 3, 0, 0, 0, 0, 0]);
    assert_eq!(baseline.state().as_slice(), &[5, 5, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_missing_snapshot_is_io_error() {
    let source = FileStateSource::new("definitely/not/here.json");
    assert!(matches!(source.fetch(), Err(CardForgeError::Io(_))));
}

#[test]
fn test_malformed_snapshot_is_json_error() {
    let mut file = NamedTempFile::with_suffix(".json").unwrap();
    writeln!(file, "{{ not json").unwrap();
    let source = FileStateSource::new(file.path());
    assert!(matches!(source.fetch(), Err(CardForgeError::Json(_))));
}

#[test]
fn test_session_rejects_dimension_mismatch() {
    let catalog = CardCatalog::from_records(vec![vec![1, 1]], 4).unwrap();
    let baseline = BaselineState::from_raw(&[0; 4], 4).unwrap();
    // Default config expects 8 dims.
    assert!(matches!(
        Session::new(catalog, baseline, Config::default()),
        Err(CardForgeError::Config(_))
    ));
}

//! Per-row error isolation: routed error records vs. fatal promotion.

use filerow::vfs::LocalFileSystem;
use filerow::{
    EnrichmentFields, FieldSpec, FilerowError, FileRowStage, PlainTextExtractor, Produced,
    StageConfig, Value, ValueType,
};
use std::fs;
use tempfile::{TempDir, tempdir};

fn write_files(contents: &[&str]) -> (TempDir, Vec<String>) {
    let dir = tempdir().unwrap();
    let mut files = Vec::new();
    for (i, content) in contents.iter().enumerate() {
        let path = dir.path().join(format!("file{i}.txt"));
        fs::write(&path, content).unwrap();
        files.push(path.to_str().unwrap().to_string());
    }
    (dir, files)
}

fn integer_field_config(route_errors: bool) -> StageConfig {
    StageConfig {
        fields: vec![FieldSpec::content("n").with_target_type(ValueType::Integer)],
        enrichment: EnrichmentFields {
            filename: Some("file_name".to_string()),
            ..Default::default()
        },
        route_errors,
        ..Default::default()
    }
}

fn stage(files: Vec<String>, config: StageConfig) -> FileRowStage {
    FileRowStage::from_files(
        files,
        Box::new(LocalFileSystem::new()),
        Box::new(PlainTextExtractor::new()),
        config,
    )
    .unwrap()
}

#[test]
fn conversion_failure_routes_one_error_record_and_continues() {
    let (_dir, files) = write_files(&["1", "not a number", "3"]);
    let mut stage = stage(files, integer_field_config(true));

    let (rows, errors) = stage.run_to_end().unwrap();

    // Main channel only carries the good rows.
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], Value::Integer(1));
    assert_eq!(rows[1][0], Value::Integer(3));

    assert_eq!(errors.len(), 1);
    let record = &errors[0];
    assert!(record.row.is_empty());
    assert!(record.error_message.starts_with("Error encountered :"));
    assert_eq!(record.field_name, "file_name");
    assert_eq!(record.error_code, "001");

    let stats = stage.stats();
    assert_eq!(stats.files_opened, 3);
    assert_eq!(stats.rows_emitted, 2);
    assert_eq!(stats.errors_routed, 1);
}

#[test]
fn routing_disabled_promotes_to_fatal() {
    let (_dir, files) = write_files(&["1", "not a number", "3"]);
    let mut stage = stage(files, integer_field_config(false));

    assert!(matches!(stage.produce_one().unwrap(), Produced::Row(_)));
    let err = stage.produce_one().unwrap_err();
    assert!(matches!(err, FilerowError::Conversion { .. }));
    // The run is over; the third file is never processed.
    assert_eq!(stage.produce_one().unwrap(), Produced::EndOfStream);
    assert_eq!(stage.stats().rows_emitted, 1);
}

#[test]
fn routed_rows_do_not_feed_null_carry_forward() {
    let (_dir, files) = write_files(&["7", "bad", ""]);
    let mut config = integer_field_config(true);
    config.fields = vec![FieldSpec::content("n")
        .with_target_type(ValueType::Integer)
        .repeated()];
    let mut stage = stage(files, config);

    let (rows, errors) = stage.run_to_end().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(rows.len(), 2);
    // The carried-forward value comes from the last successful row, not
    // from the routed one.
    assert_eq!(rows[1][0], Value::Integer(7));
}

#[test]
fn routed_rows_do_not_count_toward_the_row_limit() {
    let (_dir, files) = write_files(&["bad", "1", "2"]);
    let mut config = integer_field_config(true);
    config.row_limit = Some(2);
    let mut stage = stage(files, config);

    let (rows, errors) = stage.run_to_end().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(rows.len(), 2);
}

#[test]
fn error_record_field_name_is_empty_when_unconfigured() {
    let (_dir, files) = write_files(&["bad"]);
    let mut config = integer_field_config(true);
    config.enrichment = EnrichmentFields::default();
    let mut stage = stage(files, config);

    let (_, errors) = stage.run_to_end().unwrap();
    assert_eq!(errors[0].field_name, "");
}

#[test]
fn row_numbers_skip_routed_records() {
    let (_dir, files) = write_files(&["1", "bad", "3"]);
    let mut config = integer_field_config(true);
    config.enrichment.row_number = Some("rownr".to_string());
    let mut stage = stage(files, config);

    let (rows, _) = stage.run_to_end().unwrap();
    // Layout: n, file_name, rownr (canonical order puts filename first).
    assert_eq!(rows[0][2], Value::Integer(1));
    assert_eq!(rows[1][2], Value::Integer(2));
}

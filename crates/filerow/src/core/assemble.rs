//! Row assembly: one open file in, one output record out.

use super::config::{FieldSource, FieldSpec};
use super::cursor::OpenFile;
use super::layout::{EnrichmentKind, RowLayout};
use crate::Result;
use crate::types::{Row, Value};

/// Build one output row for the currently open file.
///
/// Pure: the same inputs always produce the same row, and `open` is never
/// mutated. The caller threads `previous` (the last successfully assembled
/// row) back in to satisfy null-carry-forward for repeated fields, and
/// snapshots the returned row as the next `previous`.
///
/// Content fields share one content view: each field's trim is applied to
/// the view before the value is read, so a later content field observes the
/// trims of every earlier one. This mirrors the semantics of a single cached
/// extraction result being trimmed in place, without the mutation.
pub fn build_row(
    layout: &RowLayout,
    fields: &[FieldSpec],
    open: &OpenFile,
    row_number: i64,
    previous: Option<&Row>,
) -> Result<Row> {
    let mut row = vec![Value::Null; layout.column_count()];

    if let Some(passthrough) = &open.passthrough {
        for (slot, value) in row[..layout.passthrough_width()].iter_mut().zip(passthrough) {
            *slot = value.clone();
        }
    }

    let mut content: &str = &open.extraction.text;
    for (i, field) in fields.iter().enumerate() {
        let index = layout.field_offset() + i;
        let mut value = match field.source {
            FieldSource::Content => {
                content = field.trim.apply(content);
                field.target_type.convert(Some(content))?
            }
            FieldSource::Size => {
                let size = open.info.size.to_string();
                field.target_type.convert(Some(&size))?
            }
        };

        if field.repeat && value.is_null() {
            if let Some(previous) = previous {
                value = previous.get(index).cloned().unwrap_or(Value::Null);
            }
        }
        row[index] = value;
    }

    let mut index = layout.enrichment_offset();
    for (kind, _) in layout.active_enrichments() {
        row[index] = enrichment_value(*kind, open, row_number)?;
        index += 1;
    }

    Ok(row)
}

fn enrichment_value(kind: EnrichmentKind, open: &OpenFile, row_number: i64) -> Result<Value> {
    Ok(match kind {
        EnrichmentKind::Filename => Value::String(open.info.path.clone()),
        EnrichmentKind::RowNumber => Value::Integer(row_number),
        EnrichmentKind::ShortFilename => Value::String(open.info.base_name.clone()),
        EnrichmentKind::Extension => Value::String(open.info.extension.clone()),
        EnrichmentKind::Path => Value::String(open.info.parent_path.clone()),
        EnrichmentKind::Hidden => Value::Boolean(open.info.hidden),
        EnrichmentKind::LastModified => {
            open.info.modified.map(Value::Date).unwrap_or(Value::Null)
        }
        EnrichmentKind::Uri => Value::String(open.info.uri.clone()),
        EnrichmentKind::RootUri => Value::String(open.info.root_uri.clone()),
        EnrichmentKind::MetadataJson => {
            Value::String(serde_json::to_string(&open.extraction.metadata)?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{EnrichmentFields, StageConfig, TrimType};
    use crate::extract::Extraction;
    use crate::types::{Column, Schema, ValueType};
    use crate::vfs::{FileHandle, FileInfo};
    use chrono::{TimeZone, Utc};
    use indexmap::IndexMap;

    struct FakeHandle;

    impl FileHandle for FakeHandle {
        fn location(&self) -> &str {
            "/tmp/report.txt"
        }

        fn info(&self) -> crate::Result<FileInfo> {
            Ok(fake_info())
        }

        fn reader(&mut self) -> crate::Result<Box<dyn std::io::Read + '_>> {
            Ok(Box::new(std::io::empty()))
        }
    }

    fn fake_info() -> FileInfo {
        FileInfo {
            size: 10,
            hidden: false,
            modified: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
            base_name: "report.txt".into(),
            extension: "txt".into(),
            parent_path: "/tmp".into(),
            path: "/tmp/report.txt".into(),
            uri: "file:///tmp/report.txt".into(),
            root_uri: "file:///".into(),
        }
    }

    fn open_file(text: &str, passthrough: Option<Row>) -> OpenFile {
        let mut metadata = IndexMap::new();
        metadata.insert("content-type".to_string(), "text/plain".to_string());
        OpenFile {
            handle: Box::new(FakeHandle),
            location: "/tmp/report.txt".into(),
            info: fake_info(),
            extraction: Extraction {
                text: text.to_string(),
                metadata,
            },
            passthrough,
            sequence: 1,
        }
    }

    #[test]
    fn test_shared_trim_coupling_between_content_fields() {
        // The second content field has no trim of its own but still sees
        // the first field's trim of the shared content view.
        let config = StageConfig {
            fields: vec![
                FieldSpec::content("trimmed").with_trim(TrimType::Both),
                FieldSpec::content("untrimmed"),
            ],
            ..Default::default()
        };
        let layout = RowLayout::new(&config, None);
        let open = open_file("  hi  ", None);

        let row = build_row(&layout, &config.fields, &open, 1, None).unwrap();
        assert_eq!(row[0], Value::String("hi".into()));
        assert_eq!(row[1], Value::String("hi".into()));
        // The extraction result itself stays untouched.
        assert_eq!(open.extraction.text, "  hi  ");
    }

    #[test]
    fn test_trim_order_left_then_right() {
        let config = StageConfig {
            fields: vec![
                FieldSpec::content("left").with_trim(TrimType::Left),
                FieldSpec::content("right").with_trim(TrimType::Right),
            ],
            ..Default::default()
        };
        let layout = RowLayout::new(&config, None);
        let open = open_file("  hi  ", None);

        let row = build_row(&layout, &config.fields, &open, 1, None).unwrap();
        assert_eq!(row[0], Value::String("hi  ".into()));
        assert_eq!(row[1], Value::String("hi".into()));
    }

    #[test]
    fn test_size_field_converts_decimal_byte_size() {
        let config = StageConfig {
            fields: vec![FieldSpec::size("bytes")],
            ..Default::default()
        };
        let layout = RowLayout::new(&config, None);
        let open = open_file("irrelevant", None);

        let row = build_row(&layout, &config.fields, &open, 1, None).unwrap();
        assert_eq!(row[0], Value::Integer(10));
    }

    #[test]
    fn test_repeat_carries_previous_value_forward() {
        let config = StageConfig {
            fields: vec![FieldSpec::content("n")
                .with_target_type(ValueType::Integer)
                .repeated()],
            ..Default::default()
        };
        let layout = RowLayout::new(&config, None);

        // Empty content converts to Null for an Integer target.
        let open = open_file("", None);
        let previous = vec![Value::Integer(42)];
        let row = build_row(&layout, &config.fields, &open, 2, Some(&previous)).unwrap();
        assert_eq!(row[0], Value::Integer(42));
    }

    #[test]
    fn test_repeat_without_previous_row_stays_null() {
        let config = StageConfig {
            fields: vec![FieldSpec::content("n")
                .with_target_type(ValueType::Integer)
                .repeated()],
            ..Default::default()
        };
        let layout = RowLayout::new(&config, None);
        let open = open_file("", None);

        let row = build_row(&layout, &config.fields, &open, 1, None).unwrap();
        assert_eq!(row[0], Value::Null);
    }

    #[test]
    fn test_non_repeated_field_ignores_previous_row() {
        let config = StageConfig {
            fields: vec![FieldSpec::content("n").with_target_type(ValueType::Integer)],
            ..Default::default()
        };
        let layout = RowLayout::new(&config, None);
        let open = open_file("", None);

        let previous = vec![Value::Integer(42)];
        let row = build_row(&layout, &config.fields, &open, 2, Some(&previous)).unwrap();
        assert_eq!(row[0], Value::Null);
    }

    #[test]
    fn test_passthrough_copied_verbatim_into_leading_slots() {
        let upstream = Schema::new(vec![
            Column::new("path", ValueType::String),
            Column::new("batch", ValueType::Integer),
        ]);
        let config = StageConfig {
            fields: vec![FieldSpec::content("content")],
            ..Default::default()
        };
        let layout = RowLayout::new(&config, Some(&upstream));
        let open = open_file(
            "body",
            Some(vec![
                Value::String("file:///tmp/a.txt".into()),
                Value::Integer(7),
            ]),
        );

        let row = build_row(&layout, &config.fields, &open, 1, None).unwrap();
        assert_eq!(row[0], Value::String("file:///tmp/a.txt".into()));
        assert_eq!(row[1], Value::Integer(7));
        assert_eq!(row[2], Value::String("body".into()));
    }

    #[test]
    fn test_enrichment_values_in_canonical_order() {
        let config = StageConfig {
            enrichment: EnrichmentFields {
                filename: Some("filename".into()),
                row_number: Some("rownr".into()),
                hidden: Some("hidden".into()),
                last_modified: Some("modified".into()),
                metadata: Some("meta".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let layout = RowLayout::new(&config, None);
        let open = open_file("body", None);

        let row = build_row(&layout, &config.fields, &open, 3, None).unwrap();
        assert_eq!(row[0], Value::String("/tmp/report.txt".into()));
        assert_eq!(row[1], Value::Integer(3));
        assert_eq!(row[2], Value::Boolean(false));
        assert!(matches!(row[3], Value::Date(_)));
        let Value::String(meta) = &row[4] else {
            panic!("expected metadata JSON string");
        };
        assert_eq!(meta, r#"{"content-type":"text/plain"}"#);
    }

    #[test]
    fn test_conversion_failure_is_recoverable_error() {
        let config = StageConfig {
            fields: vec![FieldSpec::content("n").with_target_type(ValueType::Integer)],
            ..Default::default()
        };
        let layout = RowLayout::new(&config, None);
        let open = open_file("not a number", None);

        let err = build_row(&layout, &config.fields, &open, 1, None).unwrap_err();
        assert!(err.is_recoverable());
    }
}

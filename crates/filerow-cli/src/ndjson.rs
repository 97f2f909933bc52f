//! NDJSON upstream adapter: drive streamed mode from newline-delimited JSON
//! records.

use anyhow::Context;
use filerow::{Column, RecordStream, Row, Schema, Value, ValueType};
use std::io::BufRead;

/// A [`RecordStream`] over newline-delimited JSON objects.
///
/// The schema is fixed by the first record: its keys, sorted alphabetically
/// for a deterministic column order, with types inferred from the JSON
/// values. Later records are projected onto that schema; keys the first
/// record did not have are ignored, missing keys read as null.
pub struct NdjsonStream<R: BufRead> {
    reader: R,
    schema: Schema,
    buffered_first: Option<Row>,
}

impl<R: BufRead> NdjsonStream<R> {
    pub fn new(mut reader: R) -> anyhow::Result<Self> {
        let mut first_line = String::new();
        loop {
            first_line.clear();
            if reader.read_line(&mut first_line)? == 0 {
                first_line.clear();
                break;
            }
            if !first_line.trim().is_empty() {
                break;
            }
        }

        let (schema, buffered_first) = if first_line.is_empty() {
            (Schema::default(), None)
        } else {
            let object = parse_object(&first_line)?;
            let mut columns: Vec<Column> = object
                .iter()
                .map(|(key, value)| Column::new(key.clone(), value_type_of(value)))
                .collect();
            columns.sort_by(|a, b| a.name.cmp(&b.name));
            let schema = Schema::new(columns);
            let first = project(&schema, &object);
            (schema, Some(first))
        };

        Ok(Self {
            reader,
            schema,
            buffered_first,
        })
    }
}

fn parse_object(line: &str) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
    let value: serde_json::Value = serde_json::from_str(line.trim())
        .with_context(|| format!("invalid NDJSON record: {}", line.trim()))?;
    match value {
        serde_json::Value::Object(object) => Ok(object),
        other => anyhow::bail!("NDJSON record is not an object: {other}"),
    }
}

fn project(schema: &Schema, object: &serde_json::Map<String, serde_json::Value>) -> Row {
    schema
        .columns
        .iter()
        .map(|column| {
            object
                .get(&column.name)
                .map(json_to_value)
                .unwrap_or(Value::Null)
        })
        .collect()
}

fn json_to_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s.clone()),
        other => Value::String(other.to_string()),
    }
}

fn value_type_of(value: &serde_json::Value) -> ValueType {
    match value {
        serde_json::Value::Bool(_) => ValueType::Boolean,
        serde_json::Value::Number(n) if n.is_i64() => ValueType::Integer,
        serde_json::Value::Number(_) => ValueType::Number,
        _ => ValueType::String,
    }
}

impl<R: BufRead> RecordStream for NdjsonStream<R> {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn next_record(&mut self) -> filerow::Result<Option<Row>> {
        if let Some(first) = self.buffered_first.take() {
            return Ok(Some(first));
        }

        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            if line.trim().is_empty() {
                continue;
            }
            let object = parse_object(&line).map_err(|e| {
                filerow::FilerowError::configuration(format!("bad upstream record: {e}"))
            })?;
            return Ok(Some(project(&self.schema, &object)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_schema_from_first_record_sorted() {
        let input = "{\"path\": \"/tmp/a.txt\", \"batch\": 1}\n";
        let stream = NdjsonStream::new(Cursor::new(input)).unwrap();
        let names: Vec<&str> = stream.schema().columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["batch", "path"]);
        assert_eq!(stream.schema().columns[0].value_type, ValueType::Integer);
        assert_eq!(stream.schema().columns[1].value_type, ValueType::String);
    }

    #[test]
    fn test_records_projected_in_schema_order() {
        let input = "{\"path\": \"/tmp/a.txt\", \"batch\": 1}\n{\"batch\": 2, \"path\": \"/tmp/b.txt\"}\n";
        let mut stream = NdjsonStream::new(Cursor::new(input)).unwrap();

        assert_eq!(
            stream.next_record().unwrap(),
            Some(vec![Value::Integer(1), Value::String("/tmp/a.txt".into())])
        );
        assert_eq!(
            stream.next_record().unwrap(),
            Some(vec![Value::Integer(2), Value::String("/tmp/b.txt".into())])
        );
        assert_eq!(stream.next_record().unwrap(), None);
    }

    #[test]
    fn test_missing_keys_read_as_null_and_blank_lines_skipped() {
        let input = "{\"path\": \"/tmp/a.txt\", \"batch\": 1}\n\n{\"path\": \"/tmp/b.txt\"}\n";
        let mut stream = NdjsonStream::new(Cursor::new(input)).unwrap();
        stream.next_record().unwrap();
        assert_eq!(
            stream.next_record().unwrap(),
            Some(vec![Value::Null, Value::String("/tmp/b.txt".into())])
        );
    }

    #[test]
    fn test_empty_input_is_empty_stream() {
        let mut stream = NdjsonStream::new(Cursor::new("")).unwrap();
        assert!(stream.schema().is_empty());
        assert_eq!(stream.next_record().unwrap(), None);
    }

    #[test]
    fn test_non_object_record_rejected() {
        assert!(NdjsonStream::new(Cursor::new("[1, 2]\n")).is_err());
    }
}

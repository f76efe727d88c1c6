use crate::common::error::W2nerError;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads newline-delimited JSON files in order and maps every non-empty object with `parse`.
///
/// Blank lines, `null` and `{}` are skipped. `parse` receives the decoded value and a
/// `file:line` location string for error messages; returning `Ok(None)` skips the record.
pub fn read_json_lines<P, T, F>(paths: &[P], mut parse: F) -> Result<Vec<T>, W2nerError>
where
    P: AsRef<Path>,
    F: FnMut(Value, &str) -> Result<Option<T>, W2nerError>,
{
    let mut records = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            W2nerError::IOError(format!("could not open {}: {}", path.display(), e))
        })?;
        let records_before = records.len();
        for (line_index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let location = format!("{}:{}", path.display(), line_index + 1);
            let value: Value = serde_json::from_str(&line)
                .map_err(|e| W2nerError::ParseError(format!("{}: {}", location, e)))?;
            let is_empty = match &value {
                Value::Null => true,
                Value::Object(map) => map.is_empty(),
                _ => false,
            };
            if is_empty {
                continue;
            }
            if let Some(record) = parse(value, &location)? {
                records.push(record);
            }
        }
        tracing::info!(
            file = %path.display(),
            records = records.len() - records_before,
            "loaded corpus file"
        );
    }
    Ok(records)
}

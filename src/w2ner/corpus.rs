//! # CLUENER corpus reader
//!
//! One JSON object per line:
//!
//! ```json
//! {"text": "浙商银行企业信贷部叶老桂博士", "label": {"name": {"叶老桂": [[9, 11]]}, "company": {"浙商银行": [[0, 3]]}}}
//! ```
//!
//! Offsets are inclusive character positions. Records without a `label` key (or with an empty
//! one) are unlabeled test records.

use crate::common::error::W2nerError;
use crate::common::file_utils::read_json_lines;
use crate::w2ner::grid::LabeledSpan;
use crate::w2ner::labels::LabelVocabulary;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Entity annotation with its type name and inclusive character offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAnnotation {
    pub label: String,
    pub start: usize,
    pub end: usize,
}

/// A sentence with its optional annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NerRecord {
    pub text: String,
    /// `None` for unlabeled records
    pub entities: Option<Vec<EntityAnnotation>>,
}

impl NerRecord {
    /// Converts the annotations into label-id spans.
    pub fn labeled_spans(
        &self,
        label_vocabulary: &LabelVocabulary,
    ) -> Result<Option<Vec<LabeledSpan>>, W2nerError> {
        self.entities
            .as_ref()
            .map(|entities| {
                entities
                    .iter()
                    .map(|entity| {
                        Ok(LabeledSpan::new(
                            label_vocabulary.id(&entity.label)?,
                            entity.start,
                            entity.end,
                        ))
                    })
                    .collect::<Result<Vec<_>, W2nerError>>()
            })
            .transpose()
    }
}

/// Loads all records of the given files, in file order.
///
/// Fails on the first record holding an inverted span (`start > end`).
pub fn read_ner_corpus<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<NerRecord>, W2nerError> {
    read_json_lines(paths, |value, location| parse_ner_record(value, location).map(Some))
}

fn parse_ner_record(value: Value, location: &str) -> Result<NerRecord, W2nerError> {
    let text = value
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| W2nerError::ParseError(format!("{}: missing `text` field", location)))?
        .to_string();

    let label_map = match value.get("label") {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) if map.is_empty() => None,
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            return Err(W2nerError::ParseError(format!(
                "{}: `label` must be an object, got {}",
                location, other
            )));
        }
    };

    let entities = match label_map {
        None => None,
        Some(label_map) => {
            let mut entities = Vec::new();
            for (label, mentions) in label_map {
                let mentions = mentions.as_object().ok_or_else(|| {
                    W2nerError::ParseError(format!(
                        "{}: mentions of `{}` must be an object",
                        location, label
                    ))
                })?;
                for positions in mentions.values() {
                    let positions: Vec<(usize, usize)> =
                        serde_json::from_value(positions.clone()).map_err(|e| {
                            W2nerError::ParseError(format!(
                                "{}: invalid positions for `{}`: {}",
                                location, label, e
                            ))
                        })?;
                    for (start, end) in positions {
                        if start > end {
                            return Err(W2nerError::ValueError(format!(
                                "{}: span [{}, {}] of `{}` starts after it ends",
                                location, start, end, label
                            )));
                        }
                        entities.push(EntityAnnotation {
                            label: label.clone(),
                            start,
                            end,
                        });
                    }
                }
            }
            Some(entities)
        }
    };

    Ok(NerRecord { text, entities })
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_labeled_record() -> Result<(), W2nerError> {
        let value = json!({
            "text": "浙商银行企业信贷部叶老桂博士",
            "label": {"name": {"叶老桂": [[9, 11]]}, "company": {"浙商银行": [[0, 3]]}}
        });

        let record = parse_ner_record(value, "test:1")?;

        assert_eq!(
            record.entities,
            Some(vec![
                EntityAnnotation {
                    label: "name".to_string(),
                    start: 9,
                    end: 11
                },
                EntityAnnotation {
                    label: "company".to_string(),
                    start: 0,
                    end: 3
                },
            ])
        );
        Ok(())
    }

    #[test]
    fn test_empty_label_is_unlabeled() -> Result<(), W2nerError> {
        let record = parse_ner_record(json!({"text": "abc", "label": {}}), "test:1")?;
        assert_eq!(record.entities, None);
        let record = parse_ner_record(json!({"id": 3, "text": "abc"}), "test:2")?;
        assert_eq!(record.entities, None);
        Ok(())
    }

    #[test]
    fn test_inverted_span_fails_fast() {
        let value = json!({"text": "abcdef", "label": {"book": {"cd": [[3, 2]]}}});
        assert!(matches!(
            parse_ner_record(value, "test:1"),
            Err(W2nerError::ValueError(_))
        ));
    }
}

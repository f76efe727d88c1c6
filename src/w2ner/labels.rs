use crate::common::error::W2nerError;
use crate::w2ner::grid::LABEL_OFFSET;
use std::collections::HashMap;

/// Entity types of the CLUENER 2020 benchmark.
pub const CLUENER_LABELS: [&str; 10] = [
    "address",
    "book",
    "company",
    "game",
    "government",
    "movie",
    "name",
    "organization",
    "position",
    "scene",
];

/// # Closed set of entity types mapped to contiguous ids
/// Labels are deduplicated and sorted so that ids do not depend on the order they were declared in.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelVocabulary {
    labels: Vec<String>,
    label2id: HashMap<String, i64>,
}

impl LabelVocabulary {
    pub fn from_labels<I, S>(labels: I) -> Result<LabelVocabulary, W2nerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let vocabulary = LabelVocabulary::sorted(labels);
        if vocabulary.is_empty() {
            return Err(W2nerError::InvalidConfigurationError(
                "the label vocabulary needs at least one label".to_string(),
            ));
        }
        Ok(vocabulary)
    }

    /// CLUENER entity types
    pub fn cluener() -> LabelVocabulary {
        LabelVocabulary::sorted(CLUENER_LABELS.iter())
    }

    fn sorted<I, S>(labels: I) -> LabelVocabulary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels: Vec<String> = labels
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();
        labels.sort();
        labels.dedup();
        let label2id = labels
            .iter()
            .enumerate()
            .map(|(id, label)| (label.clone(), id as i64))
            .collect();
        LabelVocabulary { labels, label2id }
    }

    pub fn id(&self, label: &str) -> Result<i64, W2nerError> {
        self.label2id.get(label).copied().ok_or_else(|| {
            W2nerError::ValueError(format!("label {} is not part of the vocabulary", label))
        })
    }

    pub fn label(&self, id: i64) -> Option<&str> {
        if id < 0 {
            return None;
        }
        self.labels.get(id as usize).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of grid relation classes: no relation, continuation and one end marker per label.
    pub fn num_relations(&self) -> usize {
        self.labels.len() + LABEL_OFFSET as usize
    }

    /// `id -> label` mapping, in the layout of a model configuration's `id2label`.
    pub fn id2label(&self) -> HashMap<i64, String> {
        self.label2id
            .iter()
            .map(|(label, id)| (*id, label.clone()))
            .collect()
    }
}

//! # Span-level precision, recall and F1
//! A predicted span counts as correct only if its label and both offsets match a reference span
//! of the same example.

use crate::common::error::W2nerError;
use crate::w2ner::grid::LabeledSpan;
use crate::w2ner::labels::LabelVocabulary;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpanCounts {
    pub true_positives: usize,
    pub predicted: usize,
    pub gold: usize,
}

impl SpanCounts {
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.predicted)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.gold)
    }

    pub fn f1(&self) -> f64 {
        let (precision, recall) = (self.precision(), self.recall());
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn update_counts<F>(per_label: &mut [SpanCounts], micro: &mut SpanCounts, label_id: i64, update: F)
where
    F: Fn(&mut SpanCounts),
{
    update(micro);
    if label_id >= 0 {
        if let Some(counts) = per_label.get_mut(label_id as usize) {
            update(counts);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelScore {
    pub label: String,
    pub counts: SpanCounts,
}

/// # Scores of a set of predictions against reference spans
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanMetrics {
    /// One entry per label of the vocabulary, in id order
    pub per_label: Vec<LabelScore>,
    /// Counts over all labels, including predictions with ids outside the vocabulary
    pub micro: SpanCounts,
}

impl SpanMetrics {
    /// Scores `predictions` against `references`, example by example.
    ///
    /// Duplicate spans within an example are counted once.
    pub fn compute(
        references: &[Vec<LabeledSpan>],
        predictions: &[Vec<LabeledSpan>],
        label_vocabulary: &LabelVocabulary,
    ) -> Result<SpanMetrics, W2nerError> {
        if references.len() != predictions.len() {
            return Err(W2nerError::ValueError(format!(
                "got {} reference examples but {} predicted examples",
                references.len(),
                predictions.len()
            )));
        }
        let mut per_label = vec![SpanCounts::default(); label_vocabulary.len()];
        let mut micro = SpanCounts::default();
        for (reference, prediction) in references.iter().zip(predictions.iter()) {
            let reference: HashSet<&LabeledSpan> = reference.iter().collect();
            let prediction: HashSet<&LabeledSpan> = prediction.iter().collect();
            for span in &reference {
                update_counts(&mut per_label, &mut micro, span.label_id, |c| c.gold += 1);
            }
            for span in &prediction {
                update_counts(&mut per_label, &mut micro, span.label_id, |c| c.predicted += 1);
                if reference.contains(span) {
                    update_counts(&mut per_label, &mut micro, span.label_id, |c| {
                        c.true_positives += 1
                    });
                }
            }
        }

        let per_label = per_label
            .into_iter()
            .zip(label_vocabulary.labels())
            .map(|(counts, label)| LabelScore {
                label: label.clone(),
                counts,
            })
            .collect();
        Ok(SpanMetrics { per_label, micro })
    }

    /// Micro-averaged F1
    pub fn f1(&self) -> f64 {
        self.micro.f1()
    }

    /// Text table with precision, recall, F1 and support per label, followed by the micro
    /// average.
    pub fn report(&self) -> String {
        let width = self
            .per_label
            .iter()
            .map(|score| score.label.chars().count())
            .chain(std::iter::once("micro avg".len()))
            .max()
            .unwrap_or(0);
        let mut lines = vec![format!(
            "{:>width$} {:>10} {:>10} {:>10} {:>10}",
            "",
            "precision",
            "recall",
            "f1-score",
            "support",
            width = width
        )];
        let rows = self
            .per_label
            .iter()
            .map(|score| (score.label.as_str(), score.counts))
            .chain(std::iter::once(("micro avg", self.micro)));
        for (label, counts) in rows {
            lines.push(format!(
                "{:>width$} {:>10.4} {:>10.4} {:>10.4} {:>10}",
                label,
                counts.precision(),
                counts.recall(),
                counts.f1(),
                counts.gold,
                width = width
            ));
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

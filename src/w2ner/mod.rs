//! # W2NER grid tagging (Li et al., 2022)
//!
//! Unified named entity recognition as word-word relation classification. Every sentence is
//! represented by an `L x L` grid of relations between token pairs, allowing flat, overlapped
//! and nested entities to be encoded in the same target:
//! - `grid`: builds the padded label grid and its companion planes from token ids and spans
//! - `decoder`: reads entity spans back from a (predicted) grid
//! - `preprocess`: character tokenization of CLUENER sentences and evaluation label bookkeeping
//! - `collate`: batching into `tch` tensors trimmed to the batch's longest sentence
//! - `metrics`: span-level precision, recall and F1
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use rust_w2ner::resources::LocalResource;
//! use rust_w2ner::w2ner::{
//!     collate_grids, read_ner_corpus, EvalLabels, GridDecoder, SpanMetrics, W2nerDataConfig,
//!     W2nerPreprocessor,
//! };
//! use rust_w2ner::{Config, DataMode};
//! use std::path::PathBuf;
//! use tch::Device;
//!
//! let config = W2nerDataConfig::from_file("path/to/data_config.json")?.validate()?;
//! let vocab = LocalResource::from(PathBuf::from("path/to/vocab.txt"));
//! let preprocessor =
//!     W2nerPreprocessor::from_vocab_resource(&vocab, config.label_vocabulary()?, config.do_lower_case)?;
//!
//! let records = read_ner_corpus(&["path/to/dev.json"])?;
//! let mut eval_labels = EvalLabels::new();
//! let features = preprocessor.process_all(
//!     &records,
//!     config.max_seq_length(DataMode::Eval),
//!     DataMode::Eval,
//!     &mut eval_labels,
//! )?;
//!
//! let mut predictions = Vec::new();
//! for chunk in features.chunks(config.batch_size(DataMode::Eval)) {
//!     let batch = collate_grids(chunk, Device::Cpu)?;
//!     // Run the model on `batch` to get logits of shape (batch, length, length, relations),
//!     // here replaced by the reference labels.
//!     let logits = batch.labels.one_hot(preprocessor.label_vocabulary().num_relations() as i64);
//!     predictions.extend(GridDecoder.decode_batch(&logits, &batch.seqlens)?);
//! }
//! let metrics = SpanMetrics::compute(eval_labels.labels(), &predictions, preprocessor.label_vocabulary())?;
//! println!("{}", metrics.report());
//! # Ok(())
//! # }
//! ```

mod collate;
mod config;
mod corpus;
mod decoder;
pub mod distance;
mod grid;
mod labels;
mod metrics;
mod preprocess;

pub use collate::{collate_grids, GridBatch};
pub use config::W2nerDataConfig;
pub use corpus::{read_ner_corpus, EntityAnnotation, NerRecord};
pub use decoder::GridDecoder;
pub use grid::{
    encode_grid_labels, GridFeatures, GridLabelBuilder, LabeledSpan, SquareGrid, CONTINUATION,
    LABEL_OFFSET, NO_RELATION,
};
pub use labels::{LabelVocabulary, CLUENER_LABELS};
pub use metrics::{LabelScore, SpanCounts, SpanMetrics};
pub use preprocess::{EvalLabels, W2nerPreprocessor};

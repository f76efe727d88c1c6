//! # Data preparation for W2NER and CoSENT on Chinese corpora
//!
//! Data side of two BERT fine-tuning tasks, built on `tch-rs` tensors and
//! `rust_tokenizers` vocabularies:
//! - W2NER grid tagging for named entity recognition (CLUENER): label grid construction,
//!   relative distance buckets, batch collation, decoding of predicted grids and span-level scoring
//! - CoSENT sentence pair preparation (AFQMC): pair encoding, collation and the row reordering of
//!   pair embeddings used by the ranking loss
//!
//! Model definition, training loops and optimizers are out of scope: batches are handed over as
//! `tch::Tensor`s, and can be written to disk with the `prepare-data` binary.
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use rust_w2ner::w2ner::{GridDecoder, GridLabelBuilder, LabeledSpan};
//!
//! // [CLS] 浙 江 大 学 [SEP] with ids 101 and 102 for the special tokens and 0 for padding
//! let builder = GridLabelBuilder::new(8, 101, 102, 0)?;
//! let spans = vec![LabeledSpan::new(2, 0, 3)];
//! let features = builder.build(&[3851, 3736, 1920, 2110], Some(&spans[..]))?;
//!
//! assert_eq!(GridDecoder.decode(&features.grid_labels, features.seqlen), spans);
//! # Ok(())
//! # }
//! ```
//!
//! # Loading resources
//!
//! Vocabularies and configuration files are accessed through `ResourceProvider`s. With the
//! default `remote` feature, `RemoteResource`s are downloaded once and cached under
//! `~/.cache/.w2ner`, or under the directory set by the `W2NER_CACHE` environment variable.

pub mod common;
pub mod cosent;
pub mod w2ner;

pub use common::error::W2nerError;
pub use common::resources;
pub use common::{Config, DataMode};

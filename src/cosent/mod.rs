//! # CoSENT sentence pair preparation
//!
//! Data side of CoSENT sentence embedding training on AFQMC-style pairs: corpus loading,
//! BERT encoding of both sentences, collation and the row reordering applied to the pair
//! embeddings before the ranking loss.
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use rust_w2ner::cosent::{collate_pairs, read_pair_corpus, PairDataConfig, PairPreprocessor};
//! use rust_w2ner::resources::LocalResource;
//! use rust_w2ner::{Config, DataMode};
//! use std::path::PathBuf;
//! use tch::Device;
//!
//! let config = PairDataConfig::from_file("path/to/afqmc_config.json")?.validate()?;
//! let vocab = LocalResource::from(PathBuf::from("path/to/vocab.txt"));
//! let preprocessor = PairPreprocessor::from_vocab_resource(&vocab, config.do_lower_case)?;
//!
//! let records = read_pair_corpus(&["path/to/train.json"])?;
//! let features = preprocessor.process_all(&records, config.max_seq_length)?;
//! for chunk in features.chunks(config.batch_size(DataMode::Train)) {
//!     let batch = collate_pairs(chunk, Device::Cpu)?;
//!     println!("{:?}", batch.input_ids.size());
//! }
//! # Ok(())
//! # }
//! ```

mod collate;
mod config;
mod corpus;
mod features;

pub use collate::{collate_pairs, interleave_pair_rows, PairBatch};
pub use config::PairDataConfig;
pub use corpus::{read_pair_corpus, PairRecord};
pub use features::{PairFeatures, PairPreprocessor, PAIR_LABELS};

// Copyright 2019-present Guillaume Becquin
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rust_w2ner::cosent::{collate_pairs, read_pair_corpus, PairDataConfig, PairPreprocessor};
use rust_w2ner::resources::{resource_from_location, ResourceProvider};
use rust_w2ner::w2ner::{
    collate_grids, read_ner_corpus, EvalLabels, GridDecoder, SpanMetrics, W2nerDataConfig,
    W2nerPreprocessor,
};
use rust_w2ner::{Config, DataMode, W2nerError};
use tch::{Device, Tensor};
use tracing_subscriber::EnvFilter;

/// prepare-data: encodes a corpus into batches of tensors saved with `Tensor::save_multi`.
#[derive(Parser)]
#[command(name = "prepare-data", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build W2NER grid batches from a CLUENER-style corpus.
    W2ner {
        /// Path to the JSON data configuration.
        #[arg(long)]
        config: PathBuf,
        /// Path or URL of the BERT vocab.txt. Defaults to bert-base-chinese.
        #[arg(long)]
        vocab: Option<String>,
        /// Dataset split to prepare (train, eval or test).
        #[arg(long, default_value = "train")]
        mode: DataMode,
        /// Destination .ot file.
        #[arg(long)]
        output: PathBuf,
        /// Where to write the reference spans as JSON (eval mode only).
        #[arg(long)]
        labels_output: Option<PathBuf>,
    },
    /// Build CoSENT sentence pair batches from an AFQMC-style corpus.
    Cosent {
        /// Path to the JSON data configuration.
        #[arg(long)]
        config: PathBuf,
        /// Path or URL of the BERT vocab.txt. Defaults to bert-base-chinese.
        #[arg(long)]
        vocab: Option<String>,
        /// Dataset split to prepare (train, eval or test).
        #[arg(long, default_value = "train")]
        mode: DataMode,
        /// Destination .ot file.
        #[arg(long)]
        output: PathBuf,
    },
}

fn vocab_resource(location: Option<&str>) -> Result<Box<dyn ResourceProvider + Send>, W2nerError> {
    match location {
        Some(location) => Ok(resource_from_location(location)),
        None => default_vocab_resource(),
    }
}

#[cfg(feature = "remote")]
fn default_vocab_resource() -> Result<Box<dyn ResourceProvider + Send>, W2nerError> {
    use rust_w2ner::resources::{BertChineseVocabResources, RemoteResource};
    Ok(Box::new(RemoteResource::from_pretrained(
        BertChineseVocabResources::BERT_BASE_CHINESE,
    )))
}

#[cfg(not(feature = "remote"))]
fn default_vocab_resource() -> Result<Box<dyn ResourceProvider + Send>, W2nerError> {
    Err(W2nerError::InvalidConfigurationError(
        "--vocab is required when built without the remote feature".to_string(),
    ))
}

fn corpus_file(file: Option<&Path>, mode: DataMode) -> Result<PathBuf, W2nerError> {
    file.map(Path::to_path_buf).ok_or_else(|| {
        W2nerError::InvalidConfigurationError(format!("no {} file in the data configuration", mode))
    })
}

fn prepare_w2ner(
    config: &Path,
    vocab: Option<&str>,
    mode: DataMode,
    output: &Path,
    labels_output: Option<&Path>,
) -> Result<(), W2nerError> {
    let config = W2nerDataConfig::from_file(config)?.validate()?;
    let vocab = vocab_resource(vocab)?;
    let preprocessor = W2nerPreprocessor::from_vocab_resource(
        &*vocab,
        config.label_vocabulary()?,
        config.do_lower_case,
    )?;

    let records = read_ner_corpus(&[corpus_file(config.file(mode), mode)?])?;
    let mut eval_labels = EvalLabels::new();
    let features = preprocessor.process_all(
        &records,
        config.max_seq_length(mode),
        mode,
        &mut eval_labels,
    )?;

    let mut named_tensors = Vec::new();
    let mut decoded = Vec::new();
    for (batch_index, chunk) in features.chunks(config.batch_size(mode)).enumerate() {
        let batch = collate_grids(chunk, Device::Cpu)?;
        if mode == DataMode::Eval {
            decoded.extend(GridDecoder.decode_predictions(&batch.labels, &batch.seqlens)?);
        }
        named_tensors.extend(batch.named_tensors(&batch_index.to_string()));
    }
    Tensor::save_multi(&named_tensors, output)?;
    tracing::info!(
        examples = features.len(),
        tensors = named_tensors.len(),
        output = %output.display(),
        "saved grid batches"
    );

    if mode == DataMode::Eval {
        // Spans cut by truncation are missing from the encoded grids.
        let metrics =
            SpanMetrics::compute(eval_labels.labels(), &decoded, preprocessor.label_vocabulary())?;
        tracing::info!(
            recall = metrics.micro.recall(),
            "reference spans recovered from the encoded grids"
        );
        if let Some(labels_output) = labels_output {
            let writer = BufWriter::new(File::create(labels_output)?);
            serde_json::to_writer(writer, eval_labels.labels())?;
        }
    } else if labels_output.is_some() {
        tracing::warn!(%mode, "reference spans are only collected in eval mode");
    }
    Ok(())
}

fn prepare_cosent(
    config: &Path,
    vocab: Option<&str>,
    mode: DataMode,
    output: &Path,
) -> Result<(), W2nerError> {
    let config = PairDataConfig::from_file(config)?.validate()?;
    let vocab = vocab_resource(vocab)?;
    let preprocessor = PairPreprocessor::from_vocab_resource(&*vocab, config.do_lower_case)?;

    let records = read_pair_corpus(&[corpus_file(config.file(mode), mode)?])?;
    let features = preprocessor.process_all(&records, config.max_seq_length)?;

    let mut named_tensors = Vec::new();
    for (batch_index, chunk) in features.chunks(config.batch_size(mode)).enumerate() {
        let batch = collate_pairs(chunk, Device::Cpu)?;
        named_tensors.extend(batch.named_tensors(&batch_index.to_string()));
    }
    Tensor::save_multi(&named_tensors, output)?;
    tracing::info!(
        examples = features.len(),
        tensors = named_tensors.len(),
        output = %output.display(),
        "saved sentence pair batches"
    );
    Ok(())
}

fn main() -> Result<(), W2nerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::W2ner {
            config,
            vocab,
            mode,
            output,
            labels_output,
        } => prepare_w2ner(
            &config,
            vocab.as_deref(),
            mode,
            &output,
            labels_output.as_deref(),
        ),
        Command::Cosent {
            config,
            vocab,
            mode,
            output,
        } => prepare_cosent(&config, vocab.as_deref(), mode, &output),
    }
}

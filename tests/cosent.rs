extern crate anyhow;

use rust_w2ner::cosent::{
    collate_pairs, interleave_pair_rows, read_pair_corpus, PairDataConfig, PairPreprocessor,
    PairRecord,
};
use rust_w2ner::resources::LocalResource;
use rust_w2ner::{Config, DataMode};
use std::convert::TryFrom;
use std::fs;
use std::path::{Path, PathBuf};
use tch::{Device, Tensor};
use tempfile::TempDir;

fn write_vocab(dir: &Path) -> anyhow::Result<PathBuf> {
    let tokens = [
        "[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "花", "呗", "借", "款", "还", "怎", "么",
    ];
    let path = dir.join("vocab.txt");
    fs::write(&path, tokens.join("\n"))?;
    Ok(path)
}

fn pair(sentence1: &str, sentence2: &str, label: Option<&str>) -> PairRecord {
    PairRecord {
        sentence1: sentence1.to_string(),
        sentence2: sentence2.to_string(),
        label: label.map(str::to_string),
    }
}

#[test]
fn read_afqmc_corpus() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("train.json");
    fs::write(
        &path,
        [
            r#"{"sentence1": "花呗怎么还", "sentence2": "借款怎么还", "label": "0"}"#,
            "{}",
            r#"{"sentence1": "花呗", "sentence2": "借呗"}"#,
        ]
        .join("\n"),
    )?;

    let records = read_pair_corpus(&[&path])?;

    assert_eq!(
        records,
        vec![
            pair("花呗怎么还", "借款怎么还", Some("0")),
            pair("花呗", "借呗", None)
        ]
    );
    Ok(())
}

#[test]
fn pair_features_are_padded_and_labeled() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let vocab = LocalResource::from(write_vocab(dir.path())?);
    let preprocessor = PairPreprocessor::from_vocab_resource(&vocab, true)?;

    let features = preprocessor.process(&pair("花呗", "借款怎么还", Some("1")), 10)?;

    assert_eq!(features.labels, 0);
    assert_eq!(features.input_ids, vec![2, 5, 6, 3, 0, 0, 0, 0, 0, 0]);
    assert_eq!(features.attention_mask, vec![1, 1, 1, 1, 0, 0, 0, 0, 0, 0]);
    assert_eq!(features.seqlen, 4);
    assert_eq!(features.input_ids_2, vec![2, 7, 8, 10, 11, 9, 3, 0, 0, 0]);
    assert_eq!(features.seqlen_2, 7);

    assert_eq!(preprocessor.process(&pair("花", "呗", Some("0")), 10)?.labels, 1);
    assert_eq!(preprocessor.process(&pair("花", "呗", None), 10)?.labels, 0);
    assert!(preprocessor.process(&pair("花", "呗", Some("2")), 10).is_err());

    let truncated = preprocessor.process(&pair("花呗怎么还", "花", None), 4)?;
    assert_eq!(truncated.input_ids.len(), 4);
    assert_eq!(truncated.seqlen, 4);
    assert_eq!(truncated.input_ids[0], 2);
    Ok(())
}

#[test]
fn collate_trims_each_side() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let vocab = LocalResource::from(write_vocab(dir.path())?);
    let preprocessor = PairPreprocessor::from_vocab_resource(&vocab, true)?;
    let features = preprocessor.process_all(
        &[
            pair("花呗", "借款怎么还", Some("1")),
            pair("花", "借款", Some("0")),
        ],
        16,
    )?;

    let batch = collate_pairs(&features, Device::Cpu)?;

    assert_eq!(batch.input_ids.size(), vec![2, 4]);
    assert_eq!(batch.attention_mask.size(), vec![2, 4]);
    assert_eq!(batch.input_ids_2.size(), vec![2, 7]);
    assert_eq!(batch.attention_mask_2.int64_value(&[1, 3]), 1);
    assert_eq!(batch.attention_mask_2.int64_value(&[1, 4]), 0);
    assert_eq!(Vec::<i64>::try_from(&batch.labels)?, vec![0, 1]);
    assert_eq!(batch.named_tensors("3")[0].0, "3.labels");
    Ok(())
}

#[test]
fn interleave_moves_rows_to_even_then_odd_slots() -> anyhow::Result<()> {
    let logits1 = Tensor::from_slice(&[0f32, 1., 2., 3.]).view([4, 1]);
    let logits2 = Tensor::from_slice(&[10f32, 11., 12., 13.]).view([4, 1]);

    let output = interleave_pair_rows(&logits1, &logits2)?;

    assert_eq!(output.size(), vec![4, 2]);
    assert_eq!(
        Vec::<f32>::try_from(&output.flatten(0, -1))?,
        vec![0., 10., 2., 12., 1., 11., 3., 13.]
    );

    let logits1 = Tensor::from_slice(&[0f32, 1., 2., 3., 4.]).view([5, 1]);
    let output = interleave_pair_rows(&logits1, &logits1)?;
    assert_eq!(
        Vec::<f32>::try_from(&output.select(1, 0).contiguous())?,
        vec![0., 3., 1., 4., 2.]
    );
    Ok(())
}

#[test]
fn pair_config_defaults() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("afqmc.json");
    fs::write(&path, r#"{"train_file": "train.json"}"#)?;

    let config = PairDataConfig::from_file(&path)?.validate()?;

    assert_eq!(config.max_seq_length, 140);
    assert_eq!(config.batch_size(DataMode::Train), 64);
    assert_eq!(config.batch_size(DataMode::Test), 2);
    assert_eq!(config.file(DataMode::Train), Some(Path::new("train.json")));
    Ok(())
}

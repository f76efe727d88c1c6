extern crate anyhow;

use rust_w2ner::resources::LocalResource;
use rust_w2ner::w2ner::distance::{distance_bucket, NEGATIVE_DISTANCE_OFFSET, SAME_POSITION_BUCKET};
use rust_w2ner::w2ner::{
    collate_grids, encode_grid_labels, read_ner_corpus, EvalLabels, GridDecoder,
    GridLabelBuilder, LabelVocabulary, LabeledSpan, SpanMetrics, W2nerDataConfig,
    W2nerPreprocessor, CONTINUATION, NO_RELATION,
};
use rust_w2ner::{Config, DataMode};
use std::fs;
use std::path::{Path, PathBuf};
use tch::{Device, Kind, Tensor};
use tempfile::TempDir;

const CLS: i64 = 101;
const SEP: i64 = 102;
const PAD: i64 = 0;

fn write_vocab(dir: &Path) -> anyhow::Result<PathBuf> {
    let tokens = [
        "[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "浙", "江", "大", "学", "在", "杭", "州",
        "a",
    ];
    let path = dir.join("vocab.txt");
    fs::write(&path, tokens.join("\n"))?;
    Ok(path)
}

fn write_corpus(dir: &Path, lines: &[&str]) -> anyhow::Result<PathBuf> {
    let path = dir.join("dev.json");
    fs::write(&path, lines.join("\n"))?;
    Ok(path)
}

#[test]
fn single_span_round_trip() -> anyhow::Result<()> {
    let max_seq_length = 12;
    let builder = GridLabelBuilder::new(max_seq_length, CLS, SEP, PAD)?;
    let tokens: Vec<i64> = (1000..1000 + max_seq_length as i64 - 2).collect();

    for start in 0..max_seq_length - 2 {
        for end in start..max_seq_length - 2 {
            let span = LabeledSpan::new(3, start, end);
            let features = builder.build(&tokens, Some(&[span]))?;
            let decoded = GridDecoder.decode(&features.grid_labels, features.seqlen);
            assert_eq!(decoded, vec![span], "span ({}, {})", start, end);
        }
    }
    Ok(())
}

#[test]
fn three_token_sentence_layout() -> anyhow::Result<()> {
    let builder = GridLabelBuilder::new(8, CLS, SEP, PAD)?;
    let features = builder.build(&[7, 8, 9], Some(&[LabeledSpan::new(0, 1, 2)]))?;

    assert_eq!(features.seqlen, 5);
    assert_eq!(features.input_ids, vec![CLS, 7, 8, 9, SEP, PAD, PAD, PAD]);
    assert_eq!(features.attention_mask, vec![1, 1, 1, 1, 1, 0, 0, 0]);
    // Tokens 1 and 2 sit at grid positions 2 and 3 after the [CLS] shift.
    assert_eq!(features.grid_labels.get(2, 3), CONTINUATION);
    assert_eq!(features.grid_labels.get(3, 2), 2);
    let marked = features
        .grid_labels
        .as_slice()
        .iter()
        .filter(|value| **value != NO_RELATION)
        .count();
    assert_eq!(marked, 2);

    assert_eq!(
        GridDecoder.decode(&features.grid_labels, features.seqlen),
        vec![LabeledSpan::new(0, 1, 2)]
    );
    Ok(())
}

#[test]
fn spans_beyond_truncation_are_dropped() -> anyhow::Result<()> {
    let builder = GridLabelBuilder::new(6, CLS, SEP, PAD)?;
    let spans = [
        LabeledSpan::new(1, 2, 3),
        LabeledSpan::new(0, 3, 4),
        LabeledSpan::new(2, 6, 8),
    ];

    let features = builder.build(&[1, 2, 3, 4, 5, 6, 7, 8, 9], Some(&spans))?;

    assert_eq!(features.seqlen, 6);
    assert_eq!(
        features.input_ids,
        vec![CLS, 1, 2, 3, 4, SEP]
    );
    let mut expected = encode_grid_labels(6, &[])?;
    expected.set(3, 4, CONTINUATION);
    expected.set(4, 3, 1 + 2);
    assert_eq!(features.grid_labels, expected);
    assert_eq!(
        GridDecoder.decode(&features.grid_labels, features.seqlen),
        vec![LabeledSpan::new(1, 2, 3)]
    );
    Ok(())
}

#[test]
fn spans_with_huge_offsets_are_dropped() -> anyhow::Result<()> {
    let builder = GridLabelBuilder::new(8, CLS, SEP, PAD)?;
    let spans = [
        LabeledSpan::new(0, 0, usize::MAX),
        LabeledSpan::new(1, usize::MAX, usize::MAX),
    ];

    let features = builder.build(&[1, 2, 3], Some(&spans))?;

    assert!(features
        .grid_labels
        .as_slice()
        .iter()
        .all(|value| *value == NO_RELATION));
    assert!(GridDecoder
        .decode(&features.grid_labels, features.seqlen)
        .is_empty());
    Ok(())
}

#[test]
fn decoder_rejects_malformed_shapes() -> anyhow::Result<()> {
    let options = (Kind::Float, Device::Cpu);
    let seqlens = Tensor::from_slice(&[4i64]);

    let rank_3 = Tensor::zeros(&[1, 4, 4], options);
    assert!(GridDecoder.decode_batch(&rank_3, &seqlens).is_err());
    let not_square = Tensor::zeros(&[1, 4, 5, 3], options);
    assert!(GridDecoder.decode_batch(&not_square, &seqlens).is_err());
    let no_relations = Tensor::zeros(&[1, 4, 4, 0], options);
    assert!(GridDecoder.decode_batch(&no_relations, &seqlens).is_err());

    let predictions = Tensor::zeros(&[1, 4, 4], (Kind::Int64, Device::Cpu));
    let two_lengths = Tensor::from_slice(&[4i64, 4]);
    assert!(GridDecoder
        .decode_predictions(&predictions, &two_lengths)
        .is_err());
    let rank_2 = Tensor::zeros(&[4, 4], (Kind::Int64, Device::Cpu));
    assert!(GridDecoder.decode_predictions(&rank_2, &seqlens).is_err());

    assert_eq!(
        GridDecoder.decode_predictions(&predictions, &seqlens)?,
        vec![vec![]]
    );
    Ok(())
}

#[test]
fn padding_cells_are_empty() -> anyhow::Result<()> {
    let max_seq_length = 10;
    let builder = GridLabelBuilder::new(max_seq_length, CLS, SEP, PAD)?;
    let features = builder.build(&[5, 6, 7], Some(&[LabeledSpan::new(4, 0, 2)]))?;

    for row in 0..max_seq_length {
        for column in 0..max_seq_length {
            let inside = row < features.seqlen && column < features.seqlen;
            assert_eq!(features.grid_mask2d.get(row, column), inside);
            if !inside {
                assert_eq!(features.grid_labels.get(row, column), NO_RELATION);
                assert!(!features.pieces2word.get(row, column));
                assert_eq!(features.dist_inputs.get(row, column), 0);
            }
        }
    }
    for position in 0..features.seqlen - 1 {
        assert!(features.pieces2word.get(position, position + 1));
    }
    Ok(())
}

#[test]
fn distance_buckets_are_antisymmetric() -> anyhow::Result<()> {
    let builder = GridLabelBuilder::new(200, CLS, SEP, PAD)?;
    let tokens = vec![1i64; 198];
    let features = builder.build(&tokens, None)?;
    let dist_inputs = &features.dist_inputs;

    for i in 0..200 {
        assert_eq!(dist_inputs.get(i, i), SAME_POSITION_BUCKET);
        for j in i + 1..200 {
            assert_eq!(dist_inputs.get(i, j), distance_bucket(j - i));
            assert_eq!(
                dist_inputs.get(i, j),
                dist_inputs.get(j, i) - NEGATIVE_DISTANCE_OFFSET
            );
        }
    }
    assert_eq!(dist_inputs.get(0, 199), 8);
    assert_eq!(dist_inputs.get(199, 0), 17);
    Ok(())
}

#[test]
fn decoding_then_encoding_keeps_entity_markers() -> anyhow::Result<()> {
    let builder = GridLabelBuilder::new(16, CLS, SEP, PAD)?;
    let spans = [
        LabeledSpan::new(0, 0, 1),
        LabeledSpan::new(1, 10, 12),
        LabeledSpan::new(2, 8, 8),
        LabeledSpan::new(5, 3, 6),
    ];
    let tokens: Vec<i64> = (1..=14).collect();
    let features = builder.build(&tokens, Some(&spans))?;

    let decoded = GridDecoder.decode(&features.grid_labels, features.seqlen);
    let rebuilt = builder.build(&tokens, Some(&decoded))?;

    assert_eq!(decoded, spans.to_vec());
    assert_eq!(rebuilt.grid_labels, features.grid_labels);
    Ok(())
}

#[test]
fn nested_spans_share_the_chain() -> anyhow::Result<()> {
    let builder = GridLabelBuilder::new(10, CLS, SEP, PAD)?;
    let spans = [LabeledSpan::new(7, 0, 3), LabeledSpan::new(2, 1, 2)];
    let features = builder.build(&[1, 2, 3, 4, 5], Some(&spans))?;

    let decoded = GridDecoder.decode(&features.grid_labels, features.seqlen);

    assert_eq!(
        decoded,
        vec![LabeledSpan::new(2, 1, 2), LabeledSpan::new(7, 0, 3)]
    );
    Ok(())
}

#[test]
fn inverted_span_fails() -> anyhow::Result<()> {
    let builder = GridLabelBuilder::new(10, CLS, SEP, PAD)?;
    assert!(builder
        .build(&[1, 2, 3], Some(&[LabeledSpan::new(0, 2, 1)]))
        .is_err());
    assert!(GridLabelBuilder::new(1, CLS, SEP, PAD).is_err());
    Ok(())
}

#[test]
fn collate_trims_to_longest_sentence() -> anyhow::Result<()> {
    let builder = GridLabelBuilder::new(12, CLS, SEP, PAD)?;
    let features = vec![
        builder.build(&[1, 2], Some(&[LabeledSpan::new(0, 0, 1)]))?,
        builder.build(&[1, 2, 3, 4, 5], Some(&[LabeledSpan::new(1, 2, 4)]))?,
        builder.build(&[1], None)?,
    ];

    let batch = collate_grids(&features, Device::Cpu)?;

    assert_eq!(batch.sequence_length(), 7);
    assert_eq!(batch.input_ids.size(), vec![3, 7]);
    assert_eq!(batch.labels.size(), vec![3, 7, 7]);
    assert_eq!(batch.grid_mask2d.size(), vec![3, 7, 7]);
    assert_eq!(batch.seqlens.size(), vec![3]);
    assert_eq!(batch.seqlens.int64_value(&[0]), 4);
    assert_eq!(batch.input_ids.int64_value(&[0, 4]), PAD);
    assert_eq!(batch.attention_mask.int64_value(&[2, 2]), 1);
    assert_eq!(batch.attention_mask.int64_value(&[2, 3]), 0);
    assert_eq!(batch.named_tensors("0").len(), 7);

    let decoded = GridDecoder.decode_predictions(&batch.labels, &batch.seqlens)?;
    assert_eq!(
        decoded,
        vec![
            vec![LabeledSpan::new(0, 0, 1)],
            vec![LabeledSpan::new(1, 2, 4)],
            vec![]
        ]
    );
    assert!(collate_grids(&[], Device::Cpu).is_err());
    Ok(())
}

#[test]
fn preprocess_and_score_eval_corpus() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let vocab = LocalResource::from(write_vocab(dir.path())?);
    let corpus = write_corpus(
        dir.path(),
        &[
            r#"{"text": "浙江大学在杭州", "label": {"organization": {"浙江大学": [[0, 3]]}, "address": {"杭州": [[5, 6]]}}}"#,
            "",
            "{}",
            r#"{"text": "A大学", "label": {}}"#,
        ],
    )?;

    let records = read_ner_corpus(&[&corpus])?;
    assert_eq!(records.len(), 2);
    assert!(records[1].entities.is_none());

    let preprocessor = W2nerPreprocessor::from_vocab_resource(&vocab, LabelVocabulary::cluener(), true)?;
    assert_eq!(preprocessor.tokenize("A大学"), vec![12, 7, 8]);
    assert_eq!(preprocessor.tokenize("北京"), vec![1, 1]);

    let mut eval_labels = EvalLabels::new();
    let features = preprocessor.process_all(&records, 20, DataMode::Eval, &mut eval_labels)?;

    assert_eq!(features[0].input_ids[..9], [2, 5, 6, 7, 8, 9, 10, 11, 3]);
    assert_eq!(features[0].input_ids[9], 0);
    assert_eq!(features[0].seqlen, 9);
    let organization = LabelVocabulary::cluener().id("organization")?;
    let address = LabelVocabulary::cluener().id("address")?;
    assert_eq!(
        eval_labels.labels(),
        &[
            vec![
                LabeledSpan::new(organization, 0, 3),
                LabeledSpan::new(address, 5, 6)
            ],
            vec![]
        ]
    );

    let batch = collate_grids(&features, Device::Cpu)?;
    let num_relations = preprocessor.label_vocabulary().num_relations() as i64;
    let predictions = GridDecoder.decode_batch(&batch.labels.one_hot(num_relations), &batch.seqlens)?;
    let metrics = SpanMetrics::compute(
        eval_labels.labels(),
        &predictions,
        preprocessor.label_vocabulary(),
    )?;
    assert!((metrics.f1() - 1.0).abs() < 1e-9);
    assert_eq!(metrics.micro.gold, 2);
    Ok(())
}

#[test]
fn train_mode_skips_eval_labels() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let vocab = LocalResource::from(write_vocab(dir.path())?);
    let corpus = write_corpus(
        dir.path(),
        &[r#"{"text": "杭州", "label": {"address": {"杭州": [[0, 1]]}}}"#],
    )?;
    let preprocessor =
        W2nerPreprocessor::from_vocab_resource(&vocab, LabelVocabulary::cluener(), false)?;

    let mut eval_labels = EvalLabels::new();
    let features = preprocessor.process_all(
        &read_ner_corpus(&[&corpus])?,
        8,
        DataMode::Train,
        &mut eval_labels,
    )?;

    assert!(eval_labels.is_empty());
    assert_eq!(features[0].grid_labels.get(2, 1), 2);
    Ok(())
}

#[test]
fn corpus_with_inverted_span_fails() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let corpus = write_corpus(
        dir.path(),
        &[r#"{"text": "杭州", "label": {"address": {"杭州": [[1, 0]]}}}"#],
    )?;
    assert!(read_ner_corpus(&[&corpus]).is_err());
    Ok(())
}

#[test]
fn data_config_defaults_and_overrides() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("data_config.json");
    fs::write(
        &path,
        r#"{"eval_file": "dev.json", "eval_batch_size": 8, "labels": ["person", "place"]}"#,
    )?;

    let config = W2nerDataConfig::from_file(&path)?.validate()?;

    assert_eq!(config.max_seq_length(DataMode::Train), 90);
    assert_eq!(config.max_seq_length(DataMode::Test), 120);
    assert_eq!(config.batch_size(DataMode::Eval), 8);
    assert_eq!(config.batch_size(DataMode::Train), 40);
    assert_eq!(config.file(DataMode::Eval), Some(Path::new("dev.json")));
    assert_eq!(config.file(DataMode::Train), None);
    assert_eq!(config.label_vocabulary()?.num_relations(), 4);

    let invalid = W2nerDataConfig {
        test_batch_size: 0,
        ..Default::default()
    };
    assert!(invalid.validate().is_err());
    Ok(())
}

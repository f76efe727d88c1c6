use crate::common::error::W2nerError;
use crate::resources::ResourceProvider;
use rust_tokenizers::tokenizer::{BertTokenizer, Tokenizer};
use rust_tokenizers::vocab::Vocab;

pub const CLS_TOKEN: &str = "[CLS]";
pub const SEP_TOKEN: &str = "[SEP]";
pub const PAD_TOKEN: &str = "[PAD]";

/// Ids of the special tokens surrounding and padding every sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTokenIds {
    pub cls: i64,
    pub sep: i64,
    pub pad: i64,
}

/// Loads a WordPiece tokenizer from a `vocab.txt` resource.
pub fn load_bert_tokenizer(
    vocab_resource: &dyn ResourceProvider,
    lower_case: bool,
) -> Result<BertTokenizer, W2nerError> {
    let vocab_path = vocab_resource.get_local_path()?;
    let vocab_path = vocab_path.to_str().ok_or_else(|| {
        W2nerError::InvalidConfigurationError(format!(
            "vocabulary path {} is not valid UTF-8",
            vocab_path.display()
        ))
    })?;
    Ok(BertTokenizer::from_file(vocab_path, lower_case, lower_case)?)
}

pub fn special_token_ids(tokenizer: &BertTokenizer) -> Result<SpecialTokenIds, W2nerError> {
    let values = Tokenizer::vocab(tokenizer).values();
    let lookup = |token: &str| {
        values.get(token).copied().ok_or_else(|| {
            W2nerError::InvalidConfigurationError(format!(
                "special token {} not found in the vocabulary",
                token
            ))
        })
    };
    Ok(SpecialTokenIds {
        cls: lookup(CLS_TOKEN)?,
        sep: lookup(SEP_TOKEN)?,
        pad: lookup(PAD_TOKEN)?,
    })
}

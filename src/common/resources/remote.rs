use super::*;
use crate::common::error::W2nerError;
use cached_path::{Cache, Options, ProgressBar};
use dirs::cache_dir;
use lazy_static::lazy_static;
use std::path::PathBuf;

/// # Remote resource that will be downloaded and cached locally on demand
#[derive(PartialEq, Clone, Debug)]
pub struct RemoteResource {
    /// Remote path/url for the resource
    pub url: String,
    /// Local subdirectory of the cache root where this resource is saved
    pub cache_subdir: String,
}

impl RemoteResource {
    /// Creates a new RemoteResource from an URL and a custom local path. Note that this does not
    /// download the resource (only declares the remote and local locations)
    ///
    /// # Arguments
    ///
    /// * `url` - `&str` Location of the remote resource
    /// * `cache_subdir` - `&str` Local subdirectory of the cache root to save the resource to
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rust_w2ner::resources::RemoteResource;
    /// let vocab_resource = RemoteResource::new(
    ///     "https://huggingface.co/bert-base-chinese/resolve/main/vocab.txt",
    ///     "bert-base-chinese",
    /// );
    /// ```
    pub fn new(url: &str, cache_subdir: &str) -> RemoteResource {
        RemoteResource {
            url: url.to_string(),
            cache_subdir: cache_subdir.to_string(),
        }
    }

    /// Creates a new RemoteResource from a `(name, url)` tuple, cached under
    /// `<cache root>/<name>`.
    pub fn from_pretrained(name_url_tuple: (&str, &str)) -> RemoteResource {
        let cache_subdir = name_url_tuple.0.to_string();
        let url = name_url_tuple.1.to_string();
        RemoteResource { url, cache_subdir }
    }
}

impl ResourceProvider for RemoteResource {
    /// Gets the local path for a remote resource.
    ///
    /// The remote resource is downloaded and cached. Then the path
    /// to the local cache is returned.
    fn get_local_path(&self) -> Result<PathBuf, W2nerError> {
        let cache = CACHE.as_ref().map_err(|e| {
            W2nerError::FileDownloadError(format!("could not initialize the cache: {}", e))
        })?;
        let cached_path =
            cache.cached_path_with_options(&self.url, &Options::default().subdir(&self.cache_subdir))?;
        Ok(cached_path)
    }
}

/// Pretrained vocabulary used by the Chinese tasks.
pub struct BertChineseVocabResources;

impl BertChineseVocabResources {
    /// Shared under Apache 2.0 license by the Google AI Language team at <https://huggingface.co/bert-base-chinese>.
    pub const BERT_BASE_CHINESE: (&'static str, &'static str) = (
        "bert-base-chinese/vocab",
        "https://huggingface.co/bert-base-chinese/resolve/main/vocab.txt",
    );
}

lazy_static! {
/// # Global cache directory
/// If the environment variable `W2NER_CACHE` is set, will save the cache files at that
/// location. Otherwise defaults to `$XDG_CACHE_HOME/.w2ner`, or corresponding user cache for
/// the current system.
    pub static ref CACHE: Result<Cache, String> = _get_cache_directory()
        .and_then(|dir| {
            Cache::builder()
                .dir(dir)
                .progress_bar(Some(ProgressBar::Light))
                .build()
                .map_err(|e| e.to_string())
        });
}

fn _get_cache_directory() -> Result<PathBuf, String> {
    match std::env::var("W2NER_CACHE") {
        Ok(value) => Ok(PathBuf::from(value)),
        Err(_) => {
            let mut home = cache_dir().ok_or_else(|| "no user cache directory".to_string())?;
            home.push(".w2ner");
            Ok(home)
        }
    }
}

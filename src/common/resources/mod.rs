//! # Resource definitions for vocabularies, configuration files and corpora
//!
//! The data preparation relies on the concept of Resources to access the files it reads:
//! - tokenizer vocabularies
//! - data configuration files
//!
//! Two types of resources are pre-defined:
//! - LocalResource: points to a local file
//! - RemoteResource: points to a remote file via a URL (requires the `remote` feature)
//!
//! For both types of resources, the local location of the file can be retrieved using
//! `get_local_path`, allowing to reference the resource file location regardless if it is a remote
//! or local resource.

mod local;

use crate::common::error::W2nerError;
pub use local::LocalResource;
use std::path::PathBuf;

/// # Resource Trait that can provide the location of the vocabulary or configuration resources
pub trait ResourceProvider {
    /// Provides the local path for a resource.
    ///
    /// # Returns
    ///
    /// * `PathBuf` pointing to the resource file
    fn get_local_path(&self) -> Result<PathBuf, W2nerError>;
}

/// Resolves a location given on the command line or in a configuration file: strings starting
/// with `http://` or `https://` become a `RemoteResource` (when the `remote` feature is enabled),
/// anything else a `LocalResource`.
pub fn resource_from_location(location: &str) -> Box<dyn ResourceProvider + Send> {
    #[cfg(feature = "remote")]
    {
        if location.starts_with("http://") || location.starts_with("https://") {
            return Box::new(RemoteResource::new(location, "downloads"));
        }
    }
    Box::new(LocalResource {
        local_path: PathBuf::from(location),
    })
}

#[cfg(feature = "remote")]
mod remote;
#[cfg(feature = "remote")]
pub use remote::{BertChineseVocabResources, RemoteResource};

//! Binary object store for fitted artifacts
//!
//! Fitted preprocessors and trained models are written with bincode's serde
//! integration. Parent directories are created on save; saving overwrites.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Serialize `object` to `path`, creating the parent directory if needed.
pub fn save_object<T: Serialize>(path: &Path, object: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::persistence(parent, e))?;
    }

    let bytes = bincode::serde::encode_to_vec(object, bincode::config::standard())
        .map_err(|e| PipelineError::persistence(path, e))?;
    std::fs::write(path, &bytes).map_err(|e| PipelineError::persistence(path, e))?;

    debug!(path = %path.display(), bytes = bytes.len(), "saved object");
    Ok(())
}

/// Deserialize an object previously written by [`save_object`].
pub fn load_object<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(PipelineError::NotFound {
            context: "object store",
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path).map_err(|e| PipelineError::persistence(path, e))?;
    let (object, _) = bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
        .map_err(|source| PipelineError::Corruption {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), bytes = bytes.len(), "loaded object");
    Ok(object)
}

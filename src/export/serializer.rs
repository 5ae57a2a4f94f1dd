//! Bincode model serialization

use crate::error::{HousingError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Save a serializable model to `path`. The parent directory must already exist.
pub fn save_model<M: Serialize>(model: &M, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;

    let file = File::create(path)
        .map_err(|e| HousingError::DataError(format!("Failed to create {}: {}", path.display(), e)))?;
    let mut writer = BufWriter::new(file);

    bincode::serialize_into(&mut writer, model)?;
    writer.flush()?;

    Ok(())
}

/// Load a model previously written by [`save_model`]
pub fn load_model<M: DeserializeOwned>(path: impl AsRef<Path>) -> Result<M> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| HousingError::DataError(format!("Failed to open {}: {}", path.display(), e)))?;
    let reader = BufReader::new(file);

    bincode::deserialize_from(reader).map_err(|e| {
        HousingError::SerializationError(format!("Failed to read {}: {}", path.display(), e))
    })
}

/// Save several models, checking every target directory before writing any file
pub fn save_models<M: Serialize>(models: &[(&M, PathBuf)]) -> Result<Vec<PathBuf>> {
    for (_, path) in models {
        ensure_parent_dir(path)?;
    }

    let mut written = Vec::with_capacity(models.len());
    for (model, path) in models {
        save_model(*model, path)?;
        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        info!(path = %path.display(), bytes = size, "Model saved");
        written.push(path.clone());
    }

    Ok(written)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Ok(()),
    };

    if !dir.is_dir() {
        return Err(HousingError::DataError(format!(
            "Output directory {} does not exist",
            dir.display()
        )));
    }
    Ok(())
}

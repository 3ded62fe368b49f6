//! Device profile persistence using JSON file storage

use crate::error::RegistryError;
use crate::registry::Registry;
use std::path::Path;
use tokio::fs;

/// Load a device profile from a JSON file
pub async fn load_profile(path: &Path) -> Result<Registry, RegistryError> {
    let contents = fs::read_to_string(path).await.map_err(|e| {
        tracing::warn!("Failed to read profile file {:?}: {}", path, e);
        e
    })?;
    let registry: Registry = serde_json::from_str(&contents).map_err(|e| {
        tracing::warn!("Failed to parse profile file {:?}: {}", path, e);
        e
    })?;
    tracing::info!(
        "Loaded profile {} ({} entries) from {:?}",
        registry.name(),
        registry.entries().len(),
        path
    );
    Ok(registry)
}

/// Save a device profile to a JSON file atomically
pub async fn save_profile(path: &Path, registry: &Registry) -> Result<(), RegistryError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(registry)?;

    // Write atomically: write to temp file, then rename
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &json).await?;
    fs::rename(&tmp_path, path).await?;

    tracing::debug!("Saved profile {} to {:?}", registry.name(), path);
    Ok(())
}

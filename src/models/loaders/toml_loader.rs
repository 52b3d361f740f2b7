use std::path::Path;

use tokio::fs;

use crate::error::{AppError, AppResult, FileError};
use crate::models::profile::ApplicationProfile;

/// Load the application profile from a TOML file
pub async fn load_profile(path: &Path) -> AppResult<ApplicationProfile> {
    if !path.exists() {
        return Err(AppError::File(FileError::NotFound {
            path: path.display().to_string(),
        }));
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let profile: ApplicationProfile = toml::from_str(&content).map_err(|e| {
        AppError::File(FileError::TomlParseFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })
    })?;

    tracing::info!(
        "Loaded profile: {} experience entries, {} languages",
        profile.experience_details.len(),
        profile.languages.len()
    );

    Ok(profile)
}

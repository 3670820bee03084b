//! Avatar upload processing
//!
//! An upload is written to the scratch directory, decoded, cropped to a
//! square of `AvatarConfig::size` and moved under `{public_dir}/avatars`,
//! which the server exposes at `/avatars`. The scratch file never outlives
//! the request.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use image::{imageops::FilterType, DynamicImage, ImageFormat, ImageReader};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::AvatarConfig, errors::ApiError};

/// URL prefix the avatars directory is served under
pub const AVATARS_PREFIX: &str = "avatars";

/// Moves processed avatars into the public directory
#[derive(Debug, Clone)]
pub struct AvatarStore {
    avatars_dir: PathBuf,
    tmp_dir: PathBuf,
    size: u32,
}

impl AvatarStore {
    pub fn new(config: &AvatarConfig) -> Self {
        Self {
            avatars_dir: config.avatars_dir(),
            tmp_dir: config.tmp_dir.clone(),
            size: config.size,
        }
    }

    pub fn avatars_dir(&self) -> &Path {
        &self.avatars_dir
    }

    /// Process `bytes` as the avatar of `user_id` and return its public
    /// relative URL, `avatars/{user_id}_{name}`
    pub async fn store(
        &self,
        user_id: &str,
        original_name: &str,
        bytes: Bytes,
    ) -> Result<String, ApiError> {
        let name = sanitize_file_name(original_name);
        tokio::fs::create_dir_all(&self.tmp_dir).await?;
        tokio::fs::create_dir_all(&self.avatars_dir).await?;

        let tmp_path = self.tmp_dir.join(format!("{}_{}", Uuid::new_v4().simple(), name));
        tokio::fs::write(&tmp_path, &bytes).await?;

        let result = self.publish(&tmp_path, user_id, &name).await;
        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(&tmp_path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %tmp_path.display(), error = %e, "failed to remove upload");
                }
            }
        }
        result
    }

    /// Delete a file previously returned by [`store`](Self::store).
    ///
    /// References outside `avatars/`, such as the default gravatar URL, are
    /// left alone. Failures are logged only.
    pub async fn remove(&self, avatar_url: &str) {
        let Some(name) = avatar_url.strip_prefix(&format!("{AVATARS_PREFIX}/")) else {
            return;
        };
        if name.is_empty() || name != sanitize_file_name(name) {
            warn!(avatar_url, "refusing to remove unexpected avatar path");
            return;
        }

        let path = self.avatars_dir.join(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!(path = %path.display(), "previous avatar removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove previous avatar"),
        }
    }

    async fn publish(&self, tmp_path: &Path, user_id: &str, name: &str) -> Result<String, ApiError> {
        let size = self.size;
        let path = tmp_path.to_path_buf();
        tokio::task::spawn_blocking(move || normalize_image(&path, size))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))??;

        let file_name = format!("{user_id}_{name}");
        let target = self.avatars_dir.join(&file_name);
        move_file(tmp_path, &target).await?;

        debug!(target = %target.display(), "avatar stored");
        Ok(format!("{AVATARS_PREFIX}/{file_name}"))
    }
}

/// Decode, crop to `size`x`size` and rewrite the file in its own format
fn normalize_image(path: &Path, size: u32) -> Result<(), ApiError> {
    let reader = ImageReader::open(path)?
        .with_guessed_format()
        .map_err(|e| ApiError::ImageProcessing(e.to_string()))?;
    let format = reader
        .format()
        .ok_or_else(|| ApiError::ImageProcessing("unrecognised image format".to_string()))?;
    let image = reader
        .decode()
        .map_err(|e| ApiError::ImageProcessing(e.to_string()))?;

    let resized = image.resize_to_fill(size, size, FilterType::Lanczos3);
    // JPEG has no alpha channel
    let resized = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
        _ => resized,
    };

    resized
        .save_with_format(path, format)
        .map_err(|e| ApiError::ImageProcessing(e.to_string()))
}

/// Rename, falling back to copy when the directories are on different devices
async fn move_file(from: &Path, to: &Path) -> Result<(), ApiError> {
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }
    tokio::fs::copy(from, to).await?;
    tokio::fs::remove_file(from).await?;
    Ok(())
}

/// Keep the final path component, restricted to a portable character set
pub fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "avatar".to_string()
    } else {
        cleaned.to_string()
    }
}

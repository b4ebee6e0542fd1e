use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::database::models::{Role, StoredFile};
use crate::database::repositories::FileRepository;
use crate::error::AppError;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
const MAX_FILENAME_LENGTH: usize = 255;

/// Keep only the final path component of a client-supplied name.
fn sanitize_filename(name: &str) -> Option<String> {
    let base = Path::new(name.trim()).file_name()?.to_str()?.trim();
    if base.is_empty() || base.len() > MAX_FILENAME_LENGTH {
        None
    } else {
        Some(base.to_string())
    }
}

/// Attachments stored on local disk under generated keys.
#[derive(Clone)]
pub struct FileService {
    repository: FileRepository,
    upload_dir: PathBuf,
    max_bytes: usize,
}

impl FileService {
    pub fn new(repository: FileRepository, upload_dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            repository,
            upload_dir: upload_dir.into(),
            max_bytes,
        }
    }

    pub async fn upload(
        &self,
        owner_id: Uuid,
        filename: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredFile, AppError> {
        let original_name = sanitize_filename(filename)
            .ok_or_else(|| AppError::BadRequest("Invalid file name".to_string()))?;

        if bytes.is_empty() {
            return Err(AppError::BadRequest("File is empty".to_string()));
        }
        if bytes.len() > self.max_bytes {
            return Err(AppError::BadRequest(format!(
                "File exceeds the {} byte limit",
                self.max_bytes
            )));
        }

        let storage_key = Uuid::new_v4().simple().to_string();
        let content_type = content_type
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|e| {
                log::error!("Failed to create upload directory: {}", e);
                AppError::internal_server_error_message("Failed to store file")
            })?;
        tokio::fs::write(self.upload_dir.join(&storage_key), bytes)
            .await
            .map_err(|e| {
                log::error!("Failed to write upload {}: {}", storage_key, e);
                AppError::internal_server_error_message("Failed to store file")
            })?;

        let stored = self
            .repository
            .create(
                owner_id,
                &original_name,
                content_type,
                bytes.len() as i64,
                &storage_key,
            )
            .await?;

        log::info!(
            "Stored file {} ({} bytes) for {}",
            stored.id,
            stored.size_bytes,
            owner_id
        );

        Ok(stored)
    }

    /// Metadata and content, for the owner or HR/administrators.
    pub async fn download(
        &self,
        id: Uuid,
        viewer_id: Uuid,
        viewer_role: Role,
    ) -> Result<(StoredFile, Vec<u8>), AppError> {
        let file = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", id)))?;

        if file.owner_id != viewer_id && !viewer_role.is_hr_or_admin() {
            return Err(AppError::Forbidden(
                "Cannot access another user's file".to_string(),
            ));
        }

        let bytes = tokio::fs::read(self.upload_dir.join(&file.storage_key))
            .await
            .map_err(|e| {
                log::error!("Stored content of file {} is unreadable: {}", file.id, e);
                AppError::NotFound(format!("Content of file {} is missing", id))
            })?;

        Ok((file, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_lose_their_directories() {
        assert_eq!(sanitize_filename("report.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(
            sanitize_filename("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(sanitize_filename("   "), None);
        assert_eq!(sanitize_filename(".."), None);
    }
}

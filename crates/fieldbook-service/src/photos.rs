use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use rand::RngCore;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, error, warn};

use fieldbook_db::{Database, Result, time};
use fieldbook_types::models::Photo;

/// Upload ceiling: 10 MiB.
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Default upload root, relative to the working directory.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads/photos";

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Validates, names, and persists uploaded photo bytes plus their metadata
/// record. The file write and the metadata insert succeed or fail together:
/// a file written before a failed insert is deleted before returning.
pub struct PhotoStore {
    db: Arc<Database>,
    upload_dir: PathBuf,
}

impl PhotoStore {
    pub fn new(db: Arc<Database>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            db,
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// True iff the lower-cased extension is on the allow-list.
    pub fn is_allowed(filename: &str) -> bool {
        match extension(filename) {
            Some(ext) => ALLOWED_EXTENSIONS.contains(&ext.as_str()),
            None => false,
        }
    }

    /// Collision-resistant storage name: UTC timestamp to second precision
    /// plus an 8-byte random token, keeping only the lower-cased extension
    /// from the original name.
    pub fn generate_unique_name(original_filename: &str) -> String {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let mut token = [0u8; 8];
        rand::rng().fill_bytes(&mut token);

        match extension(original_filename) {
            Some(ext) => format!("{timestamp}_{}.{ext}", hex::encode(token)),
            None => format!("{timestamp}_{}", hex::encode(token)),
        }
    }

    /// Persist uploaded bytes and their metadata record. Returns `Ok(None)`
    /// when the extension is not allowed, the payload is empty, or the
    /// payload exceeds [`MAX_FILE_SIZE`] — nothing is written in those
    /// cases.
    pub async fn save(
        &self,
        bytes: &[u8],
        original_filename: &str,
        mime_type: &str,
        metadata: Option<Value>,
    ) -> Result<Option<Photo>> {
        if !Self::is_allowed(original_filename) {
            debug!(filename = %original_filename, "rejected upload: extension not allowed");
            return Ok(None);
        }

        if bytes.is_empty() || bytes.len() > MAX_FILE_SIZE {
            debug!(
                filename = %original_filename,
                size = bytes.len(),
                "rejected upload: size out of bounds"
            );
            return Ok(None);
        }

        fs::create_dir_all(&self.upload_dir).await?;

        let filename = Self::generate_unique_name(original_filename);
        let file_path = self.upload_dir.join(&filename);

        fs::write(&file_path, bytes).await?;

        let uploaded_at = time::encode(Utc::now());
        let metadata = metadata.unwrap_or_else(|| Value::Object(Default::default()));

        let inserted = self.db.insert_photo(
            &filename,
            original_filename,
            &file_path.to_string_lossy(),
            bytes.len() as i64,
            mime_type,
            &uploaded_at,
            &metadata.to_string(),
        );

        match inserted {
            Ok(id) => match self.db.get_photo_by_id(id)? {
                Some(row) => Ok(Some(row.into_photo()?)),
                None => Ok(None),
            },
            Err(err) => {
                // The metadata insert failed after the file write: remove
                // the file so no orphan is left behind.
                if let Err(remove_err) = fs::remove_file(&file_path).await {
                    warn!(path = %file_path.display(), "orphan cleanup failed: {remove_err}");
                }
                error!(filename = %original_filename, "photo save failed: {err}");
                Err(err)
            }
        }
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<Photo>> {
        match self.db.get_photo_by_id(id)? {
            Some(row) => Ok(Some(row.into_photo()?)),
            None => Ok(None),
        }
    }
}

fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_is_case_insensitive() {
        assert!(PhotoStore::is_allowed("visit.jpg"));
        assert!(PhotoStore::is_allowed("visit.jpeg"));
        assert!(PhotoStore::is_allowed("visit.png"));
        assert!(PhotoStore::is_allowed("visit.gif"));
        assert!(PhotoStore::is_allowed("visit.webp"));
        assert!(PhotoStore::is_allowed("VISIT.JPG"));

        assert!(!PhotoStore::is_allowed("visit.txt"));
        assert!(!PhotoStore::is_allowed("visit.pdf"));
        assert!(!PhotoStore::is_allowed("visit"));
        assert!(!PhotoStore::is_allowed(""));
    }

    #[test]
    fn generated_names_are_unique() {
        let first = PhotoStore::generate_unique_name("visit.jpg");
        let second = PhotoStore::generate_unique_name("visit.jpg");

        assert_ne!(first, second);
        assert!(first.ends_with(".jpg"));
        assert!(second.ends_with(".jpg"));
    }

    #[test]
    fn generated_name_lowercases_extension() {
        let name = PhotoStore::generate_unique_name("SCAN.PNG");
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn generated_name_ignores_original_stem() {
        let name = PhotoStore::generate_unique_name("../../etc/passwd.jpg");
        assert!(!name.contains("passwd"));
        assert!(!name.contains('/'));
        assert!(name.ends_with(".jpg"));
    }
}

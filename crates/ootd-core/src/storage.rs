//! Flat on-disk image store.
//!
//! Images live directly under the data directory; the generated filename is
//! the only identifier. Names combine the current epoch milliseconds with
//! random hex so concurrent uploads never need a lock.
//!
//! ```rust,no_run
//! use ootd_core::storage::ImageStore;
//!
//! # async fn demo(png: Vec<u8>) -> ootd_core::Result<()> {
//! let store = ImageStore::new("data");
//! let stored = store.save(&png, Some("selfie.PNG")).await?;
//! let bytes = store.read(&stored.filename).await?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::defaults::{
    DATA_DIR_NAME, FALLBACK_EXTENSION, IMAGE_FILENAME_PREFIX, IMAGE_FILENAME_RANDOM_HEX,
};
use crate::signature;
use crate::{Error, Result, StoredImage};

/// Filesystem store rooted at the data directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    data_dir: PathBuf,
}

impl ImageStore {
    /// Create a store rooted at the given directory. The directory is created
    /// lazily on the first save.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Persist an already validated payload under a freshly generated name.
    pub async fn save(&self, data: &[u8], declared_filename: Option<&str>) -> Result<StoredImage> {
        fs::create_dir_all(&self.data_dir).await.map_err(|e| {
            warn!(data_dir = %self.data_dir.display(), error = %e, "image_store: create_dir_all failed");
            e
        })?;

        let filename = generate_filename(&resolve_extension(declared_filename, data));
        let save_path = self.data_dir.join(&filename);
        debug!(save_path = %save_path.display(), size_bytes = data.len(), "image_store: write");

        let mut file = fs::File::create(&save_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        // Stored images are data, never executables
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&save_path, std::fs::Permissions::from_mode(0o644)).await?;
        }

        let absolute = fs::canonicalize(&save_path)
            .await
            .unwrap_or_else(|_| save_path.clone());
        info!(save_path = %absolute.display(), size_bytes = data.len(), "Image uploaded");

        Ok(StoredImage {
            relative_path: format!("{}/{}", DATA_DIR_NAME, filename),
            filename,
            size_bytes: data.len() as u64,
        })
    }

    /// Resolve a stored file name to its path, failing if it does not exist.
    ///
    /// Names that could escape the data directory are treated as missing.
    pub async fn resolve(&self, file_name: &str) -> Result<PathBuf> {
        if !is_plain_file_name(file_name) {
            return Err(not_found(file_name));
        }
        let path = self.data_dir.join(file_name);
        if !fs::try_exists(&path).await? {
            return Err(not_found(file_name));
        }
        Ok(path)
    }

    /// Read a stored file in full.
    pub async fn read(&self, file_name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(file_name).await?;
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            // Deleted between the existence check and the read
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found(file_name)),
            Err(e) => Err(e.into()),
        }
    }
}

fn not_found(file_name: &str) -> Error {
    Error::NotFound(format!(
        "{} (expected under the {}/ directory)",
        file_name, DATA_DIR_NAME
    ))
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
        && !name.contains("..")
}

/// Choose the stored extension: the declared filename's extension when it
/// has one, else the sniffed format, else the generic binary extension.
pub fn resolve_extension(declared_filename: Option<&str>, data: &[u8]) -> String {
    declared_filename
        .and_then(declared_extension)
        .or_else(|| signature::detect(data).map(|f| f.extension().to_string()))
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

/// Lower-cased text after the last dot, limited to ASCII alphanumerics.
fn declared_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext: String = ext
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    (!ext.is_empty()).then_some(ext)
}

/// Generate `image_<epoch_millis>_<8 hex>.<ext>`.
pub fn generate_filename(extension: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}.{}",
        IMAGE_FILENAME_PREFIX,
        chrono::Utc::now().timestamp_millis(),
        &random[..IMAGE_FILENAME_RANDOM_HEX],
        extension
    )
}

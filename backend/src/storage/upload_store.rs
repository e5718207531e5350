use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

/// Every upload is stored with this extension whatever its real format.
pub const UPLOAD_EXTENSION: &str = "jpg";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to create upload directory {}: {}", .0.display(), .1)]
    CreateDir(PathBuf, #[source] std::io::Error),
    #[error("Failed to write upload {}: {}", .0.display(), .1)]
    Write(PathBuf, #[source] std::io::Error),
    #[error("Upload directory {} would be served at the site root", .0.display())]
    RootDirectory(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredImage {
    pub file_name: String,
    pub path: PathBuf,
    pub url: String,
}

/// Flat, append-only directory of uploaded images. Files are never removed.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    url_prefix: String,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        let url_prefix = Self::web_path(&dir);
        if url_prefix == "/" {
            return Err(StorageError::RootDirectory(dir));
        }
        fs::create_dir_all(&dir).map_err(|e| StorageError::CreateDir(dir.clone(), e))?;
        Ok(Self { dir, url_prefix })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// `<32 hex chars>.jpg`
    pub fn generate_file_name() -> String {
        format!("{}.{}", Uuid::new_v4().simple(), UPLOAD_EXTENSION)
    }

    pub fn save(&self, image_data: &[u8]) -> Result<StoredImage, StorageError> {
        let file_name = Self::generate_file_name();
        let path = self.dir.join(&file_name);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| StorageError::Write(path.clone(), e))?;
        file.write_all(image_data)
            .map_err(|e| StorageError::Write(path.clone(), e))?;

        let url = format!("{}/{}", self.url_prefix, file_name);
        Ok(StoredImage { file_name, path, url })
    }

    fn web_path(dir: &Path) -> String {
        let segments: Vec<String> = dir
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        format!("/{}", segments.join("/"))
    }
}

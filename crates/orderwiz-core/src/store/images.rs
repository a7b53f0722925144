//! Managed directory for attached order screenshots.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use image::ImageFormat;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{OrderError, Result};

/// Image formats accepted as order screenshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl ImageKind {
    /// File extension used for stored copies.
    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpg",
            ImageKind::Gif => "gif",
            ImageKind::Bmp => "bmp",
        }
    }

    fn from_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(ImageKind::Png),
            ImageFormat::Jpeg => Some(ImageKind::Jpeg),
            ImageFormat::Gif => Some(ImageKind::Gif),
            ImageFormat::Bmp => Some(ImageKind::Bmp),
            _ => None,
        }
    }
}

/// Sniff the image format from its magic bytes.
pub fn detect_format(bytes: &[u8]) -> Option<ImageKind> {
    image::guess_format(bytes)
        .ok()
        .and_then(ImageKind::from_format)
}

/// What to do with an order's image file when the order is deleted
/// or its image is replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRetention {
    /// Leave the file on disk.
    #[default]
    Keep,
    /// Remove the file if it lives in the managed directory.
    Delete,
}

/// Copies screenshots into a dedicated directory under unique names.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// The directory is created on first import.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy an image file into the managed directory.
    pub fn import_file(&self, source: &Path) -> Result<PathBuf> {
        let bytes = fs::read(source)?;
        debug!("Importing image {} ({} bytes)", source.display(), bytes.len());
        self.import_bytes(&bytes)
    }

    /// Store image bytes in the managed directory.
    pub fn import_bytes(&self, bytes: &[u8]) -> Result<PathBuf> {
        let kind = detect_format(bytes).ok_or_else(|| {
            OrderError::validation("image", "unsupported format (expected PNG, JPEG, GIF or BMP)")
        })?;

        fs::create_dir_all(&self.dir)?;

        let path = self
            .dir
            .join(format!("{}.{}", Uuid::new_v4(), kind.extension()));
        fs::write(&path, bytes)?;

        info!("Stored image at {}", path.display());
        Ok(path)
    }

    /// True if `path` points into the managed directory.
    ///
    /// Paths with `..` components are never considered managed.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.dir)
            && !path.components().any(|c| matches!(c, Component::ParentDir))
    }

    /// Remove a managed image. Returns whether a file was deleted.
    ///
    /// Paths outside the managed directory are never touched.
    pub fn remove(&self, path: &Path) -> Result<bool> {
        if !self.contains(path) {
            debug!("Not removing unmanaged image {}", path.display());
            return Ok(false);
        }

        match fs::remove_file(path) {
            Ok(()) => {
                info!("Removed image {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(PNG_MAGIC), Some(ImageKind::Png));
        assert_eq!(detect_format(b"\xff\xd8\xff\xe0\0\x10JFIF"), Some(ImageKind::Jpeg));
        assert_eq!(detect_format(b"GIF89a\x01\0\x01\0"), Some(ImageKind::Gif));
        assert_eq!(detect_format(b"BM\x3a\0\0\0\0\0\0\0"), Some(ImageKind::Bmp));
        assert_eq!(detect_format(b"%PDF-1.7"), None);
        assert_eq!(detect_format(b""), None);
    }

    #[test]
    fn test_import_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().join("images"));

        let path = store.import_bytes(PNG_MAGIC).unwrap();
        assert!(path.exists());
        assert!(store.contains(&path));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));

        assert!(store.remove(&path).unwrap());
        assert!(!path.exists());
        assert!(!store.remove(&path).unwrap());
    }

    #[test]
    fn test_import_file_copies() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("shot.gif");
        fs::write(&source, b"GIF89a\x01\0\x01\0").unwrap();

        let store = ImageStore::new(dir.path().join("images"));
        let copy = store.import_file(&source).unwrap();

        assert_ne!(copy, source);
        assert!(source.exists());
        assert_eq!(fs::read(&copy).unwrap(), fs::read(&source).unwrap());
    }

    #[test]
    fn test_rejects_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());
        let err = store.import_bytes(b"plain text").unwrap_err();
        assert!(matches!(err, OrderError::Validation { .. }));
    }

    #[test]
    fn test_remove_ignores_unmanaged() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("outside.png");
        fs::write(&outside, PNG_MAGIC).unwrap();

        let store = ImageStore::new(dir.path().join("images"));
        assert!(!store.remove(&outside).unwrap());
        assert!(outside.exists());
    }

    #[test]
    fn test_remove_ignores_parent_dir_escape() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("outside.png");
        fs::write(&outside, PNG_MAGIC).unwrap();

        let store = ImageStore::new(dir.path().join("images"));
        let escape = store.dir().join("..").join("outside.png");

        assert!(!store.contains(&escape));
        assert!(!store.remove(&escape).unwrap());
        assert!(outside.exists());
    }
}

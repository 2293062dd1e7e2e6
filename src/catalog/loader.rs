//! Catalog file loading.
//!
//! The catalog is read once per session. Any failure here is fatal for the
//! session and is shown on the full-screen error view, which offers a retry.
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::types::{Catalog, Category};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog file too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Catalog {
    /// Maximum catalog file size (16 MiB).
    const MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

    /// Load the catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// - `CatalogError::NotFound` if the file does not exist
    /// - `CatalogError::TooLarge` if the file exceeds 16 MiB
    /// - `CatalogError::Parse` if the content is not a valid catalog
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(CatalogError::TooLarge {
                    size: meta.len(),
                    max: Self::MAX_FILE_SIZE,
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CatalogError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(CatalogError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CatalogError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(CatalogError::Io(e)),
        };

        let catalog = Self::from_json(&content)?;
        tracing::info!(
            path = %path.display(),
            total = catalog.total(),
            modals = catalog.modals.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// Parse a catalog from JSON text. Missing categories are empty.
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(content)?;

        for category in Category::ALL {
            for item in catalog.items(category) {
                if let Some(modal) = &item.modal {
                    if !catalog.modals.contains_key(modal) {
                        tracing::warn!(
                            item = %item.name,
                            modal = %modal,
                            "Item references an unknown modal"
                        );
                    }
                }
            }
        }

        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ItemAction;

    const SAMPLE: &str = r#"{
        "programas": [
            {"name": "7-Zip", "info": "File archiver", "icon": "fa-file-zipper",
             "badges": ["Gratuito", "Open Source"], "enlace": "https://www.7-zip.org/a/7z.exe"}
        ],
        "juegos": [
            {"name": "Doom", "info": "Classic shooter", "badges": ["Portable"],
             "enlace": "none", "modal": "doomModal"}
        ],
        "modales": {
            "doomModal": {"titulo": "Doom", "descripcion": "Pick one",
                          "botones": [{"texto": "Mirror 1", "enlace": "https://mega.nz/x"}]}
        }
    }"#;

    #[test]
    fn test_from_json_missing_categories_are_empty() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.count(Category::Programs), 1);
        assert_eq!(catalog.count(Category::Games), 1);
        assert_eq!(catalog.count(Category::Systems), 0);
        assert_eq!(catalog.count(Category::Apks), 0);
        assert_eq!(catalog.total(), 2);
        assert_eq!(
            catalog.items(Category::Games)[0].action(),
            ItemAction::Modal("doomModal".to_string())
        );
        assert_eq!(catalog.modal("doomModal").unwrap().buttons.len(), 1);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = Catalog::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let path = Path::new("/tmp/foxweb_test_no_such_catalog.json");
        let err = Catalog::load(path).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join("foxweb_catalog_test_load");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.total(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("foxweb_catalog_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.json");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(Catalog::MAX_FILE_SIZE + 1).unwrap();

        let err = Catalog::load(&path).unwrap_err();
        assert!(matches!(err, CatalogError::TooLarge { .. }));

        std::fs::remove_dir_all(&dir).ok();
    }
}

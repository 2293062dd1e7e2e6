//! Read-only download catalog: categories, items and download modals.

mod changes;
mod loader;
mod types;

pub use changes::{detect_new_content, fingerprint, ContentChanges, NameSnapshot};
pub use loader::CatalogError;
pub use types::{Catalog, CatalogItem, Category, ItemAction, ItemId, ModalButton, ModalSpec};

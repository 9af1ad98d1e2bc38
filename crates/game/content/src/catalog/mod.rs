//! In-memory collaborator implementations backed by loaded content.

mod items;
mod templates;

pub use items::ItemCatalog;
pub use templates::TemplateCatalog;

//! Data-driven content for the summon engine.
//!
//! This crate provides in-memory implementations of the engine's
//! collaborator traits and loaders that fill them from data files:
//! - Item catalog and storage ([`ItemCatalog`], RON)
//! - Creature templates ([`TemplateCatalog`], RON)
//! - Engine configuration (TOML)
//!
//! The catalogs are always available; the file loaders sit behind the
//! `loaders` feature.

pub mod catalog;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::{ItemCatalog, TemplateCatalog};

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, ItemCatalogFile, ItemLoader, LoadedContent, TemplateCatalogFile,
    TemplateLoader,
};

//! Catalog model, scanning, and the artist universe fed to image batches.

pub(crate) mod artist_extraction;
pub(crate) mod artist_store;
pub(crate) mod library_scanner;
pub(crate) mod models;

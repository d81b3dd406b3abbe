//! Tag readers used by catalog scans.

pub(crate) mod metadata_tags;

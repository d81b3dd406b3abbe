//! Shared in-memory artist universe read by image batches.

use std::sync::{Arc, RwLock};

use crate::library::models::Artist;

#[derive(Debug, Clone, Default)]
pub struct ArtistStore {
    artists: Arc<RwLock<Vec<Artist>>>,
}

impl ArtistStore {
    pub fn new(artists: Vec<Artist>) -> Self {
        Self {
            artists: Arc::new(RwLock::new(artists)),
        }
    }

    pub fn replace_all(&self, artists: Vec<Artist>) {
        match self.artists.write() {
            Ok(mut guard) => *guard = artists,
            Err(poisoned) => *poisoned.into_inner() = artists,
        }
    }

    /// Copy of the current artists; batches work on a snapshot.
    pub fn snapshot(&self) -> Vec<Artist> {
        match self.artists.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self.artists.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ArtistStore;
    use crate::library::models::Artist;

    #[test]
    fn test_replace_all_is_visible_through_clones() {
        let store = ArtistStore::default();
        let handle = store.clone();
        store.replace_all(vec![Artist::new("Low"), Artist::new("Air")]);
        assert_eq!(handle.len(), 2);
        assert_eq!(handle.snapshot()[1].name, "Air");
    }
}

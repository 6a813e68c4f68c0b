//! Set of consumed key images.

use lode_core::KeyImage;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Membership set answering "was this key image already spent".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpentImageSet {
    images: HashSet<KeyImage>,
}

impl SpentImageSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an image; returns `false` when it was already present.
    pub fn insert(&mut self, image: KeyImage) -> bool {
        self.images.insert(image)
    }

    /// Remove an image; returns `false` when it was absent.
    pub fn remove(&mut self, image: &KeyImage) -> bool {
        self.images.remove(image)
    }

    /// Membership test.
    pub fn contains(&self, image: &KeyImage) -> bool {
        self.images.contains(image)
    }

    /// Number of spent images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// True when nothing is spent.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

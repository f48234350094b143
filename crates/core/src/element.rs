//! Dataset elements
//!
//! An element is the unit a cursor produces and a chunk stores. It is an
//! ordered list of byte-buffer components, the way a dataset element is a
//! tuple of tensors. The writer never looks inside the components; it only
//! needs the estimated size for its chunk rotation policy.

use serde::{Deserialize, Serialize};

/// One element of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    components: Vec<Vec<u8>>,
}

impl Element {
    /// Create an element from its components
    pub fn new(components: Vec<Vec<u8>>) -> Self {
        Element { components }
    }

    /// Create a single-component element
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Element {
            components: vec![bytes.into()],
        }
    }

    /// Components in order
    pub fn components(&self) -> &[Vec<u8>] {
        &self.components
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True if the element has no components
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Estimated in-memory size in bytes.
    ///
    /// Sum of the component lengths. Framing and encoding overhead are not
    /// counted, so the bytes a sink writes can be slightly larger.
    pub fn estimated_size_bytes(&self) -> u64 {
        self.components.iter().map(|c| c.len() as u64).sum()
    }

    /// Consume the element, returning its components
    pub fn into_components(self) -> Vec<Vec<u8>> {
        self.components
    }
}

impl From<Vec<Vec<u8>>> for Element {
    fn from(components: Vec<Vec<u8>>) -> Self {
        Element::new(components)
    }
}

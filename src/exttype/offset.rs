// Sat Oct 17 2026 - Alex

use crate::exttype::Alignment;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte distance from an object's base address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Offset {
    value: usize,
}

impl Offset {
    pub const fn new(value: usize) -> Self {
        Self { value }
    }

    pub fn as_usize(&self) -> usize {
        self.value
    }

    pub fn is_aligned(&self, alignment: Alignment) -> bool {
        self.value % alignment.as_usize() == 0
    }

    /// Round up to the next multiple of `alignment`.
    pub fn align_to(self, alignment: Alignment) -> Option<Self> {
        alignment.align(self.value).map(Self::new)
    }

    pub fn advance(self, bytes: usize) -> Option<Self> {
        self.value.checked_add(bytes).map(Self::new)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.value)
    }
}

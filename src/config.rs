// Sat Oct 17 2026 - Alex

use crate::exttype::{Alignment, LayoutError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// ABI constants the layout engine computes offsets against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Size of a pointer (and of a vtable slot) in bytes.
    pub pointer_size: usize,
    /// Runtime bookkeeping preceding the vtable pointer (refcount + type pointer).
    pub object_header_size: usize,
    /// Bytes in front of slot 0 inside a vtable.
    pub vtable_header_size: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            pointer_size: 8,
            object_header_size: 16,
            vtable_header_size: 0,
        }
    }
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pointer_size(mut self, pointer_size: usize) -> Self {
        self.pointer_size = pointer_size;
        self
    }

    pub fn with_object_header_size(mut self, size: usize) -> Self {
        self.object_header_size = size;
        self
    }

    pub fn with_vtable_header_size(mut self, size: usize) -> Self {
        self.vtable_header_size = size;
        self
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn pointer_alignment(&self) -> Alignment {
        Alignment::natural(self.pointer_size)
    }

    /// Offset of the vtable pointer in a root object.
    pub fn vtab_pointer_offset(&self) -> usize {
        self.object_header_size
    }

    /// Fixed object header: runtime bookkeeping plus the vtable pointer.
    pub fn header_size(&self) -> usize {
        self.object_header_size + self.pointer_size
    }

    pub fn validate(&self) -> Result<()> {
        let pointer = Alignment::new(self.pointer_size).map_err(|_| {
            LayoutError::InvalidConfig(format!(
                "pointer_size must be a non-zero power of two, got {}",
                self.pointer_size
            ))
        })?;
        if self.object_header_size % pointer.as_usize() != 0 {
            return Err(LayoutError::InvalidConfig(format!(
                "object_header_size {} is not pointer aligned",
                self.object_header_size
            )));
        }
        if self.vtable_header_size % pointer.as_usize() != 0 {
            return Err(LayoutError::InvalidConfig(format!(
                "vtable_header_size {} is not pointer aligned",
                self.vtable_header_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_header() {
        let config = LayoutConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.header_size(), 24);
        assert_eq!(config.vtab_pointer_offset(), 16);
    }

    #[test]
    fn test_validate() {
        assert!(LayoutConfig::new().with_pointer_size(0).validate().is_err());
        assert!(LayoutConfig::new().with_pointer_size(6).validate().is_err());
        assert!(LayoutConfig::new().with_object_header_size(12).validate().is_err());
        assert!(LayoutConfig::new()
            .with_pointer_size(4)
            .with_object_header_size(8)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LayoutConfig = serde_json::from_str(r#"{"vtable_header_size": 16}"#).unwrap();
        assert_eq!(config.pointer_size, 8);
        assert_eq!(config.vtable_header_size, 16);
    }
}

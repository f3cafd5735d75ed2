// Sat Oct 17 2026 - Alex

use crate::exttype::{AttrType, ExtensionTypeDescriptor, LayoutError, Result};
use ahash::RandomState;
use indexmap::IndexMap;
use itertools::Itertools;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The two descriptor kinds. Both share the layout algorithm; they differ
/// only in how the compiler picks a method body for a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionKind {
    /// Methods are bound once to a fixed signature.
    #[default]
    StaticSignature,
    /// Methods are compiled per observed argument types.
    InferredPerCall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPolicy {
    BoundOnce,
    PerCallSite,
}

impl ExtensionKind {
    pub fn lookup_policy(self) -> LookupPolicy {
        match self {
            Self::StaticSignature => LookupPolicy::BoundOnce,
            Self::InferredPerCall => LookupPolicy::PerCallSite,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::StaticSignature => "StaticExtension",
            Self::InferredPerCall => "InferredExtension",
        }
    }
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One compiled body of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specialization {
    pub id: usize,
    pub method: String,
    pub slot: usize,
    pub arg_types: Vec<AttrType>,
    pub implementation: String,
}

type SpecKey = (String, Vec<AttrType>);

/// Compiled bodies of one extension type's methods. Every specialization
/// refers to the same descriptor, whatever argument types produced it.
pub struct SpecializationTable {
    descriptor: Arc<ExtensionTypeDescriptor>,
    entries: RwLock<IndexMap<SpecKey, Arc<Specialization>, RandomState>>,
}

impl SpecializationTable {
    pub fn new(descriptor: Arc<ExtensionTypeDescriptor>) -> Self {
        Self {
            descriptor,
            entries: RwLock::new(IndexMap::default()),
        }
    }

    pub fn descriptor(&self) -> &Arc<ExtensionTypeDescriptor> {
        &self.descriptor
    }

    /// Select (creating on first use) the body for a call of `method` with
    /// the given argument types.
    pub fn specialize(&self, method: &str, arg_types: &[AttrType]) -> Result<Arc<Specialization>> {
        let slot = self.descriptor.method_slot(method)?;
        let mismatch = |expected: String| LayoutError::MethodSignatureMismatch {
            class: self.descriptor.id().to_string(),
            method: method.to_string(),
            expected,
            found: format!("({})", arg_types.iter().join(", ")),
        };

        let key: SpecKey = match self.descriptor.kind().lookup_policy() {
            LookupPolicy::BoundOnce => {
                if let Some(ref sig) = slot.signature {
                    if sig.params.as_slice() != arg_types {
                        return Err(mismatch(sig.to_string()));
                    }
                }
                (method.to_string(), Vec::new())
            }
            LookupPolicy::PerCallSite => (method.to_string(), arg_types.to_vec()),
        };

        let bound = |existing: &Arc<Specialization>| {
            if existing.arg_types.as_slice() == arg_types {
                Ok(existing.clone())
            } else {
                Err(mismatch(format!("({})", existing.arg_types.iter().join(", "))))
            }
        };

        if let Some(existing) = self.entries.read().get(&key) {
            return bound(existing);
        }

        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(&key) {
            return bound(existing);
        }
        let implementation = match self.descriptor.kind().lookup_policy() {
            LookupPolicy::BoundOnce => slot.implementation.clone(),
            LookupPolicy::PerCallSite => {
                format!("{}[{}]", slot.implementation, arg_types.iter().join(","))
            }
        };
        let spec = Arc::new(Specialization {
            id: entries.len(),
            method: method.to_string(),
            slot: slot.index,
            arg_types: arg_types.to_vec(),
            implementation,
        });
        log::debug!(
            "{}: new body {} for slot {}",
            self.descriptor.name(),
            spec.implementation,
            spec.slot
        );
        entries.insert(key, spec.clone());
        Ok(spec)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn specializations(&self) -> Vec<Arc<Specialization>> {
        self.entries.read().values().cloned().collect()
    }
}

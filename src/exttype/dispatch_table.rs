// Sat Oct 17 2026 - Alex

use crate::exttype::{LayoutError, MethodDecl, MethodSignature, Result, TableKind};
use ahash::{AHashSet, RandomState};
use indexmap::IndexMap;
use std::fmt;

/// One entry of the dispatch table. `index` equals the entry's position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSlot {
    pub index: usize,
    pub signature: Option<MethodSignature>,
    pub implementation: String,
    /// Class providing the current implementation.
    pub defined_in: String,
    /// Class that first introduced the slot.
    pub introduced_by: String,
}

impl MethodSlot {
    pub fn is_override(&self) -> bool {
        self.defined_in != self.introduced_by
    }
}

impl fmt::Display for MethodSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.index, self.implementation)?;
        if let Some(ref sig) = self.signature {
            write!(f, " {}", sig)?;
        }
        if self.is_override() {
            write!(f, " [override of {}]", self.introduced_by)?;
        }
        Ok(())
    }
}

pub type MethodMap = IndexMap<String, MethodSlot, RandomState>;

/// Ordered method name -> slot table (the vtable shape).
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    owner: String,
    methods: MethodMap,
    local: AHashSet<String>,
}

impl DispatchTable {
    pub fn new(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            methods: MethodMap::default(),
            local: AHashSet::new(),
        }
    }

    pub fn from_methods<I>(owner: &str, methods: I) -> Result<Self>
    where
        I: IntoIterator<Item = MethodDecl>,
    {
        let mut table = Self::new(owner);
        for method in methods {
            table.add_method(method)?;
        }
        Ok(table)
    }

    /// Copy of the parent's name -> slot map for a subclass to extend.
    pub fn derive(&self, owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            methods: self.methods.clone(),
            local: AHashSet::new(),
        }
    }

    /// Register a method: an inherited name keeps its slot, a new name gets
    /// the next free one. Returns the slot index.
    pub fn add_method(&mut self, method: MethodDecl) -> Result<usize> {
        if !self.local.insert(method.name.clone()) {
            return Err(LayoutError::DuplicateName {
                class: self.owner.clone(),
                table: TableKind::Dispatch,
                name: method.name,
            });
        }
        let implementation = method.implementation_for(&self.owner);

        if let Some(slot) = self.methods.get_mut(&method.name) {
            if let (Some(expected), Some(found)) = (&slot.signature, &method.signature) {
                if !expected.is_compatible(found) {
                    let err = LayoutError::MethodSignatureMismatch {
                        class: self.owner.clone(),
                        method: method.name.clone(),
                        expected: expected.to_string(),
                        found: found.to_string(),
                    };
                    self.local.remove(&method.name);
                    return Err(err);
                }
            }
            if slot.signature.is_none() {
                slot.signature = method.signature;
            }
            slot.implementation = implementation;
            slot.defined_in = self.owner.clone();
            log::trace!("{}.{} overrides slot {}", self.owner, method.name, slot.index);
            return Ok(slot.index);
        }

        let index = self.methods.len();
        self.methods.insert(
            method.name.clone(),
            MethodSlot {
                index,
                signature: method.signature,
                implementation,
                defined_in: self.owner.clone(),
                introduced_by: self.owner.clone(),
            },
        );
        log::trace!("{}.{} gets new slot {}", self.owner, method.name, index);
        Ok(index)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn methoddict(&self) -> &MethodMap {
        &self.methods
    }

    /// Method names in slot order.
    pub fn methodnames(&self) -> Vec<&str> {
        self.methods.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<&MethodSlot> {
        self.methods.get(name)
    }

    pub fn by_slot(&self, index: usize) -> Option<(&str, &MethodSlot)> {
        self.methods
            .get_index(index)
            .map(|(name, slot)| (name.as_str(), slot))
    }

    pub fn slot_count(&self) -> usize {
        self.methods.len()
    }

    pub fn max_slot(&self) -> Option<usize> {
        self.methods.len().checked_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exttype::AttrType;

    #[test]
    fn test_slots_follow_declaration_order() {
        let table = DispatchTable::from_methods(
            "A",
            vec![MethodDecl::new("foo"), MethodDecl::new("bar"), MethodDecl::new("baz")],
        )
        .unwrap();
        assert_eq!(table.methodnames(), vec!["foo", "bar", "baz"]);
        assert_eq!(table.get("baz").unwrap().index, 2);
        assert_eq!(table.by_slot(1).unwrap().0, "bar");
        assert_eq!(table.max_slot(), Some(2));
        assert_eq!(DispatchTable::new("E").max_slot(), None);
    }

    #[test]
    fn test_duplicate_method_rejected() {
        let err = DispatchTable::from_methods("A", vec![MethodDecl::new("foo"), MethodDecl::new("foo")])
            .unwrap_err();
        assert!(matches!(err, LayoutError::DuplicateName { table: TableKind::Dispatch, .. }));
    }

    #[test]
    fn test_override_keeps_slot() {
        let parent =
            DispatchTable::from_methods("A", vec![MethodDecl::new("foo"), MethodDecl::new("bar")])
                .unwrap();
        let mut child = parent.derive("B");
        assert_eq!(child.add_method(MethodDecl::new("bar")).unwrap(), 1);
        assert_eq!(child.add_method(MethodDecl::new("qux")).unwrap(), 2);

        let bar = child.get("bar").unwrap();
        assert!(bar.is_override());
        assert_eq!(bar.implementation, "B.bar");
        assert_eq!(bar.introduced_by, "A");
        assert!(!child.get("foo").unwrap().is_override());
        assert_eq!(parent.get("bar").unwrap().implementation, "A.bar");
    }

    #[test]
    fn test_signature_mismatch() {
        let parent = DispatchTable::from_methods(
            "A",
            vec![MethodDecl::new("area").with_signature(vec![], AttrType::float64())],
        )
        .unwrap();
        let mut child = parent.derive("B");
        let err = child
            .add_method(MethodDecl::new("area").with_signature(vec![AttrType::int64()], AttrType::float64()))
            .unwrap_err();
        assert!(matches!(err, LayoutError::MethodSignatureMismatch { ref method, .. } if method == "area"));

        // Undeclared override inherits the slot signature.
        let mut child = parent.derive("C");
        child.add_method(MethodDecl::new("area")).unwrap();
        assert_eq!(child.get("area").unwrap().signature, parent.get("area").unwrap().signature);
    }
}

// Sat Oct 17 2026 - Alex

use crate::exttype::{AttrType, LayoutError, Result, TableKind};
use ahash::{AHashSet, RandomState};
use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt;

pub type AttributeMap = IndexMap<String, AttrType, RandomState>;

/// Outcome of declaring one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declared {
    New,
    /// Same name and identical type as an inherited attribute.
    Redundant,
}

/// Ordered attribute name -> type table. Iteration order is layout order.
#[derive(Debug, Clone, Default)]
pub struct AttributeTable {
    owner: String,
    attributes: AttributeMap,
    local: AHashSet<String>,
}

impl AttributeTable {
    pub fn new(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            attributes: AttributeMap::default(),
            local: AHashSet::new(),
        }
    }

    pub fn from_pairs<I>(owner: &str, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, AttrType)>,
    {
        let mut table = Self::new(owner);
        for (name, ty) in pairs {
            table.declare(&name, ty)?;
        }
        Ok(table)
    }

    /// Copy of this table owned by a subclass; nothing in it counts as
    /// declared by the new owner yet.
    pub fn derive(&self, owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            attributes: self.attributes.clone(),
            local: AHashSet::new(),
        }
    }

    pub fn declare(&mut self, name: &str, ty: AttrType) -> Result<Declared> {
        if !self.local.insert(name.to_string()) {
            return Err(LayoutError::DuplicateName {
                class: self.owner.clone(),
                table: TableKind::Attribute,
                name: name.to_string(),
            });
        }
        match self.attributes.get(name) {
            Some(existing) if *existing == ty => Ok(Declared::Redundant),
            Some(existing) => {
                let expected = existing.to_string();
                self.local.remove(name);
                Err(LayoutError::AttributeRedefinition {
                    class: self.owner.clone(),
                    attribute: name.to_string(),
                    expected,
                    found: ty.to_string(),
                })
            }
            None => {
                self.attributes.insert(name.to_string(), ty);
                Ok(Declared::New)
            }
        }
    }

    /// Declare every attribute of `own` (in its order) on top of this table.
    /// Returns the names that merely repeated an inherited declaration.
    pub fn extend_from(&mut self, own: &AttributeTable) -> Result<Vec<String>> {
        let mut redundant = Vec::new();
        for (name, ty) in &own.attributes {
            if self.declare(name, ty.clone())? == Declared::Redundant {
                redundant.push(name.clone());
            }
        }
        Ok(redundant)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn attributedict(&self) -> &AttributeMap {
        &self.attributes
    }

    /// (name, type) pairs in layout order.
    pub fn attributes(&self) -> Vec<(&str, &AttrType)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }

    pub fn get(&self, name: &str) -> Option<&AttrType> {
        self.attributes.get(name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.attributes.get_index_of(name)
    }

    pub fn is_local(&self, name: &str) -> bool {
        self.local.contains(name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl fmt::Display for AttributeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.attributes
                .iter()
                .map(|(name, ty)| format!("{}: {}", name, ty))
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, AttrType)> {
        items
            .iter()
            .map(|(n, t)| (n.to_string(), t.parse().unwrap()))
            .collect()
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let table =
            AttributeTable::from_pairs("A", pairs(&[("z", "int8"), ("a", "int64"), ("m", "object")]))
                .unwrap();
        let names: Vec<_> = table.attributes().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
        assert_eq!(table.position("m"), Some(2));
        assert_eq!(table.to_string(), "z: int8, a: int64, m: object");
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = AttributeTable::from_pairs("A", pairs(&[("x", "int64"), ("x", "int64")]))
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::DuplicateName {
                class: "A".to_string(),
                table: TableKind::Attribute,
                name: "x".to_string(),
            }
        );
    }

    #[test]
    fn test_derived_redefinition_rules() {
        let parent = AttributeTable::from_pairs("A", pairs(&[("x", "int64")])).unwrap();
        let mut child = parent.derive("B");
        assert_eq!(child.declare("x", AttrType::int64()).unwrap(), Declared::Redundant);
        assert_eq!(child.len(), 1);

        let mut other = parent.derive("C");
        let err = other.declare("x", AttrType::float64()).unwrap_err();
        assert!(matches!(err, LayoutError::AttributeRedefinition { ref attribute, .. } if attribute == "x"));
        assert!(!other.is_local("x"));
    }

    #[test]
    fn test_extend_appends_after_parent() {
        let parent = AttributeTable::from_pairs("A", pairs(&[("x", "int64"), ("y", "int64")])).unwrap();
        let own = AttributeTable::from_pairs("B", pairs(&[("y", "int64"), ("z", "int32")])).unwrap();
        let mut child = parent.derive("B");
        assert_eq!(child.extend_from(&own).unwrap(), vec!["y".to_string()]);
        let names: Vec<_> = child.attributedict().keys().cloned().collect();
        assert_eq!(names, vec!["x", "y", "z"]);
        assert!(child.is_local("z"));
        assert!(!child.is_local("x"));
    }
}

// Sat Oct 17 2026 - Alex

use crate::exttype::{AttrType, ClassId, Offset};
use ahash::RandomState;
use indexmap::IndexMap;

/// Where an attribute variable lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageClass {
    /// Declared by this type; stored in its own attribute segment.
    Own,
    /// Reproduced from an ancestor at the ancestor's offset.
    Inherited(ClassId),
}

/// Variable descriptor handed to downstream type checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub ty: AttrType,
    pub storage: StorageClass,
    pub offset: Offset,
    pub size: usize,
}

impl Variable {
    pub fn is_inherited(&self) -> bool {
        matches!(self.storage, StorageClass::Inherited(_))
    }

    /// The class that introduced this attribute, given the owner of the table.
    pub fn declared_in<'a>(&'a self, owner: &'a ClassId) -> &'a ClassId {
        match &self.storage {
            StorageClass::Own => owner,
            StorageClass::Inherited(origin) => origin,
        }
    }
}

/// attribute name -> variable, in layout order.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    vars: IndexMap<String, Variable, RandomState>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserting an existing name replaces (shadows) the previous entry in place.
    pub(crate) fn insert(&mut self, name: &str, var: Variable) {
        self.vars.insert(name.to_string(), var);
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> + '_ {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

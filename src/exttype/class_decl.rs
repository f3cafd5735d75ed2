// Sat Oct 17 2026 - Alex

use crate::exttype::{AttrType, ExtensionKind, LayoutError, MethodDecl, Result};
use ahash::AHashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

pub(crate) fn is_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

/// Identity of a declared class, qualified by its defining scope (`module.Name`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(String);

impl ClassId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unqualified name, the last dotted component.
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// What the declaring front end actually handed over as the "class".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclForm {
    #[default]
    Class,
    Instance,
    Primitive,
}

/// A class declaration as seen by the layout engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub id: ClassId,
    #[serde(default)]
    pub form: DeclForm,
    #[serde(default)]
    pub bases: Vec<ClassId>,
    #[serde(default)]
    pub kind: ExtensionKind,
}

impl ClassDecl {
    pub fn new(id: impl Into<ClassId>) -> Self {
        Self {
            id: id.into(),
            form: DeclForm::Class,
            bases: Vec::new(),
            kind: ExtensionKind::default(),
        }
    }

    pub fn with_base(mut self, base: impl Into<ClassId>) -> Self {
        self.bases.push(base.into());
        self
    }

    pub fn with_kind(mut self, kind: ExtensionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_form(mut self, form: DeclForm) -> Self {
        self.form = form;
        self
    }

    pub fn name(&self) -> &str {
        self.id.short_name()
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| LayoutError::InvalidClass {
            class: self.id.to_string(),
            reason,
        };

        match self.form {
            DeclForm::Class => {}
            DeclForm::Instance => return Err(invalid("an instance is not a class".to_string())),
            DeclForm::Primitive => {
                return Err(invalid("primitive types cannot be extended".to_string()))
            }
        }
        if !self.id.as_str().split('.').all(is_identifier) {
            return Err(invalid("class name is not a valid identifier".to_string()));
        }
        if let Some(base) = self.bases.iter().find(|b| !b.as_str().split('.').all(is_identifier)) {
            return Err(invalid(format!("base '{}' is not a valid identifier", base)));
        }
        Ok(())
    }
}

/// Full class definition: declaration plus declared members, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDefinition {
    #[serde(flatten)]
    pub decl: ClassDecl,
    #[serde(default)]
    pub attributes: Vec<(String, AttrType)>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

impl ClassDefinition {
    pub fn new(decl: ClassDecl) -> Self {
        Self {
            decl,
            attributes: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn attribute(mut self, name: &str, ty: AttrType) -> Self {
        self.attributes.push((name.to_string(), ty));
        self
    }

    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }
}

/// Class-registration collaborator: supplies definitions of classes the
/// engine has to lay out on demand (embedded attribute types).
pub trait ClassSource: Send + Sync {
    fn definition(&self, id: &ClassId) -> Option<ClassDefinition>;
}

/// In-memory class source keyed by class id.
#[derive(Debug, Default, Clone)]
pub struct DefinitionSet {
    order: Vec<ClassId>,
    definitions: AHashMap<ClassId, ClassDefinition>,
}

impl DefinitionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, definition: ClassDefinition) {
        let id = definition.decl.id.clone();
        if self.definitions.insert(id.clone(), definition).is_none() {
            self.order.push(id);
        }
    }

    /// Definitions in insertion (declaration) order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassDefinition> + '_ {
        self.order.iter().filter_map(|id| self.definitions.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl FromIterator<ClassDefinition> for DefinitionSet {
    fn from_iter<I: IntoIterator<Item = ClassDefinition>>(iter: I) -> Self {
        let mut set = Self::new();
        for definition in iter {
            set.insert(definition);
        }
        set
    }
}

impl ClassSource for DefinitionSet {
    fn definition(&self, id: &ClassId) -> Option<ClassDefinition> {
        self.definitions.get(id).cloned()
    }
}

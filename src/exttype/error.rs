// Sat Oct 17 2026 - Alex

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Which table of a descriptor an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Attribute,
    Dispatch,
}

impl TableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attribute => "attribute table",
            Self::Dispatch => "dispatch table",
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Invalid class '{class}': {reason}")]
    InvalidClass { class: String, reason: String },

    #[error("Multiple inheritance in '{class}': extension bases {}", .parents.join(", "))]
    MultipleInheritance { class: String, parents: Vec<String> },

    #[error("Cyclic definition of '{class}': {}", .chain.join(" -> "))]
    CyclicDefinition { class: String, chain: Vec<String> },

    #[error("Attribute '{attribute}' of '{class}' redefined as {found}, parent declares {expected}")]
    AttributeRedefinition {
        class: String,
        attribute: String,
        expected: String,
        found: String,
    },

    #[error("Method '{method}' of '{class}' overrides slot with signature {expected}, got {found}")]
    MethodSignatureMismatch {
        class: String,
        method: String,
        expected: String,
        found: String,
    },

    #[error("Duplicate name '{name}' in {table} of '{class}'")]
    DuplicateName {
        class: String,
        table: TableKind,
        name: String,
    },

    #[error("'{operation}' on '{class}' called before its {table} was built")]
    UninitializedState {
        class: String,
        table: TableKind,
        operation: &'static str,
    },

    #[error("Attribute not found: {class}.{attribute}")]
    AttributeNotFound { class: String, attribute: String },

    #[error("Method not found: {class}.{method}")]
    MethodNotFound { class: String, method: String },

    #[error("Type '{referenced}' used by '{class}' is not a known extension type")]
    UnresolvedType { class: String, referenced: String },

    #[error("Attribute '{attribute}' of '{class}' of type {ty} overflows the address space")]
    SizeOverflow {
        class: String,
        attribute: String,
        ty: String,
    },

    #[error("Invalid layout config: {0}")]
    InvalidConfig(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl LayoutError {
    /// Name of the class whose build or lookup failed, if the error has one.
    pub fn class(&self) -> Option<&str> {
        match self {
            Self::InvalidClass { class, .. }
            | Self::MultipleInheritance { class, .. }
            | Self::CyclicDefinition { class, .. }
            | Self::AttributeRedefinition { class, .. }
            | Self::MethodSignatureMismatch { class, .. }
            | Self::DuplicateName { class, .. }
            | Self::UninitializedState { class, .. }
            | Self::AttributeNotFound { class, .. }
            | Self::MethodNotFound { class, .. }
            | Self::UnresolvedType { class, .. }
            | Self::SizeOverflow { class, .. } => Some(class),
            Self::InvalidConfig(_) | Self::ParseError(_) => None,
        }
    }

    /// Attach the class and attribute being laid out to a size overflow
    /// raised while sizing its type. Other errors pass through.
    pub(crate) fn in_attribute(self, class: &str, attribute: &str) -> Self {
        match self {
            Self::SizeOverflow { ty, .. } => Self::SizeOverflow {
                class: class.to_string(),
                attribute: attribute.to_string(),
                ty,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = LayoutError::AttributeRedefinition {
            class: "C".to_string(),
            attribute: "x".to_string(),
            expected: "int64".to_string(),
            found: "float64".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'x'"));
        assert!(msg.contains("'C'"));
        assert_eq!(err.class(), Some("C"));

        let cyc = LayoutError::CyclicDefinition {
            class: "A".to_string(),
            chain: vec!["A".to_string(), "B".to_string(), "A".to_string()],
        };
        assert!(cyc.to_string().contains("A -> B -> A"));
    }

    #[test]
    fn test_overflow_gets_attribute_context() {
        let err = LayoutError::SizeOverflow {
            class: String::new(),
            attribute: String::new(),
            ty: "[int64; 9]".to_string(),
        }
        .in_attribute("pkg.A", "data");
        assert_eq!(err.class(), Some("pkg.A"));
        assert!(err.to_string().contains("'data'"));

        let other = LayoutError::ParseError("x".to_string()).in_attribute("pkg.A", "data");
        assert_eq!(other, LayoutError::ParseError("x".to_string()));
    }

    #[test]
    fn test_config_error_has_no_class() {
        assert_eq!(LayoutError::InvalidConfig("bad".to_string()).class(), None);
    }
}

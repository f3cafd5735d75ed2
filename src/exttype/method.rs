// Sat Oct 17 2026 - Alex

use crate::exttype::AttrType;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared parameter and return types of a method, `self` excluded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub params: Vec<AttrType>,
    pub returns: AttrType,
}

impl MethodSignature {
    pub fn new(params: Vec<AttrType>, returns: AttrType) -> Self {
        Self { params, returns }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Exact compatibility: same arity, same declared types, same return type.
    pub fn is_compatible(&self, other: &MethodSignature) -> bool {
        self == other
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) -> {}", self.params.iter().join(", "), self.returns)
    }
}

/// A method as declared in a class body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MethodSpec", into = "MethodSpec")]
pub struct MethodDecl {
    pub name: String,
    pub signature: Option<MethodSignature>,
    /// Symbol of the compiled body. Defaults to `Class.method`.
    pub implementation: Option<String>,
}

impl MethodDecl {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            signature: None,
            implementation: None,
        }
    }

    pub fn with_signature(mut self, params: Vec<AttrType>, returns: AttrType) -> Self {
        self.signature = Some(MethodSignature::new(params, returns));
        self
    }

    pub fn with_implementation(mut self, symbol: &str) -> Self {
        self.implementation = Some(symbol.to_string());
        self
    }

    pub fn implementation_for(&self, class: &str) -> String {
        self.implementation
            .clone()
            .unwrap_or_else(|| format!("{}.{}", class, self.name))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MethodSpec {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    params: Option<Vec<AttrType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    returns: Option<AttrType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    implementation: Option<String>,
}

impl From<MethodSpec> for MethodDecl {
    fn from(spec: MethodSpec) -> Self {
        let signature = match (spec.params, spec.returns) {
            (None, None) => None,
            (params, returns) => Some(MethodSignature::new(
                params.unwrap_or_default(),
                returns.unwrap_or(AttrType::Object),
            )),
        };
        Self {
            name: spec.name,
            signature,
            implementation: spec.implementation,
        }
    }
}

impl From<MethodDecl> for MethodSpec {
    fn from(decl: MethodDecl) -> Self {
        let (params, returns) = match decl.signature {
            Some(sig) => (Some(sig.params), Some(sig.returns)),
            None => (None, None),
        };
        Self {
            name: decl.name,
            params,
            returns,
            implementation: decl.implementation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_display_and_compat() {
        let a = MethodSignature::new(vec![AttrType::int64(), AttrType::Object], AttrType::float64());
        assert_eq!(a.to_string(), "(int64, object) -> float64");
        assert!(a.is_compatible(&a.clone()));

        let fewer = MethodSignature::new(vec![AttrType::int64()], AttrType::float64());
        assert!(!a.is_compatible(&fewer));
        let other_ret = MethodSignature::new(a.params.clone(), AttrType::int64());
        assert!(!a.is_compatible(&other_ret));
    }

    #[test]
    fn test_default_implementation_symbol() {
        assert_eq!(MethodDecl::new("area").implementation_for("Shape"), "Shape.area");
        let m = MethodDecl::new("area").with_implementation("shape_area_v2");
        assert_eq!(m.implementation_for("Shape"), "shape_area_v2");
    }

    #[test]
    fn test_json_forms() {
        let bare: MethodDecl = serde_json::from_str(r#"{"name": "foo"}"#).unwrap();
        assert!(bare.signature.is_none());

        let typed: MethodDecl =
            serde_json::from_str(r#"{"name": "scale", "params": ["float64"]}"#).unwrap();
        let sig = typed.signature.unwrap();
        assert_eq!(sig.arity(), 1);
        assert_eq!(sig.returns, AttrType::Object);
    }
}

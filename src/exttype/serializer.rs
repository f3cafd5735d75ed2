// Sat Oct 17 2026 - Alex

use crate::exttype::{ExtensionKind, ExtensionTypeDescriptor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Serializable snapshot of a descriptor, for tooling output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutReport {
    pub id: String,
    pub name: String,
    pub kind: ExtensionKind,
    pub parent: Option<String>,
    pub vtab_offset: usize,
    pub attr_offset: usize,
    pub size: usize,
    pub alignment: usize,
    pub vtable_size: usize,
    pub attributes: Vec<AttributeEntry>,
    pub methods: Vec<MethodEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub offset: usize,
    pub size: usize,
    pub declared_in: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodEntry {
    pub name: String,
    pub slot: usize,
    pub vtable_offset: usize,
    pub implementation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub introduced_by: String,
}

impl From<&ExtensionTypeDescriptor> for LayoutReport {
    fn from(desc: &ExtensionTypeDescriptor) -> Self {
        let attributes = desc
            .symtab()
            .iter()
            .map(|(name, var)| AttributeEntry {
                name: name.to_string(),
                ty: var.ty.to_string(),
                offset: var.offset.as_usize(),
                size: var.size,
                declared_in: var.declared_in(desc.id()).to_string(),
            })
            .collect();

        let methods = desc
            .dispatch_table()
            .map(|table| {
                table
                    .methoddict()
                    .iter()
                    .map(|(name, slot)| MethodEntry {
                        name: name.clone(),
                        slot: slot.index,
                        vtable_offset: desc.method_offset(name).unwrap_or_default(),
                        implementation: slot.implementation.clone(),
                        signature: slot.signature.as_ref().map(ToString::to_string),
                        introduced_by: slot.introduced_by.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: desc.id().to_string(),
            name: desc.name().to_string(),
            kind: desc.kind(),
            parent: desc.parent().map(|p| p.id().to_string()),
            vtab_offset: desc.vtab_offset(),
            attr_offset: desc.attr_offset(),
            size: desc.size(),
            alignment: desc.alignment().as_usize(),
            vtable_size: desc.vtable_size(),
            attributes,
            methods,
        }
    }
}

impl fmt::Display for LayoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.kind)?;
        if let Some(ref parent) = self.parent {
            write!(f, " : {}", parent)?;
        }
        writeln!(f, "  size={} align={}", self.size, self.alignment)?;
        writeln!(f, "  vtab ptr @ 0x{:x}, own attributes @ 0x{:x}", self.vtab_offset, self.attr_offset)?;
        for attr in &self.attributes {
            writeln!(
                f,
                "  0x{:04x} {:<16} {:<12} {}",
                attr.offset, attr.name, attr.ty, attr.declared_in
            )?;
        }
        for method in &self.methods {
            writeln!(
                f,
                "  [{}] +0x{:x} {} -> {}",
                method.slot, method.vtable_offset, method.name, method.implementation
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exttype::{AttrType, ClassDecl, MethodDecl, TypeRegistry};

    #[test]
    fn test_report_of_child() {
        let registry = TypeRegistry::new();
        registry
            .builder(ClassDecl::new("A"))
            .attribute("x", AttrType::int64())
            .method(MethodDecl::new("foo"))
            .build()
            .unwrap();
        let b = registry
            .builder(ClassDecl::new("B").with_base("A"))
            .attribute("z", AttrType::float64())
            .method(MethodDecl::new("foo"))
            .method(MethodDecl::new("bar").with_signature(vec![], AttrType::int64()))
            .build()
            .unwrap();

        let report = LayoutReport::from(b.as_ref());
        assert_eq!(report.parent.as_deref(), Some("A"));
        assert_eq!(report.attributes.len(), 2);
        assert_eq!(report.attributes[0].declared_in, "A");
        assert_eq!(report.attributes[1].declared_in, "B");
        assert_eq!(report.methods[0].introduced_by, "A");
        assert_eq!(report.methods[0].implementation, "B.foo");
        assert_eq!(report.methods[1].vtable_offset, 8);
        assert_eq!(report.methods[1].signature.as_deref(), Some("() -> int64"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["attributes"][1]["type"], "float64");
        assert_eq!(json["kind"], "static_signature");
        assert!(report.to_string().contains("[1] +0x8 bar -> B.bar"));
    }
}

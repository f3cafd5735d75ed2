// Sat Oct 17 2026 - Alex

//! Entry points used by the code generator.

use crate::exttype::{
    AttrType, ClassDecl, ExtensionTypeDescriptor, MethodDecl, Result, TypeRegistry,
};
use std::sync::Arc;

/// Build (or fetch the already built) descriptor for a class in the
/// process-wide registry.
pub fn build_type(
    decl: ClassDecl,
    attributes: Vec<(String, AttrType)>,
    methods: Vec<MethodDecl>,
    parent: Option<Arc<ExtensionTypeDescriptor>>,
) -> Result<Arc<ExtensionTypeDescriptor>> {
    TypeRegistry::global().build_type(decl, attributes, methods, parent)
}

pub fn offset_of(descriptor: &ExtensionTypeDescriptor, attribute: &str) -> Result<usize> {
    descriptor.offset_of(attribute)
}

pub fn slot_of(descriptor: &ExtensionTypeDescriptor, method: &str) -> Result<usize> {
    descriptor.slot_of(method)
}

pub fn size_of(descriptor: &ExtensionTypeDescriptor) -> usize {
    descriptor.size()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exttype::{ClassId, LayoutError};

    #[test]
    fn test_global_entry_points() {
        let base = build_type(
            ClassDecl::new("query_tests.Base"),
            vec![("count".to_string(), AttrType::int64())],
            vec![MethodDecl::new("tick")],
            None,
        )
        .unwrap();
        let derived = build_type(
            ClassDecl::new("query_tests.Derived"),
            vec![("rate".to_string(), AttrType::float64())],
            vec![MethodDecl::new("tick"), MethodDecl::new("reset")],
            Some(base.clone()),
        )
        .unwrap();

        assert_eq!(offset_of(&derived, "count").unwrap(), offset_of(&base, "count").unwrap());
        assert_eq!(slot_of(&derived, "tick").unwrap(), slot_of(&base, "tick").unwrap());
        assert_eq!(slot_of(&derived, "reset").unwrap(), 1);
        assert!(size_of(&derived) > size_of(&base));
        assert!(TypeRegistry::global().contains(&ClassId::new("query_tests.Derived")));

        assert!(matches!(offset_of(&base, "rate"), Err(LayoutError::AttributeNotFound { .. })));
        assert!(matches!(slot_of(&base, "reset"), Err(LayoutError::MethodNotFound { .. })));
    }
}

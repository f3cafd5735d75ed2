// Sat Oct 17 2026 - Alex

use crate::config::LayoutConfig;
use crate::exttype::delegate::{delegate, Delegate};
use crate::exttype::{
    Alignment, AttrType, AttributeMap, AttributeTable, ClassDecl, ClassId, DispatchTable,
    ExtensionKind, LayoutError, MethodDecl, MethodMap, MethodSlot, Offset, Result, StorageClass,
    SymbolTable, TableKind, TypeEnv, Variable,
};
use std::fmt;
use std::sync::Arc;

/// Finished, immutable layout of one extension type.
///
/// Attribute offsets are relative to the object's base address. The
/// attribute and dispatch tables are reached through delegated operations
/// (`attributedict`, `attributes`, `methoddict`, `methodnames`).
#[derive(Debug)]
pub struct ExtensionTypeDescriptor {
    id: ClassId,
    name: String,
    kind: ExtensionKind,
    parent: Option<Arc<ExtensionTypeDescriptor>>,
    attribute_table: Delegate<AttributeTable>,
    dispatch_table: Delegate<DispatchTable>,
    symtab: SymbolTable,
    vtab_offset: usize,
    attr_offset: usize,
    own_slots_offset: usize,
    instance_size: usize,
    alignment: Alignment,
    slot_count: usize,
    pointer_size: usize,
    vtable_header_size: usize,
}

impl ExtensionTypeDescriptor {
    fn delegate_owner(&self) -> &str {
        self.id.as_str()
    }

    delegate! {
        attribute_table => {
            fn attributedict(&self) -> &AttributeMap;
            fn attributes(&self) -> Vec<(&str, &AttrType)>;
        }
        dispatch_table => {
            fn methoddict(&self) -> &MethodMap;
            fn methodnames(&self) -> Vec<&str>;
        }
    }

    pub fn id(&self) -> &ClassId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ExtensionKind {
        self.kind
    }

    pub fn is_extension(&self) -> bool {
        true
    }

    pub fn parent(&self) -> Option<&Arc<ExtensionTypeDescriptor>> {
        self.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Offset of the vtable pointer inside an instance.
    pub fn vtab_offset(&self) -> usize {
        self.vtab_offset
    }

    /// Offset where this type's own attributes begin.
    pub fn attr_offset(&self) -> usize {
        self.attr_offset
    }

    /// Byte offset, inside the vtable, of the first slot this type introduces.
    pub fn own_slots_offset(&self) -> usize {
        self.own_slots_offset
    }

    /// Total instance size: header plus every attribute through the chain.
    pub fn size(&self) -> usize {
        self.instance_size
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn vtable_size(&self) -> usize {
        self.vtable_header_size + self.slot_count * self.pointer_size
    }

    pub fn attribute_table(&self) -> Result<&AttributeTable> {
        self.attribute_table.get(self.id.as_str(), "attribute_table")
    }

    pub fn dispatch_table(&self) -> Result<&DispatchTable> {
        self.dispatch_table.get(self.id.as_str(), "dispatch_table")
    }

    pub fn symtab(&self) -> &SymbolTable {
        &self.symtab
    }

    pub fn variable(&self, attribute: &str) -> Result<&Variable> {
        self.symtab
            .get(attribute)
            .ok_or_else(|| LayoutError::AttributeNotFound {
                class: self.id.to_string(),
                attribute: attribute.to_string(),
            })
    }

    pub fn offset_of(&self, attribute: &str) -> Result<usize> {
        self.variable(attribute).map(|v| v.offset.as_usize())
    }

    pub fn method_slot(&self, method: &str) -> Result<&MethodSlot> {
        self.dispatch_table
            .get(self.id.as_str(), "method_slot")?
            .get(method)
            .ok_or_else(|| LayoutError::MethodNotFound {
                class: self.id.to_string(),
                method: method.to_string(),
            })
    }

    pub fn slot_of(&self, method: &str) -> Result<usize> {
        self.method_slot(method).map(|slot| slot.index)
    }

    /// Byte offset of a method's function pointer inside the vtable.
    pub fn method_offset(&self, method: &str) -> Result<usize> {
        self.slot_of(method)
            .map(|slot| self.vtable_header_size + slot * self.pointer_size)
    }

    pub fn parent_attribute_table(&self) -> Option<&AttributeTable> {
        self.parent.as_ref().and_then(|p| p.attribute_table().ok())
    }

    pub fn parent_dispatch_table(&self) -> Option<&DispatchTable> {
        self.parent.as_ref().and_then(|p| p.dispatch_table().ok())
    }

    /// This descriptor followed by its ancestors up to the root.
    pub fn chain(&self) -> impl Iterator<Item = &ExtensionTypeDescriptor> + '_ {
        std::iter::successors(Some(self), |d| d.parent.as_deref())
    }

    /// Number of ancestors (0 for a root type).
    pub fn depth(&self) -> usize {
        self.chain().count() - 1
    }

    pub fn is_subtype_of(&self, other: &ClassId) -> bool {
        self.chain().any(|d| &d.id == other)
    }

    /// Attributes this type adds to its parent's layout.
    pub fn own_attributes(&self) -> impl Iterator<Item = (&str, &Variable)> + '_ {
        self.symtab.iter().filter(|(_, v)| !v.is_inherited())
    }
}

impl fmt::Display for ExtensionTypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            if let Ok(table) = self.attribute_table.get(self.id.as_str(), "fmt") {
                return write!(f, "<{} {}({})>", self.kind.label(), self.name, table);
            }
        }
        write!(f, "<{} {}>", self.kind.label(), self.name)
    }
}

/// Descriptor under construction. Offsets are fixed at creation; the tables
/// are attached during the build and the whole thing is frozen at the end.
#[derive(Debug)]
pub struct ExtensionTypeDraft {
    inner: ExtensionTypeDescriptor,
}

impl ExtensionTypeDraft {
    pub fn new(
        decl: &ClassDecl,
        parent: Option<Arc<ExtensionTypeDescriptor>>,
        config: &LayoutConfig,
    ) -> Self {
        let (vtab_offset, attr_offset, own_slots_offset, alignment) = match parent {
            Some(ref p) => (
                p.vtab_offset,
                p.instance_size,
                config.vtable_header_size + p.slot_count * config.pointer_size,
                p.alignment,
            ),
            None => (
                config.vtab_pointer_offset(),
                config.header_size(),
                config.vtable_header_size,
                config.pointer_alignment(),
            ),
        };
        log::debug!(
            "{}: vtab_offset={} attr_offset={} own_slots_offset={}",
            decl.id,
            vtab_offset,
            attr_offset,
            own_slots_offset
        );

        Self {
            inner: ExtensionTypeDescriptor {
                id: decl.id.clone(),
                name: decl.name().to_string(),
                kind: decl.kind,
                parent,
                attribute_table: Delegate::empty(TableKind::Attribute),
                dispatch_table: Delegate::empty(TableKind::Dispatch),
                symtab: SymbolTable::new(),
                vtab_offset,
                attr_offset,
                own_slots_offset,
                instance_size: attr_offset,
                alignment,
                slot_count: 0,
                pointer_size: config.pointer_size,
                vtable_header_size: config.vtable_header_size,
            },
        }
    }

    fn delegate_owner(&self) -> &str {
        self.inner.id.as_str()
    }

    delegate! {
        inner.attribute_table => {
            fn attributedict(&self) -> &AttributeMap;
            fn attributes(&self) -> Vec<(&str, &AttrType)>;
        }
        inner.dispatch_table => {
            fn methoddict(&self) -> &MethodMap;
            fn methodnames(&self) -> Vec<&str>;
        }
        inner.dispatch_table => mut {
            fn add_method(&mut self, method: MethodDecl) -> usize;
        }
    }

    pub fn id(&self) -> &ClassId {
        &self.inner.id
    }

    pub fn parent(&self) -> Option<&Arc<ExtensionTypeDescriptor>> {
        self.inner.parent.as_ref()
    }

    pub fn attr_offset(&self) -> usize {
        self.inner.attr_offset
    }

    pub fn vtab_offset(&self) -> usize {
        self.inner.vtab_offset
    }

    /// Attach the finished attribute table, laying out every attribute the
    /// parent does not already place and filling the symbol table.
    pub fn set_attributes(&mut self, table: AttributeTable, env: &dyn TypeEnv) -> Result<()> {
        let parent = self.inner.parent.clone();
        let class = self.inner.id.to_string();
        let mut symtab = SymbolTable::new();
        let mut cursor = Offset::new(self.inner.attr_offset);
        let mut alignment = self.inner.alignment;
        let mut last_own: Option<(&str, &AttrType)> = None;
        let overflow = |attribute: &str, ty: &AttrType| LayoutError::SizeOverflow {
            class: class.clone(),
            attribute: attribute.to_string(),
            ty: ty.to_string(),
        };

        for (name, ty) in table.attributedict() {
            if let Some(p) = parent.as_deref() {
                if let Some(var) = p.symtab.get(name) {
                    let origin = var.declared_in(&p.id).clone();
                    symtab.insert(
                        name,
                        Variable {
                            storage: StorageClass::Inherited(origin),
                            ..var.clone()
                        },
                    );
                    continue;
                }
            }

            let field = ty.layout(env).map_err(|e| e.in_attribute(&class, name))?;
            cursor = cursor
                .align_to(field.alignment)
                .ok_or_else(|| overflow(name.as_str(), ty))?;
            alignment = alignment.max(field.alignment);
            log::trace!("{}.{}: {} @ {} ({} bytes)", class, name, ty, cursor, field.size);
            symtab.insert(
                name,
                Variable {
                    ty: ty.clone(),
                    storage: StorageClass::Own,
                    offset: cursor,
                    size: field.size,
                },
            );
            cursor = cursor.advance(field.size).ok_or_else(|| overflow(name.as_str(), ty))?;
            last_own = Some((name.as_str(), ty));
        }

        // Padding past the last field can still run off the end.
        self.inner.instance_size = match (alignment.align(cursor.as_usize()), last_own) {
            (Some(size), _) => size,
            (None, Some((name, ty))) => return Err(overflow(name, ty)),
            (None, None) => self.inner.attr_offset,
        };
        self.inner.alignment = alignment;
        self.inner.symtab = symtab;
        self.inner.attribute_table.set(table);
        Ok(())
    }

    pub fn set_dispatch_table(&mut self, table: DispatchTable) {
        self.inner.dispatch_table.set(table);
    }

    /// Finish the build. Both tables must have been attached.
    pub fn freeze(self) -> Result<ExtensionTypeDescriptor> {
        let mut inner = self.inner;
        let owner = inner.id.to_string();
        inner.attribute_table.get(&owner, "freeze")?;
        inner.slot_count = inner.dispatch_table.get(&owner, "freeze")?.slot_count();
        Ok(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exttype::{FieldLayout, MethodDecl};

    struct NoEmbedding;

    impl TypeEnv for NoEmbedding {
        fn pointer_size(&self) -> usize {
            8
        }

        fn embedded_layout(&self, class: &ClassId) -> Result<FieldLayout> {
            Err(LayoutError::UnresolvedType {
                class: "test".to_string(),
                referenced: class.to_string(),
            })
        }
    }

    fn table(owner: &str, items: &[(&str, &str)]) -> AttributeTable {
        AttributeTable::from_pairs(
            owner,
            items.iter().map(|(n, t)| (n.to_string(), t.parse().unwrap())),
        )
        .unwrap()
    }

    #[test]
    fn test_delegates_fail_before_tables_exist() {
        let mut draft = ExtensionTypeDraft::new(&ClassDecl::new("A"), None, &LayoutConfig::default());
        assert!(matches!(
            draft.methodnames(),
            Err(LayoutError::UninitializedState { table: TableKind::Dispatch, .. })
        ));
        assert!(matches!(
            draft.attributes(),
            Err(LayoutError::UninitializedState { table: TableKind::Attribute, .. })
        ));
        assert!(draft.add_method(MethodDecl::new("foo")).is_err());
    }

    #[test]
    fn test_freeze_requires_tables() {
        let mut draft = ExtensionTypeDraft::new(&ClassDecl::new("A"), None, &LayoutConfig::default());
        draft.set_attributes(AttributeTable::new("A"), &NoEmbedding).unwrap();
        let err = draft.freeze().unwrap_err();
        assert!(matches!(err, LayoutError::UninitializedState { operation: "freeze", .. }));
    }

    #[test]
    fn test_add_method_visible_through_table() {
        let mut draft = ExtensionTypeDraft::new(&ClassDecl::new("A"), None, &LayoutConfig::default());
        draft.set_dispatch_table(DispatchTable::new("A"));
        assert_eq!(draft.add_method(MethodDecl::new("foo")).unwrap(), 0);
        assert_eq!(draft.add_method(MethodDecl::new("bar")).unwrap(), 1);
        assert_eq!(draft.methodnames().unwrap(), vec!["foo", "bar"]);
        assert_eq!(draft.methoddict().unwrap()["bar"].index, 1);
    }

    #[test]
    fn test_root_layout_with_padding() {
        let config = LayoutConfig::default();
        let mut draft = ExtensionTypeDraft::new(&ClassDecl::new("A"), None, &config);
        draft
            .set_attributes(table("A", &[("flag", "bool"), ("n", "int32"), ("p", "object")]), &NoEmbedding)
            .unwrap();
        draft.set_dispatch_table(DispatchTable::new("A"));
        let desc = draft.freeze().unwrap();

        assert_eq!(desc.attr_offset(), 24);
        assert_eq!(desc.vtab_offset(), 16);
        assert_eq!(desc.offset_of("flag").unwrap(), 24);
        assert_eq!(desc.offset_of("n").unwrap(), 28);
        assert_eq!(desc.offset_of("p").unwrap(), 32);
        assert_eq!(desc.size(), 40);
        assert_eq!(desc.to_string(), "<StaticExtension A>");
        assert_eq!(format!("{:#}", desc), "<StaticExtension A(flag: bool, n: int32, p: object)>");
    }

    #[test]
    fn test_lookup_errors() {
        let mut draft = ExtensionTypeDraft::new(&ClassDecl::new("A"), None, &LayoutConfig::default());
        draft.set_attributes(AttributeTable::new("A"), &NoEmbedding).unwrap();
        draft.set_dispatch_table(DispatchTable::new("A"));
        let desc = draft.freeze().unwrap();

        assert!(matches!(desc.offset_of("x"), Err(LayoutError::AttributeNotFound { .. })));
        assert!(matches!(desc.slot_of("m"), Err(LayoutError::MethodNotFound { .. })));
        assert_eq!(desc.size(), 24);
        assert_eq!(desc.depth(), 0);
        assert!(desc.is_extension());
    }
}

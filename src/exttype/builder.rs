// Sat Oct 17 2026 - Alex

use crate::exttype::{
    AttrType, AttributeTable, ClassDecl, DispatchTable, ExtensionTypeDescriptor,
    ExtensionTypeDraft, LayoutError, MethodDecl, Result, TypeRegistry,
};
use std::sync::Arc;

/// Lays out one class description into a descriptor and publishes it.
pub struct ExtensionTypeBuilder<'r> {
    registry: &'r TypeRegistry,
    decl: ClassDecl,
    attributes: Vec<(String, AttrType)>,
    methods: Vec<MethodDecl>,
    parent: Option<Arc<ExtensionTypeDescriptor>>,
}

impl<'r> ExtensionTypeBuilder<'r> {
    pub fn new(registry: &'r TypeRegistry, decl: ClassDecl) -> Self {
        Self {
            registry,
            decl,
            attributes: Vec::new(),
            methods: Vec::new(),
            parent: None,
        }
    }

    pub fn attribute(mut self, name: &str, ty: AttrType) -> Self {
        self.attributes.push((name.to_string(), ty));
        self
    }

    pub fn attributes(mut self, attributes: impl IntoIterator<Item = (String, AttrType)>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    pub fn methods(mut self, methods: impl IntoIterator<Item = MethodDecl>) -> Self {
        self.methods.extend(methods);
        self
    }

    /// Parent descriptor supplied directly instead of found through the
    /// declared bases.
    pub fn parent(mut self, parent: Option<Arc<ExtensionTypeDescriptor>>) -> Self {
        self.parent = parent;
        self
    }

    pub fn build(self) -> Result<Arc<ExtensionTypeDescriptor>> {
        self.decl.validate()?;

        let _guard = self.registry.begin_build(&self.decl.id)?;
        if let Some(existing) = self.registry.get(&self.decl.id) {
            log::debug!("{} already built, reusing descriptor", self.decl.id);
            return Ok(existing);
        }

        let parent = self.resolve_parent()?;
        let owner = self.decl.id.to_string();

        let own = AttributeTable::from_pairs(&owner, self.attributes)?;
        let attributes = match parent {
            Some(ref p) => {
                let mut table = p.attribute_table()?.derive(&owner);
                for name in table.extend_from(&own)? {
                    log::warn!("{}: attribute '{}' repeats the inherited declaration", owner, name);
                }
                table
            }
            None => own,
        };
        let dispatch = match parent {
            Some(ref p) => p.dispatch_table()?.derive(&owner),
            None => DispatchTable::new(&owner),
        };

        let mut draft = ExtensionTypeDraft::new(&self.decl, parent, self.registry.config());
        draft.set_attributes(attributes, &self.registry.env(&self.decl.id))?;
        draft.set_dispatch_table(dispatch);
        for method in self.methods {
            draft.add_method(method)?;
        }

        let descriptor = self.registry.publish(draft.freeze()?);
        log::debug!(
            "built {:#} size={} slots={}",
            descriptor,
            descriptor.size(),
            descriptor.slot_count()
        );
        Ok(descriptor)
    }

    /// The single parent extension type, from the explicit parent and the
    /// declared bases that are extension types. A base the registry has not
    /// built yet is built first when the class source defines it. Other bases
    /// are plain classes and contribute nothing.
    fn resolve_parent(&self) -> Result<Option<Arc<ExtensionTypeDescriptor>>> {
        let id = &self.decl.id;
        let mut parents: Vec<Arc<ExtensionTypeDescriptor>> = self.parent.iter().cloned().collect();

        for base in &self.decl.bases {
            if let Some(descriptor) = self.registry.resolve(base)? {
                if !parents.iter().any(|p| p.id() == descriptor.id()) {
                    parents.push(descriptor);
                }
            }
        }

        if parents.len() > 1 {
            return Err(LayoutError::MultipleInheritance {
                class: id.to_string(),
                parents: parents.iter().map(|p| p.id().to_string()).collect(),
            });
        }

        let parent = parents.pop();
        if let Some(ref p) = parent {
            if p.is_subtype_of(id) {
                let mut chain: Vec<String> = p.chain().map(|d| d.id().to_string()).collect();
                chain.reverse();
                chain.push(id.to_string());
                return Err(LayoutError::CyclicDefinition {
                    class: id.to_string(),
                    chain,
                });
            }
        }
        Ok(parent)
    }
}

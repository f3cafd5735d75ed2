// Sat Oct 17 2026 - Alex

use crate::config::LayoutConfig;
use crate::exttype::{
    AttrType, ClassDecl, ClassDefinition, ClassId, ClassSource, ExtensionTypeBuilder,
    ExtensionTypeDescriptor, FieldLayout, LayoutError, MethodDecl, Result, TypeEnv,
};
use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard, RwLock};
use std::cell::RefCell;
use std::sync::Arc;

static GLOBAL: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::new);

/// Class identity -> built descriptor.
///
/// Lookups take a read lock only. Builds are serialized by a reentrant lock
/// over the stack of classes currently being built, so a nested build on the
/// same thread (an embedded attribute type) proceeds while a second thread
/// waits. A descriptor becomes visible only after it is frozen.
pub struct TypeRegistry {
    config: LayoutConfig,
    descriptors: RwLock<AHashMap<ClassId, Arc<ExtensionTypeDescriptor>>>,
    building: ReentrantMutex<RefCell<Vec<ClassId>>>,
    source: Option<Box<dyn ClassSource>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            config: LayoutConfig::default(),
            descriptors: RwLock::new(AHashMap::new()),
            building: ReentrantMutex::new(RefCell::new(Vec::new())),
            source: None,
        }
    }

    pub fn with_config(config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    pub fn with_source(mut self, source: impl ClassSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Process-wide registry.
    pub fn global() -> &'static TypeRegistry {
        &GLOBAL
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn get(&self, id: &ClassId) -> Option<Arc<ExtensionTypeDescriptor>> {
        self.descriptors.read().get(id).cloned()
    }

    pub fn contains(&self, id: &ClassId) -> bool {
        self.descriptors.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.read().is_empty()
    }

    pub fn ids(&self) -> Vec<ClassId> {
        let mut ids: Vec<_> = self.descriptors.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Whether `id` is being built on the current thread.
    pub fn is_building(&self, id: &ClassId) -> bool {
        let guard = self.building.lock();
        let stack = guard.borrow();
        stack.contains(id)
    }

    pub fn builder(&self, decl: ClassDecl) -> ExtensionTypeBuilder<'_> {
        ExtensionTypeBuilder::new(self, decl)
    }

    pub fn build_type(
        &self,
        decl: ClassDecl,
        attributes: Vec<(String, AttrType)>,
        methods: Vec<MethodDecl>,
        parent: Option<Arc<ExtensionTypeDescriptor>>,
    ) -> Result<Arc<ExtensionTypeDescriptor>> {
        self.builder(decl)
            .attributes(attributes)
            .methods(methods)
            .parent(parent)
            .build()
    }

    pub fn build_definition(&self, def: &ClassDefinition) -> Result<Arc<ExtensionTypeDescriptor>> {
        self.build_type(
            def.decl.clone(),
            def.attributes.clone(),
            def.methods.clone(),
            None,
        )
    }

    /// Mark `id` as under construction. Fails if it already is, which means
    /// its definition depends on itself.
    pub(crate) fn begin_build(&self, id: &ClassId) -> Result<BuildGuard<'_>> {
        let lock = self.building.lock();
        {
            let mut stack = lock.borrow_mut();
            if let Some(pos) = stack.iter().position(|c| c == id) {
                return Err(cycle(id, &stack[pos..]));
            }
            stack.push(id.clone());
        }
        Ok(BuildGuard {
            lock,
            id: id.clone(),
        })
    }

    pub(crate) fn cycle_error(&self, id: &ClassId) -> Option<LayoutError> {
        let guard = self.building.lock();
        let stack = guard.borrow();
        stack
            .iter()
            .position(|c| c == id)
            .map(|pos| cycle(id, &stack[pos..]))
    }

    /// Make a frozen descriptor visible. The first one published for an id wins.
    pub(crate) fn publish(&self, descriptor: ExtensionTypeDescriptor) -> Arc<ExtensionTypeDescriptor> {
        let mut map = self.descriptors.write();
        map.entry(descriptor.id().clone())
            .or_insert_with(|| Arc::new(descriptor))
            .clone()
    }

    /// Descriptor for `id`, building it through the class source when the
    /// source knows the class and it is not registered yet. `None` means the
    /// class is not an extension type this registry can see.
    pub(crate) fn resolve(&self, id: &ClassId) -> Result<Option<Arc<ExtensionTypeDescriptor>>> {
        if let Some(err) = self.cycle_error(id) {
            return Err(err);
        }
        if let Some(descriptor) = self.get(id) {
            return Ok(Some(descriptor));
        }
        match self.source.as_ref().and_then(|s| s.definition(id)) {
            Some(def) => {
                log::debug!("building {} on demand", id);
                self.build_definition(&def).map(Some)
            }
            None => Ok(None),
        }
    }

    pub(crate) fn env<'a>(&'a self, class: &'a ClassId) -> RegistryEnv<'a> {
        RegistryEnv {
            registry: self,
            class,
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn cycle(id: &ClassId, path: &[ClassId]) -> LayoutError {
    let mut chain: Vec<String> = path.iter().map(ToString::to_string).collect();
    chain.push(id.to_string());
    LayoutError::CyclicDefinition {
        class: id.to_string(),
        chain,
    }
}

/// Holds the build lock and the in-progress mark for one class.
pub(crate) struct BuildGuard<'a> {
    lock: ReentrantMutexGuard<'a, RefCell<Vec<ClassId>>>,
    id: ClassId,
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        let mut stack = self.lock.borrow_mut();
        if let Some(pos) = stack.iter().rposition(|c| *c == self.id) {
            stack.remove(pos);
        }
    }
}

/// Sizes attribute types against the registry, building embedded classes on
/// demand through the class source.
pub(crate) struct RegistryEnv<'a> {
    registry: &'a TypeRegistry,
    class: &'a ClassId,
}

impl TypeEnv for RegistryEnv<'_> {
    fn pointer_size(&self) -> usize {
        self.registry.config.pointer_size
    }

    fn embedded_layout(&self, class: &ClassId) -> Result<FieldLayout> {
        let descriptor = self
            .registry
            .resolve(class)?
            .ok_or_else(|| LayoutError::UnresolvedType {
                class: self.class.to_string(),
                referenced: class.to_string(),
            })?;
        Ok(FieldLayout {
            size: descriptor.size(),
            alignment: descriptor.alignment(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn point() -> ClassDefinition {
        ClassDefinition::new(ClassDecl::new("geo.Point"))
            .attribute("x", AttrType::float64())
            .attribute("y", AttrType::float64())
            .method(MethodDecl::new("norm"))
    }

    #[test]
    fn test_concurrent_builds_yield_one_descriptor() {
        let registry = Arc::new(TypeRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || registry.build_definition(&point()).unwrap())
            })
            .collect();
        let built: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(built.iter().all(|d| Arc::ptr_eq(d, &built[0])));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_concurrent_lookups() {
        let registry = Arc::new(TypeRegistry::new());
        let point = registry.build_definition(&point()).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || {
                    let d = registry.get(&ClassId::new("geo.Point")).unwrap();
                    (d.offset_of("y").unwrap(), d.slot_of("norm").unwrap())
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), (point.offset_of("y").unwrap(), 0));
        }
    }

    #[test]
    fn test_build_guard_releases_on_error() {
        let registry = TypeRegistry::new();
        let id = ClassId::new("Bad");
        {
            let _guard = registry.begin_build(&id).unwrap();
            assert!(registry.is_building(&id));
            assert!(matches!(
                registry.begin_build(&id),
                Err(LayoutError::CyclicDefinition { .. })
            ));
        }
        assert!(!registry.is_building(&id));
    }

    #[test]
    fn test_with_config_validates() {
        assert!(TypeRegistry::with_config(LayoutConfig::new().with_pointer_size(3)).is_err());
        let registry = TypeRegistry::with_config(LayoutConfig::new().with_pointer_size(4)).unwrap();
        assert_eq!(registry.config().header_size(), 20);
    }

    #[test]
    fn test_ids_sorted() {
        let registry = TypeRegistry::new();
        registry.build_definition(&ClassDefinition::new(ClassDecl::new("Zed"))).unwrap();
        registry.build_definition(&ClassDefinition::new(ClassDecl::new("Alpha"))).unwrap();
        assert_eq!(registry.ids(), vec![ClassId::new("Alpha"), ClassId::new("Zed")]);
    }
}

// Sat Oct 17 2026 - Alex

pub mod error;
pub mod offset;
pub mod alignment;
pub mod attr_type;
pub mod class_decl;
pub mod method;
pub mod attribute_table;
pub mod dispatch_table;
pub mod delegate;
pub mod symtab;
pub mod variant;
pub mod descriptor;
pub mod builder;
pub mod registry;
pub mod serializer;
pub mod query;

pub use error::{LayoutError, Result, TableKind};
pub use offset::Offset;
pub use alignment::Alignment;
pub use attr_type::{AttrType, FieldLayout, PrimitiveType, TypeEnv};
pub use class_decl::{ClassDecl, ClassDefinition, ClassId, ClassSource, DeclForm, DefinitionSet};
pub use method::{MethodDecl, MethodSignature};
pub use attribute_table::{AttributeMap, AttributeTable, Declared};
pub use dispatch_table::{DispatchTable, MethodMap, MethodSlot};
pub use delegate::Delegate;
pub use symtab::{StorageClass, SymbolTable, Variable};
pub use variant::{ExtensionKind, LookupPolicy, Specialization, SpecializationTable};
pub use descriptor::{ExtensionTypeDescriptor, ExtensionTypeDraft};
pub use builder::ExtensionTypeBuilder;
pub use registry::TypeRegistry;
pub use serializer::{AttributeEntry, LayoutReport, MethodEntry};
pub use query::{build_type, offset_of, size_of, slot_of};

// Sat Oct 17 2026 - Alex

pub mod config;
pub mod exttype;
pub mod utils;

pub use config::LayoutConfig;
pub use exttype::{
    build_type, offset_of, size_of, slot_of, AttrType, ClassDecl, ClassDefinition, ClassId,
    ExtensionKind, ExtensionTypeBuilder, ExtensionTypeDescriptor, LayoutError, MethodDecl,
    TypeRegistry,
};

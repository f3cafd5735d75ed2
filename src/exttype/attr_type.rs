// Sat Oct 17 2026 - Alex

use crate::exttype::class_decl::is_identifier;
use crate::exttype::{Alignment, ClassId, LayoutError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static ARRAY_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(.+);\s*(\d+)\]$").expect("array pattern is valid"));

/// Semantic type tag of an attribute. Equality is nominal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AttrType {
    Primitive(PrimitiveType),
    /// Generic managed object reference.
    Object,
    Pointer(Box<AttrType>),
    Array(Box<AttrType>, usize),
    /// Reference to an instance of an extension type.
    Reference(ClassId),
    /// Instance of an extension type stored inline.
    Embedded(ClassId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

impl PrimitiveType {
    const ALL: [PrimitiveType; 13] = [
        Self::Bool,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::Float32,
        Self::Float64,
        Self::Complex64,
        Self::Complex128,
    ];

    pub fn size(self) -> usize {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 | Self::Complex64 => 8,
            Self::Complex128 => 16,
        }
    }

    pub fn alignment(self) -> Alignment {
        match self {
            Self::Complex64 => Alignment::natural(4),
            Self::Complex128 => Alignment::natural(8),
            other => Alignment::natural(other.size()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }
}

/// Size and alignment of one attribute slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    pub size: usize,
    pub alignment: Alignment,
}

/// Target environment the attribute types are laid out against.
pub trait TypeEnv {
    fn pointer_size(&self) -> usize;

    /// Layout of an extension instance stored by value.
    fn embedded_layout(&self, class: &ClassId) -> Result<FieldLayout>;
}

impl AttrType {
    pub fn int64() -> Self {
        Self::Primitive(PrimitiveType::Int64)
    }

    pub fn float64() -> Self {
        Self::Primitive(PrimitiveType::Float64)
    }

    pub fn layout(&self, env: &dyn TypeEnv) -> Result<FieldLayout> {
        let pointer = FieldLayout {
            size: env.pointer_size(),
            alignment: Alignment::natural(env.pointer_size()),
        };
        Ok(match self {
            Self::Primitive(p) => FieldLayout {
                size: p.size(),
                alignment: p.alignment(),
            },
            Self::Object | Self::Pointer(_) | Self::Reference(_) => pointer,
            Self::Array(elem, count) => {
                let elem = elem.layout(env)?;
                let size = elem
                    .alignment
                    .align(elem.size)
                    .and_then(|stride| stride.checked_mul(*count))
                    .ok_or_else(|| LayoutError::SizeOverflow {
                        class: String::new(),
                        attribute: String::new(),
                        ty: self.to_string(),
                    })?;
                FieldLayout {
                    size,
                    alignment: elem.alignment,
                }
            }
            Self::Embedded(class) => env.embedded_layout(class)?,
        })
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => f.write_str(p.name()),
            Self::Object => f.write_str("object"),
            Self::Pointer(inner) => write!(f, "*{}", inner),
            Self::Array(elem, count) => write!(f, "[{}; {}]", elem, count),
            Self::Reference(class) => write!(f, "ref {}", class),
            Self::Embedded(class) => write!(f, "{}", class),
        }
    }
}

impl FromStr for AttrType {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(inner) = s.strip_prefix('*') {
            return Ok(Self::Pointer(Box::new(inner.parse()?)));
        }
        if let Some(class) = s.strip_prefix("ref ") {
            return parse_class(class.trim(), s).map(Self::Reference);
        }
        if let Some(caps) = ARRAY_TYPE.captures(s) {
            let count: usize = caps[2]
                .parse()
                .map_err(|_| LayoutError::ParseError(format!("bad array length in '{}'", s)))?;
            if count == 0 {
                return Err(LayoutError::ParseError(format!("zero-length array '{}'", s)));
            }
            return Ok(Self::Array(Box::new(caps[1].parse()?), count));
        }
        if s == "object" {
            return Ok(Self::Object);
        }
        if let Some(p) = PrimitiveType::from_name(s) {
            return Ok(Self::Primitive(p));
        }
        parse_class(s, s).map(Self::Embedded)
    }
}

fn parse_class(name: &str, whole: &str) -> Result<ClassId> {
    if !name.is_empty() && name.split('.').all(is_identifier) {
        Ok(ClassId::new(name))
    } else {
        Err(LayoutError::ParseError(format!("unknown type '{}'", whole)))
    }
}

impl TryFrom<String> for AttrType {
    type Error = LayoutError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<AttrType> for String {
    fn from(ty: AttrType) -> String {
        ty.to_string()
    }
}

impl From<PrimitiveType> for AttrType {
    fn from(p: PrimitiveType) -> Self {
        Self::Primitive(p)
    }
}

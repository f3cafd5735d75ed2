// Sat Oct 17 2026 - Alex

//! Forwarding of a composite's operations to a sub-table that only exists
//! once the build has produced it.

use crate::exttype::{LayoutError, Result, TableKind};

/// Backing slot for a delegated sub-table. Empty until the table is built.
#[derive(Debug, Clone)]
pub struct Delegate<T> {
    table: TableKind,
    inner: Option<T>,
}

impl<T> Delegate<T> {
    pub fn empty(table: TableKind) -> Self {
        Self { table, inner: None }
    }

    pub fn set(&mut self, value: T) {
        self.inner = Some(value);
    }

    pub fn get(&self, owner: &str, operation: &'static str) -> Result<&T> {
        let table = self.table;
        self.inner
            .as_ref()
            .ok_or_else(|| uninitialized(table, owner, operation))
    }

    pub fn get_mut(&mut self, owner: &str, operation: &'static str) -> Result<&mut T> {
        let table = self.table;
        self.inner
            .as_mut()
            .ok_or_else(|| uninitialized(table, owner, operation))
    }
}

fn uninitialized(table: TableKind, owner: &str, operation: &'static str) -> LayoutError {
    LayoutError::UninitializedState {
        class: owner.to_string(),
        table,
        operation,
    }
}

/// Generates forwarding methods to a `Delegate<_>` field (a dotted field
/// path is accepted). The implementing type provides
/// `fn delegate_owner(&self) -> &str` for diagnostics. Forwarded calls fail
/// with `UninitializedState` while the delegate is empty.
///
/// ```ignore
/// delegate! {
///     attribute_table => {
///         fn attributedict(&self) -> &AttributeMap;
///     }
///     inner.dispatch_table => mut {
///         fn add_method(&mut self, method: MethodDecl) -> usize;
///     }
/// }
/// ```
macro_rules! delegate {
    (@ro ($($target:ident).+)) => {};
    (@ro ($($target:ident).+) fn $name:ident(&self $(, $arg:ident: $argty:ty)*) -> $ret:ty; $($more:tt)*) => {
        pub fn $name(&self $(, $arg: $argty)*) -> $crate::exttype::Result<$ret> {
            Ok(self.$($target).+.get(self.delegate_owner(), stringify!($name))?.$name($($arg),*))
        }
        delegate! { @ro ($($target).+) $($more)* }
    };
    (@mut ($($target:ident).+)) => {};
    (@mut ($($target:ident).+) fn $name:ident(&mut self $(, $arg:ident: $argty:ty)*) -> $ret:ty; $($more:tt)*) => {
        pub fn $name(&mut self $(, $arg: $argty)*) -> $crate::exttype::Result<$ret> {
            let owner = self.delegate_owner().to_string();
            self.$($target).+.get_mut(&owner, stringify!($name))?.$name($($arg),*)
        }
        delegate! { @mut ($($target).+) $($more)* }
    };
    () => {};
    ($($target:ident).+ => { $($body:tt)* } $($rest:tt)*) => {
        delegate! { @ro ($($target).+) $($body)* }
        delegate! { $($rest)* }
    };
    ($($target:ident).+ => mut { $($body:tt)* } $($rest:tt)*) => {
        delegate! { @mut ($($target).+) $($body)* }
        delegate! { $($rest)* }
    };
}

pub(crate) use delegate;

//! Runtime classification of printable values
//!
//! The printer does not know the shape of what it prints. Every printable
//! type implements [`Inspect`], which describes one level of the value as a
//! [`Value`]: absent, a transparent wrapper, a reference with an identity, a
//! mapping, a sequence (raw bytes being a special case), a record with named
//! fields, or a scalar rendered through its `Debug` form.
//!
//! Implementations for syntax-tree types are generated with
//! [`inspect_struct!`](crate::inspect_struct), [`inspect_enum!`](crate::inspect_enum)
//! and [`inspect_scalar!`](crate::inspect_scalar).

use std::any::{type_name, TypeId};
use std::cell::OnceCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Deref;
use std::path::PathBuf;
use std::rc::{Rc, Weak};

use crate::string_utils::short_type_name;

/// A value that can describe its own structure to the printer.
pub trait Inspect {
    /// Describe the outermost level of `self`.
    fn inspect(&self) -> Value<'_>;

    /// Whether the value is absent (a `None`, an empty collection, a dangling
    /// weak reference). Transparent wrappers answer for their contents.
    fn is_nil(&self) -> bool {
        match self.inspect() {
            Value::Nil => true,
            Value::Interface(inner) => inner.is_nil(),
            _ => false,
        }
    }

    /// View a slice of `Self` as raw bytes. Only `u8` answers, which lets a
    /// `Vec<u8>` print as one byte-string literal instead of element by element.
    #[doc(hidden)]
    fn slice_as_bytes(_items: &[Self]) -> Option<&[u8]>
    where
        Self: Sized,
    {
        None
    }
}

/// One level of a value, as seen by the printer.
pub enum Value<'a> {
    Nil,
    /// A transparent wrapper around exactly one value (an enum variant payload).
    Interface(&'a dyn Inspect),
    Pointer(Pointer<'a>),
    Map(Map<'a>),
    Slice(Slice<'a>),
    Bytes(&'a [u8]),
    Struct(Struct<'a>),
    Scalar(&'a dyn fmt::Debug),
}

/// The pointee of a reference: either borrowed from the owner, or kept alive
/// by the printer for the duration of the visit (upgraded weak references).
pub enum Target<'a> {
    Borrowed(&'a dyn Inspect),
    Shared(Rc<dyn Inspect + 'a>),
}

impl<'a> Deref for Target<'a> {
    type Target = dyn Inspect + 'a;

    fn deref(&self) -> &Self::Target {
        match self {
            Target::Borrowed(value) => *value,
            Target::Shared(value) => &**value,
        }
    }
}

/// A reference with an identity. Two pointers are the same reference iff
/// they point at the same address with the same pointee type.
pub struct Pointer<'a> {
    addr: usize,
    pointee: &'static str,
    target: Target<'a>,
}

impl<'a> Pointer<'a> {
    pub fn borrowed<T: Inspect>(target: &'a T) -> Self {
        Self {
            addr: target as *const T as *const () as usize,
            pointee: type_name::<T>(),
            target: Target::Borrowed(target),
        }
    }

    pub fn shared<T: Inspect + 'a>(target: Rc<T>) -> Self {
        Self {
            addr: Rc::as_ptr(&target) as *const () as usize,
            pointee: type_name::<T>(),
            target: Target::Shared(target),
        }
    }

    /// Identity key of the reference.
    pub fn identity(&self) -> (usize, &'static str) {
        (self.addr, self.pointee)
    }

    pub fn target(&self) -> &(dyn Inspect + 'a) {
        &*self.target
    }
}

pub struct Map<'a> {
    type_name: String,
    entries: Vec<(&'a dyn Inspect, &'a dyn Inspect)>,
}

impl<'a> Map<'a> {
    pub fn new<T: ?Sized>(entries: Vec<(&'a dyn Inspect, &'a dyn Inspect)>) -> Self {
        Self {
            type_name: short_type_name(type_name::<T>()),
            entries,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn entries(&self) -> &[(&'a dyn Inspect, &'a dyn Inspect)] {
        &self.entries
    }
}

pub struct Slice<'a> {
    type_name: String,
    elems: Vec<&'a dyn Inspect>,
}

impl<'a> Slice<'a> {
    pub fn new<T: ?Sized>(elems: Vec<&'a dyn Inspect>) -> Self {
        Self {
            type_name: short_type_name(type_name::<T>()),
            elems,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn elems(&self) -> &[&'a dyn Inspect] {
        &self.elems
    }
}

/// A named field of a record.
pub struct Field<'a> {
    pub name: &'static str,
    pub value: &'a dyn Inspect,
}

/// A record: a type with named fields in declaration order.
pub struct Struct<'a> {
    type_id: TypeId,
    type_name: String,
    fields: Vec<Field<'a>>,
}

impl<'a> Struct<'a> {
    pub fn new<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: short_type_name(type_name::<T>()),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: &'static str, value: &'a dyn Inspect) -> Self {
        self.fields.push(Field { name, value });
        self
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> &[Field<'a>] {
        &self.fields
    }
}

/// Implement [`Inspect`] for a struct as a record of the listed fields.
///
/// ```
/// use gofunc::inspect::{Inspect, Value};
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
/// gofunc::inspect_struct!(Point { x, y });
///
/// assert!(matches!(Point { x: 1, y: 2 }.inspect(), Value::Struct(_)));
/// ```
#[macro_export]
macro_rules! inspect_struct {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::inspect::Inspect for $ty {
            fn inspect(&self) -> $crate::inspect::Value<'_> {
                $crate::inspect::Value::Struct(
                    $crate::inspect::Struct::new::<$ty>()
                        $(.field(stringify!($field), &self.$field))*
                )
            }
        }
    };
}

/// Implement [`Inspect`] for an enum whose variants each wrap one value.
/// The enum itself is transparent: printing shows the payload.
#[macro_export]
macro_rules! inspect_enum {
    ($ty:ident { $($variant:ident),* $(,)? }) => {
        impl $crate::inspect::Inspect for $ty {
            fn inspect(&self) -> $crate::inspect::Value<'_> {
                match self {
                    $($ty::$variant(inner) => {
                        $crate::inspect::Value::Interface(inner as &dyn $crate::inspect::Inspect)
                    })*
                }
            }
        }
    };
}

/// Implement [`Inspect`] for types printed through their `Debug` form.
#[macro_export]
macro_rules! inspect_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::inspect::Inspect for $ty {
                fn inspect(&self) -> $crate::inspect::Value<'_> {
                    $crate::inspect::Value::Scalar(self)
                }
            }
        )*
    };
}

inspect_scalar!(
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    isize,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    String,
    &'static str,
    PathBuf,
);

impl Inspect for u8 {
    fn inspect(&self) -> Value<'_> {
        Value::Scalar(self)
    }

    fn slice_as_bytes(items: &[u8]) -> Option<&[u8]> {
        Some(items)
    }
}

impl<T: Inspect> Inspect for Option<T> {
    fn inspect(&self) -> Value<'_> {
        match self {
            Some(value) => value.inspect(),
            None => Value::Nil,
        }
    }

    fn is_nil(&self) -> bool {
        self.as_ref().is_none_or(|value| value.is_nil())
    }
}

impl<T: Inspect> Inspect for Box<T> {
    fn inspect(&self) -> Value<'_> {
        Value::Pointer(Pointer::borrowed(&**self))
    }

    fn is_nil(&self) -> bool {
        false
    }
}

impl<T: Inspect> Inspect for Rc<T> {
    fn inspect(&self) -> Value<'_> {
        Value::Pointer(Pointer::borrowed(&**self))
    }

    fn is_nil(&self) -> bool {
        false
    }
}

impl<T: Inspect + 'static> Inspect for Weak<T> {
    fn inspect(&self) -> Value<'_> {
        match self.upgrade() {
            Some(target) => Value::Pointer(Pointer::shared(target)),
            None => Value::Nil,
        }
    }

    fn is_nil(&self) -> bool {
        self.strong_count() == 0
    }
}

impl<T: Inspect> Inspect for OnceCell<T> {
    fn inspect(&self) -> Value<'_> {
        match self.get() {
            Some(value) => value.inspect(),
            None => Value::Nil,
        }
    }

    fn is_nil(&self) -> bool {
        self.get().is_none_or(|value| value.is_nil())
    }
}

impl<T: Inspect> Inspect for Vec<T> {
    fn inspect(&self) -> Value<'_> {
        if let Some(bytes) = T::slice_as_bytes(self) {
            return Value::Bytes(bytes);
        }
        Value::Slice(Slice::new::<Self>(
            self.iter().map(|e| e as &dyn Inspect).collect(),
        ))
    }

    fn is_nil(&self) -> bool {
        self.is_empty()
    }
}

impl<K: Inspect, V: Inspect, S> Inspect for HashMap<K, V, S> {
    fn inspect(&self) -> Value<'_> {
        Value::Map(Map::new::<Self>(
            self.iter()
                .map(|(k, v)| (k as &dyn Inspect, v as &dyn Inspect))
                .collect(),
        ))
    }

    fn is_nil(&self) -> bool {
        self.is_empty()
    }
}

impl<K: Inspect, V: Inspect> Inspect for BTreeMap<K, V> {
    fn inspect(&self) -> Value<'_> {
        Value::Map(Map::new::<Self>(
            self.iter()
                .map(|(k, v)| (k as &dyn Inspect, v as &dyn Inspect))
                .collect(),
        ))
    }

    fn is_nil(&self) -> bool {
        self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Leaf {
        label: String,
    }
    crate::inspect_struct!(Leaf { label });

    #[test]
    fn test_empty_collections_are_nil() {
        assert!(Vec::<u32>::new().is_nil());
        assert!(HashMap::<String, u32>::new().is_nil());
        assert!(BTreeMap::<String, u32>::new().is_nil());
        assert!(!vec![1u32].is_nil());
    }

    #[test]
    fn test_empty_collections_still_inspect_as_containers() {
        assert!(matches!(Vec::<u32>::new().inspect(), Value::Slice(s) if s.elems().is_empty()));
        assert!(matches!(Vec::<u8>::new().inspect(), Value::Bytes(b"")));
        assert!(matches!(BTreeMap::<String, u32>::new().inspect(), Value::Map(m) if m.entries().is_empty()));
        assert!(matches!(HashMap::<String, u32>::new().inspect(), Value::Map(_)));
    }

    #[test]
    fn test_option_nilness() {
        assert!(None::<u32>.is_nil());
        assert!(!Some(3u32).is_nil());
        assert!(Some(Vec::<u32>::new()).is_nil());
    }

    #[test]
    fn test_byte_vectors_are_bytes() {
        let bytes = vec![0x68u8, 0x69];
        assert!(matches!(bytes.inspect(), Value::Bytes(b"hi")));
        let words = vec![1u16, 2];
        assert!(matches!(words.inspect(), Value::Slice(_)));
    }

    #[test]
    fn test_rc_clones_share_identity() {
        let a = Rc::new(Leaf {
            label: "a".to_string(),
        });
        let b = Rc::clone(&a);
        let c = Rc::new(Leaf {
            label: "a".to_string(),
        });

        let id = |rc: &Rc<Leaf>| match rc.inspect() {
            Value::Pointer(p) => p.identity(),
            _ => panic!("Rc should inspect as a pointer"),
        };
        assert_eq!(id(&a), id(&b));
        assert_ne!(id(&a), id(&c), "structurally equal values are distinct references");
    }

    #[test]
    fn test_weak_upgrade_keeps_identity() {
        let strong = Rc::new(Leaf {
            label: "x".to_string(),
        });
        let weak = Rc::downgrade(&strong);
        let (Value::Pointer(from_weak), Value::Pointer(from_rc)) = (weak.inspect(), strong.inspect())
        else {
            panic!("expected pointers");
        };
        assert_eq!(from_weak.identity(), from_rc.identity());

        drop(from_weak);
        drop(from_rc);
        drop(strong);
        assert!(weak.is_nil());
        assert!(matches!(weak.inspect(), Value::Nil));
    }

    #[test]
    fn test_struct_fields_in_declaration_order() {
        let leaf = Leaf {
            label: "x".to_string(),
        };
        let Value::Struct(record) = leaf.inspect() else {
            panic!("expected a struct");
        };
        assert_eq!(record.type_name(), "Leaf");
        assert!(record.is::<Leaf>());
        let names: Vec<_> = record.fields().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["label"]);
    }
}

//! The tagged value universe the VM pushes and pops.

mod handle;
mod list;
mod map;

pub use handle::InteropHandle;
pub use list::ValueList;
pub use map::ValueMap;

use std::collections::HashMap;

use num_bigint::BigInt;
use num_traits::Zero;

use crate::error::{InteropError, InteropResult};

/// Wire tag of each value kind. The discriminants are externally
/// visible in serialized streams and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueKind {
    ByteArray = 0x00,
    Boolean = 0x01,
    Integer = 0x02,
    InteropHandle = 0x40,
    Array = 0x80,
    Struct = 0x81,
    Map = 0x82,
}

impl ValueKind {
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::ByteArray),
            0x01 => Some(Self::Boolean),
            0x02 => Some(Self::Integer),
            0x40 => Some(Self::InteropHandle),
            0x80 => Some(Self::Array),
            0x81 => Some(Self::Struct),
            0x82 => Some(Self::Map),
            _ => None,
        }
    }
}

/// A value on the evaluation stack.
///
/// `Array`, `Struct` and `Map` are shared containers: cloning a
/// `StackValue` clones the handle, so aliasing and cycles behave the
/// way scripts expect.
#[derive(Debug, Clone)]
pub enum StackValue {
    ByteArray(Vec<u8>),
    Boolean(bool),
    Integer(BigInt),
    Array(ValueList),
    Struct(ValueList),
    Map(ValueMap),
    InteropHandle(InteropHandle),
}

impl StackValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::ByteArray(_) => ValueKind::ByteArray,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Integer(_) => ValueKind::Integer,
            Self::Array(_) => ValueKind::Array,
            Self::Struct(_) => ValueKind::Struct,
            Self::Map(_) => ValueKind::Map,
            Self::InteropHandle(_) => ValueKind::InteropHandle,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::ByteArray(_) => "ByteArray",
            Self::Boolean(_) => "Boolean",
            Self::Integer(_) => "Integer",
            Self::Array(_) => "Array",
            Self::Struct(_) => "Struct",
            Self::Map(_) => "Map",
            Self::InteropHandle(handle) => handle.kind_name(),
        }
    }

    #[inline]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::ByteArray(bytes.into())
    }

    #[inline]
    pub fn from_bool(value: bool) -> Self {
        Self::Boolean(value)
    }

    #[inline]
    pub fn from_int(value: impl Into<BigInt>) -> Self {
        Self::Integer(value.into())
    }

    pub fn new_array(items: Vec<StackValue>) -> Self {
        Self::Array(ValueList::new(items))
    }

    pub fn new_struct(items: Vec<StackValue>) -> Self {
        Self::Struct(ValueList::new(items))
    }

    pub fn new_map() -> Self {
        Self::Map(ValueMap::new())
    }

    /// True for `Array`, `Struct` and `Map`.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Struct(_) | Self::Map(_))
    }

    /// The container identity, when the value is a container.
    pub fn container_id(&self) -> Option<usize> {
        match self {
            Self::Array(list) | Self::Struct(list) => Some(list.id()),
            Self::Map(map) => Some(map.id()),
            _ => None,
        }
    }

    /// Scalar byte form: raw octets for byte arrays, `{0x01}`/empty
    /// for booleans, minimal two's-complement little-endian for
    /// integers. Containers and handles have no byte form.
    pub fn to_bytes(&self) -> InteropResult<Vec<u8>> {
        match self {
            Self::ByteArray(bytes) => Ok(bytes.clone()),
            Self::Boolean(true) => Ok(vec![0x01]),
            Self::Boolean(false) => Ok(Vec::new()),
            Self::Integer(value) => Ok(bigint_to_bytes(value)),
            other => Err(InteropError::not_supported(format!(
                "{} has no byte representation",
                other.kind_name()
            ))),
        }
    }

    /// Scalar integer form; byte arrays decode as signed little-endian.
    pub fn to_bigint(&self) -> InteropResult<BigInt> {
        match self {
            Self::Integer(value) => Ok(value.clone()),
            Self::Boolean(value) => Ok(BigInt::from(u8::from(*value))),
            Self::ByteArray(bytes) => Ok(bigint_from_bytes(bytes)),
            other => Err(InteropError::not_supported(format!(
                "{} has no integer representation",
                other.kind_name()
            ))),
        }
    }

    /// Truthiness: byte arrays are true iff any byte is nonzero,
    /// integers iff nonzero; containers and handles are always true.
    pub fn to_bool(&self) -> bool {
        match self {
            Self::ByteArray(bytes) => bytes.iter().any(|b| *b != 0),
            Self::Boolean(value) => *value,
            Self::Integer(value) => !value.is_zero(),
            _ => true,
        }
    }

    pub fn as_handle(&self) -> InteropResult<&InteropHandle> {
        match self {
            Self::InteropHandle(handle) => Ok(handle),
            other => Err(InteropError::invalid_argument(
                "an interop handle",
                other.kind_name(),
            )),
        }
    }

    /// Structural deep copy. Shared containers are copied once and the
    /// copies re-linked, so aliasing and cycles survive the copy
    /// without looping.
    pub fn deep_copy(&self) -> StackValue {
        let mut copies: HashMap<usize, StackValue> = HashMap::new();
        self.deep_copy_inner(&mut copies)
    }

    fn deep_copy_inner(&self, copies: &mut HashMap<usize, StackValue>) -> StackValue {
        match self {
            Self::Array(list) | Self::Struct(list) => {
                if let Some(copy) = copies.get(&list.id()) {
                    return copy.clone();
                }
                let copy_list = ValueList::new(Vec::new());
                let copy = match self {
                    Self::Array(_) => Self::Array(copy_list.clone()),
                    _ => Self::Struct(copy_list.clone()),
                };
                copies.insert(list.id(), copy.clone());
                for item in list.items() {
                    copy_list.push(item.deep_copy_inner(copies));
                }
                copy
            }
            Self::Map(map) => {
                if let Some(copy) = copies.get(&map.id()) {
                    return copy.clone();
                }
                let copy_map = ValueMap::new();
                let copy = Self::Map(copy_map.clone());
                copies.insert(map.id(), copy.clone());
                for (key, value) in map.entries() {
                    copy_map.push_entry(key.clone(), value.deep_copy_inner(copies));
                }
                copy
            }
            other => other.clone(),
        }
    }

    /// Structural equality. Array and Struct are distinct kinds; maps
    /// compare entries in insertion order. Callers must not hand in
    /// cyclic values.
    pub fn equals(&self, other: &StackValue) -> bool {
        match (self, other) {
            (Self::ByteArray(a), Self::ByteArray(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Array(a), Self::Array(b)) | (Self::Struct(a), Self::Struct(b)) => {
                if a.id() == b.id() {
                    return true;
                }
                let left = a.items();
                let right = b.items();
                left.len() == right.len()
                    && left.iter().zip(right.iter()).all(|(x, y)| x.equals(y))
            }
            (Self::Map(a), Self::Map(b)) => {
                if a.id() == b.id() {
                    return true;
                }
                let left = a.entries();
                let right = b.entries();
                left.len() == right.len()
                    && left
                        .iter()
                        .zip(right.iter())
                        .all(|((ka, va), (kb, vb))| ka.equals(kb) && va.equals(vb))
            }
            (Self::InteropHandle(a), Self::InteropHandle(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for StackValue {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

/// Minimal two's-complement little-endian encoding; zero is empty.
pub(crate) fn bigint_to_bytes(value: &BigInt) -> Vec<u8> {
    if value.is_zero() {
        Vec::new()
    } else {
        value.to_signed_bytes_le()
    }
}

/// Inverse of [`bigint_to_bytes`]; an empty slice decodes to zero.
pub(crate) fn bigint_from_bytes(bytes: &[u8]) -> BigInt {
    BigInt::from_signed_bytes_le(bytes)
}

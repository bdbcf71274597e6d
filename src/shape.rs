//! Registration-time check that an input type is a record.
//!
//! The type's `Deserialize` impl is driven with a deserializer that only
//! records which entry point was requested and then fails. Derived impls for
//! structs with named fields ask for `deserialize_struct`; everything else
//! (scalars, sequences, maps, enums, options, tuple and unit structs) asks for
//! something else. `Box<T>` forwards to `T`, so an owning pointer to a record
//! is accepted as well.

use std::{any::type_name, fmt::Display};

use serde::de::{self, DeserializeOwned, Deserializer, Visitor};

use crate::{InputShape, SignatureError};


pub(crate) fn probe<T: DeserializeOwned>() -> Result<InputShape, SignatureError> {
    let mut found = None;
    let _ = T::deserialize(ShapeProbe(&mut found));
    match found {
        Some(Found::Struct { name, fields }) => Ok(InputShape {
            type_name: type_name::<T>(),
            name,
            fields,
        }),
        Some(Found::Other(found)) => Err(SignatureError::InputNotRecord {
            type_name: type_name::<T>(),
            found,
        }),
        None => Err(SignatureError::InputNotRecord {
            type_name: type_name::<T>(),
            found: "nothing",
        }),
    }
}

enum Found {
    Struct {
        name: &'static str,
        fields: &'static [&'static str],
    },
    Other(&'static str),
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct ProbeError(String);

impl de::Error for ProbeError {
    fn custom<T: Display>(msg: T) -> Self {
        Self(msg.to_string())
    }
}

struct ShapeProbe<'a>(&'a mut Option<Found>);

impl ShapeProbe<'_> {
    fn record<V>(self, found: Found) -> Result<V, ProbeError> {
        if self.0.is_none() {
            *self.0 = Some(found);
        }
        Err(ProbeError("shape recorded".into()))
    }
}

macro_rules! reject {
    ($($method:ident => $found:literal,)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, ProbeError> {
                self.record(Found::Other($found))
            }
        )*
    };
}

impl<'de> Deserializer<'de> for ShapeProbe<'_> {
    type Error = ProbeError;

    reject! {
        deserialize_any => "any",
        deserialize_bool => "bool",
        deserialize_i8 => "i8",
        deserialize_i16 => "i16",
        deserialize_i32 => "i32",
        deserialize_i64 => "i64",
        deserialize_i128 => "i128",
        deserialize_u8 => "u8",
        deserialize_u16 => "u16",
        deserialize_u32 => "u32",
        deserialize_u64 => "u64",
        deserialize_u128 => "u128",
        deserialize_f32 => "f32",
        deserialize_f64 => "f64",
        deserialize_char => "char",
        deserialize_str => "string",
        deserialize_string => "string",
        deserialize_bytes => "bytes",
        deserialize_byte_buf => "bytes",
        deserialize_option => "option",
        deserialize_unit => "unit",
        deserialize_seq => "sequence",
        deserialize_map => "map",
        deserialize_identifier => "identifier",
        deserialize_ignored_any => "any",
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, ProbeError> {
        self.record(Found::Other("unit struct"))
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, ProbeError> {
        self.record(Found::Other("newtype struct"))
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value, ProbeError> {
        self.record(Found::Other("tuple"))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value, ProbeError> {
        self.record(Found::Other("tuple struct"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, ProbeError> {
        self.record(Found::Struct { name, fields })
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, ProbeError> {
        self.record(Found::Other("enum"))
    }
}

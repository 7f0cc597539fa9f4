//! Structural pruning of serializable values.
//!
//! [`PruningSerializer`] is a `serde::Serializer` whose output is
//! `Option<Value>`: `None` means the value is empty and must not appear in the
//! encoded document. Containers are rebuilt from their surviving children, so
//! emptiness propagates upwards (a struct whose fields are all empty is itself
//! empty, however deep the nesting).

use serde::Serialize;
use serde::ser::{self, Impossible};
use serde_json::{Map, Number, Value};

use crate::error::EncodeError;
use crate::timestamp::{TIMESTAMP_TOKEN, ZERO_TIMESTAMP};

/// Prune any serializable value.
///
/// Returns `Ok(None)` when nothing survives.
///
/// # Errors
/// Returns [`EncodeError`] when the value has no JSON representation.
pub fn prune<T: Serialize + ?Sized>(value: &T) -> Result<Option<Value>, EncodeError> {
    value.serialize(PruningSerializer)
}

/// Prune an already-decoded JSON document.
///
/// Equivalent to [`prune`] on the same value, but infallible since every
/// `Value` is representable.
#[must_use]
pub fn prune_value(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Bool(b) => b.then_some(Value::Bool(true)),
        Value::Number(n) => (!is_zero(n)).then(|| Value::Number(n.clone())),
        Value::String(s) => (!s.is_empty()).then(|| Value::String(s.clone())),
        Value::Array(items) => non_empty_array(items.iter().filter_map(prune_value).collect()),
        Value::Object(map) => non_empty_object(
            map.iter()
                .filter_map(|(k, v)| prune_value(v).map(|v| (k.clone(), v)))
                .collect(),
        ),
    }
}

fn is_zero(n: &Number) -> bool {
    n.as_u64() == Some(0) || n.as_i64() == Some(0) || n.as_f64().is_some_and(|f| f == 0.0)
}

fn non_empty_array(items: Vec<Value>) -> Option<Value> {
    (!items.is_empty()).then_some(Value::Array(items))
}

fn non_empty_object(map: Map<String, Value>) -> Option<Value> {
    (!map.is_empty()).then_some(Value::Object(map))
}

fn tagged(variant: &str, inner: Option<Value>) -> Option<Value> {
    inner.map(|inner| {
        let mut map = Map::with_capacity(1);
        map.insert(variant.to_owned(), inner);
        Value::Object(map)
    })
}

/// Serializer producing the pruned tree of a value.
#[derive(Debug, Clone, Copy)]
pub struct PruningSerializer;

impl ser::Serializer for PruningSerializer {
    type Ok = Option<Value>;
    type Error = EncodeError;

    type SerializeSeq = PruneSeq;
    type SerializeTuple = PruneSeq;
    type SerializeTupleStruct = PruneSeq;
    type SerializeTupleVariant = PruneTupleVariant;
    type SerializeMap = PruneMap;
    type SerializeStruct = PruneStruct;
    type SerializeStructVariant = PruneStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok, Self::Error> {
        Ok(v.then_some(Value::Bool(true)))
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok, Self::Error> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok, Self::Error> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok, Self::Error> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok, Self::Error> {
        Ok((v != 0).then(|| Value::from(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<Self::Ok, Self::Error> {
        if v == 0 {
            return Ok(None);
        }
        if let Ok(n) = i64::try_from(v) {
            return Ok(Some(Value::from(n)));
        }
        if let Ok(n) = u64::try_from(v) {
            return Ok(Some(Value::from(n)));
        }
        Err(EncodeError::NumberOutOfRange(v.to_string()))
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok, Self::Error> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok, Self::Error> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok, Self::Error> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok, Self::Error> {
        Ok((v != 0).then(|| Value::from(v)))
    }

    fn serialize_u128(self, v: u128) -> Result<Self::Ok, Self::Error> {
        if v == 0 {
            return Ok(None);
        }
        u64::try_from(v)
            .map(|n| Some(Value::from(n)))
            .map_err(|_| EncodeError::NumberOutOfRange(v.to_string()))
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok, Self::Error> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok, Self::Error> {
        if v == 0.0 {
            return Ok(None);
        }
        Number::from_f64(v)
            .map(|n| Some(Value::Number(n)))
            .ok_or(EncodeError::NonFiniteFloat)
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
        Ok(Some(Value::String(v.to_string())))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
        Ok((!v.is_empty()).then(|| Value::String(v.to_owned())))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
        Ok(non_empty_array(
            v.iter().filter(|b| **b != 0).map(|b| Value::from(*b)).collect(),
        ))
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        Ok(None)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Ok(None)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
        Ok(None)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        let inner = value.serialize(self)?;
        if name == TIMESTAMP_TOKEN
            && matches!(&inner, Some(Value::String(s)) if s == ZERO_TIMESTAMP)
        {
            return Ok(None);
        }
        Ok(inner)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        Ok(tagged(variant, value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Ok(PruneSeq {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Ok(PruneTupleVariant {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Ok(PruneMap {
            map: Map::new(),
            next_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(PruneStruct { map: Map::new() })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Ok(PruneStructVariant {
            variant,
            map: Map::new(),
        })
    }
}

pub struct PruneSeq {
    items: Vec<Value>,
}

impl PruneSeq {
    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), EncodeError> {
        if let Some(v) = value.serialize(PruningSerializer)? {
            self.items.push(v);
        }
        Ok(())
    }
}

impl ser::SerializeSeq for PruneSeq {
    type Ok = Option<Value>;
    type Error = EncodeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.push(value)
    }

    fn end(self) -> Result<Option<Value>, EncodeError> {
        Ok(non_empty_array(self.items))
    }
}

impl ser::SerializeTuple for PruneSeq {
    type Ok = Option<Value>;
    type Error = EncodeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.push(value)
    }

    fn end(self) -> Result<Option<Value>, EncodeError> {
        Ok(non_empty_array(self.items))
    }
}

impl ser::SerializeTupleStruct for PruneSeq {
    type Ok = Option<Value>;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.push(value)
    }

    fn end(self) -> Result<Option<Value>, EncodeError> {
        Ok(non_empty_array(self.items))
    }
}

pub struct PruneTupleVariant {
    variant: &'static str,
    items: Vec<Value>,
}

impl ser::SerializeTupleVariant for PruneTupleVariant {
    type Ok = Option<Value>;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), EncodeError> {
        if let Some(v) = value.serialize(PruningSerializer)? {
            self.items.push(v);
        }
        Ok(())
    }

    fn end(self) -> Result<Option<Value>, EncodeError> {
        Ok(tagged(self.variant, non_empty_array(self.items)))
    }
}

pub struct PruneMap {
    map: Map<String, Value>,
    next_key: Option<String>,
}

impl ser::SerializeMap for PruneMap {
    type Ok = Option<Value>;
    type Error = EncodeError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), EncodeError> {
        self.next_key = Some(key.serialize(MapKeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), EncodeError> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| EncodeError::Custom("map value serialized before its key".to_owned()))?;
        if let Some(v) = value.serialize(PruningSerializer)? {
            self.map.insert(key, v);
        }
        Ok(())
    }

    fn end(self) -> Result<Option<Value>, EncodeError> {
        Ok(non_empty_object(self.map))
    }
}

pub struct PruneStruct {
    map: Map<String, Value>,
}

impl ser::SerializeStruct for PruneStruct {
    type Ok = Option<Value>;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), EncodeError> {
        if let Some(v) = value.serialize(PruningSerializer)? {
            self.map.insert(key.to_owned(), v);
        }
        Ok(())
    }

    fn end(self) -> Result<Option<Value>, EncodeError> {
        Ok(non_empty_object(self.map))
    }
}

pub struct PruneStructVariant {
    variant: &'static str,
    map: Map<String, Value>,
}

impl ser::SerializeStructVariant for PruneStructVariant {
    type Ok = Option<Value>;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), EncodeError> {
        if let Some(v) = value.serialize(PruningSerializer)? {
            self.map.insert(key.to_owned(), v);
        }
        Ok(())
    }

    fn end(self) -> Result<Option<Value>, EncodeError> {
        Ok(tagged(self.variant, non_empty_object(self.map)))
    }
}

/// Stringifies map keys the way `serde_json` does.
struct MapKeySerializer;

impl ser::Serializer for MapKeySerializer {
    type Ok = String;
    type Error = EncodeError;

    type SerializeSeq = Impossible<String, EncodeError>;
    type SerializeTuple = Impossible<String, EncodeError>;
    type SerializeTupleStruct = Impossible<String, EncodeError>;
    type SerializeTupleVariant = Impossible<String, EncodeError>;
    type SerializeMap = Impossible<String, EncodeError>;
    type SerializeStruct = Impossible<String, EncodeError>;
    type SerializeStructVariant = Impossible<String, EncodeError>;

    fn serialize_bool(self, v: bool) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_i128(self, v: i128) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_u128(self, v: u128) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, _v: f32) -> Result<String, EncodeError> {
        Err(EncodeError::KeyMustBeScalar)
    }

    fn serialize_f64(self, _v: f64) -> Result<String, EncodeError> {
        Err(EncodeError::KeyMustBeScalar)
    }

    fn serialize_char(self, v: char) -> Result<String, EncodeError> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String, EncodeError> {
        Ok(v.to_owned())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String, EncodeError> {
        Err(EncodeError::KeyMustBeScalar)
    }

    fn serialize_none(self) -> Result<String, EncodeError> {
        Err(EncodeError::KeyMustBeScalar)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<String, EncodeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String, EncodeError> {
        Err(EncodeError::KeyMustBeScalar)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String, EncodeError> {
        Err(EncodeError::KeyMustBeScalar)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String, EncodeError> {
        Ok(variant.to_owned())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String, EncodeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String, EncodeError> {
        Err(EncodeError::KeyMustBeScalar)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, EncodeError> {
        Err(EncodeError::KeyMustBeScalar)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, EncodeError> {
        Err(EncodeError::KeyMustBeScalar)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, EncodeError> {
        Err(EncodeError::KeyMustBeScalar)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, EncodeError> {
        Err(EncodeError::KeyMustBeScalar)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, EncodeError> {
        Err(EncodeError::KeyMustBeScalar)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, EncodeError> {
        Err(EncodeError::KeyMustBeScalar)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, EncodeError> {
        Err(EncodeError::KeyMustBeScalar)
    }
}

//! Layer 0: Payload fields
//!
//! Payload: the domain fields an entry carries besides `id` and `children`
//! (label, hidden, resource references). Stored as an ordered JSON object
//! so snapshots and wire output are deterministic.
//!
//! This is the deep-clone boundary: anything admitted here is plain JSON
//! data, so cloning an entry can never fail or truncate. Non-serializable
//! input is rejected at construction instead.

use std::collections::BTreeMap;

use serde::ser::{
    SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant, SerializeTuple,
    SerializeTupleStruct, SerializeTupleVariant, Serializer,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Keys carried by dedicated entry fields, never inside the payload map.
const RESERVED_KEYS: &[&str] = &["id", "children"];

const LABEL_KEY: &str = "label";
const HIDDEN_KEY: &str = "hidden";

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload encode failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("non-finite float values are not allowed in payloads")]
    NonFiniteFloat,
    #[error("payload must be a json object, got {got}")]
    NotAnObject { got: &'static str },
}

/// Ordered field map for an entry's domain properties.
///
/// `serde_json::to_value` maps NaN and infinities to `null` instead of
/// failing, which would corrupt caller data silently. [`Payload::from_serialize`]
/// runs a finite scan first so that case surfaces as
/// [`PayloadError::NonFiniteFloat`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a payload from any serializable value that forms a JSON object.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, PayloadError> {
        check_finite(value)?;
        match serde_json::to_value(value)? {
            Value::Object(map) => {
                let mut payload = Self(map.into_iter().collect());
                payload.strip_reserved();
                Ok(payload)
            }
            other => Err(PayloadError::NotAnObject {
                got: json_kind(&other),
            }),
        }
    }

    /// Build a payload from an already-parsed JSON value.
    ///
    /// Parsed JSON cannot carry non-finite numbers, so only the object
    /// check applies.
    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        match value {
            Value::Object(map) => {
                let mut payload = Self(map.into_iter().collect());
                payload.strip_reserved();
                Ok(payload)
            }
            other => Err(PayloadError::NotAnObject {
                got: json_kind(&other),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert a field. Reserved keys (`id`, `children`) are ignored; those
    /// live in the entry's own fields.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if !RESERVED_KEYS.contains(&key.as_str()) {
            self.0.insert(key, value);
        }
    }

    /// Insert a float field, rejecting NaN and infinities.
    pub fn insert_number(&mut self, key: impl Into<String>, value: f64) -> Result<(), PayloadError> {
        let num = serde_json::Number::from_f64(value).ok_or(PayloadError::NonFiniteFloat)?;
        self.insert(key, Value::Number(num));
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn label(&self) -> Option<&str> {
        self.0.get(LABEL_KEY).and_then(Value::as_str)
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.0.insert(LABEL_KEY.into(), Value::String(label.into()));
    }

    /// Whether the entry is hidden in the presented tree. Absent means no.
    pub fn hidden(&self) -> bool {
        self.0
            .get(HIDDEN_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// The raw hidden flag, distinguishing "absent" from explicit values.
    pub fn hidden_flag(&self) -> Option<bool> {
        self.0.get(HIDDEN_KEY).and_then(Value::as_bool)
    }

    /// Write the hidden flag. `None` removes the key, restoring the
    /// "never touched" shape.
    pub fn set_hidden(&mut self, hidden: Option<bool>) {
        match hidden {
            Some(flag) => {
                self.0.insert(HIDDEN_KEY.into(), Value::Bool(flag));
            }
            None => {
                self.0.remove(HIDDEN_KEY);
            }
        }
    }

    /// Overlay `patch` onto this payload. Top-level keys overwrite
    /// wholesale; there is no deep merge.
    pub fn merge_from(&mut self, patch: &Payload) {
        for (key, value) in &patch.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub(crate) fn strip_reserved(&mut self) {
        for key in RESERVED_KEYS {
            self.0.remove(*key);
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check_finite<T: Serialize>(value: &T) -> Result<(), PayloadError> {
    value
        .serialize(FiniteScan)
        .map_err(|_| PayloadError::NonFiniteFloat)
}

#[derive(Debug)]
struct NonFinite;

impl std::fmt::Display for NonFinite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("non-finite float")
    }
}

impl std::error::Error for NonFinite {}

impl serde::ser::Error for NonFinite {
    fn custom<T: std::fmt::Display>(_msg: T) -> Self {
        NonFinite
    }
}

/// Serializer that visits every float in a value tree and fails on the
/// first non-finite one. Produces no output.
struct FiniteScan;

struct FiniteScanParts;

impl Serializer for FiniteScan {
    type Ok = ();
    type Error = NonFinite;
    type SerializeSeq = FiniteScanParts;
    type SerializeTuple = FiniteScanParts;
    type SerializeTupleStruct = FiniteScanParts;
    type SerializeTupleVariant = FiniteScanParts;
    type SerializeMap = FiniteScanParts;
    type SerializeStruct = FiniteScanParts;
    type SerializeStructVariant = FiniteScanParts;

    fn serialize_bool(self, _v: bool) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_i8(self, _v: i8) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_i16(self, _v: i16) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_i32(self, _v: i32) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_i64(self, _v: i64) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_u8(self, _v: u8) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_u16(self, _v: u16) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_u32(self, _v: u32) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_u64(self, _v: u64) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<(), NonFinite> {
        if v.is_finite() { Ok(()) } else { Err(NonFinite) }
    }

    fn serialize_f64(self, v: f64) -> Result<(), NonFinite> {
        if v.is_finite() { Ok(()) } else { Err(NonFinite) }
    }

    fn serialize_char(self, _v: char) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_str(self, _v: &str) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_none(self) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<(), NonFinite> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<(), NonFinite> {
        Ok(())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), NonFinite> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<(), NonFinite> {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<FiniteScanParts, NonFinite> {
        Ok(FiniteScanParts)
    }

    fn serialize_tuple(self, _len: usize) -> Result<FiniteScanParts, NonFinite> {
        Ok(FiniteScanParts)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<FiniteScanParts, NonFinite> {
        Ok(FiniteScanParts)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<FiniteScanParts, NonFinite> {
        Ok(FiniteScanParts)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<FiniteScanParts, NonFinite> {
        Ok(FiniteScanParts)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<FiniteScanParts, NonFinite> {
        Ok(FiniteScanParts)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<FiniteScanParts, NonFinite> {
        Ok(FiniteScanParts)
    }
}

impl SerializeSeq for FiniteScanParts {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), NonFinite> {
        value.serialize(FiniteScan)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

impl SerializeTuple for FiniteScanParts {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), NonFinite> {
        value.serialize(FiniteScan)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

impl SerializeTupleStruct for FiniteScanParts {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), NonFinite> {
        value.serialize(FiniteScan)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

impl SerializeTupleVariant for FiniteScanParts {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), NonFinite> {
        value.serialize(FiniteScan)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

impl SerializeMap for FiniteScanParts {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), NonFinite> {
        key.serialize(FiniteScan)
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), NonFinite> {
        value.serialize(FiniteScan)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

impl SerializeStruct for FiniteScanParts {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), NonFinite> {
        value.serialize(FiniteScan)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

impl SerializeStructVariant for FiniteScanParts {
    type Ok = ();
    type Error = NonFinite;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), NonFinite> {
        value.serialize(FiniteScan)
    }

    fn end(self) -> Result<(), NonFinite> {
        Ok(())
    }
}

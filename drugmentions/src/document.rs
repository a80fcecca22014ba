//! # Document serializer
//!
//! Renders the mention graphs and the aggregate results as a plain tree of
//! objects, arrays, strings, numbers, booleans and nulls, then persists that
//! tree as JSON.
//!
//! ## Contract
//!
//! - **Dates**: every `NaiveDate` field goes through [`iso_date`] and renders
//!   as `YYYY-MM-DD`
//! - **Everything else without a tree form fails**: raw byte blobs,
//!   NaN/infinite floats and non-scalar map keys raise a [`SerializeError`]
//!   instead of being coerced or dropped
//!
//! `serde_json::to_value` cannot be used directly: it silently turns byte
//! blobs into number arrays and NaN into `null`.

use crate::error::{MentionError, Result, SerializeError};
use serde::de::DeserializeOwned;
use serde::ser::{self, Serializer};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Number, Value};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// `#[serde(with = "iso_date")]` helper for calendar dates
pub mod iso_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&text, FORMAT).map_err(de::Error::custom)
    }
}

/// Render any serializable value as a document tree
///
/// # Errors
///
/// Returns `SerializeError` for byte blobs, non-finite floats and map keys
/// that are not strings, numbers or booleans.
pub fn to_document<T>(value: &T) -> std::result::Result<Value, SerializeError>
where
    T: ?Sized + Serialize,
{
    value.serialize(DocumentSerializer)
}

/// Write `data` as pretty JSON (4-space indent) at `path`
///
/// Missing parent directories are created. Non-ASCII text is written as-is.
pub fn save_as_json<T>(data: &T, path: &Path) -> Result<()>
where
    T: ?Sized + Serialize,
{
    let document = to_document(data)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| MentionError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let file = File::create(path).map_err(|source| MentionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    // the document is already a plain value tree, so only the writer can fail
    document
        .serialize(&mut serializer)
        .map_err(|source| MentionError::Io {
            path: path.to_path_buf(),
            source: source.into(),
        })?;
    writer.flush().map_err(|source| MentionError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Read back a document written by [`save_as_json`]
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|source| MentionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

// ============================================================================
// Serializer
// ============================================================================

/// Serde serializer producing a [`Value`] tree, strict about unrepresentable
/// values
pub struct DocumentSerializer;

impl ser::Serializer for DocumentSerializer {
    type Ok = Value;
    type Error = SerializeError;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = VariantSeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = VariantMapBuilder;

    fn serialize_bool(self, v: bool) -> std::result::Result<Value, SerializeError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> std::result::Result<Value, SerializeError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> std::result::Result<Value, SerializeError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> std::result::Result<Value, SerializeError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> std::result::Result<Value, SerializeError> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_u8(self, v: u8) -> std::result::Result<Value, SerializeError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> std::result::Result<Value, SerializeError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> std::result::Result<Value, SerializeError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> std::result::Result<Value, SerializeError> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_f32(self, v: f32) -> std::result::Result<Value, SerializeError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> std::result::Result<Value, SerializeError> {
        Number::from_f64(v)
            .map(Value::Number)
            .ok_or(SerializeError::NonFiniteFloat(v))
    }

    fn serialize_char(self, v: char) -> std::result::Result<Value, SerializeError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> std::result::Result<Value, SerializeError> {
        Ok(Value::String(v.to_owned()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> std::result::Result<Value, SerializeError> {
        Err(SerializeError::UnsupportedType("bytes"))
    }

    fn serialize_none(self) -> std::result::Result<Value, SerializeError> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> std::result::Result<Value, SerializeError>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> std::result::Result<Value, SerializeError> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> std::result::Result<Value, SerializeError> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> std::result::Result<Value, SerializeError> {
        Ok(Value::String(variant.to_owned()))
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> std::result::Result<Value, SerializeError>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> std::result::Result<Value, SerializeError>
    where
        T: ?Sized + Serialize,
    {
        let mut object = Map::new();
        object.insert(variant.to_owned(), value.serialize(DocumentSerializer)?);
        Ok(Value::Object(object))
    }

    fn serialize_seq(self, len: Option<usize>) -> std::result::Result<SeqBuilder, SerializeError> {
        Ok(SeqBuilder {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> std::result::Result<SeqBuilder, SerializeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> std::result::Result<SeqBuilder, SerializeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> std::result::Result<VariantSeqBuilder, SerializeError> {
        Ok(VariantSeqBuilder {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> std::result::Result<MapBuilder, SerializeError> {
        Ok(MapBuilder {
            object: Map::new(),
            next_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> std::result::Result<MapBuilder, SerializeError> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> std::result::Result<VariantMapBuilder, SerializeError> {
        Ok(VariantMapBuilder {
            variant,
            object: Map::new(),
        })
    }
}

/// Map keys must end up as strings; scalar keys are stringified.
fn key_to_string<T>(key: &T) -> std::result::Result<String, SerializeError>
where
    T: ?Sized + Serialize,
{
    match key.serialize(DocumentSerializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Err(SerializeError::KeyMustBeString("null".into())),
        Value::Array(_) => Err(SerializeError::KeyMustBeString("array".into())),
        Value::Object(_) => Err(SerializeError::KeyMustBeString("object".into())),
    }
}

pub struct SeqBuilder {
    items: Vec<Value>,
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_element<T>(&mut self, value: &T) -> std::result::Result<(), SerializeError>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(value.serialize(DocumentSerializer)?);
        Ok(())
    }

    fn end(self) -> std::result::Result<Value, SerializeError> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_element<T>(&mut self, value: &T) -> std::result::Result<(), SerializeError>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> std::result::Result<Value, SerializeError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T>(&mut self, value: &T) -> std::result::Result<(), SerializeError>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> std::result::Result<Value, SerializeError> {
        ser::SerializeSeq::end(self)
    }
}

pub struct VariantSeqBuilder {
    variant: &'static str,
    items: Vec<Value>,
}

impl ser::SerializeTupleVariant for VariantSeqBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T>(&mut self, value: &T) -> std::result::Result<(), SerializeError>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(value.serialize(DocumentSerializer)?);
        Ok(())
    }

    fn end(self) -> std::result::Result<Value, SerializeError> {
        let mut object = Map::new();
        object.insert(self.variant.to_owned(), Value::Array(self.items));
        Ok(Value::Object(object))
    }
}

pub struct MapBuilder {
    object: Map<String, Value>,
    next_key: Option<String>,
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_key<T>(&mut self, key: &T) -> std::result::Result<(), SerializeError>
    where
        T: ?Sized + Serialize,
    {
        self.next_key = Some(key_to_string(key)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> std::result::Result<(), SerializeError>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| SerializeError::Custom("map value written before its key".into()))?;
        self.object.insert(key, value.serialize(DocumentSerializer)?);
        Ok(())
    }

    fn end(self) -> std::result::Result<Value, SerializeError> {
        Ok(Value::Object(self.object))
    }
}

impl ser::SerializeStruct for MapBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> std::result::Result<(), SerializeError>
    where
        T: ?Sized + Serialize,
    {
        self.object
            .insert(key.to_owned(), value.serialize(DocumentSerializer)?);
        Ok(())
    }

    fn end(self) -> std::result::Result<Value, SerializeError> {
        Ok(Value::Object(self.object))
    }
}

pub struct VariantMapBuilder {
    variant: &'static str,
    object: Map<String, Value>,
}

impl ser::SerializeStructVariant for VariantMapBuilder {
    type Ok = Value;
    type Error = SerializeError;

    fn serialize_field<T>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> std::result::Result<(), SerializeError>
    where
        T: ?Sized + Serialize,
    {
        self.object
            .insert(key.to_owned(), value.serialize(DocumentSerializer)?);
        Ok(())
    }

    fn end(self) -> std::result::Result<Value, SerializeError> {
        let mut outer = Map::new();
        outer.insert(self.variant.to_owned(), Value::Object(self.object));
        Ok(Value::Object(outer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Dated {
        #[serde(with = "iso_date")]
        date: NaiveDate,
    }

    struct Blob(Vec<u8>);

    impl Serialize for Blob {
        fn serialize<S: ser::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
            serializer.serialize_bytes(&self.0)
        }
    }

    #[test]
    fn test_date_renders_as_iso_string() {
        let value = Dated {
            date: NaiveDate::from_ymd_opt(2021, 7, 4).unwrap(),
        };
        assert_eq!(to_document(&value).unwrap(), json!({ "date": "2021-07-04" }));
    }

    #[test]
    fn test_byte_blob_is_rejected() {
        let err = to_document(&Blob(vec![0xde, 0xad])).unwrap_err();
        assert!(matches!(err, SerializeError::UnsupportedType("bytes")));
    }

    #[test]
    fn test_nested_byte_blob_is_rejected() {
        let mut nested = BTreeMap::new();
        nested.insert("payload", vec![Blob(vec![1, 2, 3])]);
        assert!(to_document(&nested).is_err());
    }

    #[test]
    fn test_non_finite_float_is_rejected() {
        let err = to_document(&vec![1.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, SerializeError::NonFiniteFloat(_)));
    }

    #[test]
    fn test_scalar_map_keys_are_stringified() {
        let mut counts = BTreeMap::new();
        counts.insert(3u32, "three");
        assert_eq!(to_document(&counts).unwrap(), json!({ "3": "three" }));
    }

    #[test]
    fn test_composite_map_keys_are_rejected() {
        let mut pairs = BTreeMap::new();
        pairs.insert(vec![1, 2], "pair");
        let err = to_document(&pairs).unwrap_err();
        assert!(matches!(err, SerializeError::KeyMustBeString(ref kind) if kind == "array"));
    }

    #[test]
    fn test_save_as_json_creates_directories_and_indents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.json");

        save_as_json(&json!({ "journal": "Psychopharmacology" }), &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n    \"journal\": \"Psychopharmacology\"\n}");
    }

    #[test]
    fn test_save_as_json_keeps_non_ascii() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");

        save_as_json(&vec!["Journal de pédiatrie"], &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("pédiatrie"));
        let back: Vec<String> = read_json(&path).unwrap();
        assert_eq!(back, vec!["Journal de pédiatrie".to_string()]);
    }

    #[test]
    fn test_save_as_json_fails_loudly_on_blob() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob.json");

        let err = save_as_json(&Blob(vec![1]), &path).unwrap_err();
        assert!(matches!(err, MentionError::Serialize(_)));
        assert!(!path.exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_save_as_json_write_failure_names_the_file() {
        let full = Path::new("/dev/full");
        if !full.exists() {
            return;
        }
        // larger than the write buffer so the failure surfaces mid-document
        let journals = vec!["Journal of emergency nursing"; 2048];

        let err = save_as_json(&journals, full).unwrap_err();
        assert!(matches!(err, MentionError::Io { ref path, .. } if path == full));
    }
}

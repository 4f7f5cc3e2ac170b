//! Key/value records for raw storage engine cursors.
//!
//! A table in the storage engine declares two format strings, one for keys and one for
//! values. In raw mode the engine only moves opaque byte spans around, so the packing and
//! unpacking of both halves happens here.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::format::Format;
use crate::value::Value;

/// Key and value format strings, as declared by a table's schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub key_format: String,
    pub value_format: String,
}

/// Parsed key and value formats for one table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordFormat {
    key: Format,
    value: Format,
}

impl RecordFormat {
    /// Parse a key format and a value format.
    pub fn new(key_format: &str, value_format: &str) -> Result<RecordFormat> {
        let key = Format::parse(key_format).map_err(|e| Error::BadSchema {
            part: "key",
            cause: Box::new(e),
        })?;
        let value = Format::parse(value_format).map_err(|e| Error::BadSchema {
            part: "value",
            cause: Box::new(e),
        })?;
        Ok(RecordFormat { key, value })
    }

    pub fn from_schema(schema: &TableSchema) -> Result<RecordFormat> {
        Self::new(&schema.key_format, &schema.value_format)
    }

    pub fn key_format(&self) -> &Format {
        &self.key
    }

    pub fn value_format(&self) -> &Format {
        &self.value
    }

    pub fn pack_key(&self, keys: &[Value]) -> Result<Vec<u8>> {
        self.key.pack(keys)
    }

    pub fn pack_value(&self, values: &[Value]) -> Result<Vec<u8>> {
        self.value.pack(values)
    }

    pub fn unpack_key(&self, data: &[u8]) -> Result<Vec<Value>> {
        self.key.unpack(data)
    }

    pub fn unpack_value(&self, data: &[u8]) -> Result<Vec<Value>> {
        self.value.unpack(data)
    }
}

/// A storage engine cursor opened in raw mode, which exchanges keys and values as opaque bytes.
///
/// Implementations wrap whatever the engine provides. Engine failures should be reported as
/// [`Error::Engine`].
pub trait RawCursor {
    /// Insert a packed key and value.
    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Advance to the next record, returning its packed key and value, or `None` at the end.
    fn next(&mut self) -> Result<Option<(Vec<u8>, Vec<u8>)>>;

    /// Return the cursor to its unpositioned state.
    fn reset(&mut self) -> Result<()>;
}

/// A typed cursor over a raw engine cursor.
///
/// Keys and values are staged with [`set_key`](RecordCursor::set_key) and
/// [`set_value`](RecordCursor::set_value), then written together by
/// [`insert`](RecordCursor::insert). Scanning with [`next`](RecordCursor::next) keeps the
/// current record so [`key`](RecordCursor::key) and [`value`](RecordCursor::value) can unpack
/// it.
pub struct RecordCursor<C> {
    raw: C,
    format: RecordFormat,
    key_buf: Option<Vec<u8>>,
    value_buf: Option<Vec<u8>>,
    current: Option<(Vec<u8>, Vec<u8>)>,
}

impl<C: RawCursor> RecordCursor<C> {
    pub fn new(raw: C, format: RecordFormat) -> Self {
        Self {
            raw,
            format,
            key_buf: None,
            value_buf: None,
            current: None,
        }
    }

    /// Open a typed cursor using the formats from a table schema.
    pub fn with_schema(raw: C, schema: &TableSchema) -> Result<Self> {
        Ok(Self::new(raw, RecordFormat::from_schema(schema)?))
    }

    pub fn format(&self) -> &RecordFormat {
        &self.format
    }

    /// Pack and stage the key for the next insert. On failure the staged key is cleared.
    pub fn set_key(&mut self, keys: &[Value]) -> Result<()> {
        self.key_buf = None;
        self.key_buf = Some(self.format.pack_key(keys)?);
        Ok(())
    }

    /// Pack and stage the value for the next insert. On failure the staged value is cleared.
    pub fn set_value(&mut self, values: &[Value]) -> Result<()> {
        self.value_buf = None;
        self.value_buf = Some(self.format.pack_value(values)?);
        Ok(())
    }

    /// Insert the staged key and value, then clear them.
    pub fn insert(&mut self) -> Result<()> {
        let key = self.key_buf.as_deref().ok_or(Error::MissingField("key"))?;
        let value = self.value_buf.as_deref().ok_or(Error::MissingField("value"))?;
        self.raw.insert(key, value)?;
        debug!(key_len = key.len(), value_len = value.len(), "inserted record");
        self.key_buf = None;
        self.value_buf = None;
        Ok(())
    }

    /// Advance to the next record. Returns `false` at the end of the scan.
    pub fn next(&mut self) -> Result<bool> {
        self.current = self.raw.next()?;
        Ok(self.current.is_some())
    }

    /// Unpack the key of the current record.
    pub fn key(&self) -> Result<Vec<Value>> {
        let (key, _) = self.current.as_ref().ok_or(Error::NoCurrentRecord)?;
        self.format.unpack_key(key)
    }

    /// Unpack the value of the current record.
    pub fn value(&self) -> Result<Vec<Value>> {
        let (_, value) = self.current.as_ref().ok_or(Error::NoCurrentRecord)?;
        self.format.unpack_value(value)
    }

    /// Drop any staged key and value and reset the engine cursor.
    pub fn reset(&mut self) -> Result<()> {
        self.key_buf = None;
        self.value_buf = None;
        self.current = None;
        self.raw.reset()?;
        debug!("reset cursor");
        Ok(())
    }

    /// Give back the raw cursor.
    pub fn into_inner(self) -> C {
        self.raw
    }
}

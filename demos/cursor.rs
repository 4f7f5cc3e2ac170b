//! Pack and scan a few records through a typed cursor backed by an in-memory table.
//!
//! Run with `RUST_LOG=debug cargo run --example cursor` to see the cursor's log output.

use std::collections::BTreeMap;

use rawpack::{RawCursor, RecordCursor, Result, TableSchema, Value};

/// Stand-in for a storage engine table opened in raw mode.
#[derive(Default)]
struct MemTable {
    rows: BTreeMap<Vec<u8>, Vec<u8>>,
    scan: Option<std::vec::IntoIter<(Vec<u8>, Vec<u8>)>>,
}

impl RawCursor for MemTable {
    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.rows.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn next(&mut self) -> Result<Option<(Vec<u8>, Vec<u8>)>> {
        let rows = &self.rows;
        let scan = self.scan.get_or_insert_with(|| {
            rows.iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Vec<_>>()
                .into_iter()
        });
        Ok(scan.next())
    }

    fn reset(&mut self) -> Result<()> {
        self.scan = None;
        Ok(())
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let schema: TableSchema =
        serde_json::from_str(r#"{ "key_format": "r", "value_format": "S3sh" }"#)?;

    let mut cursor = RecordCursor::with_schema(MemTable::default(), &schema)?;
    let people = [
        (3u64, "Grace", "USA", 1906i16),
        (1, "Ada", "GBR", 1815),
        (2, "Alan", "GBR", 1912),
    ];
    for (id, name, country, born) in people {
        cursor.set_key(&[Value::U64(id)])?;
        cursor.set_value(&[Value::cstr(name), Value::fixed_str(country), Value::I16(born)])?;
        cursor.insert()?;
    }

    while cursor.next()? {
        let key = cursor.key()?;
        let value = cursor.value()?;
        let fields: Vec<String> = value.iter().map(|v| v.to_string()).collect();
        println!("{} => {}", key[0], fields.join(", "));
    }
    Ok(())
}

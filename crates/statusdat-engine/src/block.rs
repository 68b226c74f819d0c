use serde::ser::{Serialize, SerializeMap, Serializer};

/// Key the block type is exposed under when a block is serialized as a map.
pub const TYPE_KEY: &str = "_type";

/// One `name { ... }` record of a status file.
///
/// Fields keep the order they first appeared in. Setting a field that already
/// exists replaces its value in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    block_type: String,
    fields: Vec<(String, String)>,
}

impl Block {
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            fields: Vec::new(),
        }
    }

    pub fn block_type(&self) -> &str {
        &self.block_type
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `key=value` lines, used to attach a partial block to a diagnostic.
    pub fn to_dump(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Serializes as a flat map: `_type` first, then the fields in source order.
/// A source field literally named `_type` is skipped so the key stays unique.
impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields: Vec<_> = self.fields.iter().filter(|(k, _)| k != TYPE_KEY).collect();
        let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
        map.serialize_entry(TYPE_KEY, &self.block_type)?;
        for (k, v) in fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

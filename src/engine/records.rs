// Records supplied by the outside world. The scene only needs the id and
// the list order; everything else rides along untouched as payload.

use std::sync::Arc;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use super::reveal::ListKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    pub fn new(id: i64) -> Self {
        Self { id, payload: serde_json::Map::new() }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.payload.insert(key.to_owned(), value.into());
        self
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(|v| v.as_str())
    }

    /// Display name, falling back to the id when the payload has none.
    pub fn title(&self) -> String {
        match self.text("name") {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => format!("#{}", self.id),
        }
    }
}

/// The current ordered record list. Replacing it bumps the generation so
/// downstream caches and the reveal scheduler notice even when the length
/// happens to match.
#[derive(Resource, Debug, Clone, Default)]
pub struct RecordSet {
    records: Arc<[Record]>,
    generation: u64,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records: records.into(), generation: 1 }
    }

    pub fn replace(&mut self, records: Vec<Record>) {
        self.records = records.into();
        self.generation += 1;
    }

    pub fn key(&self) -> ListKey {
        ListKey { generation: self.generation, len: self.records.len() }
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_kept_verbatim() {
        let json = r#"[{"id": 7, "name": "Juicero", "raised": 120000000, "tags": ["hardware"]}]"#;
        let records: Vec<Record> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0].id, 7);
        assert_eq!(records[0].title(), "Juicero");
        assert_eq!(records[0].payload["raised"], serde_json::json!(120000000));
        assert_eq!(records[0].payload.len(), 3);
    }

    #[test]
    fn negative_ids_load() {
        let records: Vec<Record> = serde_json::from_str(r#"[{"id": -4, "name": "Theranos"}]"#).unwrap();
        assert_eq!(records[0].id, -4);
        assert_eq!(Record::new(-4).title(), "#-4");
    }

    #[test]
    fn missing_name_falls_back_to_id() {
        assert_eq!(Record::new(12).title(), "#12");
        assert_eq!(Record::new(12).with_field("name", "").title(), "#12");
    }

    #[test]
    fn replacing_changes_key_even_at_same_length() {
        let mut set = RecordSet::new(vec![Record::new(1), Record::new(2)]);
        let before = set.key();
        set.replace(vec![Record::new(3), Record::new(4)]);
        assert_ne!(set.key(), before);
        assert_eq!(set.key().len, 2);
    }
}

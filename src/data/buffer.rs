use serde::Serialize;

use crate::data::attributes::AttributeRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BufferBase {
    pub id: String,
    pub name: String,
    pub attribute: Option<String>,
    pub buff_type: Option<String>,
    pub debuff: bool,
    pub duration: Option<f64>,
    pub scale: Option<f64>,
    pub group: Option<String>,
    pub overlap: Option<String>,
}

impl BufferBase {
    pub fn from_record(record: &AttributeRecord) -> Option<Self> {
        let id = record.id()?.to_string();
        Some(Self {
            name: record.string("name").unwrap_or_else(|| id.clone()),
            id,
            attribute: record.string("attr"),
            buff_type: record.string("bufftype"),
            debuff: record.get("debuff").is_some_and(|v| v != "0"),
            duration: record.parse("buffdur"),
            scale: record.parse("buffscale"),
            group: record.string("group"),
            overlap: record.string("overlap"),
        })
    }
}

use serde::Serialize;

use crate::data::attributes::AttributeRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemBase {
    pub id: String,
    pub name: String,
    pub item_type: Option<String>,
    pub rank: Option<String>,
    pub group: Option<String>,
    pub money_price: Option<i64>,
    pub stack_number: Option<u32>,
    pub comment: Option<String>,
}

impl ItemBase {
    pub fn from_record(record: &AttributeRecord) -> Option<Self> {
        let id = record.id()?.to_string();
        Some(Self {
            name: record.string("name").unwrap_or_else(|| id.clone()),
            id,
            item_type: record.string("type"),
            rank: record.string("rank"),
            group: record.string("group"),
            money_price: record.parse("money_price"),
            stack_number: record.parse("stack_num"),
            comment: record.string("comment"),
        })
    }
}

use serde::Serialize;

use crate::data::attributes::AttributeRecord;

/// Equipment stat block. Display names live on the item with the same id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipBase {
    pub id: String,
    pub rank: Option<String>,
    pub base_level_max: Option<u32>,
    pub hp: Option<i64>,
    pub attack: Option<i64>,
    pub defense: Option<i64>,
    pub speed: Option<i64>,
    pub movement: Option<i64>,
    pub critical: Option<i64>,
    pub skill: Option<String>,
}

impl EquipBase {
    pub fn from_record(record: &AttributeRecord) -> Option<Self> {
        Some(Self {
            id: record.id()?.to_string(),
            rank: record.string("rank"),
            base_level_max: record.parse("base_lv_max"),
            hp: record.parse("hp"),
            attack: record.parse("atk"),
            defense: record.parse("def"),
            speed: record.parse("spd"),
            movement: record.parse("move"),
            critical: record.parse("crit"),
            skill: record.string("skill"),
        })
    }
}

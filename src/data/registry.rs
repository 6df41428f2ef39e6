//! In-memory master data (units, skills, equips, buffs, items, and generic
//! elements such as quests and stages), loaded once and read-only afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;

use crate::data::attributes::AttributeRecord;
use crate::data::buffer::BufferBase;
use crate::data::equip::EquipBase;
use crate::data::error::MasterDataError;
use crate::data::item::ItemBase;
use crate::data::skill::SkillBase;
use crate::data::unit::UnitBase;

pub const DEFAULT_MASTER_DATA_PATH: &str = "data/bgr.xml";

/// Root element of the game's master-data XML.
pub const XML_ROOT: &str = "BGR";

pub const TAG_UNIT: &str = "hero";
pub const TAG_SKILL: &str = "skill";
pub const TAG_EQUIP: &str = "equip";
pub const TAG_BUFF: &str = "buff";
pub const TAG_ITEM: &str = "item";
pub const TAG_QUEST: &str = "quest";
pub const TAG_STAGE: &str = "stage";

/// Element tags read from an XML document. Other elements are only structure
/// and are walked through, not recorded.
pub const XML_ELEMENT_TAGS: &[&str] = &[
    TAG_UNIT,
    "herogroup",
    TAG_SKILL,
    TAG_EQUIP,
    TAG_BUFF,
    TAG_ITEM,
    "specialitem",
    "achievement",
    TAG_QUEST,
    TAG_STAGE,
    "stagelist",
    "stagearea",
    "stage_group",
    "chapter_group",
];

/// Read-only lookups the battle log pipeline needs from master data.
pub trait MasterData {
    fn unit(&self, template_id: u32) -> Option<&UnitBase>;
    /// Reverse lookup of the unit that performs `skill_id`. When several units
    /// match, the last top-rank upgraded ("+") unit wins, else the first match.
    fn unit_by_skill_id(&self, skill_id: u32) -> Option<&UnitBase>;
    fn skill(&self, skill_id: u32) -> Option<&SkillBase>;
    fn equip(&self, equip_id: u32) -> Option<&EquipBase>;
    fn item(&self, item_id: u32) -> Option<&ItemBase>;
    fn buff(&self, buff_id: u32) -> Option<&BufferBase>;
}

/// Records of one type in document order with an id index.
/// A repeated id replaces the earlier record but keeps its position.
#[derive(Debug, Clone)]
pub struct RecordTable<T> {
    records: IndexMap<String, T>,
}

impl<T> Default for RecordTable<T> {
    fn default() -> Self {
        Self {
            records: IndexMap::new(),
        }
    }
}

impl<T> RecordTable<T> {
    fn insert(&mut self, id: String, record: T) {
        self.records.insert(id, record);
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Master data loaded from one document.
#[derive(Debug, Clone, Default)]
pub struct MasterDataSet {
    pub units: RecordTable<UnitBase>,
    pub skills: RecordTable<SkillBase>,
    pub equips: RecordTable<EquipBase>,
    pub buffs: RecordTable<BufferBase>,
    pub items: RecordTable<ItemBase>,
    /// Every other element tag (quests, stages, ...) as raw attribute records.
    pub elements: BTreeMap<String, RecordTable<AttributeRecord>>,
    /// Attribute names observed per tag, across all records of that tag.
    pub key_sets: BTreeMap<String, BTreeSet<String>>,
    /// Elements dropped because they carried no `id`.
    pub skipped_without_id: usize,
}

impl MasterDataSet {
    /// Parse a master-data JSON document: `{ "<tag>": [ {attributes...}, ... ], ... }`.
    pub fn from_json_str(input: &str) -> Result<Self, MasterDataError> {
        let document: Value = serde_json::from_str(input).map_err(MasterDataError::Parse)?;
        let Value::Object(tags) = document else {
            return Err(MasterDataError::NotAnObject {
                found: json_kind(&document),
            });
        };

        let mut set = MasterDataSet::default();
        for (tag, elements) in &tags {
            let Some(elements) = elements.as_array() else {
                tracing::debug!(tag = %tag, "master data tag is not an array; skipping");
                continue;
            };
            for element in elements.iter().filter_map(Value::as_object) {
                set.insert(AttributeRecord::from_json(tag, element));
            }
        }

        set.log_summary();
        Ok(set)
    }

    /// Parse the game's master-data XML: a `<BGR>` root whose descendant
    /// elements carry their fields as attributes.
    pub fn from_xml_str(input: &str) -> Result<Self, MasterDataError> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let document =
            roxmltree::Document::parse_with_options(input, options).map_err(MasterDataError::Xml)?;
        let root = document.root_element();
        if root.tag_name().name() != XML_ROOT {
            return Err(MasterDataError::UnexpectedRoot {
                expected: XML_ROOT,
                found: root.tag_name().name().to_string(),
            });
        }

        let mut set = MasterDataSet::default();
        for element in root
            .descendants()
            .filter(|node| node.is_element() && XML_ELEMENT_TAGS.contains(&node.tag_name().name()))
        {
            set.insert(AttributeRecord::from_xml(element));
        }
        set.log_summary();
        Ok(set)
    }

    /// Parse either format, picked from the first significant character.
    pub fn from_document_str(input: &str) -> Result<Self, MasterDataError> {
        let trimmed = input.trim_start_matches('\u{feff}').trim_start();
        if trimmed.starts_with('<') {
            Self::from_xml_str(trimmed)
        } else {
            Self::from_json_str(input)
        }
    }

    fn log_summary(&self) {
        tracing::info!(
            units = self.units.len(),
            skills = self.skills.len(),
            equips = self.equips.len(),
            buffs = self.buffs.len(),
            items = self.items.len(),
            skipped = self.skipped_without_id,
            "master data loaded"
        );
    }

    /// Insert one element, routing it to its typed table by tag.
    pub fn insert(&mut self, record: AttributeRecord) {
        let Some(id) = record.id().map(str::to_string) else {
            self.skipped_without_id += 1;
            return;
        };
        self.key_sets
            .entry(record.tag.clone())
            .or_default()
            .extend(record.keys().map(str::to_string));

        match record.tag.as_str() {
            TAG_UNIT => insert_typed(&mut self.units, id, UnitBase::from_record(&record)),
            TAG_SKILL => insert_typed(&mut self.skills, id, SkillBase::from_record(&record)),
            TAG_EQUIP => insert_typed(&mut self.equips, id, EquipBase::from_record(&record)),
            TAG_BUFF => insert_typed(&mut self.buffs, id, BufferBase::from_record(&record)),
            TAG_ITEM => insert_typed(&mut self.items, id, ItemBase::from_record(&record)),
            _ => {
                let tag = record.tag.clone();
                self.elements.entry(tag).or_default().insert(id, record);
            }
        }
    }

    /// Raw elements of a generic tag (quests, stages, ...).
    pub fn elements(&self, tag: &str) -> Option<&RecordTable<AttributeRecord>> {
        self.elements.get(tag)
    }

    /// Record count per tag, typed tags first.
    pub fn summary(&self) -> Vec<(String, usize)> {
        let mut counts = vec![
            (TAG_UNIT.to_string(), self.units.len()),
            (TAG_SKILL.to_string(), self.skills.len()),
            (TAG_EQUIP.to_string(), self.equips.len()),
            (TAG_BUFF.to_string(), self.buffs.len()),
            (TAG_ITEM.to_string(), self.items.len()),
        ];
        counts.extend(
            self.elements
                .iter()
                .map(|(tag, table)| (tag.clone(), table.len())),
        );
        counts
    }
}

fn insert_typed<T>(table: &mut RecordTable<T>, id: String, record: Option<T>) {
    if let Some(record) = record {
        table.insert(id, record);
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl MasterData for MasterDataSet {
    fn unit(&self, template_id: u32) -> Option<&UnitBase> {
        self.units.get(&template_id.to_string())
    }

    fn unit_by_skill_id(&self, skill_id: u32) -> Option<&UnitBase> {
        let skill_id = skill_id.to_string();
        let mut first = None;
        let mut upgraded = None;
        for unit in self.units.iter().filter(|unit| unit.uses_skill(&skill_id)) {
            first.get_or_insert(unit);
            if unit.is_upgraded_top_rank() {
                upgraded = Some(unit);
            }
        }
        upgraded.or(first)
    }

    fn skill(&self, skill_id: u32) -> Option<&SkillBase> {
        self.skills.get(&skill_id.to_string())
    }

    fn equip(&self, equip_id: u32) -> Option<&EquipBase> {
        self.equips.get(&equip_id.to_string())
    }

    fn item(&self, item_id: u32) -> Option<&ItemBase> {
        self.items.get(&item_id.to_string())
    }

    fn buff(&self, buff_id: u32) -> Option<&BufferBase> {
        self.buffs.get(&buff_id.to_string())
    }
}

/// Load master data from an XML or JSON file.
pub fn load_master_data(path: impl AsRef<Path>) -> Result<MasterDataSet, MasterDataError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| MasterDataError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    MasterDataSet::from_document_str(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "hero": [
            {"id": "1", "name": "Slime", "rank": "1", "monster_skill": "500"},
            {"id": "2", "name": "Slime King", "rank": "5", "monster_skill": "500,501"},
            {"id": "3", "name": "Slime King+", "rank": "5", "nskill": "500"},
            {"id": "4", "name": "Slime Lord+", "rank": "5", "askill": "500"},
            {"id": "5", "name": "Goblin+", "rank": "4", "nskill": "600"},
            {"name": "no id"}
        ],
        "skill": [{"id": "500", "name": "Ooze"}],
        "quest": [{"id": "q1", "name": "Intro", "stage": "10"}],
        "meta": "ignored"
    }"#;

    #[test]
    fn loads_typed_and_generic_tags() {
        let set = MasterDataSet::from_json_str(DOC).expect("load");
        assert_eq!(set.units.len(), 5);
        assert_eq!(set.skipped_without_id, 1);
        assert_eq!(set.skill(500).map(|s| s.name.as_str()), Some("Ooze"));
        assert_eq!(set.elements(TAG_QUEST).map(RecordTable::len), Some(1));
        assert!(set.key_sets[TAG_QUEST].contains("stage"));
    }

    #[test]
    fn unit_by_skill_prefers_last_upgraded_top_rank() {
        let set = MasterDataSet::from_json_str(DOC).expect("load");
        assert_eq!(set.unit_by_skill_id(500).map(|u| u.id.as_str()), Some("4"));
    }

    #[test]
    fn unit_by_skill_falls_back_to_first_match() {
        let set = MasterDataSet::from_json_str(DOC).expect("load");
        assert_eq!(set.unit_by_skill_id(600).map(|u| u.id.as_str()), Some("5"));
        assert_eq!(set.unit_by_skill_id(501).map(|u| u.id.as_str()), Some("2"));
        assert!(set.unit_by_skill_id(999).is_none());
    }

    #[test]
    fn repeated_id_replaces_in_place() {
        let set = MasterDataSet::from_json_str(
            r#"{"hero": [{"id": "1", "name": "A"}, {"id": "2", "name": "B"}, {"id": "1", "name": "C"}]}"#,
        )
        .expect("load");
        let names: Vec<_> = set.units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["C", "B"]);
    }

    #[test]
    fn xml_reads_known_tags_at_any_depth() {
        let set = MasterDataSet::from_xml_str(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <BGR>
                <hero id="1" name="Slime" rank="1" monster_skill="500"/>
                <heroes><hero id="2" name="Slime King+" rank="5" nskill="500"/></heroes>
                <hero name="no id"/>
                <skill id="500" name="Ooze"/>
                <stage_group id="g1" name="Caves"/>
                <note id="n1"/>
            </BGR>"#,
        )
        .expect("load");
        assert_eq!(set.units.len(), 2);
        assert_eq!(set.skipped_without_id, 1);
        assert_eq!(set.unit_by_skill_id(500).map(|u| u.id.as_str()), Some("2"));
        assert_eq!(set.elements("stage_group").map(RecordTable::len), Some(1));
        assert!(set.elements("note").is_none());
    }

    #[test]
    fn xml_requires_bgr_root() {
        let err = MasterDataSet::from_xml_str(r#"<ELG><hero id="1"/></ELG>"#).unwrap_err();
        assert!(matches!(err, MasterDataError::UnexpectedRoot { found, .. } if found == "ELG"));
        assert!(matches!(
            MasterDataSet::from_xml_str("<BGR><hero"),
            Err(MasterDataError::Xml(_))
        ));
    }

    #[test]
    fn document_format_is_sniffed() {
        let xml = MasterDataSet::from_document_str("\n  <BGR><skill id=\"1\" name=\"A\"/></BGR>").expect("xml");
        let json = MasterDataSet::from_document_str(r#"{"skill": [{"id": "1", "name": "A"}]}"#).expect("json");
        assert_eq!(xml.skill(1).map(|s| s.name.as_str()), Some("A"));
        assert_eq!(json.skill(1).map(|s| s.name.as_str()), Some("A"));
    }

    #[test]
    fn rejects_non_object_document() {
        let err = MasterDataSet::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, MasterDataError::NotAnObject { found: "an array" }));
    }
}

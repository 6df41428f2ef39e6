//! Unit (hero/monster) master data.

use serde::Serialize;

use crate::data::attributes::AttributeRecord;

/// Rank value marking top-rank units.
pub const TOP_RANK: &str = "5";

/// Marker in a unit's display name for upgraded variants.
pub const UPGRADE_MARKER: char = '+';

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitBase {
    pub id: String,
    pub group_id: Option<String>,
    pub name: String,
    pub attribute: Option<String>,
    pub rank: Option<String>,
    pub max_level: Option<u32>,
    pub summon_cooldown: Option<f64>,
    pub hp: Option<i64>,
    pub attack: Option<i64>,
    pub defense: Option<i64>,
    pub speed: Option<i64>,
    pub movement: Option<i64>,
    pub critical: Option<i64>,
    pub leader_skill: Option<String>,
    pub attack_skill: Option<String>,
    pub normal_skill: Option<String>,
    pub monster_skills: Vec<String>,
    /// `back_passive_skill1`, `back_passive_skill2`, ...
    pub passive_skills: Vec<String>,
    pub talent_skills: Vec<String>,
    pub comment: Option<String>,
}

impl UnitBase {
    /// Map a `hero` element. Returns `None` when the element has no id.
    pub fn from_record(record: &AttributeRecord) -> Option<Self> {
        let id = record.id()?.to_string();
        Some(Self {
            name: record.string("name").unwrap_or_else(|| id.clone()),
            id,
            group_id: record.string("group_id"),
            attribute: record.string("attr"),
            rank: record.string("rank"),
            max_level: record.parse("max_lv"),
            summon_cooldown: record.parse("summon_cd"),
            hp: record.parse("hp"),
            attack: record.parse("atk"),
            defense: record.parse("def"),
            speed: record.parse("spd"),
            movement: record.parse("move"),
            critical: record.parse("crit"),
            leader_skill: record.string("lskill"),
            attack_skill: record.string("askill"),
            normal_skill: record.string("nskill"),
            monster_skills: record.list("monster_skill"),
            passive_skills: record.numbered("back_passive_skill"),
            talent_skills: record.numbered("talent_skill_id"),
            comment: record.string("comment"),
        })
    }

    /// True when the unit can perform the given skill (normal, attack or monster skill).
    pub fn uses_skill(&self, skill_id: &str) -> bool {
        self.normal_skill.as_deref() == Some(skill_id)
            || self.attack_skill.as_deref() == Some(skill_id)
            || self.monster_skills.iter().any(|s| s == skill_id)
    }

    /// Top-rank upgraded variant: rank "5" and a "+" in the name.
    pub fn is_upgraded_top_rank(&self) -> bool {
        self.rank.as_deref() == Some(TOP_RANK) && self.name.contains(UPGRADE_MARKER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AttributeRecord {
        AttributeRecord::new("hero")
            .with("id", "100")
            .with("name", "Knight+")
            .with("rank", "5")
            .with("nskill", "9001")
            .with("askill", "9002")
            .with("monster_skill", "9100,9101")
            .with("hp", "1500")
    }

    #[test]
    fn maps_hero_attributes() {
        let unit = UnitBase::from_record(&record()).expect("unit");
        assert_eq!(unit.id, "100");
        assert_eq!(unit.hp, Some(1500));
        assert_eq!(unit.monster_skills, vec!["9100", "9101"]);
        assert!(unit.is_upgraded_top_rank());
    }

    #[test]
    fn uses_skill_checks_all_slots() {
        let unit = UnitBase::from_record(&record()).expect("unit");
        assert!(unit.uses_skill("9001"));
        assert!(unit.uses_skill("9002"));
        assert!(unit.uses_skill("9101"));
        assert!(!unit.uses_skill("910"));
    }

    #[test]
    fn missing_id_is_skipped() {
        assert!(UnitBase::from_record(&AttributeRecord::new("hero").with("name", "x")).is_none());
    }
}

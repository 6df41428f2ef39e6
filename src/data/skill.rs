use serde::Serialize;

use crate::data::attributes::AttributeRecord;

/// One buff slot of a skill (`buff1`/`bprob1`/`buff_self1`...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillBuffSlot {
    pub buff_id: String,
    pub probability: Option<f64>,
    pub on_self: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillBase {
    pub id: String,
    pub name: String,
    pub attribute: Option<String>,
    pub sp: Option<f64>,
    pub first_cooldown: Option<f64>,
    pub cooldown: Option<f64>,
    pub target: Option<String>,
    pub skill_type: Option<String>,
    pub attack_scale: Option<f64>,
    pub attack_add: Option<f64>,
    pub attack_range: Option<f64>,
    pub attack_area: Option<f64>,
    pub buffs: Vec<SkillBuffSlot>,
    pub comment: Option<String>,
}

impl SkillBase {
    pub fn from_record(record: &AttributeRecord) -> Option<Self> {
        let id = record.id()?.to_string();
        let buffs = (1..=2)
            .filter_map(|slot| {
                let buff_id = record.string(&format!("buff{slot}"))?;
                Some(SkillBuffSlot {
                    buff_id,
                    probability: record.parse(&format!("bprob{slot}")),
                    on_self: record.get(&format!("buff_self{slot}")) == Some("1"),
                })
            })
            .collect();
        Some(Self {
            name: record.string("name").unwrap_or_else(|| id.clone()),
            id,
            attribute: record.string("attr"),
            sp: record.parse("sp"),
            first_cooldown: record.parse("first_cd"),
            cooldown: record.parse("cd"),
            target: record.string("target"),
            skill_type: record.string("type"),
            attack_scale: record.parse("atkscale"),
            attack_add: record.parse("atkadd"),
            attack_range: record.parse("atkrange"),
            attack_area: record.parse("atkarea"),
            buffs,
            comment: record.string("comment"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_present_buff_slots() {
        let record = AttributeRecord::new("skill")
            .with("id", "9001")
            .with("name", "Slash")
            .with("buff2", "300")
            .with("bprob2", "0.5")
            .with("buff_self2", "1");
        let skill = SkillBase::from_record(&record).expect("skill");
        assert_eq!(skill.name, "Slash");
        assert_eq!(skill.buffs.len(), 1);
        assert_eq!(skill.buffs[0].buff_id, "300");
        assert_eq!(skill.buffs[0].probability, Some(0.5));
        assert!(skill.buffs[0].on_self);
    }
}

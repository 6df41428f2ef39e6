//! Master-data tables for the data browser.

use std::fmt;
use std::str::FromStr;

use crate::data::registry::{TAG_QUEST, TAG_STAGE};
use crate::data::{MasterData, MasterDataSet};
use crate::report::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseKind {
    Units,
    Equips,
    Skills,
    Buffs,
    Items,
    Quests,
    Stages,
}

impl BrowseKind {
    pub const ALL: [BrowseKind; 7] = [
        BrowseKind::Units,
        BrowseKind::Equips,
        BrowseKind::Skills,
        BrowseKind::Buffs,
        BrowseKind::Items,
        BrowseKind::Quests,
        BrowseKind::Stages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Units => "units",
            Self::Equips => "equips",
            Self::Skills => "skills",
            Self::Buffs => "buffs",
            Self::Items => "items",
            Self::Quests => "quests",
            Self::Stages => "stages",
        }
    }
}

impl fmt::Display for BrowseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted || kind.as_str().trim_end_matches('s') == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(BrowseKind::as_str).collect();
                format!("unknown kind {s:?} (expected one of: {})", known.join(", "))
            })
    }
}

fn cell<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// Skill name for an id cell, or the raw id when master data has no such skill.
fn skill_cell(master: &MasterDataSet, skill_id: Option<&str>) -> String {
    let Some(id) = skill_id else {
        return String::new();
    };
    id.parse::<u32>()
        .ok()
        .and_then(|id| master.skill(id))
        .map_or_else(|| id.to_string(), |skill| skill.name.clone())
}

pub fn browse(master: &MasterDataSet, kind: BrowseKind) -> Table {
    match kind {
        BrowseKind::Units => units(master),
        BrowseKind::Equips => equips(master),
        BrowseKind::Skills => skills(master),
        BrowseKind::Buffs => buffs(master),
        BrowseKind::Items => items(master),
        BrowseKind::Quests => generic(master, TAG_QUEST),
        BrowseKind::Stages => generic(master, TAG_STAGE),
    }
}

fn units(master: &MasterDataSet) -> Table {
    let mut table = Table::new([
        "id", "name", "attr", "rank", "max_lv", "hp", "atk", "def", "spd", "move", "crit",
        "leader_skill", "attack_skill", "normal_skill", "monster_skills", "passive_skills",
        "comment",
    ]);
    for unit in master.units.iter() {
        let skill_names = |ids: &[String]| {
            ids.iter()
                .map(|id| skill_cell(master, Some(id.as_str())))
                .collect::<Vec<_>>()
                .join(", ")
        };
        table.push_row(vec![
            unit.id.clone(),
            unit.name.clone(),
            cell(&unit.attribute),
            cell(&unit.rank),
            cell(&unit.max_level),
            cell(&unit.hp),
            cell(&unit.attack),
            cell(&unit.defense),
            cell(&unit.speed),
            cell(&unit.movement),
            cell(&unit.critical),
            skill_cell(master, unit.leader_skill.as_deref()),
            skill_cell(master, unit.attack_skill.as_deref()),
            skill_cell(master, unit.normal_skill.as_deref()),
            skill_names(&unit.monster_skills),
            skill_names(&unit.passive_skills),
            cell(&unit.comment),
        ]);
    }
    table
}

fn equips(master: &MasterDataSet) -> Table {
    let mut table = Table::new([
        "id", "name", "rank", "base_lv_max", "hp", "atk", "def", "spd", "move", "crit", "skill",
    ]);
    for equip in master.equips.iter() {
        let name = master
            .items
            .get(&equip.id)
            .map(|item| item.name.clone())
            .unwrap_or_default();
        table.push_row(vec![
            equip.id.clone(),
            name,
            cell(&equip.rank),
            cell(&equip.base_level_max),
            cell(&equip.hp),
            cell(&equip.attack),
            cell(&equip.defense),
            cell(&equip.speed),
            cell(&equip.movement),
            cell(&equip.critical),
            skill_cell(master, equip.skill.as_deref()),
        ]);
    }
    table
}

fn skills(master: &MasterDataSet) -> Table {
    let mut table = Table::new([
        "id", "name", "attr", "sp", "first_cd", "cd", "target", "type", "atkscale", "atkadd",
        "atkrange", "atkarea", "buffs", "comment",
    ]);
    for skill in master.skills.iter() {
        let buffs: Vec<String> = skill
            .buffs
            .iter()
            .map(|slot| {
                let name = master
                    .buffs
                    .get(&slot.buff_id)
                    .map_or(slot.buff_id.as_str(), |buff| buff.name.as_str());
                let target = if slot.on_self { " (self)" } else { "" };
                match slot.probability {
                    Some(p) => format!("{name}{target} {p}"),
                    None => format!("{name}{target}"),
                }
            })
            .collect();
        table.push_row(vec![
            skill.id.clone(),
            skill.name.clone(),
            cell(&skill.attribute),
            cell(&skill.sp),
            cell(&skill.first_cooldown),
            cell(&skill.cooldown),
            cell(&skill.target),
            cell(&skill.skill_type),
            cell(&skill.attack_scale),
            cell(&skill.attack_add),
            cell(&skill.attack_range),
            cell(&skill.attack_area),
            buffs.join(", "),
            cell(&skill.comment),
        ]);
    }
    table
}

fn buffs(master: &MasterDataSet) -> Table {
    let mut table = Table::new([
        "id", "name", "attr", "type", "debuff", "duration", "scale", "group", "overlap",
    ]);
    for buff in master.buffs.iter() {
        table.push_row(vec![
            buff.id.clone(),
            buff.name.clone(),
            cell(&buff.attribute),
            cell(&buff.buff_type),
            if buff.debuff { "1" } else { "0" }.to_string(),
            cell(&buff.duration),
            cell(&buff.scale),
            cell(&buff.group),
            cell(&buff.overlap),
        ]);
    }
    table
}

fn items(master: &MasterDataSet) -> Table {
    let mut table = Table::new([
        "id", "name", "type", "rank", "group", "money_price", "stack_num", "comment",
    ]);
    for item in master.items.iter() {
        table.push_row(vec![
            item.id.clone(),
            item.name.clone(),
            cell(&item.item_type),
            cell(&item.rank),
            cell(&item.group),
            cell(&item.money_price),
            cell(&item.stack_number),
            cell(&item.comment),
        ]);
    }
    table
}

/// Raw attribute table; columns are every attribute seen on the tag, `id` first.
fn generic(master: &MasterDataSet, tag: &str) -> Table {
    let mut columns = vec!["id".to_string()];
    if let Some(keys) = master.key_sets.get(tag) {
        columns.extend(keys.iter().filter(|key| key.as_str() != "id").cloned());
    }
    let mut table = Table::new(columns.clone());
    for record in master.elements(tag).into_iter().flat_map(|records| records.iter()) {
        table.push_row(
            columns
                .iter()
                .map(|column| record.get(column).unwrap_or_default().to_string())
                .collect(),
        );
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn master() -> MasterDataSet {
        MasterDataSet::from_json_str(
            r#"{
                "hero": [{"id": "100", "name": "Alice", "rank": "5", "nskill": "9001", "atk": "50", "back_passive_skill1": "9001", "back_passive_skill2": "77"}],
                "skill": [{"id": "9001", "name": "Slash", "buff1": "300", "bprob1": "0.5"}],
                "buff": [{"id": "300", "name": "Burn", "debuff": "1"}],
                "equip": [{"id": "4000", "rank": "3", "atk": "12"}],
                "item": [{"id": "4000", "name": "Bronze Sword"}],
                "stage": [{"id": "s1", "name": "Forest", "boss": "200"}, {"id": "s2", "time": "90"}]
            }"#,
        )
        .expect("master data")
    }

    #[test]
    fn kinds_parse_singular_and_plural() {
        assert_eq!("unit".parse::<BrowseKind>(), Ok(BrowseKind::Units));
        assert_eq!("STAGES".parse::<BrowseKind>(), Ok(BrowseKind::Stages));
        assert!("weapons".parse::<BrowseKind>().is_err());
    }

    #[test]
    fn units_show_skill_names() {
        let table = browse(&master(), BrowseKind::Units);
        let column = table.column_index("normal_skill").expect("column");
        assert_eq!(table.rows[0][column], "Slash");
        let column = table.column_index("passive_skills").expect("column");
        assert_eq!(table.rows[0][column], "Slash, 77");
    }

    #[test]
    fn skills_list_buff_names() {
        let table = browse(&master(), BrowseKind::Skills);
        let column = table.column_index("buffs").expect("column");
        assert_eq!(table.rows[0][column], "Burn 0.5");
    }

    #[test]
    fn equips_take_names_from_items() {
        let table = browse(&master(), BrowseKind::Equips);
        assert_eq!(table.rows[0][1], "Bronze Sword");
    }

    #[test]
    fn generic_kinds_use_union_of_keys() {
        let table = browse(&master(), BrowseKind::Stages);
        assert_eq!(table.columns, vec!["id", "boss", "name", "time"]);
        assert_eq!(table.rows[1], vec!["s2", "", "", "90"]);
        assert!(browse(&master(), BrowseKind::Quests).is_empty());
    }
}

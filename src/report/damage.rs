//! The two damage-challenge tables: chronological action log and per-unit totals.

use crate::battle::dmglog::{ActionLogRow, UnitAggregates};
use crate::battle::event::HeroSnapshot;
use crate::battle::identity::{unresolved_name, UnitIdentityMap};
use crate::config::Labels;
use crate::data::MasterData;
use crate::report::table::Table;

pub fn action_log_table(rows: &[ActionLogRow], labels: &Labels) -> Table {
    let mut table = Table::new([
        labels.checkpoint,
        labels.sp,
        labels.summon_auto,
        labels.skill_auto,
        labels.actor,
        labels.skill,
        labels.hits,
    ]);
    for row in rows {
        let cells = match row {
            ActionLogRow::PlayerState {
                checkpoint,
                sp,
                summon_auto,
                skill_auto,
            } => vec![
                checkpoint.to_string(),
                sp.map(|sp| sp.to_string()).unwrap_or_default(),
                summon_auto.map(|f| labels.auto_flag(f).to_string()).unwrap_or_default(),
                skill_auto.map(|f| labels.auto_flag(f).to_string()).unwrap_or_default(),
                String::new(),
                String::new(),
                String::new(),
            ],
            ActionLogRow::Skill {
                checkpoint,
                actor,
                skill_name,
                hits,
            } => {
                let hits: Vec<String> = hits.iter().map(|hit| hit.render(labels)).collect();
                vec![
                    checkpoint.to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    actor.clone(),
                    skill_name.clone(),
                    hits.join("\n"),
                ]
            }
        };
        table.push_row(cells);
    }
    table
}

pub fn unit_table<M>(
    identities: &UnitIdentityMap,
    aggregates: &UnitAggregates,
    master: &M,
    labels: &Labels,
) -> Table
where
    M: MasterData + ?Sized,
{
    let mut table = Table::new([
        labels.unit,
        labels.damage_taken,
        labels.taken_counts,
        labels.damage_given,
        labels.given_counts,
        labels.equipment,
        labels.buffs,
    ]);
    for (id, totals) in aggregates.rows(identities) {
        let Some(identity) = identities.get(id) else {
            continue;
        };
        let (equipment, buffs) = identity
            .hero
            .as_ref()
            .map(|hero| (equipment_summary(hero, master), buff_summary(hero, master)))
            .unwrap_or_default();
        table.push_row(vec![
            identity.display_name.clone(),
            totals.take_damage.to_string(),
            format!(
                "({}/{}/{})",
                totals.take_critical_count, totals.take_hit_count, totals.take_miss_count
            ),
            totals.give_damage.to_string(),
            format!("({}/{})", totals.give_critical_count, totals.give_hit_count),
            equipment,
            buffs,
        ]);
    }
    table
}

/// Item names of the hero's equipment with their levels.
pub fn equipment_summary<M: MasterData + ?Sized>(hero: &HeroSnapshot, master: &M) -> String {
    hero.equips
        .iter()
        .map(|equip| {
            let name = master
                .item(equip.equip_id)
                .map(|item| item.name.clone())
                .unwrap_or_else(|| unresolved_name(equip.equip_id));
            format!("{name} Lv{}", equip.level)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn buff_summary<M: MasterData + ?Sized>(hero: &HeroSnapshot, master: &M) -> String {
    hero.buffs
        .iter()
        .map(|buff| {
            master
                .buff(buff.buff_id)
                .map(|record| record.name.clone())
                .unwrap_or_else(|| unresolved_name(buff.buff_id))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

//! All events decoded from one log line, grouped by kind.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::Value;

use crate::battle::event::{
    BattleEndTime, BattleEvent, DamageChallengeRecord, EventKind, HeroHpSp, HeroJoin,
    OpaqueAction, PlayerInfo, SkillAction,
};

/// Per-kind event sequences, each in insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BattleActionBatch {
    pub battle_start: Vec<OpaqueAction>,
    pub hero_join: Vec<HeroJoin>,
    pub skill_act: Vec<SkillAction>,
    pub hero_move: Vec<OpaqueAction>,
    pub battle_end_time: Vec<BattleEndTime>,
    pub damage_challenge_record: Vec<DamageChallengeRecord>,
    pub hero_buff: Vec<OpaqueAction>,
    pub hero_hp_sp: Vec<HeroHpSp>,
    pub line_index: Vec<OpaqueAction>,
    pub player_info: Vec<PlayerInfo>,
    pub on_cast_skill: Vec<OpaqueAction>,
    pub on_normal_casting_skill: Vec<OpaqueAction>,
    pub on_area_casting_skill: Vec<OpaqueAction>,
    pub off_cast_skill: Vec<OpaqueAction>,
    pub off_casting_skill: Vec<OpaqueAction>,
}

impl BattleActionBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: BattleEvent) {
        match event {
            BattleEvent::BattleStart(e) => self.battle_start.push(e),
            BattleEvent::HeroJoin(e) => self.hero_join.push(e),
            BattleEvent::SkillAct(e) => self.skill_act.push(e),
            BattleEvent::HeroMove(e) => self.hero_move.push(e),
            BattleEvent::UpdateBattleEndTime(e) => self.battle_end_time.push(e),
            BattleEvent::UpdateDamageChallengeRecord(e) => self.damage_challenge_record.push(e),
            BattleEvent::UpdateHeroBuff(e) => self.hero_buff.push(e),
            BattleEvent::UpdateHeroHpSp(e) => self.hero_hp_sp.push(e),
            BattleEvent::UpdateLineIndex(e) => self.line_index.push(e),
            BattleEvent::UpdatePlayerInfo(e) => self.player_info.push(e),
            BattleEvent::OnCastSkill(e) => self.on_cast_skill.push(e),
            BattleEvent::OnNormalCastingSkill(e) => self.on_normal_casting_skill.push(e),
            BattleEvent::OnAreaCastingSkill(e) => self.on_area_casting_skill.push(e),
            BattleEvent::OffCastSkill(e) => self.off_cast_skill.push(e),
            BattleEvent::OffCastingSkill(e) => self.off_casting_skill.push(e),
        }
    }

    /// The opaque-payload sequence for `kind`, if that kind keeps raw payloads.
    fn opaque(&self, kind: EventKind) -> Option<&[OpaqueAction]> {
        let events = match kind {
            EventKind::BattleStart => &self.battle_start,
            EventKind::HeroMove => &self.hero_move,
            EventKind::UpdateHeroBuff => &self.hero_buff,
            EventKind::UpdateLineIndex => &self.line_index,
            EventKind::OnCastSkill => &self.on_cast_skill,
            EventKind::OnNormalCastingSkill => &self.on_normal_casting_skill,
            EventKind::OnAreaCastingSkill => &self.on_area_casting_skill,
            EventKind::OffCastSkill => &self.off_cast_skill,
            EventKind::OffCastingSkill => &self.off_casting_skill,
            _ => return None,
        };
        Some(events.as_slice())
    }

    /// Every opaque-payload event in the batch, in kind order.
    pub fn opaque_actions(&self) -> impl Iterator<Item = &OpaqueAction> {
        EventKind::ALL
            .into_iter()
            .filter_map(move |kind| self.opaque(kind))
            .flatten()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        match kind {
            EventKind::HeroJoin => self.hero_join.len(),
            EventKind::SkillAct => self.skill_act.len(),
            EventKind::UpdateBattleEndTime => self.battle_end_time.len(),
            EventKind::UpdateDamageChallengeRecord => self.damage_challenge_record.len(),
            EventKind::UpdateHeroHpSp => self.hero_hp_sp.len(),
            EventKind::UpdatePlayerInfo => self.player_info.len(),
            opaque => self.opaque(opaque).map_or(0, <[OpaqueAction]>::len),
        }
    }

    /// Non-zero event counts per kind.
    pub fn kind_counts(&self) -> BTreeMap<EventKind, usize> {
        EventKind::ALL
            .into_iter()
            .map(|kind| (kind, self.count(kind)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    pub fn len(&self) -> usize {
        EventKind::ALL.into_iter().map(|kind| self.count(kind)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checkpoint reported by the last damage-challenge record in this batch.
    pub fn checkpoint(&self) -> Option<i64> {
        self.damage_challenge_record.last().map(|record| record.damage)
    }

    /// Keep `self`'s events, then append each event of `other` that is not
    /// already present (deep equality) in the accumulated sequence.
    pub fn merge(mut self, other: &BattleActionBatch) -> Self {
        self.merge_from(other);
        self
    }

    pub fn merge_from(&mut self, other: &BattleActionBatch) {
        merge_sequence(&mut self.battle_start, &other.battle_start);
        merge_sequence(&mut self.hero_join, &other.hero_join);
        merge_sequence(&mut self.skill_act, &other.skill_act);
        merge_sequence(&mut self.hero_move, &other.hero_move);
        merge_sequence(&mut self.battle_end_time, &other.battle_end_time);
        merge_sequence(
            &mut self.damage_challenge_record,
            &other.damage_challenge_record,
        );
        merge_sequence(&mut self.hero_buff, &other.hero_buff);
        merge_sequence(&mut self.hero_hp_sp, &other.hero_hp_sp);
        merge_sequence(&mut self.line_index, &other.line_index);
        merge_sequence(&mut self.player_info, &other.player_info);
        merge_sequence(&mut self.on_cast_skill, &other.on_cast_skill);
        merge_sequence(
            &mut self.on_normal_casting_skill,
            &other.on_normal_casting_skill,
        );
        merge_sequence(&mut self.on_area_casting_skill, &other.on_area_casting_skill);
        merge_sequence(&mut self.off_cast_skill, &other.off_cast_skill);
        merge_sequence(&mut self.off_casting_skill, &other.off_casting_skill);
    }
}

impl FromIterator<BattleEvent> for BattleActionBatch {
    fn from_iter<I: IntoIterator<Item = BattleEvent>>(events: I) -> Self {
        let mut batch = Self::new();
        for event in events {
            batch.push(event);
        }
        batch
    }
}

/// Canonical serialization used as a structural dedup key. Object keys are
/// written sorted regardless of map ordering, so deep-equal values always
/// produce equal keys. `None` sends the caller back to `PartialEq`.
fn dedup_key<T: Serialize>(event: &T) -> Option<String> {
    let value = serde_json::to_value(event).ok()?;
    let mut key = String::new();
    write_canonical(&value, &mut key);
    Some(key)
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
            out.push('{');
            for (i, (name, field)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(name.clone()).to_string());
                out.push(':');
                write_canonical(field, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn merge_sequence<T>(target: &mut Vec<T>, incoming: &[T])
where
    T: Clone + PartialEq + Serialize,
{
    if incoming.is_empty() {
        return;
    }
    let mut seen: HashSet<String> = target.iter().filter_map(dedup_key).collect();
    for event in incoming {
        let fresh = match dedup_key(event) {
            Some(key) => seen.insert(key),
            None => !target.contains(event),
        };
        if fresh {
            target.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::event::SkillHit;

    fn hit(target: i64, delta: i64) -> SkillHit {
        SkillHit {
            target,
            hp_after: 1000 + delta,
            hp_delta: delta,
            critical: false,
            buffs: Vec::new(),
        }
    }

    fn act(actor: i64, skill_id: u32, hits: Vec<SkillHit>) -> BattleEvent {
        BattleEvent::SkillAct(SkillAction {
            actor,
            skill_id,
            hits,
        })
    }

    #[test]
    fn merge_appends_only_new_events() {
        let a: BattleActionBatch = vec![act(1, 10, vec![hit(2, -5)]), act(1, 11, vec![])]
            .into_iter()
            .collect();
        let b: BattleActionBatch = vec![act(1, 11, vec![]), act(3, 12, vec![hit(1, -9)])]
            .into_iter()
            .collect();

        let merged = a.clone().merge(&b);
        assert_eq!(merged.skill_act.len(), 3);
        assert_eq!(merged.skill_act[..2], a.skill_act[..]);
        assert_eq!(merged.skill_act[2].actor, 3);
    }

    #[test]
    fn merge_is_idempotent() {
        let a: BattleActionBatch = vec![
            act(1, 10, vec![hit(2, -5)]),
            BattleEvent::UpdateDamageChallengeRecord(DamageChallengeRecord { damage: 500 }),
        ]
        .into_iter()
        .collect();
        assert_eq!(a.clone().merge(&a), a);
    }

    #[test]
    fn merge_dedups_within_incoming() {
        let a = BattleActionBatch::new();
        let b: BattleActionBatch = vec![act(1, 10, vec![]), act(1, 10, vec![])]
            .into_iter()
            .collect();
        assert_eq!(a.merge(&b).skill_act.len(), 1);
    }

    #[test]
    fn nested_difference_keeps_both() {
        let a: BattleActionBatch = vec![act(1, 10, vec![hit(2, -5)])].into_iter().collect();
        let b: BattleActionBatch = vec![act(1, 10, vec![hit(2, -6)])].into_iter().collect();
        assert_eq!(a.merge(&b).skill_act.len(), 2);
    }

    #[test]
    fn opaque_key_order_does_not_defeat_dedup() {
        let mut forward = serde_json::Map::new();
        forward.insert("lUID".to_string(), Value::from(4));
        forward.insert("nPos".to_string(), serde_json::json!({"x": 1, "y": 2}));
        let mut reverse = serde_json::Map::new();
        reverse.insert("nPos".to_string(), serde_json::json!({"y": 2, "x": 1}));
        reverse.insert("lUID".to_string(), Value::from(4));

        let a: BattleActionBatch = vec![BattleEvent::HeroMove(OpaqueAction::new(forward))]
            .into_iter()
            .collect();
        let b: BattleActionBatch = vec![BattleEvent::HeroMove(OpaqueAction::new(reverse))]
            .into_iter()
            .collect();
        assert_eq!(dedup_key(&a.hero_move[0]), dedup_key(&b.hero_move[0]));
        assert_eq!(
            dedup_key(&a.hero_move[0]).as_deref(),
            Some(r#"{"lUID":4,"nPos":{"x":1,"y":2}}"#)
        );
        assert_eq!(a.merge(&b).hero_move.len(), 1);
    }

    #[test]
    fn checkpoint_is_last_record() {
        let batch: BattleActionBatch = vec![
            BattleEvent::UpdateDamageChallengeRecord(DamageChallengeRecord { damage: 100 }),
            BattleEvent::UpdateDamageChallengeRecord(DamageChallengeRecord { damage: 250 }),
        ]
        .into_iter()
        .collect();
        assert_eq!(batch.checkpoint(), Some(250));
        assert_eq!(BattleActionBatch::new().checkpoint(), None);
    }

    #[test]
    fn counts_cover_opaque_kinds() {
        let batch: BattleActionBatch = vec![
            BattleEvent::HeroMove(OpaqueAction::default()),
            BattleEvent::OffCastSkill(OpaqueAction::default()),
            act(1, 10, vec![]),
        ]
        .into_iter()
        .collect();
        assert_eq!(batch.count(EventKind::HeroMove), 1);
        assert_eq!(batch.count(EventKind::OffCastSkill), 1);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.opaque_actions().count(), 2);
        assert_eq!(batch.kind_counts().len(), 3);
    }
}

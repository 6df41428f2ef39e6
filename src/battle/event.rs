//! Battle event model: one variant per recognized `typeName` tag.
//!
//! Payload structs deserialize straight from the wire field names. Arrays that
//! the producer omits (or sends as `null`) decode as empty.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Battle-local unit identity (`lUID`).
pub type InstanceId = i64;

/// Tag prefix shared by every battle action type name.
pub const TAG_PREFIX: &str = "BAction_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EventKind {
    BattleStart,
    HeroJoin,
    SkillAct,
    HeroMove,
    UpdateBattleEndTime,
    UpdateDamageChallengeRecord,
    UpdateHeroBuff,
    UpdateHeroHpSp,
    UpdateLineIndex,
    UpdatePlayerInfo,
    OnCastSkill,
    OnNormalCastingSkill,
    OnAreaCastingSkill,
    OffCastSkill,
    OffCastingSkill,
}

impl EventKind {
    pub const ALL: [EventKind; 15] = [
        EventKind::BattleStart,
        EventKind::HeroJoin,
        EventKind::SkillAct,
        EventKind::HeroMove,
        EventKind::UpdateBattleEndTime,
        EventKind::UpdateDamageChallengeRecord,
        EventKind::UpdateHeroBuff,
        EventKind::UpdateHeroHpSp,
        EventKind::UpdateLineIndex,
        EventKind::UpdatePlayerInfo,
        EventKind::OnCastSkill,
        EventKind::OnNormalCastingSkill,
        EventKind::OnAreaCastingSkill,
        EventKind::OffCastSkill,
        EventKind::OffCastingSkill,
    ];

    /// Wire tag (`typeName`) for this kind.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::BattleStart => "BAction_BattleStart",
            Self::HeroJoin => "BAction_HeroJoin",
            Self::SkillAct => "BAction_SkillAct",
            Self::HeroMove => "BAction_HeroMove",
            Self::UpdateBattleEndTime => "BAction_UpdateBattleEndTime",
            Self::UpdateDamageChallengeRecord => "BAction_UpdateDamageChallengeRecord",
            Self::UpdateHeroBuff => "BAction_UpdateHeroBuff",
            Self::UpdateHeroHpSp => "BAction_UpdateHeroHPSP",
            Self::UpdateLineIndex => "BAction_UpdateLineIndex",
            Self::UpdatePlayerInfo => "BAction_UpdatePlayerInfo",
            Self::OnCastSkill => "BAction_OnCastSkill",
            Self::OnNormalCastingSkill => "BAction_OnNormalCastingSkill",
            Self::OnAreaCastingSkill => "BAction_OnAreaCastingSkill",
            Self::OffCastSkill => "BAction_OffCastSkill",
            Self::OffCastingSkill => "BAction_OffCastingSkill",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "BAction_BattleStart" => Self::BattleStart,
            "BAction_HeroJoin" => Self::HeroJoin,
            "BAction_SkillAct" => Self::SkillAct,
            "BAction_HeroMove" => Self::HeroMove,
            "BAction_UpdateBattleEndTime" => Self::UpdateBattleEndTime,
            "BAction_UpdateDamageChallengeRecord" => Self::UpdateDamageChallengeRecord,
            "BAction_UpdateHeroBuff" => Self::UpdateHeroBuff,
            "BAction_UpdateHeroHPSP" => Self::UpdateHeroHpSp,
            "BAction_UpdateLineIndex" => Self::UpdateLineIndex,
            "BAction_UpdatePlayerInfo" => Self::UpdatePlayerInfo,
            "BAction_OnCastSkill" => Self::OnCastSkill,
            "BAction_OnNormalCastingSkill" => Self::OnNormalCastingSkill,
            "BAction_OnAreaCastingSkill" => Self::OnAreaCastingSkill,
            "BAction_OffCastSkill" => Self::OffCastSkill,
            "BAction_OffCastingSkill" => Self::OffCastingSkill,
            _ => return None,
        })
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag().trim_start_matches(TAG_PREFIX))
    }
}

/// Treat an explicit `null` like an absent field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A buff carried by a hero or applied by a hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuffApplication {
    #[serde(rename = "uBuffID", default)]
    pub buff_id: u32,
    #[serde(rename = "nLeftTime", default)]
    pub turns_left: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipSnapshot {
    #[serde(rename = "uXID", default)]
    pub equip_id: u32,
    #[serde(rename = "nLevel", default)]
    pub level: u32,
}

/// A unit's state as of the join event that introduced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroSnapshot {
    #[serde(rename = "uXID", default)]
    pub template_id: u32,
    #[serde(rename = "lUID", default)]
    pub instance_id: InstanceId,
    #[serde(rename = "nLevel", default)]
    pub level: u32,
    #[serde(rename = "uGP", default)]
    pub gp_points: u32,
    #[serde(rename = "uTP", default)]
    pub tp_points: u32,
    #[serde(rename = "nHp", default)]
    pub hp: i64,
    #[serde(rename = "cDamageChallengePos", default)]
    pub party_position: i32,
    #[serde(rename = "CEquipDataS", default, deserialize_with = "nullable")]
    pub equips: Vec<EquipSnapshot>,
    #[serde(rename = "CBuffDataS", default, deserialize_with = "nullable")]
    pub buffs: Vec<BuffApplication>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroJoin {
    #[serde(rename = "CHeroDataS", default, deserialize_with = "nullable")]
    pub heroes: Vec<HeroSnapshot>,
}

/// One target outcome of a skill. Negative `hp_delta` is damage, positive is healing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillHit {
    #[serde(rename = "lUID", default)]
    pub target: InstanceId,
    #[serde(rename = "nHP", default)]
    pub hp_after: i64,
    #[serde(rename = "nHPVal", default)]
    pub hp_delta: i64,
    #[serde(rename = "bCrit", default)]
    pub critical: bool,
    #[serde(rename = "CBuffDataS", default, deserialize_with = "nullable")]
    pub buffs: Vec<BuffApplication>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillAction {
    #[serde(rename = "lUID", default)]
    pub actor: InstanceId,
    #[serde(rename = "uSkillID", default)]
    pub skill_id: u32,
    #[serde(rename = "BSkillHitS", default, deserialize_with = "nullable")]
    pub hits: Vec<SkillHit>,
}

/// Damage-challenge checkpoint: total damage dealt so far by the left side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageChallengeRecord {
    #[serde(rename = "lTotalDamageCauseByLeft", default)]
    pub damage: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroHpSp {
    #[serde(rename = "lUID", default)]
    pub unit: InstanceId,
    #[serde(rename = "nHP", default)]
    pub hp: i64,
    #[serde(rename = "nHPVal", default)]
    pub hp_delta: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleEndTime {
    #[serde(rename = "lEndTime", default)]
    pub end_time: i64,
}

/// Player-side state. Fields are absent when the event carried no player entry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerInfo {
    #[serde(rename = "fSP", default)]
    pub sp: Option<f64>,
    #[serde(rename = "bSummonAuto", default)]
    pub summon_auto: Option<bool>,
    #[serde(rename = "bSkillAuto", default)]
    pub skill_auto: Option<bool>,
}

/// Event whose payload is kept verbatim (minus `typeName`).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct OpaqueAction {
    pub fields: Map<String, Value>,
}

impl OpaqueAction {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Unit referenced by the payload (`lUID`), if any.
    pub fn unit(&self) -> Option<InstanceId> {
        self.fields.get("lUID").and_then(Value::as_i64)
    }

    pub fn skill_id(&self) -> Option<u64> {
        self.fields.get("uSkillID").and_then(Value::as_u64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BattleEvent {
    BattleStart(OpaqueAction),
    HeroJoin(HeroJoin),
    SkillAct(SkillAction),
    HeroMove(OpaqueAction),
    UpdateBattleEndTime(BattleEndTime),
    UpdateDamageChallengeRecord(DamageChallengeRecord),
    UpdateHeroBuff(OpaqueAction),
    UpdateHeroHpSp(HeroHpSp),
    UpdateLineIndex(OpaqueAction),
    UpdatePlayerInfo(PlayerInfo),
    OnCastSkill(OpaqueAction),
    OnNormalCastingSkill(OpaqueAction),
    OnAreaCastingSkill(OpaqueAction),
    OffCastSkill(OpaqueAction),
    OffCastingSkill(OpaqueAction),
}

impl BattleEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::BattleStart(_) => EventKind::BattleStart,
            Self::HeroJoin(_) => EventKind::HeroJoin,
            Self::SkillAct(_) => EventKind::SkillAct,
            Self::HeroMove(_) => EventKind::HeroMove,
            Self::UpdateBattleEndTime(_) => EventKind::UpdateBattleEndTime,
            Self::UpdateDamageChallengeRecord(_) => EventKind::UpdateDamageChallengeRecord,
            Self::UpdateHeroBuff(_) => EventKind::UpdateHeroBuff,
            Self::UpdateHeroHpSp(_) => EventKind::UpdateHeroHpSp,
            Self::UpdateLineIndex(_) => EventKind::UpdateLineIndex,
            Self::UpdatePlayerInfo(_) => EventKind::UpdatePlayerInfo,
            Self::OnCastSkill(_) => EventKind::OnCastSkill,
            Self::OnNormalCastingSkill(_) => EventKind::OnNormalCastingSkill,
            Self::OnAreaCastingSkill(_) => EventKind::OnAreaCastingSkill,
            Self::OffCastSkill(_) => EventKind::OffCastSkill,
            Self::OffCastingSkill(_) => EventKind::OffCastingSkill,
        }
    }
}

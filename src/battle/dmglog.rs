//! Damage-challenge log: batches grouped by checkpoint, the derived action log,
//! and per-unit damage tallies.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::battle::batch::BattleActionBatch;
use crate::battle::diagnostics::Diagnostics;
use crate::battle::event::{InstanceId, SkillAction, SkillHit};
use crate::battle::identity::{resolve_identities, unresolved_name, UnitIdentityMap};
use crate::battle::parser::parse_log;
use crate::config::{ConfigError, Labels};
use crate::data::MasterData;

/// How hit and critical tallies are assigned between actor and target.
///
/// Damage always follows roles: the actor gives it, the target takes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribution {
    /// Tallies land in the target's give bucket and the actor's take bucket.
    #[default]
    Source,
    /// Tallies land in the actor's give bucket and the target's take bucket.
    ByRole,
}

impl FromStr for Attribution {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "source" => Ok(Self::Source),
            "by_role" | "role" => Ok(Self::ByRole),
            _ => Err(ConfigError::InvalidValue {
                field: "attribution",
                value: s.to_string(),
            }),
        }
    }
}

/// Batches merged per checkpoint, iterated in ascending checkpoint order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DamageChallengeLog {
    pub groups: BTreeMap<i64, BattleActionBatch>,
}

impl DamageChallengeLog {
    /// Group batches by the last checkpoint each one reports. Batches with no
    /// checkpoint are not part of the log.
    pub fn from_batches<'a, I>(batches: I) -> Self
    where
        I: IntoIterator<Item = &'a BattleActionBatch>,
    {
        let mut groups: BTreeMap<i64, BattleActionBatch> = BTreeMap::new();
        let mut skipped = 0usize;
        for batch in batches {
            let Some(checkpoint) = batch.checkpoint() else {
                skipped += 1;
                continue;
            };
            match groups.get_mut(&checkpoint) {
                Some(group) => group.merge_from(batch),
                None => {
                    groups.insert(checkpoint, batch.clone());
                }
            }
        }
        tracing::debug!(
            groups = groups.len(),
            skipped,
            "damage challenge batches grouped"
        );
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn skill_actions(&self) -> impl Iterator<Item = (i64, &SkillAction)> {
        self.groups
            .iter()
            .flat_map(|(checkpoint, batch)| batch.skill_act.iter().map(move |act| (*checkpoint, act)))
    }

    /// Chronological action log: per group, the player state (if the group
    /// reports one) followed by each skill action.
    pub fn action_log<M>(&self, identities: &UnitIdentityMap, master: &M) -> Vec<ActionLogRow>
    where
        M: MasterData + ?Sized,
    {
        let mut rows = Vec::new();
        let mut sp = None;
        let mut summon_auto = None;
        let mut skill_auto = None;

        for (&checkpoint, batch) in &self.groups {
            if !batch.player_info.is_empty() {
                for info in &batch.player_info {
                    sp = info.sp.or(sp);
                    summon_auto = info.summon_auto.or(summon_auto);
                    skill_auto = info.skill_auto.or(skill_auto);
                }
                rows.push(ActionLogRow::PlayerState {
                    checkpoint,
                    sp,
                    summon_auto,
                    skill_auto,
                });
            }
            for act in &batch.skill_act {
                rows.push(ActionLogRow::Skill {
                    checkpoint,
                    actor: identities.display_name(act.actor),
                    skill_name: skill_name(master, act.skill_id),
                    hits: act
                        .hits
                        .iter()
                        .map(|hit| HitSummary::new(hit, identities))
                        .collect(),
                });
            }
        }
        rows
    }

    /// Per-unit tallies over every group.
    ///
    /// # Panics
    ///
    /// Panics if a unit referenced by a skill action is missing from
    /// `identities`; the resolver guarantees every referenced unit an entry.
    pub fn aggregate(&self, identities: &UnitIdentityMap, attribution: Attribution) -> UnitAggregates {
        let mut totals = UnitAggregates::default();
        for (checkpoint, act) in self.skill_actions() {
            totals.record(identities, checkpoint, act, attribution);
        }
        totals
    }
}

fn skill_name<M: MasterData + ?Sized>(master: &M, skill_id: u32) -> String {
    match master.skill(skill_id) {
        Some(skill) => skill.name.clone(),
        None => {
            tracing::warn!(skill_id, "skill missing from master data");
            unresolved_name(skill_id)
        }
    }
}

/// One target outcome, with the target already named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HitSummary {
    pub target: String,
    pub hp_after: i64,
    pub hp_delta: i64,
    pub critical: bool,
}

impl HitSummary {
    fn new(hit: &SkillHit, identities: &UnitIdentityMap) -> Self {
        Self {
            target: identities.display_name(hit.target),
            hp_after: hit.hp_after,
            hp_delta: hit.hp_delta,
            critical: hit.critical,
        }
    }

    /// `{target}/HP:{after}({delta})/{critical|hit}` with locale tokens.
    pub fn render(&self, labels: &Labels) -> String {
        let outcome = if self.critical {
            labels.critical
        } else {
            labels.hit
        };
        format!(
            "{}/{}{}({})/{}",
            self.target, labels.hp, self.hp_after, self.hp_delta, outcome
        )
    }
}

impl fmt::Display for HitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&Labels::EN))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "row", rename_all = "snake_case")]
pub enum ActionLogRow {
    PlayerState {
        checkpoint: i64,
        sp: Option<f64>,
        summon_auto: Option<bool>,
        skill_auto: Option<bool>,
    },
    Skill {
        checkpoint: i64,
        actor: String,
        skill_name: String,
        hits: Vec<HitSummary>,
    },
}

impl ActionLogRow {
    pub fn checkpoint(&self) -> i64 {
        match self {
            Self::PlayerState { checkpoint, .. } | Self::Skill { checkpoint, .. } => *checkpoint,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnitAggregate {
    pub take_damage: i64,
    pub take_critical_count: u32,
    pub take_hit_count: u32,
    pub take_miss_count: u32,
    pub give_damage: i64,
    pub give_critical_count: u32,
    pub give_hit_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitAggregates {
    by_unit: HashMap<InstanceId, UnitAggregate>,
}

impl UnitAggregates {
    pub fn get(&self, id: InstanceId) -> Option<&UnitAggregate> {
        self.by_unit.get(&id)
    }

    /// Tallies for `id`, zero when the unit never acted or was hit.
    pub fn totals(&self, id: InstanceId) -> UnitAggregate {
        self.get(id).copied().unwrap_or_default()
    }

    /// One row per known unit, in identity order.
    pub fn rows<'a>(
        &'a self,
        identities: &'a UnitIdentityMap,
    ) -> impl Iterator<Item = (InstanceId, UnitAggregate)> + 'a {
        identities.iter().map(|(id, _)| (id, self.totals(id)))
    }

    fn unit(&mut self, identities: &UnitIdentityMap, checkpoint: i64, id: InstanceId) -> &mut UnitAggregate {
        assert!(
            identities.contains(id),
            "unit {id} at checkpoint {checkpoint} has no resolved identity"
        );
        self.by_unit.entry(id).or_default()
    }

    fn record(
        &mut self,
        identities: &UnitIdentityMap,
        checkpoint: i64,
        act: &SkillAction,
        attribution: Attribution,
    ) {
        if act.hits.is_empty() {
            self.unit(identities, checkpoint, act.actor).take_miss_count += 1;
            return;
        }
        for hit in &act.hits {
            let damage = hit.hp_delta.saturating_neg();
            let giver = self.unit(identities, checkpoint, act.actor);
            giver.give_damage = giver.give_damage.saturating_add(damage);
            let taker = self.unit(identities, checkpoint, hit.target);
            taker.take_damage = taker.take_damage.saturating_add(damage);

            let (giver, taker) = match attribution {
                Attribution::Source => (hit.target, act.actor),
                Attribution::ByRole => (act.actor, hit.target),
            };
            if hit.critical {
                self.unit(identities, checkpoint, giver).give_critical_count += 1;
                self.unit(identities, checkpoint, taker).take_critical_count += 1;
            } else {
                self.unit(identities, checkpoint, giver).give_hit_count += 1;
                self.unit(identities, checkpoint, taker).take_hit_count += 1;
            }
        }
    }
}

/// Everything derived from one battle log.
#[derive(Debug, Clone)]
pub struct DamageReport {
    pub batches: Vec<BattleActionBatch>,
    pub identities: UnitIdentityMap,
    pub log: DamageChallengeLog,
    pub action_log: Vec<ActionLogRow>,
    pub aggregates: UnitAggregates,
}

/// Parse, resolve, group and tally one log.
pub fn analyze<M>(
    text: &str,
    master: &M,
    attribution: Attribution,
    diagnostics: &mut Diagnostics,
) -> DamageReport
where
    M: MasterData + ?Sized,
{
    let batches = parse_log(text, diagnostics);
    let identities = resolve_identities(&batches, master);
    let log = DamageChallengeLog::from_batches(&batches);
    let action_log = log.action_log(&identities, master);
    let aggregates = log.aggregate(&identities, attribution);
    tracing::info!(
        batches = batches.len(),
        checkpoints = log.len(),
        units = identities.len(),
        diagnostics = diagnostics.len(),
        "damage challenge log analyzed"
    );
    DamageReport {
        batches,
        identities,
        log,
        action_log,
        aggregates,
    }
}

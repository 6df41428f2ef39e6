//! Battle-local unit identities.
//!
//! Joined heroes are named from their snapshot, enemies are inferred from the
//! skills they use, and anything left over gets a placeholder, so every unit id
//! seen in the log has exactly one entry.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::battle::batch::BattleActionBatch;
use crate::battle::event::{HeroSnapshot, InstanceId};
use crate::data::MasterData;

/// Display marker for anything master data cannot name.
pub const UNRESOLVED_MARK: &str = "？？？";

pub fn unresolved_name(id: impl std::fmt::Display) -> String {
    format!("{UNRESOLVED_MARK}({id})")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
    /// Named from a hero-join snapshot.
    Joined,
    /// Named by reverse lookup of a skill the unit used.
    InferredFromSkill,
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitIdentity {
    pub display_name: String,
    pub template_id: Option<u32>,
    /// Present only for units introduced by a hero-join event.
    pub hero: Option<HeroSnapshot>,
    pub source: IdentitySource,
}

impl UnitIdentity {
    fn unresolved(id: InstanceId) -> Self {
        Self {
            display_name: unresolved_name(id),
            template_id: None,
            hero: None,
            source: IdentitySource::Unresolved,
        }
    }
}

/// Identities keyed by instance id, iterated in first-resolution order.
#[derive(Debug, Clone, Default)]
pub struct UnitIdentityMap {
    by_id: IndexMap<InstanceId, UnitIdentity>,
}

impl UnitIdentityMap {
    pub fn get(&self, id: InstanceId) -> Option<&UnitIdentity> {
        self.by_id.get(&id)
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Display name for a unit, or its placeholder if it was never seen.
    pub fn display_name(&self, id: InstanceId) -> String {
        self.get(id)
            .map(|identity| identity.display_name.clone())
            .unwrap_or_else(|| unresolved_name(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (InstanceId, &UnitIdentity)> {
        self.by_id.iter().map(|(id, identity)| (*id, identity))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Record an identity unless the id is already resolved.
    fn insert_new(&mut self, id: InstanceId, identity: UnitIdentity) -> bool {
        match self.by_id.entry(id) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(identity);
                true
            }
        }
    }
}

/// Build the identity map for one session's batches.
pub fn resolve_identities<M>(batches: &[BattleActionBatch], master: &M) -> UnitIdentityMap
where
    M: MasterData + ?Sized,
{
    let mut identities = UnitIdentityMap::default();

    // Joined heroes.
    for hero in batches
        .iter()
        .flat_map(|batch| &batch.hero_join)
        .flat_map(|join| &join.heroes)
    {
        let name = master
            .unit(hero.template_id)
            .map(|unit| unit.name.clone())
            .unwrap_or_else(|| unresolved_name(hero.template_id));
        identities.insert_new(
            hero.instance_id,
            UnitIdentity {
                display_name: format!("{name}[{}]", hero.party_position),
                template_id: Some(hero.template_id),
                hero: Some(hero.clone()),
                source: IdentitySource::Joined,
            },
        );
    }

    // Actors inferred from the skills they cast.
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    for act in batches.iter().flat_map(|batch| &batch.skill_act) {
        if identities.contains(act.actor) {
            continue;
        }
        let Some(unit) = master.unit_by_skill_id(act.skill_id) else {
            continue;
        };
        let n = occurrences.entry(unit.id.clone()).or_insert(0);
        *n += 1;
        identities.insert_new(
            act.actor,
            UnitIdentity {
                display_name: format!("{}({n})", unit.name),
                template_id: unit.id.parse::<u32>().ok(),
                hero: None,
                source: IdentitySource::InferredFromSkill,
            },
        );
    }

    // Everything else that is referenced anywhere.
    let mut unresolved = 0usize;
    for id in batches.iter().flat_map(referenced_units) {
        if identities.insert_new(id, UnitIdentity::unresolved(id)) {
            unresolved += 1;
        }
    }

    tracing::debug!(
        units = identities.len(),
        unresolved,
        "unit identities resolved"
    );
    identities
}

/// Every unit id a batch mentions, in kind order.
fn referenced_units(batch: &BattleActionBatch) -> Vec<InstanceId> {
    let mut ids = Vec::new();
    for act in &batch.skill_act {
        ids.push(act.actor);
        ids.extend(act.hits.iter().map(|hit| hit.target));
    }
    ids.extend(batch.hero_hp_sp.iter().map(|update| update.unit));
    ids.extend(batch.opaque_actions().filter_map(|action| action.unit()));
    ids
}

//! Battle log pipeline: decode NDJSON lines into batches, resolve unit
//! identities, group by damage-challenge checkpoint and tally per unit.

pub mod batch;
pub mod diagnostics;
pub mod dmglog;
pub mod error;
pub mod event;
pub mod identity;
pub mod parser;

pub use batch::BattleActionBatch;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use dmglog::{
    analyze, ActionLogRow, Attribution, DamageChallengeLog, DamageReport, HitSummary,
    UnitAggregate, UnitAggregates,
};
pub use error::LineDecodeError;
pub use event::{BattleEvent, EventKind, HeroSnapshot, InstanceId, SkillAction, SkillHit};
pub use identity::{resolve_identities, IdentitySource, UnitIdentity, UnitIdentityMap};
pub use parser::{parse_line, parse_log};

//! Newline-delimited battle log decoding.
//!
//! Each line is a JSON object whose `BActionS` array holds tagged actions.
//! Lines are independent, so a log is decoded in parallel and reassembled in
//! input order.

use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::battle::batch::BattleActionBatch;
use crate::battle::diagnostics::{DiagnosticKind, Diagnostics};
use crate::battle::error::LineDecodeError;
use crate::battle::event::{
    BattleEndTime, BattleEvent, DamageChallengeRecord, EventKind, HeroHpSp, HeroJoin,
    OpaqueAction, PlayerInfo, SkillAction,
};

/// Top-level field holding the action array.
pub const ACTIONS_FIELD: &str = "BActionS";

/// Per-action type tag field.
pub const TYPE_FIELD: &str = "typeName";

#[derive(Deserialize)]
struct SkillActPayload {
    #[serde(rename = "aBSkillAct")]
    act: SkillAction,
}

#[derive(Deserialize)]
struct PlayerInfoPayload {
    #[serde(rename = "BattlePlayerInfoS", default)]
    players: Option<Vec<PlayerInfo>>,
}

fn typed<T: DeserializeOwned>(fields: Map<String, Value>) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(fields))
}

/// Decode one action payload (already stripped of its tag) as `kind`.
fn decode_event(
    kind: EventKind,
    fields: Map<String, Value>,
) -> Result<BattleEvent, serde_json::Error> {
    let event = match kind {
        EventKind::HeroJoin => BattleEvent::HeroJoin(typed::<HeroJoin>(fields)?),
        EventKind::SkillAct => {
            BattleEvent::SkillAct(typed::<SkillActPayload>(fields)?.act)
        }
        EventKind::UpdateBattleEndTime => {
            BattleEvent::UpdateBattleEndTime(typed::<BattleEndTime>(fields)?)
        }
        EventKind::UpdateDamageChallengeRecord => BattleEvent::UpdateDamageChallengeRecord(
            typed::<DamageChallengeRecord>(fields)?,
        ),
        EventKind::UpdateHeroHpSp => {
            BattleEvent::UpdateHeroHpSp(typed::<HeroHpSp>(fields)?)
        }
        EventKind::UpdatePlayerInfo => {
            let players = typed::<PlayerInfoPayload>(fields)?.players;
            let last = players.and_then(|p| p.last().copied()).unwrap_or_default();
            BattleEvent::UpdatePlayerInfo(last)
        }
        EventKind::BattleStart => BattleEvent::BattleStart(OpaqueAction::new(fields)),
        EventKind::HeroMove => BattleEvent::HeroMove(OpaqueAction::new(fields)),
        EventKind::UpdateHeroBuff => BattleEvent::UpdateHeroBuff(OpaqueAction::new(fields)),
        EventKind::UpdateLineIndex => BattleEvent::UpdateLineIndex(OpaqueAction::new(fields)),
        EventKind::OnCastSkill => BattleEvent::OnCastSkill(OpaqueAction::new(fields)),
        EventKind::OnNormalCastingSkill => {
            BattleEvent::OnNormalCastingSkill(OpaqueAction::new(fields))
        }
        EventKind::OnAreaCastingSkill => BattleEvent::OnAreaCastingSkill(OpaqueAction::new(fields)),
        EventKind::OffCastSkill => BattleEvent::OffCastSkill(OpaqueAction::new(fields)),
        EventKind::OffCastingSkill => BattleEvent::OffCastingSkill(OpaqueAction::new(fields)),
    };
    Ok(event)
}

/// Decode one log line into a batch. Unknown tags and undecodable actions are
/// reported to `diagnostics` and dropped; the rest of the line still decodes.
pub fn parse_line(
    line_number: usize,
    line: &str,
    diagnostics: &mut Diagnostics,
) -> Result<BattleActionBatch, LineDecodeError> {
    let root: Value = serde_json::from_str(line).map_err(|source| LineDecodeError::InvalidJson {
        line: line_number,
        source,
    })?;
    let Value::Object(mut root) = root else {
        return Err(LineDecodeError::MalformedBatch { line: line_number });
    };
    let Some(Value::Array(actions)) = root.remove(ACTIONS_FIELD) else {
        return Err(LineDecodeError::MalformedBatch { line: line_number });
    };

    let mut batch = BattleActionBatch::new();
    for action in actions {
        let Value::Object(mut fields) = action else {
            diagnostics.push(
                line_number,
                DiagnosticKind::EventDecode,
                "action is not a JSON object",
            );
            continue;
        };
        let tag = match fields.remove(TYPE_FIELD) {
            Some(Value::String(tag)) => tag,
            _ => {
                diagnostics.unrecognized_tag(line_number, "<missing typeName>");
                continue;
            }
        };
        diagnostics.observe_keys(&tag, fields.keys());

        let Some(kind) = EventKind::from_tag(&tag) else {
            diagnostics.unrecognized_tag(line_number, &tag);
            continue;
        };
        match decode_event(kind, fields) {
            Ok(event) => batch.push(event),
            Err(err) => diagnostics.push(
                line_number,
                DiagnosticKind::EventDecode,
                format!("{tag}: {err}"),
            ),
        }
    }
    Ok(batch)
}

/// Decode every non-blank line of a log. Lines that fail to decode are
/// reported and skipped; batches come back in line order.
pub fn parse_log(text: &str, diagnostics: &mut Diagnostics) -> Vec<BattleActionBatch> {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();

    let decoded: Vec<(Option<BattleActionBatch>, Diagnostics)> = lines
        .par_iter()
        .map(|&(line_number, line)| {
            let mut local = Diagnostics::new();
            let batch = match parse_line(line_number, line, &mut local) {
                Ok(batch) => Some(batch),
                Err(err) => {
                    local.line_error(&err);
                    None
                }
            };
            (batch, local)
        })
        .collect();

    let mut batches = Vec::with_capacity(decoded.len());
    for (batch, local) in decoded {
        diagnostics.absorb(local);
        batches.extend(batch);
    }
    tracing::debug!(
        lines = lines.len(),
        batches = batches.len(),
        diagnostics = diagnostics.len(),
        "battle log decoded"
    );
    batches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tags_and_reports_unknown() {
        let line = r#"{"BActionS":[
            {"typeName":"BAction_UpdateDamageChallengeRecord","lTotalDamageCauseByLeft":500},
            {"typeName":"BAction_Nonsense","x":1},
            {"typeName":"BAction_HeroMove","lUID":5001,"nX":3}
        ]}"#
        .replace('\n', "");
        let mut diagnostics = Diagnostics::new();
        let batch = parse_line(1, &line, &mut diagnostics).expect("batch");
        assert_eq!(batch.checkpoint(), Some(500));
        assert_eq!(batch.hero_move.len(), 1);
        assert_eq!(batch.hero_move[0].unit(), Some(5001));
        assert_eq!(diagnostics.count(DiagnosticKind::UnrecognizedTag), 1);
        assert!(diagnostics.observed_keys["BAction_Nonsense"].contains("x"));
    }

    #[test]
    fn missing_action_array_is_malformed() {
        let mut diagnostics = Diagnostics::new();
        let err = parse_line(3, r#"{"other":[]}"#, &mut diagnostics).unwrap_err();
        assert!(matches!(err, LineDecodeError::MalformedBatch { line: 3 }));
        let err = parse_line(4, r#"[1,2]"#, &mut diagnostics).unwrap_err();
        assert!(matches!(err, LineDecodeError::MalformedBatch { line: 4 }));
    }

    #[test]
    fn invalid_json_is_line_decode_error() {
        let mut diagnostics = Diagnostics::new();
        let err = parse_line(7, "{not json", &mut diagnostics).unwrap_err();
        assert_eq!(err.line(), 7);
        assert_eq!(err.kind(), DiagnosticKind::LineDecode);
    }

    #[test]
    fn wrong_field_type_drops_only_that_event() {
        let line = r#"{"BActionS":[{"typeName":"BAction_UpdateHeroHPSP","lUID":"oops"},{"typeName":"BAction_UpdateBattleEndTime","lEndTime":99}]}"#;
        let mut diagnostics = Diagnostics::new();
        let batch = parse_line(1, line, &mut diagnostics).expect("batch");
        assert!(batch.hero_hp_sp.is_empty());
        assert_eq!(batch.battle_end_time[0].end_time, 99);
        assert_eq!(diagnostics.count(DiagnosticKind::EventDecode), 1);
    }

    #[test]
    fn player_info_takes_last_entry_and_tolerates_empty() {
        let line = r#"{"BActionS":[
            {"typeName":"BAction_UpdatePlayerInfo","BattlePlayerInfoS":[{"fSP":1.0,"bSummonAuto":false,"bSkillAuto":false},{"fSP":2.5,"bSummonAuto":true,"bSkillAuto":false}]},
            {"typeName":"BAction_UpdatePlayerInfo"}
        ]}"#
        .replace('\n', "");
        let mut diagnostics = Diagnostics::new();
        let batch = parse_line(1, &line, &mut diagnostics).expect("batch");
        assert_eq!(batch.player_info.len(), 2);
        assert_eq!(batch.player_info[0].sp, Some(2.5));
        assert_eq!(batch.player_info[0].summon_auto, Some(true));
        assert_eq!(batch.player_info[1], PlayerInfo::default());
    }

    #[test]
    fn parse_log_skips_bad_lines_and_keeps_order() {
        let text = [
            r#"{"BActionS":[{"typeName":"BAction_UpdateDamageChallengeRecord","lTotalDamageCauseByLeft":1}]}"#,
            "",
            "garbage",
            r#"{"BActionS":[{"typeName":"BAction_UpdateDamageChallengeRecord","lTotalDamageCauseByLeft":2}]}"#,
        ]
        .join("\n");
        let mut diagnostics = Diagnostics::new();
        let batches = parse_log(&text, &mut diagnostics);
        let checkpoints: Vec<_> = batches.iter().filter_map(BattleActionBatch::checkpoint).collect();
        assert_eq!(checkpoints, vec![1, 2]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.entries[0].line, 3);
    }
}

//! Battle log pipeline throughput: parse, group/merge and full analysis.
//!
//! Run with: `cargo bench --bench dmglog`
//! Logs are synthetic; every checkpoint is reported by two overlapping lines so
//! the merge path does real dedup work.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use bgrview::battle::{analyze, parse_log, Attribution, DamageChallengeLog, Diagnostics};
use bgrview::data::MasterDataSet;

const MASTER: &str = r#"{
    "hero": [
        {"id": "100", "name": "Alice", "rank": "5", "nskill": "9001"},
        {"id": "200", "name": "Goblin", "rank": "2", "nskill": "700"},
        {"id": "201", "name": "Goblin Chief+", "rank": "5", "monster_skill": "700"}
    ],
    "skill": [{"id": "9001", "name": "Slash"}, {"id": "700", "name": "Club"}]
}"#;

fn skill_act(actor: i64, skill: u32, target: i64, hp: i64, delta: i64, crit: bool) -> String {
    format!(
        r#"{{"typeName":"BAction_SkillAct","aBSkillAct":{{"lUID":{actor},"uSkillID":{skill},"BSkillHitS":[{{"lUID":{target},"nHP":{hp},"nHPVal":{delta},"bCrit":{crit}}}]}}}}"#
    )
}

fn synthetic_log(checkpoints: usize) -> String {
    let mut lines = vec![
        r#"{"BActionS":[{"typeName":"BAction_HeroJoin","CHeroDataS":[{"uXID":100,"lUID":5001,"nLevel":80,"nHp":1200,"cDamageChallengePos":0}]}]}"#.to_string(),
    ];
    let mut boss_hp = 1_000_000i64;
    for step in 0..checkpoints {
        let damage = 100 + (step % 7) as i64;
        boss_hp -= damage;
        let hero = skill_act(5001, 9001, 9001, boss_hp, -damage, step % 5 == 0);
        let boss = skill_act(9001, 700, 5001, 1000, -(step as i64 % 40), false);
        let record = format!(
            r#"{{"typeName":"BAction_UpdateDamageChallengeRecord","lTotalDamageCauseByLeft":{}}}"#,
            1_000_000 - boss_hp
        );
        lines.push(format!(r#"{{"BActionS":[{hero},{record}]}}"#));
        lines.push(format!(r#"{{"BActionS":[{hero},{boss},{record}]}}"#));
    }
    lines.join("\n")
}

fn bench_dmglog(c: &mut Criterion) {
    let master = MasterDataSet::from_json_str(MASTER).expect("master data");
    let log = synthetic_log(2_000);
    let line_count = log.lines().count() as u64;

    let mut group = c.benchmark_group("dmglog");
    group.sample_size(30);
    group.throughput(Throughput::Elements(line_count));

    group.bench_function("parse_log", |b| {
        b.iter(|| {
            let mut diagnostics = Diagnostics::new();
            black_box(parse_log(black_box(&log), &mut diagnostics))
        });
    });

    let batches = parse_log(&log, &mut Diagnostics::new());
    group.bench_function("group_by_checkpoint", |b| {
        b.iter_batched(
            || batches.clone(),
            |batches| black_box(DamageChallengeLog::from_batches(&batches)),
            BatchSize::LargeInput,
        );
    });

    group.bench_function("analyze", |b| {
        b.iter(|| {
            let mut diagnostics = Diagnostics::new();
            black_box(analyze(&log, &master, Attribution::Source, &mut diagnostics))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_dmglog);
criterion_main!(benches);

//! Master data in the game's XML format and in JSON load to the same tables.

use std::path::{Path, PathBuf};

use bgrview::battle::{analyze, Attribution, Diagnostics};
use bgrview::data::{load_master_data, MasterData, MasterDataError, MasterDataSet};
use bgrview::report::{browse, BrowseKind};

fn fixture_path(parts: &[&str]) -> PathBuf {
    parts.iter().fold(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures"),
        |path, part| path.join(part),
    )
}

fn load(name: &str) -> MasterDataSet {
    load_master_data(fixture_path(&[name])).expect("master data")
}

#[test]
fn xml_fixture_loads_every_tag() {
    let master = load("master_data.xml");
    assert_eq!(
        master.summary(),
        vec![
            ("hero".to_string(), 5),
            ("skill".to_string(), 6),
            ("equip".to_string(), 2),
            ("buff".to_string(), 2),
            ("item".to_string(), 3),
            ("quest".to_string(), 2),
            ("stage".to_string(), 2),
        ]
    );
    assert_eq!(master.skipped_without_id, 1);
    assert_eq!(master.item(4001).map(|item| item.name.as_str()), Some("Iron Shield"));
    assert_eq!(master.unit_by_skill_id(700).map(|unit| unit.id.as_str()), Some("201"));
    assert!(master.elements("items").is_none());
}

#[test]
fn xml_and_json_fixtures_agree() {
    let xml = load("master_data.xml");
    let json = load("master_data.json");
    assert_eq!(xml.summary(), json.summary());
    assert_eq!(xml.key_sets, json.key_sets);
    for kind in BrowseKind::ALL {
        assert_eq!(browse(&xml, kind), browse(&json, kind), "{kind} table differs");
    }
}

#[test]
fn xml_master_data_names_battle_units() {
    let master = load("master_data.xml");
    let log = std::fs::read_to_string(fixture_path(&["battle_logs", "challenge.ndjson"]))
        .expect("read log fixture");
    let mut diagnostics = Diagnostics::new();
    let report = analyze(&log, &master, Attribution::Source, &mut diagnostics);

    let names: Vec<_> = report
        .identities
        .iter()
        .map(|(_, identity)| identity.display_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["Alice[0]", "Bob[1]", "Goblin Chief+(1)", "Goblin Shaman(1)", "？？？(9003)"]
    );
}

#[test]
fn xml_with_wrong_root_is_rejected() {
    let path = std::env::temp_dir().join(format!("bgrview-elg-{}.xml", std::process::id()));
    std::fs::write(&path, r#"<ELG><hero id="1" name="x"/></ELG>"#).expect("write");
    let err = load_master_data(&path).unwrap_err();
    assert!(matches!(err, MasterDataError::UnexpectedRoot { .. }));
    let _ = std::fs::remove_file(path);
}

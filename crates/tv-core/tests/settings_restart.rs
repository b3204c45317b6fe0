use tv_core::{BoolKey, IntKey, SettingsStore};

#[test]
fn every_key_reads_its_default_before_any_write() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::open(dir.path(), "mytv");

    let bools: Vec<(&str, bool)> = BoolKey::ALL
        .iter()
        .map(|k| (k.name(), store.get_bool(*k)))
        .collect();
    assert_eq!(
        bools,
        vec![
            ("channel_reversal", false),
            ("channel_num", true),
            ("boot_startup", false),
        ]
    );
    for key in IntKey::ALL {
        assert_eq!(store.get_int(key), 0, "{}", key.name());
    }
}

#[test]
fn values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut store = SettingsStore::open(dir.path(), "mytv");
        store.set_channel_reversal(true).unwrap();
        store.set_channel_num(false).unwrap();
        store.set_boot_startup(true).unwrap();
        store.set_position(12).unwrap();
        store.set_position_category(3).unwrap();
        store.set_position_sub(-1).unwrap();
    }

    let store = SettingsStore::open(dir.path(), "mytv");
    assert!(store.channel_reversal());
    assert!(!store.channel_num());
    assert!(store.boot_startup());
    assert_eq!(store.position(), 12);
    assert_eq!(store.position_category(), 3);
    assert_eq!(store.position_sub(), -1);
}

#[test]
fn regions_are_separated_by_app_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut first = SettingsStore::open(dir.path(), "mytv");
    first.set_position(7).unwrap();

    let other = SettingsStore::open(dir.path(), "other-app");
    assert_eq!(other.position(), 0);
}

#[test]
fn unknown_keys_are_preserved() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("mytv.json"),
        r#"{"favorites": ["CCTV1"], "position": 2}"#,
    )
    .unwrap();

    let mut store = SettingsStore::open(dir.path(), "mytv");
    assert_eq!(store.position(), 2);
    store.set_position(5).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw["favorites"][0], "CCTV1");
    assert_eq!(raw["position"], 5);
}

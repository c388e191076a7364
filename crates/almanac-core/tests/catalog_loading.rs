use std::fs;

use almanac_core::catalog::Catalog;
use almanac_core::snapshot::ScheduleSnapshot;
use almanac_core::templates::visible_templates;
use almanac_core::window::MonthDay;
use tempfile::tempdir;

#[test]
fn toml_catalog_drives_template_listing() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("catalog.toml");
    fs::write(
        &path,
        r#"
[[categories]]
id = 1
name = "Everyday"

[[categories]]
id = 2
name = "Winter holidays"
seasonal = true
priority = 10
window = { start = "12-20", end = "01-06" }

[[categories]]
id = 3
name = "Leap"
seasonal = true
window = { start = "02-29", end = "02-29" }
active = false

[[templates]]
id = 100
category_id = 1
name = "Thank you"
sort_order = 1

[[templates]]
id = 101
category_id = 2
name = "Season's greetings"
sort_order = 2

[[templates]]
id = 102
category_id = 3
name = "Leap day"
"#,
    )
    .expect("write catalog");

    let catalog = Catalog::load(&path).expect("load catalog");
    assert_eq!(catalog.categories.len(), 3);
    assert_eq!(catalog.templates.len(), 3);

    let snapshot = ScheduleSnapshot::build(MonthDay::new(1, 2), 2025, &catalog.categories);
    assert_eq!(snapshot.active_ids(), vec![2, 1]);
    assert!(snapshot.entry(2).expect("entry").spans_new_year);
    assert_eq!(snapshot.entry(3).expect("entry").warnings.len(), 4);

    let visible: Vec<u64> = visible_templates(&snapshot, &catalog.templates)
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(visible, vec![101, 100]);
}

#[test]
fn jsonl_catalog_keeps_impossible_dates() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("categories.jsonl");
    fs::write(
        &path,
        concat!(
            r#"{"id":1,"name":"Odd","seasonal":true,"window":{"start":"02-30","end":"03-05"}}"#,
            "\n\n",
            r#"{"id":2,"name":"Plain"}"#,
            "\n"
        ),
    )
    .expect("write catalog");

    let catalog = Catalog::load(&path).expect("load catalog");
    assert_eq!(catalog.categories.len(), 2);

    let snapshot = ScheduleSnapshot::build(MonthDay::new(3, 1), 2025, &catalog.categories);
    let odd = snapshot.entry(1).expect("entry");
    assert!(odd.active);
    assert_eq!(
        odd.warnings[0].to_string(),
        "start date: February only has 28 days, not 30"
    );
}

#[test]
fn json_catalog_rejects_duplicate_ids() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("catalog.json");
    fs::write(
        &path,
        r#"{"categories":[{"id":1,"name":"A"},{"id":1,"name":"B"}]}"#,
    )
    .expect("write catalog");

    let err = Catalog::load(&path).expect_err("duplicate ids");
    assert!(err.to_string().contains("duplicate category id 1"));
}

#[test]
fn malformed_date_text_names_the_line() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("categories.jsonl");
    fs::write(
        &path,
        r#"{"id":1,"name":"Bad","seasonal":true,"window":{"start":"Dec 25","end":"01-01"}}"#,
    )
    .expect("write catalog");

    let err = Catalog::load(&path).expect_err("malformed date");
    assert!(format!("{err:#}").contains("line 1"));
}

#[test]
fn unknown_extension_is_rejected() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("catalog.yaml");
    fs::write(&path, "categories: []").expect("write catalog");
    assert!(Catalog::load(&path).is_err());
}

#[test]
fn demo_catalog_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/catalog.toml");
    let catalog = Catalog::load(&path).expect("load demo catalog");

    let snapshot = ScheduleSnapshot::build(MonthDay::new(2, 10), 2025, &catalog.categories);
    assert_eq!(snapshot.active_ids(), vec![3, 1]);
    assert_eq!(snapshot.summary(), "2 of 5 categories active (1 seasonal)");

    let leap = snapshot.entry(4).expect("leap entry");
    assert!(!leap.active);
    assert!(leap.warnings.iter().any(|w| w.to_string().contains("February 29th")));
}

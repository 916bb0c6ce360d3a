use super::*;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    fs::create_dir_all(&p).expect("create temp dir");
    p
}

const MATERIALS: &str = r#"
title: Lesson materials
namespace: material_set
management:
  total_forms: 1
  min_num_forms: 0
template:
  fields:
    - role: file
      kind: file
    - role: description
"#;

#[test]
fn discovers_config_in_ancestor_tui_dir() {
    let root = temp_dir("formset-discover");
    let nested = root.join("a").join("b");
    fs::create_dir_all(&nested).unwrap();
    fs::create_dir_all(root.join(".tui")).unwrap();
    let cfg = root.join(".tui").join(CONFIG_FILE);
    fs::write(&cfg, MATERIALS).unwrap();
    assert_eq!(discover_from(&nested), Some(cfg));
}

#[test]
fn explicit_path_wins() {
    let p = resolve_config_path(Some("/tmp/some/page.yaml".into())).unwrap();
    assert_eq!(p, PathBuf::from("/tmp/some/page.yaml"));
}

#[test]
fn read_reports_location_and_validation_errors() {
    let dir = temp_dir("formset-read");
    let good = dir.join("good.yaml");
    fs::write(&good, MATERIALS).unwrap();
    let cfg = read_page_config(&good).unwrap();
    assert_eq!(cfg.namespace, "material_set");
    assert_eq!(cfg.initial_empty, 1);

    let broken = dir.join("broken.yaml");
    fs::write(&broken, "namespace: [unclosed\n").unwrap();
    let err = read_page_config(&broken).unwrap_err().to_string();
    assert!(err.contains("broken.yaml:"), "{err}");

    let invalid = dir.join("invalid.yaml");
    fs::write(&invalid, MATERIALS.replace("total_forms: 1", "total_forms: 0")).unwrap();
    let err = read_page_config(&invalid).unwrap_err().to_string();
    assert!(err.contains("smaller than initial_empty"), "{err}");
}

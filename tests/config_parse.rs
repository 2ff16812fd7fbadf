use grad_check::config::Config;
use rust_decimal::Decimal;

#[test]
fn parse_example_config() {
    let raw = include_str!("../grad-check.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert!(!cfg.paths.out_dir.is_empty());
    assert_eq!(cfg.engine.backend, "lopdf");
    assert_eq!(cfg.normalize.cid_map.get("248"), Some(&'İ'));
    assert_eq!(cfg.normalize.cid_map.get("213"), Some(&'ı'));
    assert!(cfg.extract.overrides.is_empty());
}

#[test]
fn example_curriculum_matches_defaults() {
    let raw = include_str!("../grad-check.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    let defaults = Config::default();
    assert_eq!(
        cfg.curriculum.departmental_electives,
        defaults.curriculum.departmental_electives
    );
    assert_eq!(
        cfg.extract.department_prefixes,
        defaults.extract.department_prefixes
    );
    assert_eq!(cfg.curriculum.min_total_ects, Decimal::from(240));
    assert_eq!(cfg.curriculum.internship_codes, vec!["BM399", "BM499"]);
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let cfg: Config = toml::from_str("[logging]\nlevel = \"debug\"\njson = true\nwrite_to_file = false\nfile_path = \"\"\n")
        .expect("parse TOML");
    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(cfg.curriculum.min_departmental_electives, 10);
    assert_eq!(cfg.security.allowed_extensions, vec!["pdf"]);
    assert!(!cfg.normalized_for_hash().is_empty());
}

#[test]
fn default_departmental_elective_list() {
    let electives = Config::default().curriculum.departmental_electives;
    assert_eq!(electives.len(), 65);
    assert!(electives.iter().any(|c| c == "MTH401"));
    let unique: std::collections::BTreeSet<_> = electives.iter().collect();
    assert_eq!(unique.len(), electives.len());
}

#[test]
fn override_amounts_parse_as_exact_decimals() {
    let raw = r#"
[extract]
department_prefixes = ["BM"]
override_window_chars = 240

[[extract.overrides]]
code = "MTH401"
name = "Lineer Cebir"
credit = 3.5
ects = "5.25"
"#;
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.extract.overrides[0].credit, "3.5".parse::<Decimal>().unwrap());
    assert_eq!(cfg.extract.overrides[0].ects, "5.25".parse::<Decimal>().unwrap());
}

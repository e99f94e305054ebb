use std::fs;
use std::path::{Path, PathBuf};

use scene_graph::{
    load_scene_store, run, LoadIssueCode, OutputFormat, ValidatorConfig, FAILED_MESSAGE,
    PASSED_MESSAGE,
};
use tempfile::TempDir;

fn fixture_root(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("docs")
        .join("fixtures")
        .join("scene_graph_v1")
        .join(name)
}

fn copy_dir_recursive(src: &Path, dst: &Path) {
    fs::create_dir_all(dst).expect("mkdir dst");
    let entries = fs::read_dir(src).expect("read src");
    for entry in entries {
        let entry = entry.expect("entry");
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path);
        } else {
            fs::copy(&src_path, &dst_path).expect("copy");
        }
    }
}

fn staged_fixture(name: &str) -> (TempDir, ValidatorConfig) {
    let temp = TempDir::new().expect("temp");
    let data_dir = temp.path().join("src").join("data");
    copy_dir_recursive(&fixture_root(name), &data_dir);
    let config = ValidatorConfig {
        data_dir,
        ..ValidatorConfig::default()
    };
    (temp, config)
}

fn run_text(config: &ValidatorConfig) -> (scene_graph::ValidationOutcome, String) {
    let mut out = Vec::new();
    let outcome = run(config, &mut out).expect("run");
    (outcome, String::from_utf8(out).expect("utf8"))
}

#[test]
fn fixture_linked_graph_passes() {
    let (_temp, config) = staged_fixture("pass_01_linked");
    let (outcome, text) = run_text(&config);

    assert!(outcome.passed());
    assert!(outcome.errors.is_empty());
    assert!(text.starts_with("Scene Validator - Checking all scene connections\n"));
    assert!(text.contains("Loaded 3 scenes from act1/alley.json"));
    assert!(text.contains("Loaded 2 scenes from act2/door.json"));
    assert!(!text.contains("=== MISSING SCENES ==="));
    assert!(!text.contains("=== ORPHANED SCENES ==="));
    assert!(text.contains("Total scenes: 5"));
    assert!(text.contains("Referenced scenes: 5"));
    assert!(text.trim_end().ends_with(PASSED_MESSAGE));
}

#[test]
fn fixture_missing_reference_fails_with_attribution() {
    let (_temp, config) = staged_fixture("fail_01_missing_ref");
    let (outcome, text) = run_text(&config);

    assert_eq!(outcome.defect_count, 1);
    assert_eq!(
        outcome.errors,
        vec![
            "- back_door: Referenced from market (in scenes.json), start_alley (in scenes.json)"
                .to_string()
        ]
    );
    assert!(text.contains("=== MISSING SCENES ==="));
    assert!(text.contains("=== ORPHANED SCENES ==="));
    assert!(text.contains("- rooftop (in scenes.json)"));
    assert!(!text.contains("- start_alley (in"));
    assert!(text.contains("Missing scenes: 1"));
    assert!(text.contains("Orphaned scenes: 1"));
    assert!(text.trim_end().ends_with(FAILED_MESSAGE));
}

#[test]
fn fixture_duplicate_and_malformed_documents_do_not_abort() {
    let (_temp, config) = staged_fixture("warn_01_duplicate_and_malformed");

    let store = load_scene_store(&config.data_dir).expect("load");
    assert_eq!(store.len(), 2);
    assert_eq!(store.document_of("start_alley"), Some("b_second.json"));
    assert!(!store.contains("ghost_scene"));
    let codes = store
        .issues()
        .iter()
        .map(|issue| issue.code)
        .collect::<Vec<_>>();
    assert_eq!(
        codes,
        vec![LoadIssueCode::DuplicateScene, LoadIssueCode::JsonMalformed]
    );

    let (outcome, text) = run_text(&config);
    assert!(outcome.passed());
    assert!(text.contains("Load issues: 2"));
    assert!(!text.contains("c_broken.json"), "skipped document is not listed as loaded");
}

#[test]
fn fixture_json_output_matches_text_outcome() {
    let (_temp, config) = staged_fixture("fail_01_missing_ref");
    let config = ValidatorConfig {
        format: OutputFormat::Json,
        ..config
    };
    let mut out = Vec::new();
    let outcome = run(&config, &mut out).expect("run");
    let value: serde_json::Value = serde_json::from_slice(&out).expect("json");

    assert_eq!(value["defect_count"], serde_json::json!(outcome.defect_count));
    assert_eq!(
        value["report"]["orphaned"][0]["scene_id"],
        serde_json::json!("rooftop")
    );
    assert_eq!(
        value["report"]["missing"][0]["total_referrers"],
        serde_json::json!(2)
    );
}

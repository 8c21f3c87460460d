use std::io::Write;

use astrasync_core::{detect, load, AgentFormat, AstraError, RawInput};
use serde_json::json;

// ── In-memory inputs ────────────────────────────────────────────────────

#[test]
fn mapping_and_value_inputs() {
    let value = json!({"name": "Bot", "model": "gpt-4", "instructions": "x"});
    let raw = load(RawInput::Value(value.clone())).expect("value");
    assert_eq!(detect(&raw), AgentFormat::OpenAi);

    let map = value.as_object().cloned().expect("object");
    let raw = load(RawInput::from(map)).expect("mapping");
    assert_eq!(raw.str("name"), Some("Bot"));
}

#[test]
fn non_mapping_value_is_invalid_input() {
    let err = load(RawInput::Value(json!("just a string"))).expect_err("must fail");
    assert!(matches!(err, AstraError::InvalidInputKind(_)));
}

#[test]
fn json_text_is_parsed() {
    let raw = load(RawInput::Text(r#"{"ai_name": "A", "ai_role": "r", "ai_goals": []}"#.into()))
        .expect("json text");
    assert_eq!(detect(&raw), AgentFormat::AutoGpt);
}

#[test]
fn non_mapping_text_is_invalid_input() {
    for text in ["[1, 2, 3]", "42", "definitely not a config {"] {
        let err = load(RawInput::Text(text.to_string())).expect_err("must fail");
        assert!(
            matches!(err, AstraError::InvalidInputKind(_)),
            "{text:?} gave {err:?}"
        );
    }
}

// ── Files ───────────────────────────────────────────────────────────────

#[test]
fn json_file_is_loaded() {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("tempfile");
    write!(file, r#"{{"role": "Writer", "goal": "Write", "tools": ["pen"]}}"#).expect("write");

    let raw = load(RawInput::Path(file.path().to_path_buf())).expect("load");
    assert_eq!(detect(&raw), AgentFormat::CrewAi);
}

#[test]
fn toml_file_is_loaded() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("tempfile");
    writeln!(file, "agent_name = \"Analyst\"").expect("write");
    writeln!(file, "max_loops = 3").expect("write");

    let raw = load(RawInput::Path(file.path().to_path_buf())).expect("load");
    assert_eq!(detect(&raw), AgentFormat::AgentStack);
    assert_eq!(raw.get("max_loops"), Some(&json!(3)));
}

#[test]
fn unknown_extension_tries_json_then_toml() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("agent.conf");
    std::fs::write(&path, "name = \"Conf Bot\"\n").expect("write");

    let raw = load(RawInput::infer(path.to_str().expect("utf8 path"))).expect("load");
    assert_eq!(raw.str("name"), Some("Conf Bot"));
}

#[test]
fn missing_path_is_invalid_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load(RawInput::Path(dir.path().join("missing.json"))).expect_err("must fail");
    assert!(matches!(err, AstraError::InvalidInputKind(_)));
}

#[test]
fn unparseable_file_is_invalid_input() {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("tempfile");
    write!(file, "name = \"toml in a json file\"").expect("write");

    let err = load(RawInput::Path(file.path().to_path_buf())).expect_err("must fail");
    assert!(matches!(err, AstraError::InvalidInputKind(_)));
}

#[test]
fn infer_treats_non_paths_as_text() {
    match RawInput::infer(r#"{"name": "inline"}"#) {
        RawInput::Text(text) => assert!(text.contains("inline")),
        other => panic!("expected text input, got {other:?}"),
    }
}

use astrasync_core::{
    detect, estimate, normalize, AgentFormat, DefaultedField, NormalizeOptions, Normalizer,
    RawConfig,
};
use serde_json::{json, Value};

fn raw(value: Value) -> RawConfig {
    RawConfig::from_value(value).expect("object")
}

// ── End-to-end ──────────────────────────────────────────────────────────

#[test]
fn openai_record_end_to_end() {
    let record = raw(json!({
        "model": "gpt-4",
        "name": "Bot",
        "instructions": "help",
        "tools": [{"type": "retrieval"}],
    }));
    let format = detect(&record);
    assert_eq!(format, AgentFormat::OpenAi);

    let canonical = normalize(&record, format);
    assert_eq!(canonical.name(), "Bot");
    assert_eq!(canonical.agent_type(), AgentFormat::OpenAi);
    assert_eq!(canonical.capabilities(), ["retrieval"]);

    let json = serde_json::to_value(&canonical).expect("serialize");
    assert_eq!(json["agentType"], json!("openai"));

    let score = estimate(&canonical, format);
    assert!((70..=95).contains(&score.value()));
    assert!(score.is_provisional());
}

#[test]
fn crewai_agent_without_name_gets_placeholder() {
    let record = raw(json!({
        "role": "Senior Researcher",
        "goal": "Uncover developments in AI agents",
        "backstory": "A veteran analyst.",
        "tools": ["search_tool"],
    }));
    let format = detect(&record);
    assert_eq!(format, AgentFormat::CrewAi);

    let canonical = normalize(&record, format);
    assert_eq!(canonical.name(), "Unnamed CrewAI Agent");
    assert!(canonical.metadata().was_defaulted(DefaultedField::Name));
    assert_eq!(canonical.description(), "A veteran analyst.");
    assert_eq!(canonical.capabilities(), ["search_tool"]);
    assert_eq!(
        canonical.metadata().attributes["role"],
        json!("Senior Researcher")
    );
}

// ── Fallback and flattening ─────────────────────────────────────────────

#[test]
fn empty_record_normalizes_to_generic_placeholder() {
    let record = RawConfig::default();
    let canonical = normalize(&record, detect(&record));
    assert_eq!(canonical.agent_type(), AgentFormat::Generic);
    assert!(!canonical.name().is_empty());
    assert_eq!(canonical.owner(), "Unknown");
    assert_eq!(canonical.version(), "1.0.0");
}

#[test]
fn tool_types_flatten_in_order() {
    let record = raw(json!({
        "model": "gpt-4",
        "instructions": "x",
        "tools": [{"type": "retrieval"}, {"type": "code_interpreter"}, {"type": "retrieval"}],
    }));
    let canonical = normalize(&record, detect(&record));
    assert_eq!(canonical.capabilities(), ["retrieval", "code_interpreter"]);
}

#[test]
fn every_format_yields_non_empty_name_and_tag() {
    for format in AgentFormat::ALL {
        let canonical = normalize(&RawConfig::default(), format);
        assert!(!canonical.name().is_empty(), "{format}");
        assert_eq!(canonical.agent_type(), format);
    }
}

// ── Purity ──────────────────────────────────────────────────────────────

#[test]
fn normalization_is_idempotent() {
    let record = raw(json!({
        "name": "Research Crew",
        "agents": [{"role": "A", "tools": ["x"]}, {"role": "B", "tools": ["y"]}],
        "tasks": [{"description": "t"}],
        "custom": {"nested": [1, 2, 3]},
    }));
    let format = detect(&record);
    let first = normalize(&record, format);
    let second = normalize(&record, format);
    assert_eq!(first, second);
    assert_eq!(first.digest().expect("digest"), second.digest().expect("digest"));
}

// ── Passthrough ─────────────────────────────────────────────────────────

#[test]
fn unconsumed_keys_survive_in_metadata() {
    let record = raw(json!({
        "model": "gpt-4",
        "instructions": "Help users",
        "temperature": 0.2,
        "tools": "not-a-list",
        "response_format": {"type": "json_object"},
    }));
    let canonical = normalize(&record, detect(&record));
    let passthrough = &canonical.metadata().passthrough;

    assert_eq!(passthrough["temperature"], json!(0.2));
    assert_eq!(passthrough["tools"], json!("not-a-list"));
    assert_eq!(passthrough["response_format"], json!({"type": "json_object"}));
    assert_eq!(passthrough["instructions"], json!("Help users"));
    assert!(!passthrough.contains_key("model"));
    assert!(canonical.capabilities().is_empty());
}

#[test]
fn malformed_name_falls_back_and_is_preserved() {
    let record = raw(json!({"name": 42, "description": ["not", "text"]}));
    let canonical = normalize(&record, AgentFormat::Generic);
    assert_eq!(canonical.name(), "Unnamed Agent");
    assert_eq!(canonical.description(), "");
    assert_eq!(canonical.metadata().passthrough["name"], json!(42));
}

// ── Options ─────────────────────────────────────────────────────────────

#[test]
fn owner_override_is_threaded_through_options() {
    let record = raw(json!({"name": "Bot", "owner": "raw-owner"}));
    let normalizer =
        Normalizer::new(NormalizeOptions::default().with_owner_override(Some("Acme".into())));
    assert_eq!(normalizer.normalize(&record, AgentFormat::Generic).owner(), "Acme");
    assert_eq!(normalize(&record, AgentFormat::Generic).owner(), "raw-owner");
}

#[test]
fn numeric_version_is_accepted() {
    let record = raw(json!({"name": "Bot", "version": 2.1}));
    let canonical = normalize(&record, AgentFormat::Generic);
    assert_eq!(canonical.version(), "2.1");
    assert!(!canonical.metadata().was_defaulted(DefaultedField::Version));
}

#[test]
fn composite_records_collapse_to_coordinator() {
    let record = raw(json!({
        "swarm_architecture": {"name": "Trading Desk", "swarm_type": "ConcurrentWorkflow"},
        "agents": [
            {"agent_name": "Quant", "tools": ["pricing"]},
            {"agent_name": "Risk", "tools": ["var", "pricing"]},
        ],
    }));
    let format = detect(&record);
    assert_eq!(format, AgentFormat::AgentStack);
    let canonical = normalize(&record, format);
    assert_eq!(canonical.name(), "Trading Desk");
    assert_eq!(
        canonical.capabilities(),
        ["swarm:ConcurrentWorkflow", "pricing", "var"]
    );
    assert!(canonical.traits().orchestration);
}

// ── Auditability ────────────────────────────────────────────────────────

fn serialized(record: &RawConfig) -> Value {
    let canonical = normalize(record, detect(record));
    serde_json::to_value(&canonical).expect("serialize")
}

#[test]
fn crew_member_and_task_fields_survive_serialization() {
    let record = raw(json!({
        "name": "Research Crew",
        "agents": [{
            "role": "Researcher",
            "goal": "GOAL-MARKER",
            "backstory": "BACKSTORY-MARKER",
            "tools": ["search"],
        }],
        "tasks": [{"description": "TASK-MARKER", "expected_output": "OUT-MARKER"}],
    }));
    assert_eq!(detect(&record), AgentFormat::CrewAi);

    let passthrough = &serialized(&record)["metadata"]["passthrough"];
    assert_eq!(passthrough["agents"][0]["goal"], json!("GOAL-MARKER"));
    assert_eq!(passthrough["agents"][0]["backstory"], json!("BACKSTORY-MARKER"));
    assert_eq!(passthrough["tasks"][0]["description"], json!("TASK-MARKER"));
    assert_eq!(passthrough["tasks"][0]["expected_output"], json!("OUT-MARKER"));
}

#[test]
fn single_swarm_member_keeps_full_prompt() {
    let prompt = "p".repeat(300);
    let record = raw(json!({
        "agents": [{"agent_name": "Solo", "system_prompt": prompt, "tools": ["t1"]}],
    }));
    assert_eq!(detect(&record), AgentFormat::AgentStack);

    let canonical = normalize(&record, AgentFormat::AgentStack);
    assert_eq!(canonical.name(), "Solo");
    assert_eq!(canonical.description().chars().count(), 203);
    assert_eq!(
        canonical.metadata().passthrough["agents"][0]["system_prompt"],
        json!(prompt)
    );
}

#[test]
fn adk_sub_agents_and_n8n_nodes_survive() {
    let adk = raw(json!({
        "name": "Planner",
        "agent_type": "sequential",
        "sub_agents": [{"name": "step1", "instruction": "SUB-INSTRUCTION"}],
    }));
    assert_eq!(
        serialized(&adk)["metadata"]["passthrough"]["sub_agents"][0]["instruction"],
        json!("SUB-INSTRUCTION")
    );

    let n8n = raw(json!({
        "name": "Flow",
        "nodes": [
            {"name": "Agent", "type": "@n8n/n8n-nodes-langchain.agent",
             "parameters": {"systemPrompt": "route", "temperature": 0.3}},
        ],
        "connections": {"Agent": {}},
    }));
    assert_eq!(detect(&n8n), AgentFormat::N8n);
    let passthrough = &serialized(&n8n)["metadata"]["passthrough"];
    assert_eq!(
        passthrough["nodes"][0]["parameters"]["temperature"],
        json!(0.3)
    );
    assert_eq!(passthrough["connections"], json!({"Agent": {}}));
}

#[test]
fn structured_tool_definitions_survive() {
    let record = raw(json!({
        "model": "gpt-4",
        "instructions": "help",
        "tools": [{"type": "function", "function": {"name": "refund", "parameters": {"type": "object"}}}],
    }));
    let canonical = normalize(&record, detect(&record));
    assert_eq!(canonical.capabilities(), ["refund"]);
    assert_eq!(
        canonical.metadata().passthrough["tools"][0]["function"]["parameters"],
        json!({"type": "object"})
    );
}

#[test]
fn flat_agentstack_malformed_keys_are_preserved() {
    let record = raw(json!({
        "agent_name": "A",
        "max_loops": 2,
        "name": 42,
        "model": {"id": "x"},
        "llm": "gpt-4",
    }));
    assert_eq!(detect(&record), AgentFormat::AgentStack);

    let canonical = normalize(&record, AgentFormat::AgentStack);
    let passthrough = &canonical.metadata().passthrough;
    assert_eq!(canonical.name(), "A");
    assert_eq!(passthrough["name"], json!(42));
    assert_eq!(passthrough["model"], json!({"id": "x"}));
}

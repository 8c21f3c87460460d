//! Per-format extraction rules.
//!
//! Each extractor fills an [`Extraction`] from the raw record. Composite
//! definitions (crews, swarms, workflows, sub-agents) collapse into one
//! record: the top-level identity names it and every member contributes its
//! capabilities. The members themselves are only summarized, so their keys
//! are read with [`FieldReader::members`] and stay in the passthrough.

use serde_json::{json, Map, Value};

use super::reader::{str_field, truncate_prose, truthy, Capabilities, Extraction, FieldReader};
use crate::detect::ADK_AGENT_TYPES;

/// Capabilities every Letta agent has by construction.
const LETTA_CAPABILITIES: &[&str] = &["memory", "recall", "persistent_context"];

/// AutoGPT goals kept as capabilities.
const AUTOGPT_GOAL_LIMIT: usize = 5;

/// Flat AgentStack settings copied into attributes, keyed by attribute name.
const AGENTSTACK_SETTINGS: &[(&str, &str)] = &[
    ("max_loops", "maxLoops"),
    ("autosave", "autosave"),
    ("dashboard", "dashboard"),
    ("verbose", "verbose"),
    ("dynamic_temperature_enabled", "dynamicTemperature"),
    ("saved_state_path", "savedStatePath"),
    ("user_name", "userName"),
    ("retry_attempts", "retryAttempts"),
    ("context_length", "contextLength"),
    ("return_step_meta", "returnStepMeta"),
    ("output_type", "outputType"),
];

/// n8n node type fragments that mark a tool node.
const N8N_TOOL_MARKERS: &[&str] = &["tool", "http", "code", "function"];

fn memory_declared(x: &mut Extraction, memory: Option<&Value>) {
    if memory.is_some_and(truthy) {
        x.capabilities.push("memory");
        x.traits.persistent_memory = true;
    }
}

/// Read a top-level `memory` declaration. Scalars are carried whole; a
/// structured memory config stays in the passthrough.
fn read_memory(r: &mut FieldReader<'_>, x: &mut Extraction) {
    let Some(memory) = r.raw().get("memory") else {
        return;
    };
    if let Some(kind) = memory_type(memory) {
        x.attribute("memoryType", kind);
    }
    memory_declared(x, Some(memory));
    if !(memory.is_object() || memory.is_array()) {
        r.mark("memory");
    }
}

fn memory_type(memory: &Value) -> Option<String> {
    match memory {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => str_field(map, "type").map(str::to_string),
        _ => None,
    }
}

fn names_of(items: &[Value], keys: &[&str]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|m| keys.iter().find_map(|k| str_field(m, k)))
        .map(str::to_string)
        .collect()
}

fn tools_of(map: &Map<String, Value>) -> &[Value] {
    map.get("tools")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

pub(crate) fn extract_openai(r: &mut FieldReader<'_>, x: &mut Extraction) {
    x.name = r.string("name");
    x.description = r.string("description").or_else(|| r.prose("instructions"));
    x.owner = r.first_string(&["owner", "created_by"]);

    if let Some(model) = r.string("model") {
        x.attribute("model", model);
    }
    if let Some(tools) = r.names("tools") {
        x.capabilities.extend_tools(tools);
    }
}

pub(crate) fn extract_mcp(r: &mut FieldReader<'_>, x: &mut Extraction) {
    x.name = r.string("name");
    x.description = r.string("description");
    x.owner = r.first_string(&["owner", "developer"]);

    if let Some(protocol) = r.string("protocol") {
        x.attribute("protocol", protocol);
    }
    if let Some(skills) = r.names("skills") {
        x.capabilities.extend_tools(skills);
        let described = skills
            .iter()
            .filter_map(Value::as_object)
            .filter(|s| s.contains_key("description"))
            .count();
        x.attribute("skillCount", skills.len());
        x.attribute("describedSkillCount", described);
    }
    if let Some(tools) = r.names("tools") {
        x.capabilities.extend_tools(tools);
    }
}

pub(crate) fn extract_letta(r: &mut FieldReader<'_>, x: &mut Extraction) {
    x.name = r.string("name");
    x.owner = r.first_string(&["owner", "creator"]);
    x.capabilities.extend(LETTA_CAPABILITIES.iter().copied());
    x.traits.persistent_memory = true;

    let memory = r.raw().object("memory");
    x.description = r.string("description").or_else(|| {
        memory
            .and_then(|m| str_field(m, "persona"))
            .map(|p| truncate_prose(p, r.description_limit()))
    });
    if let Some(memory) = memory {
        let blocks: Vec<&String> = memory.keys().collect();
        x.attribute("memoryBlocks", json!(blocks));
    }

    if let Some(model) = r.string("model") {
        x.attribute("model", model);
    } else if let Some(model) = r
        .raw()
        .object("llm_config")
        .and_then(|c| str_field(c, "model"))
    {
        x.attribute("model", model);
    }
    if let Some(tools) = r.names("tools") {
        x.capabilities.extend_tools(tools);
    }
}

pub(crate) fn extract_ibm_acp(r: &mut FieldReader<'_>, x: &mut Extraction) {
    let agent_id = r.string("agentId");
    x.name = r
        .string("name")
        .or_else(|| agent_id.as_ref().map(|id| format!("ACP Agent {id}")));
    x.description = r.string("description");
    x.owner = r.first_string(&["owner", "organization"]);

    if let Some(id) = agent_id {
        x.attribute("agentId", id);
    }
    if let Some(method) = r
        .raw()
        .object("authentication")
        .and_then(|a| str_field(a, "method"))
    {
        x.attribute("authMethod", method);
    }

    match r.raw().get("capabilities") {
        Some(Value::Object(_)) => {
            if let Some(caps) = r.flags("capabilities") {
                x.capabilities.extend(
                    caps.iter()
                        .filter(|(_, enabled)| truthy(enabled))
                        .map(|(name, _)| name.clone()),
                );
            }
        }
        Some(Value::Array(_)) => {
            if let Some(caps) = r.names("capabilities") {
                x.capabilities.extend_tools(caps);
            }
        }
        _ => {}
    }
}

pub(crate) fn extract_autogpt(r: &mut FieldReader<'_>, x: &mut Extraction) {
    x.name = r.first_string(&["ai_name", "name"]);
    x.description = r.string("description").or_else(|| r.prose("ai_role"));
    x.owner = r.first_string(&["owner", "user"]);

    if let Some(role) = r.string("ai_role") {
        x.attribute("role", role);
    }
    // Only the first goals become capabilities; the full list stays in the
    // passthrough.
    if let Some(goals) = r.members("ai_goals") {
        x.attribute("goalCount", goals.len());
        x.capabilities.extend(
            goals
                .iter()
                .filter_map(Value::as_str)
                .take(AUTOGPT_GOAL_LIMIT)
                .map(str::to_string),
        );
    }
    if let Some(commands) = r.names("commands") {
        x.capabilities.extend_tools(commands);
    }
}

pub(crate) fn extract_agentforce(r: &mut FieldReader<'_>, x: &mut Extraction) {
    x.name = r.first_string(&["label", "name"]);
    x.description = r.string("description");
    x.owner = r.first_string(&["owner", "company_name", "organization"]);

    if let Some(kind) = r.string("agent_type") {
        x.attribute("agentKind", kind);
    }
    if let Some(template) = r.string("agent_template_type") {
        x.attribute("templateType", template);
    }
    if let Some(domain) = r.string("domain") {
        x.attribute("domain", domain);
    }

    if let Some(topics) = r.names("topics") {
        x.attribute("topicCount", topics.len());
        for topic in topics {
            match topic {
                Value::String(label) => x.capabilities.push(label.as_str()),
                Value::Object(map) => {
                    if let Some(label) = str_field(map, "label").or_else(|| str_field(map, "name"))
                    {
                        x.capabilities.push(label);
                    }
                    x.capabilities.extend_tools(
                        map.get("actions")
                            .and_then(Value::as_array)
                            .map(Vec::as_slice)
                            .unwrap_or(&[]),
                    );
                }
                _ => {}
            }
        }
    }
    if let Some(actions) = r.names("actions") {
        x.capabilities.extend_tools(actions);
    }
}

pub(crate) fn extract_google_adk(r: &mut FieldReader<'_>, x: &mut Extraction) {
    x.name = r.string("name");
    x.description = r.string("description").or_else(|| r.prose("instruction"));
    x.owner = r.first_string(&["owner", "developer"]);

    if let Some(model) = r.string("model") {
        x.attribute("model", model);
    }
    if let Some(tools) = r.names("tools") {
        x.capabilities.extend_tools(tools);
    }

    let workflow = r.string("agent_type");
    let mut orchestration = workflow
        .as_deref()
        .is_some_and(|t| ADK_AGENT_TYPES.contains(&t) && t != "llm");
    if let Some(kind) = workflow {
        x.attribute("workflowType", kind);
    }

    if let Some(subs) = r.members("sub_agents") {
        let names = names_of(subs, &["name"]);
        for sub in subs.iter().filter_map(Value::as_object) {
            x.capabilities.extend_tools(tools_of(sub));
        }
        x.attribute("subAgents", json!(names));
        orchestration |= !subs.is_empty();
    }
    x.traits.orchestration = orchestration;

    let raw = r.raw();
    let structured = raw.get("output_schema").is_some_and(truthy)
        || raw.get("structured_output").is_some_and(truthy);
    if structured {
        x.traits.structured_output = true;
        x.capabilities.push("deterministic_output");
    }
    x.traits.session_aware = raw.get("session_service").is_some_and(truthy);
    memory_declared(x, raw.get("memory_service"));
}

pub(crate) fn extract_langchain(r: &mut FieldReader<'_>, x: &mut Extraction) {
    x.name = r.string("name");
    x.description = r.string("description").or_else(|| {
        r.prose("prompt").or_else(|| {
            r.raw()
                .object("prompt")
                .and_then(|p| str_field(p, "template"))
                .map(|t| truncate_prose(t, r.description_limit()))
        })
    });
    x.owner = r.string("owner");

    match r.raw().get("llm") {
        Some(Value::String(_)) => {
            if let Some(llm) = r.string("llm") {
                x.attribute("llm", llm);
            }
        }
        Some(Value::Object(llm)) => {
            if let Some(model) = str_field(llm, "model_name").or_else(|| str_field(llm, "model")) {
                x.attribute("llm", model);
            }
        }
        _ => {}
    }
    if let Some(kind) = r.string("agent_type") {
        x.attribute("agentKind", kind);
    }
    if r.raw().contains("prompt") {
        x.attribute("hasPrompt", true);
    }
    if let Some(tools) = r.names("tools") {
        x.capabilities.extend_tools(tools);
    }

    read_memory(r, x);

    if let Some(chains) = r.raw().array("chains") {
        x.attribute("chainCount", chains.len());
        x.traits.orchestration = chains.len() > 1;
    }
    if let Some(caps) = r.names("capabilities") {
        x.capabilities.extend_tools(caps);
    }
}

pub(crate) fn extract_crewai(r: &mut FieldReader<'_>, x: &mut Extraction) {
    x.name = r.first_string(&["name", "crew_name"]);
    x.description = r
        .string("description")
        .or_else(|| r.prose("backstory"))
        .or_else(|| r.prose("goal"));
    x.owner = r.string("owner");

    if let Some(role) = r.string("role") {
        x.attribute("role", role);
    }
    if let Some(goal) = r.string("goal") {
        x.attribute("goal", goal);
    }
    if let Some(llm) = r.string("llm") {
        x.attribute("llm", llm);
    }
    if let Some(max_iter) = r.value("max_iter") {
        x.attribute("maxIterations", max_iter.clone());
    }
    if let Some(tools) = r.names("tools") {
        x.capabilities.extend_tools(tools);
    }
    read_memory(r, x);

    // Crew shape: member agents and tasks.
    let mut members = 0;
    if let Some(agents) = r.members("agents") {
        members = agents.len();
        x.attribute("agentCount", members);
        x.attribute("agentRoles", json!(names_of(agents, &["role", "name"])));
        for agent in agents.iter().filter_map(Value::as_object) {
            x.capabilities.extend_tools(tools_of(agent));
            memory_declared(x, agent.get("memory"));
        }
    }
    if let Some(tasks) = r.members("tasks") {
        x.attribute("taskCount", tasks.len());
        for task in tasks.iter().filter_map(Value::as_object) {
            x.capabilities.extend_tools(tools_of(task));
        }
    }
    let process = r.string("process");
    x.traits.orchestration = members > 1 || process.is_some();
    if let Some(process) = process {
        x.attribute("process", process);
    }
}

/// What a single n8n agent node contributes.
fn absorb_n8n_agent_params(params: &Map<String, Value>, x: &mut Extraction) {
    if let Some(model) = str_field(params, "model") {
        x.attribute("model", model);
    }
    x.capabilities.extend_tools(tools_of(params));

    let memory = params.get("memory");
    if let Some(kind) = memory.and_then(memory_type) {
        x.attribute("memoryType", kind);
    }
    memory_declared(x, memory);

    if let Some(kind) = str_field(params, "agentType") {
        x.attribute("n8nAgentType", kind);
    }
    if params.get("outputParsing").is_some_and(truthy) {
        x.capabilities.push("output_parsing");
        x.traits.structured_output = true;
    }
}

fn is_n8n_agent_node(node_type: &str) -> bool {
    let lower = node_type.to_ascii_lowercase();
    lower.contains("agent") || lower.contains("langchain")
}

fn absorb_n8n_workflow(workflow: &Map<String, Value>, x: &mut Extraction, limit: usize) {
    x.name_or(str_field(workflow, "name").map(str::to_string));
    x.description_or(str_field(workflow, "description").map(str::to_string));

    let nodes = workflow
        .get("nodes")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let mut agent_nodes = Vec::new();
    let mut tool_nodes = 0usize;
    for node in nodes.iter().filter_map(Value::as_object) {
        let node_type = str_field(node, "type").unwrap_or_default();
        let node_name = str_field(node, "name").unwrap_or_default();
        if is_n8n_agent_node(node_type) {
            agent_nodes.push(node_name.to_string());
            if let Some(params) = node.get("parameters").and_then(Value::as_object) {
                if x.description.is_none() {
                    x.description =
                        str_field(params, "systemPrompt").map(|p| truncate_prose(p, limit));
                }
                absorb_n8n_agent_params(params, x);
            }
        } else {
            let lower = node_type.to_ascii_lowercase();
            if N8N_TOOL_MARKERS.iter().any(|m| lower.contains(m)) {
                tool_nodes += 1;
                x.capabilities.push(node_name);
            }
        }
    }

    x.attribute("agentNodeCount", agent_nodes.len());
    x.attribute("agentNodes", json!(agent_nodes));
    x.attribute("toolNodeCount", tool_nodes);
    x.attribute("totalNodeCount", nodes.len());
    x.traits.orchestration = agent_nodes.len() > 1 || nodes.len() > 1;

    if let Some(connections) = workflow.get("connections").and_then(Value::as_object) {
        x.attribute("connectionCount", connections.len());
    }
    if let Some(settings) = workflow.get("settings") {
        x.attribute("settings", settings.clone());
    }
}

pub(crate) fn extract_n8n(r: &mut FieldReader<'_>, x: &mut Extraction) {
    x.name = r.string("name");
    x.description = r.string("description");
    x.owner = r.string("owner");
    let limit = r.description_limit();

    // Workflow graphs are summarized, never consumed.
    if let Some(workflow) = r.raw().object("workflow") {
        absorb_n8n_workflow(workflow, x, limit);
    } else if r.raw().array("nodes").is_some() {
        absorb_n8n_workflow(r.raw().as_map(), x, limit);
    } else {
        if let Some(node_type) = r.string("type") {
            x.attribute("nodeType", node_type);
        }
        if let Some(params) = r.raw().object("parameters") {
            if x.description.is_none() {
                x.description = str_field(params, "systemPrompt").map(|p| truncate_prose(p, limit));
            }
            absorb_n8n_agent_params(params, x);
        }
    }

    if r.raw().contains("staticData") {
        x.attribute("hasStaticData", true);
    }
}

/// First of `keys` holding a non-blank string, with the key it came from.
fn first_str<'m>(
    map: &'m Map<String, Value>,
    keys: &[&'static str],
) -> Option<(&'static str, &'m str)> {
    keys.iter()
        .find_map(|key| str_field(map, key).map(|value| (*key, value)))
}

/// Fold one AgentStack agent definition into the extraction.
///
/// Returns the keys of `agent` whose values were carried whole into the
/// extraction. Keys that were skipped, summarized, or shadowed by an earlier
/// value are left out.
fn absorb_agentstack_agent(
    agent: &Map<String, Value>,
    x: &mut Extraction,
    limit: usize,
) -> Vec<&'static str> {
    let mut used = Vec::new();

    if let Some((key, name)) = first_str(agent, &["agent_name", "name"]) {
        if x.name.is_none() {
            x.name = Some(name.to_string());
            used.push(key);
        }
    }
    if let Some(prompt) = str_field(agent, "system_prompt") {
        x.description_or(Some(truncate_prose(prompt, limit)));
    }
    if let Some((key, model)) = first_str(agent, &["model", "llm"]) {
        x.attribute("model", model);
        used.push(key);
    }
    for (key, attribute) in AGENTSTACK_SETTINGS {
        if let Some(value) = agent.get(*key) {
            x.attribute(attribute, value.clone());
            used.push(*key);
        }
    }
    if let Some(tools) = agent.get("tools").and_then(Value::as_array) {
        x.capabilities.extend_tools(tools);
        if tools.iter().all(Value::is_string) {
            used.push("tools");
        }
    }

    if let Some(memory) = agent.get("memory") {
        memory_declared(x, Some(memory));
        if !(memory.is_object() || memory.is_array()) {
            used.push("memory");
        }
    }
    memory_declared(x, agent.get("autosave"));
    if agent.get("dynamic_temperature_enabled").is_some_and(truthy) {
        x.capabilities.push("dynamic_temperature");
    }
    if agent.get("return_step_meta").is_some_and(truthy) {
        x.capabilities.push("step_metadata");
    }
    used
}

pub(crate) fn extract_agentstack(r: &mut FieldReader<'_>, x: &mut Extraction) {
    x.name = r.first_string(&["name", "swarm_name"]);
    x.description = r.string("description");
    x.owner = r.string("owner");
    let limit = r.description_limit();

    if let Some(swarm) = r.raw().object("swarm_architecture") {
        x.name_or(str_field(swarm, "name").map(str::to_string));
        x.description_or(str_field(swarm, "description").map(str::to_string));
        if let Some(kind) = str_field(swarm, "swarm_type") {
            x.attribute("swarmType", kind);
            x.capabilities.push(format!("swarm:{kind}"));
        }
        if let Some(task) = swarm.get("task") {
            x.attribute("task", task.clone());
        }
        if let Some(loops) = swarm.get("max_loops") {
            x.attribute("swarmMaxLoops", loops.clone());
        }
        x.traits.orchestration = true;
    }

    let agents: Vec<&Map<String, Value>> = r
        .members("agents")
        .map(|a| a.iter().filter_map(Value::as_object).collect())
        .unwrap_or_default();

    match agents.as_slice() {
        [] => {
            let used = absorb_agentstack_agent(r.raw().as_map(), x, limit);
            for key in used {
                r.mark(key);
            }
        }
        [single] if !x.traits.orchestration => {
            absorb_agentstack_agent(single, x, limit);
        }
        many => {
            x.name_or(Some("AgentStack Swarm".to_string()));
            let names: Vec<String> = many
                .iter()
                .map(|a| {
                    str_field(a, "agent_name")
                        .or_else(|| str_field(a, "name"))
                        .unwrap_or("Unknown")
                        .to_string()
                })
                .collect();
            for agent in many {
                x.capabilities.extend_tools(tools_of(agent));
                memory_declared(x, agent.get("memory"));
                memory_declared(x, agent.get("autosave"));
            }
            x.attribute("agentCount", many.len());
            x.attribute("agentNames", json!(names));
            x.traits.orchestration = true;
        }
    }
}

pub(crate) fn extract_generic(r: &mut FieldReader<'_>, x: &mut Extraction) {
    x.name = r.first_string(&["name", "agent_name", "ai_name", "label", "title"]);
    x.description = r.first_string(&["description", "summary"]);
    x.owner = r.first_string(&["owner", "creator", "author"]);

    let mut caps = Capabilities::default();
    for key in ["capabilities", "features", "tools", "skills"] {
        match r.raw().get(key) {
            Some(Value::Array(_)) => {
                if let Some(items) = r.names(key) {
                    caps.extend_tools(items);
                }
            }
            Some(Value::Object(_)) => {
                if let Some(map) = r.flags(key) {
                    caps.extend(
                        map.iter()
                            .filter(|(_, enabled)| truthy(enabled))
                            .map(|(name, _)| name.clone()),
                    );
                }
            }
            _ => {}
        }
    }
    x.capabilities = caps;
}

//! Workflow spec model.
//!
//! A spec is a tree of tagged nodes serialized as `{"type": ..., ...}`.
//! Unknown `type` tags and a `chord` without a `callback` are rejected
//! while parsing; [`SpecNode::validate`] then checks the rules serde cannot
//! express. Both run before the compiler touches storage, so a malformed
//! spec never leaves task rows behind.
//!
//! Keys the model does not know about are kept in `extra` maps so that a
//! parsed spec serializes back without losing editor metadata.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use casehub_core::{AppError, AppResult};

/// The stored shape of a workflow's task graph: `{"workflow": <node>, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSpec {
    /// Root node of the task graph.
    pub workflow: SpecNode,
    /// Other top-level keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkflowSpec {
    /// Parse and validate a stored spec document.
    pub fn from_value(value: &Value) -> AppResult<Self> {
        let spec: Self = serde_json::from_value(value.clone())
            .map_err(|e| AppError::validation(format!("Invalid workflow spec: {e}")))?;
        spec.workflow.validate()?;
        Ok(spec)
    }
}

/// One node of the task graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SpecNode {
    /// With one child: run it. With several: run them in parallel.
    Chain(ChainNode),
    /// Run all children in parallel.
    Group(GroupNode),
    /// Run the headers in parallel, then the callback with their results.
    Chord(ChordNode),
    /// A single executable unit, optionally followed by continuations.
    Task(TaskNode),
}

/// Children of a `chain` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainNode {
    /// Child nodes, in document order.
    #[serde(default)]
    pub tasks: Vec<SpecNode>,
    /// Unrecognized keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Children of a `group` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupNode {
    /// Child nodes, in document order.
    #[serde(default)]
    pub tasks: Vec<SpecNode>,
    /// Unrecognized keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Header and callback of a `chord` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordNode {
    /// Header nodes, run in parallel.
    #[serde(default)]
    pub tasks: Vec<SpecNode>,
    /// Node run once every header has completed.
    pub callback: Box<SpecNode>,
    /// Unrecognized keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A leaf unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskNode {
    /// Registered name of the executable unit.
    pub task_name: String,
    /// Routing key. `None` leaves routing to the runtime's default queue.
    #[serde(default)]
    pub queue_name: Option<String>,
    /// Identity of the node and of the task row it produces.
    #[serde(default)]
    pub uuid: Option<String>,
    /// Display name copied into the task row.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Description copied into the task row.
    #[serde(default)]
    pub description: Option<String>,
    /// Ordered configuration parameters.
    #[serde(default)]
    pub task_config: Vec<TaskConfigItem>,
    /// Continuations run after this unit.
    #[serde(default)]
    pub tasks: Vec<SpecNode>,
    /// Unrecognized keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One `task_config` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfigItem {
    /// Parameter name as the worker expects it.
    #[serde(default)]
    pub name: Option<String>,
    /// Parameter value.
    #[serde(default)]
    pub value: Value,
    /// Template parameter name, assigned when saved as a template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_name: Option<String>,
    /// Unrecognized keys (label, type, description...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskNode {
    /// Flatten `task_config` into the `name -> value` mapping workers receive.
    pub fn config_map(&self) -> Map<String, Value> {
        self.task_config
            .iter()
            .filter_map(|item| item.name.clone().map(|name| (name, item.value.clone())))
            .collect()
    }

    fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.task_name)
    }
}

impl SpecNode {
    /// The node's `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Chain(_) => "chain",
            Self::Group(_) => "group",
            Self::Chord(_) => "chord",
            Self::Task(_) => "task",
        }
    }

    /// Parse a single node and validate it.
    pub fn from_value(value: &Value) -> AppResult<Self> {
        let node: Self = serde_json::from_value(value.clone())
            .map_err(|e| AppError::validation(format!("Invalid workflow node: {e}")))?;
        node.validate()?;
        Ok(node)
    }

    /// Check the structural rules the serde model cannot express.
    ///
    /// - `chain` and `group` nodes need at least one child.
    /// - `task` nodes need a non-empty `task_name` and named config entries.
    /// - A `uuid` may appear on at most one node.
    pub fn validate(&self) -> AppResult<()> {
        let mut seen = HashSet::new();
        self.validate_inner(&mut seen)
    }

    fn validate_inner<'a>(&'a self, seen: &mut HashSet<&'a str>) -> AppResult<()> {
        match self {
            Self::Chain(ChainNode { tasks, .. }) | Self::Group(GroupNode { tasks, .. }) => {
                if tasks.is_empty() {
                    return Err(AppError::validation(format!(
                        "A '{}' node requires at least one task",
                        self.kind()
                    )));
                }
                tasks.iter().try_for_each(|t| t.validate_inner(seen))
            }
            Self::Chord(chord) => {
                chord.tasks.iter().try_for_each(|t| t.validate_inner(seen))?;
                chord.callback.validate_inner(seen)
            }
            Self::Task(task) => {
                if task.task_name.trim().is_empty() {
                    return Err(AppError::validation("A 'task' node requires a task_name"));
                }
                if task.task_config.iter().any(|item| item.name.is_none()) {
                    return Err(AppError::validation(format!(
                        "Task '{}' has a task_config entry without a name",
                        task.label()
                    )));
                }
                if let Some(uuid) = task.uuid.as_deref() {
                    if !seen.insert(uuid) {
                        return Err(AppError::validation(format!(
                            "Duplicate task uuid '{uuid}' in workflow spec"
                        )));
                    }
                }
                task.tasks.iter().try_for_each(|t| t.validate_inner(seen))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casehub_core::error::ErrorKind;
    use serde_json::json;

    fn task(name: &str, uuid: &str) -> Value {
        json!({"type": "task", "task_name": name, "uuid": uuid, "task_config": [], "tasks": []})
    }

    #[test]
    fn test_parses_nested_tree() {
        let value = json!({
            "workflow": {
                "type": "chain",
                "isRoot": true,
                "tasks": [{
                    "type": "chord",
                    "tasks": [task("a", "u1"), task("b", "u2")],
                    "callback": task("c", "u3")
                }]
            }
        });
        let spec = WorkflowSpec::from_value(&value).unwrap();
        let SpecNode::Chain(chain) = &spec.workflow else {
            panic!("expected chain root");
        };
        assert_eq!(chain.extra.get("isRoot"), Some(&json!(true)));
        assert!(matches!(chain.tasks[0], SpecNode::Chord(_)));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = SpecNode::from_value(&json!({"type": "loop", "tasks": []})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("loop"));
    }

    #[test]
    fn test_chord_without_callback_is_rejected() {
        let err = SpecNode::from_value(&json!({"type": "chord", "tasks": [task("a", "u1")]}))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("callback"));
    }

    #[test]
    fn test_empty_chain_is_rejected() {
        let err = SpecNode::from_value(&json!({"type": "chain", "tasks": []})).unwrap_err();
        assert!(err.message.contains("at least one task"));
    }

    #[test]
    fn test_duplicate_uuid_is_rejected() {
        let value = json!({"type": "group", "tasks": [task("a", "same"), task("b", "same")]});
        let err = SpecNode::from_value(&value).unwrap_err();
        assert!(err.message.contains("Duplicate task uuid 'same'"));
    }

    #[test]
    fn test_unnamed_config_entry_is_rejected() {
        let value = json!({
            "type": "task",
            "task_name": "strings",
            "display_name": "Strings",
            "task_config": [{"value": 1}]
        });
        let err = SpecNode::from_value(&value).unwrap_err();
        assert!(err.message.contains("Strings"));
    }

    #[test]
    fn test_missing_workflow_key_is_rejected() {
        let err = WorkflowSpec::from_value(&json!({"tasks": []})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_config_map_keeps_null_values() {
        let node = SpecNode::from_value(&json!({
            "type": "task",
            "task_name": "grep",
            "task_config": [
                {"name": "pattern", "value": "evil", "label": "Pattern"},
                {"name": "ignore_case"}
            ]
        }))
        .unwrap();
        let SpecNode::Task(task) = node else {
            panic!("expected task");
        };
        let config = task.config_map();
        assert_eq!(config.get("pattern"), Some(&json!("evil")));
        assert_eq!(config.get("ignore_case"), Some(&Value::Null));
        assert_eq!(task.task_config[0].extra.get("label"), Some(&json!("Pattern")));
    }

    #[test]
    fn test_serializes_back_with_type_tag() {
        let value = task("a", "u1");
        let node = SpecNode::from_value(&value).unwrap();
        let out = serde_json::to_value(&node).unwrap();
        assert_eq!(out["type"], "task");
        assert_eq!(out["uuid"], "u1");
    }
}

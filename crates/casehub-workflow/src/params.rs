//! Template parameters.
//!
//! Both passes work on the raw JSON document rather than [`crate::spec`]
//! types, because templates may carry editor metadata anywhere in the tree.
//! Traversal is document order: a node's own `task_config` first, then every
//! value of the node in key order, recursing into objects and arrays.

use std::collections::HashMap;

use serde_json::{Map, Value};

/// Normalized form of a config entry name: lowercase, spaces as underscores.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Return a copy of `doc` where every `task_config` entry with a string
/// `name` carries `param_name = "{normalized}_{n}"`.
///
/// `counts` holds the next index per normalized name. It is shared across
/// the whole traversal, so the second `ASCII` entry in a spec becomes
/// `ascii_1`. Pass a fresh map per spec; reusing one keeps counting.
pub fn assign_param_names(doc: &Value, counts: &mut HashMap<String, usize>) -> Value {
    match doc {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            let named_config = match map.get("task_config") {
                Some(Value::Array(items)) => Some(name_config_items(items, counts)),
                _ => None,
            };
            for (key, value) in map {
                let value = match (&named_config, key.as_str()) {
                    (Some(items), "task_config") => assign_param_names(items, counts),
                    _ => assign_param_names(value, counts),
                };
                out.insert(key.clone(), value);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| assign_param_names(item, counts))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn name_config_items(items: &[Value], counts: &mut HashMap<String, usize>) -> Value {
    Value::Array(
        items
            .iter()
            .map(|item| {
                let mut item = item.clone();
                if let Some(entry) = item.as_object_mut() {
                    if let Some(name) = entry.get("name").and_then(Value::as_str) {
                        let normalized = normalize_name(name);
                        let index = counts.entry(normalized.clone()).or_insert(0);
                        let param_name = format!("{normalized}_{index}");
                        *index += 1;
                        entry.insert("param_name".to_string(), Value::String(param_name));
                    }
                }
                item
            })
            .collect(),
    )
}

/// Return a copy of `doc` where every `task_config` entry whose
/// `param_name` is a key of `parameters` has its `value` replaced.
///
/// Entries without a `param_name`, or whose name is absent from
/// `parameters`, keep their value.
pub fn apply_parameters(doc: &Value, parameters: &Map<String, Value>) -> Value {
    match doc {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                let value = if key == "task_config" {
                    apply_to_config(value, parameters)
                } else {
                    value.clone()
                };
                out.insert(key.clone(), apply_parameters(&value, parameters));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| apply_parameters(item, parameters))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn apply_to_config(config: &Value, parameters: &Map<String, Value>) -> Value {
    let Value::Array(items) = config else {
        return config.clone();
    };
    Value::Array(
        items
            .iter()
            .map(|item| {
                let mut item = item.clone();
                if let Some(entry) = item.as_object_mut() {
                    let replacement = entry
                        .get("param_name")
                        .and_then(Value::as_str)
                        .filter(|name| !name.is_empty())
                        .and_then(|name| parameters.get(name))
                        .cloned();
                    if let Some(value) = replacement {
                        entry.insert("value".to_string(), value);
                    }
                }
                item
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings_task(uuid: &str) -> Value {
        json!({
            "task_name": "openrelik-worker-strings.tasks.strings",
            "queue_name": "openrelik-worker-strings",
            "display_name": "Strings",
            "task_config": [
                {"name": "UTF16LE", "label": "Extract Unicode strings", "type": "checkbox", "value": true},
                {"name": "ASCII", "label": "Extract ASCII strings", "type": "checkbox", "value": false}
            ],
            "type": "task",
            "uuid": uuid,
            "tasks": []
        })
    }

    fn template() -> Value {
        json!({
            "workflow": {
                "type": "chain",
                "isRoot": true,
                "tasks": [strings_task("e1e6"), strings_task("736a")]
            }
        })
    }

    fn param_names(doc: &Value, task: usize) -> Vec<String> {
        doc["workflow"]["tasks"][task]["task_config"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["param_name"].as_str().unwrap().to_string())
            .collect()
    }

    fn values(doc: &Value, task: usize) -> Vec<Value> {
        doc["workflow"]["tasks"][task]["task_config"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["value"].clone())
            .collect()
    }

    #[test]
    fn test_names_are_unique_across_tasks() {
        let named = assign_param_names(&template(), &mut HashMap::new());
        assert_eq!(param_names(&named, 0), vec!["utf16le_0", "ascii_0"]);
        assert_eq!(param_names(&named, 1), vec!["utf16le_1", "ascii_1"]);
    }

    #[test]
    fn test_input_is_not_modified() {
        let doc = template();
        let _ = assign_param_names(&doc, &mut HashMap::new());
        assert!(doc["workflow"]["tasks"][0]["task_config"][0].get("param_name").is_none());
    }

    #[test]
    fn test_reused_counter_keeps_counting() {
        let mut counts = HashMap::new();
        let once = assign_param_names(&template(), &mut counts);
        let twice = assign_param_names(&once, &mut counts);
        assert_eq!(param_names(&twice, 0), vec!["utf16le_2", "ascii_2"]);
        assert_eq!(param_names(&twice, 1), vec!["utf16le_3", "ascii_3"]);
    }

    #[test]
    fn test_spaces_become_underscores() {
        let doc = json!({
            "type": "task",
            "task_config": [{"name": "Max File Size", "value": 10}],
            "tasks": [{"type": "task", "task_config": [{"name": "max file size"}]}]
        });
        let named = assign_param_names(&doc, &mut HashMap::new());
        assert_eq!(named["task_config"][0]["param_name"], "max_file_size_0");
        assert_eq!(named["tasks"][0]["task_config"][0]["param_name"], "max_file_size_1");
    }

    #[test]
    fn test_parent_config_is_named_before_children() {
        let doc = json!({
            "tasks": [{"task_config": [{"name": "x"}]}],
            "task_config": [{"name": "x"}]
        });
        let named = assign_param_names(&doc, &mut HashMap::new());
        assert_eq!(named["task_config"][0]["param_name"], "x_0");
        assert_eq!(named["tasks"][0]["task_config"][0]["param_name"], "x_1");
    }

    #[test]
    fn test_entries_without_name_are_skipped() {
        let doc = json!({"task_config": [{"label": "no name"}, {"name": "Depth"}]});
        let named = assign_param_names(&doc, &mut HashMap::new());
        assert!(named["task_config"][0].get("param_name").is_none());
        assert_eq!(named["task_config"][1]["param_name"], "depth_0");
    }

    #[test]
    fn test_apply_overwrites_every_named_value() {
        let named = assign_param_names(&template(), &mut HashMap::new());
        let params = json!({"utf16le_0": false, "ascii_0": true, "utf16le_1": false, "ascii_1": true});
        let applied = apply_parameters(&named, params.as_object().unwrap());
        assert_eq!(values(&applied, 0), vec![json!(false), json!(true)]);
        assert_eq!(values(&applied, 1), vec![json!(false), json!(true)]);
    }

    #[test]
    fn test_apply_with_partial_parameters() {
        let named = assign_param_names(&template(), &mut HashMap::new());
        let params = json!({"utf16le_0": false, "ascii_0": true, "unknown_9": 1});
        let applied = apply_parameters(&named, params.as_object().unwrap());
        assert_eq!(values(&applied, 0), vec![json!(false), json!(true)]);
        assert_eq!(values(&applied, 1), vec![json!(true), json!(false)]);
    }

    #[test]
    fn test_apply_ignores_entries_without_param_name() {
        let params = json!({"utf16le_0": false});
        let applied = apply_parameters(&template(), params.as_object().unwrap());
        assert_eq!(applied, template());
    }
}

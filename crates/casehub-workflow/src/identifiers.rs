//! Identity rewriting for template instantiation and workflow copies.

use serde_json::{Map, Value};

use casehub_core::traits::IdGenerator;

/// Return a copy of `doc` with every `uuid` key, at any depth, rewritten.
///
/// With `replacement` set, every occurrence gets that literal value (used to
/// stamp templates with a placeholder). Otherwise each occurrence gets a
/// fresh id from `ids`. A `uuid` key's own value is replaced, not descended
/// into.
pub fn rewrite_identifiers(doc: &Value, replacement: Option<&str>, ids: &dyn IdGenerator) -> Value {
    match doc {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                let value = if key == "uuid" {
                    Value::String(replacement.map_or_else(|| ids.next_id(), str::to_string))
                } else {
                    rewrite_identifiers(value, replacement, ids)
                };
                out.insert(key.clone(), value);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| rewrite_identifiers(item, replacement, ids))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Collect every `uuid` value in document order.
pub fn collect_identifiers(doc: &Value) -> Vec<&Value> {
    let mut out = Vec::new();
    collect_into(doc, &mut out);
    out
}

fn collect_into<'a>(doc: &'a Value, out: &mut Vec<&'a Value>) {
    match doc {
        Value::Object(map) => {
            for (key, value) in map {
                if key == "uuid" {
                    out.push(value);
                } else {
                    collect_into(value, out);
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_into(item, out)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use casehub_core::traits::{SequentialIdGenerator, UuidGenerator};
    use serde_json::json;

    fn nested() -> Value {
        json!({
            "workflow": {
                "type": "chain",
                "uuid": "root",
                "tasks": [{
                    "type": "chord",
                    "uuid": "chord",
                    "tasks": [
                        {"type": "task", "task_name": "a", "uuid": "a"},
                        {"type": "task", "task_name": "b", "uuid": "b"}
                    ],
                    "callback": {
                        "type": "task",
                        "task_name": "merge",
                        "uuid": "merge",
                        "tasks": [{"type": "task", "task_name": "report", "uuid": "deep"}]
                    }
                }]
            }
        })
    }

    #[test]
    fn test_placeholder_reaches_every_depth() {
        let ids = SequentialIdGenerator::new("unused");
        let stamped = rewrite_identifiers(&nested(), Some("PLACEHOLDER"), &ids);
        let found = collect_identifiers(&stamped);
        assert_eq!(found.len(), 6);
        assert!(found.iter().all(|v| v.as_str() == Some("PLACEHOLDER")));
        assert_eq!(
            stamped["workflow"]["tasks"][0]["callback"]["tasks"][0]["uuid"],
            "PLACEHOLDER"
        );
    }

    #[test]
    fn test_fresh_ids_are_unique_per_run_and_across_runs() {
        let ids = UuidGenerator;
        let first = rewrite_identifiers(&nested(), None, &ids);
        let second = rewrite_identifiers(&nested(), None, &ids);

        let first: HashSet<String> = collect_identifiers(&first)
            .into_iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        let second: HashSet<String> = collect_identifiers(&second)
            .into_iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();

        assert_eq!(first.len(), 6);
        assert_eq!(second.len(), 6);
        assert!(first.is_disjoint(&second));
        assert!(!first.contains("root"));
    }

    #[test]
    fn test_rewrite_leaves_other_fields_alone() {
        let ids = SequentialIdGenerator::new("id");
        let doc = json!({"type": "task", "task_name": "t", "uuid": "old", "task_config": [{"name": "uuid"}]});
        let out = rewrite_identifiers(&doc, None, &ids);
        assert_eq!(
            out,
            json!({"type": "task", "task_name": "t", "uuid": "id-1", "task_config": [{"name": "uuid"}]})
        );
    }
}

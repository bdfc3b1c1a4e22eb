//! Executable task graphs handed to the task runtime.
//!
//! A [`Canvas`] only describes ordering: `Chain` runs its steps one after
//! another, `Group` runs its members with no ordering between them, and
//! `Chord` runs its header like a group and then the body once every
//! header member has finished.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use casehub_entity::file::File;

/// An input file as workers see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputFile {
    /// File row id.
    pub id: Uuid,
    /// Hex form of the id, used in on-disk names.
    pub uuid: String,
    /// Original file name.
    pub display_name: String,
    /// Extension without the dot.
    pub extension: Option<String>,
    /// Data type label.
    pub data_type: Option<String>,
    /// Detected MIME type.
    pub mime_type: Option<String>,
    /// Absolute path on shared storage.
    pub path: String,
}

impl InputFile {
    /// Describe `file`, located under `folder_path`.
    pub fn from_file(file: &File, folder_path: &Path) -> Self {
        Self {
            id: file.id,
            uuid: file.id.simple().to_string(),
            display_name: file.display_name.clone(),
            extension: file.extension.clone(),
            data_type: file.data_type.clone(),
            mime_type: file.magic_mime.clone(),
            path: file.storage_path(folder_path).to_string_lossy().into_owned(),
        }
    }
}

/// Keyword arguments every unit receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskKwargs {
    /// Files the workflow was created with.
    pub input_files: Vec<InputFile>,
    /// Directory the unit writes its output to.
    pub output_path: String,
    /// Owning workflow.
    pub workflow_id: Uuid,
    /// Flattened `task_config`.
    pub task_config: Map<String, Value>,
}

/// A single named unit routed to a queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    /// Registered name of the unit to run.
    pub task_name: String,
    /// Runtime task id; equal to the node identity and the task row's `uuid`.
    pub task_id: String,
    /// Routing key.
    pub queue: Option<String>,
    /// Keyword payload.
    pub kwargs: TaskKwargs,
}

/// A sequential, parallel or fan-in composition of signatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Canvas {
    /// One unit.
    Signature(Signature),
    /// Steps run in order; each starts after the previous one finishes.
    Chain {
        /// Ordered steps.
        steps: Vec<Canvas>,
    },
    /// Members run with no ordering between them.
    Group {
        /// Unordered members.
        members: Vec<Canvas>,
    },
    /// Header members run in parallel, then `body` receives their results.
    Chord {
        /// Parallel header.
        header: Vec<Canvas>,
        /// Callback.
        body: Box<Canvas>,
    },
}

impl Canvas {
    /// Every signature in the graph, depth-first in document order.
    pub fn signatures(&self) -> Vec<&Signature> {
        let mut out = Vec::new();
        self.collect_signatures(&mut out);
        out
    }

    fn collect_signatures<'a>(&'a self, out: &mut Vec<&'a Signature>) {
        match self {
            Self::Signature(sig) => out.push(sig),
            Self::Chain { steps: parts } | Self::Group { members: parts } => {
                parts.iter().for_each(|p| p.collect_signatures(out));
            }
            Self::Chord { header, body } => {
                header.iter().for_each(|p| p.collect_signatures(out));
                body.collect_signatures(out);
            }
        }
    }

    /// Queue of the first unit the runtime will start, if it has one.
    pub fn entry_queue(&self) -> Option<&str> {
        match self {
            Self::Signature(sig) => sig.queue.as_deref(),
            Self::Chain { steps: parts } | Self::Group { members: parts } => {
                parts.iter().find_map(Canvas::entry_queue)
            }
            Self::Chord { header, body } => header
                .iter()
                .find_map(Canvas::entry_queue)
                .or_else(|| body.entry_queue()),
        }
    }

    /// Route every unit without a queue to `queue`.
    pub fn with_default_queue(mut self, queue: &str) -> Self {
        self.fill_queue(queue);
        self
    }

    fn fill_queue(&mut self, queue: &str) {
        match self {
            Self::Signature(sig) => {
                if sig.queue.is_none() {
                    sig.queue = Some(queue.to_string());
                }
            }
            Self::Chain { steps: parts } | Self::Group { members: parts } => {
                parts.iter_mut().for_each(|p| p.fill_queue(queue));
            }
            Self::Chord { header, body } => {
                header.iter_mut().for_each(|p| p.fill_queue(queue));
                body.fill_queue(queue);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(name: &str, queue: Option<&str>) -> Canvas {
        Canvas::Signature(Signature {
            task_name: name.to_string(),
            task_id: name.to_string(),
            queue: queue.map(str::to_string),
            kwargs: TaskKwargs {
                input_files: Vec::new(),
                output_path: "/tmp/out".to_string(),
                workflow_id: Uuid::nil(),
                task_config: Map::new(),
            },
        })
    }

    #[test]
    fn test_signatures_in_document_order() {
        let canvas = Canvas::Chord {
            header: vec![sig("a", None), Canvas::Chain { steps: vec![sig("b", None)] }],
            body: Box::new(sig("c", None)),
        };
        let names: Vec<&str> = canvas
            .signatures()
            .iter()
            .map(|s| s.task_name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_default_queue_only_fills_missing() {
        let canvas = Canvas::Group {
            members: vec![sig("a", Some("plaso")), sig("b", None)],
        }
        .with_default_queue("default");
        let queues: Vec<Option<&str>> = canvas
            .signatures()
            .iter()
            .map(|s| s.queue.as_deref())
            .collect();
        assert_eq!(queues, vec![Some("plaso"), Some("default")]);
        assert_eq!(canvas.entry_queue(), Some("plaso"));
    }

    #[test]
    fn test_serialized_shape_is_tagged() {
        let canvas = Canvas::Chain {
            steps: vec![sig("a", Some("q"))],
        };
        let value = serde_json::to_value(&canvas).unwrap();
        assert_eq!(value["kind"], "chain");
        assert_eq!(value["steps"][0]["kind"], "signature");
        assert_eq!(value["steps"][0]["task_name"], "a");
    }
}

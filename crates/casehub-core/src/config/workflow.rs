//! Workflow configuration.

use serde::{Deserialize, Serialize};

/// Workflow creation and execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Root directory under which folder output paths are created.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Value stamped into every `uuid` field when a spec is saved as a template.
    #[serde(default = "default_placeholder")]
    pub template_placeholder: String,
    /// Display name for workflows created without one.
    #[serde(default = "default_display_name")]
    pub default_display_name: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            template_placeholder: default_placeholder(),
            default_display_name: default_display_name(),
        }
    }
}

fn default_data_root() -> String {
    "./data".to_string()
}

fn default_placeholder() -> String {
    "PLACEHOLDER".to_string()
}

fn default_display_name() -> String {
    "Untitled workflow".to_string()
}

//! # casehub-workflow
//!
//! Turns declarative workflow specs into executable task graphs.
//!
//! - [`spec`]: the recursive node model (`chain`, `group`, `chord`, `task`)
//!   and its structural validation.
//! - [`compiler`]: lowers a spec into a [`canvas::Canvas`], registering a
//!   persisted task row for every `task` node it visits.
//! - [`params`]: assigns stable parameter names to `task_config` entries and
//!   substitutes caller-supplied values.
//! - [`identifiers`]: rewrites every `uuid` field, for template
//!   instantiation and workflow copies.

pub mod canvas;
pub mod compiler;
pub mod identifiers;
pub mod params;
pub mod spec;

pub use canvas::{Canvas, InputFile, Signature, TaskKwargs};
pub use compiler::{CompileContext, SignatureCompiler};
pub use spec::{SpecNode, WorkflowSpec};

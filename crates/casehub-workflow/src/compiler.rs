//! Signature compiler: lowers a [`SpecNode`] tree into a [`Canvas`].
//!
//! Lowering rules:
//!
//! | node                     | canvas                                     |
//! |--------------------------|--------------------------------------------|
//! | `chain` with one child   | `Chain [child]`                            |
//! | `chain` with many        | `Group [children]` (no ordering)           |
//! | `group`                  | `Group [children]`                         |
//! | `chord`                  | `Chord { header: tasks, body: callback }`  |
//! | `task`, no continuation  | the signature                              |
//! | `task`, one continuation | `Chain [signature, child]`                 |
//! | `task`, many             | `Chain [signature, Group [children]]`      |
//!
//! Every `task` node registers a `PENDING` task row before its signature is
//! built. Registration is create-or-reset by `(workflow_id, uuid)`: compiling
//! the same spec twice for one workflow does not duplicate rows, and a reused
//! row goes back to `PENDING` with the new config.
//! Rows registered before a storage failure are not rolled back.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, info};
use uuid::Uuid;

use casehub_core::error::ErrorKind;
use casehub_core::traits::IdGenerator;
use casehub_core::AppResult;
use casehub_database::store::TaskStore;
use casehub_entity::workflow::{CreateTask, Task};

use crate::canvas::{Canvas, InputFile, Signature, TaskKwargs};
use crate::spec::{SpecNode, TaskNode, WorkflowSpec};

/// Per-compile inputs shared by every unit of the graph.
#[derive(Debug, Clone)]
pub struct CompileContext {
    /// User running the workflow; owns the task rows.
    pub user_id: Uuid,
    /// Workflow the rows belong to.
    pub workflow_id: Uuid,
    /// Files passed to every unit.
    pub input_files: Vec<InputFile>,
    /// Output directory passed to every unit.
    pub output_path: String,
}

/// Compiles specs, registering task rows through a [`TaskStore`].
#[derive(Debug, Clone)]
pub struct SignatureCompiler {
    tasks: Arc<dyn TaskStore>,
    ids: Arc<dyn IdGenerator>,
}

impl SignatureCompiler {
    /// Create a compiler.
    pub fn new(tasks: Arc<dyn TaskStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { tasks, ids }
    }

    /// Validate and compile the root node of a stored spec.
    pub async fn compile_spec(&self, spec: &WorkflowSpec, ctx: &CompileContext) -> AppResult<Canvas> {
        self.compile(&spec.workflow, ctx).await
    }

    /// Validate `node`, then lower it.
    ///
    /// Validation failures surface before any task row is written.
    pub async fn compile(&self, node: &SpecNode, ctx: &CompileContext) -> AppResult<Canvas> {
        node.validate()?;
        let canvas = self.lower(node, ctx).await?;
        info!(
            workflow_id = %ctx.workflow_id,
            units = canvas.signatures().len(),
            "Compiled workflow graph"
        );
        Ok(canvas)
    }

    fn lower<'a>(&'a self, node: &'a SpecNode, ctx: &'a CompileContext) -> BoxFuture<'a, AppResult<Canvas>> {
        async move {
            match node {
                SpecNode::Chain(chain) => {
                    let children = self.lower_all(&chain.tasks, ctx).await?;
                    if children.len() > 1 {
                        Ok(Canvas::Group { members: children })
                    } else {
                        Ok(Canvas::Chain { steps: children })
                    }
                }
                SpecNode::Group(group) => Ok(Canvas::Group {
                    members: self.lower_all(&group.tasks, ctx).await?,
                }),
                SpecNode::Chord(chord) => {
                    let header = self.lower_all(&chord.tasks, ctx).await?;
                    let body = self.lower(&chord.callback, ctx).await?;
                    Ok(Canvas::Chord {
                        header,
                        body: Box::new(body),
                    })
                }
                SpecNode::Task(task) => {
                    let leaf = Canvas::Signature(self.signature(task, ctx).await?);
                    let mut continuations = self.lower_all(&task.tasks, ctx).await?;
                    Ok(match continuations.len() {
                        0 => leaf,
                        1 => Canvas::Chain {
                            steps: vec![leaf, continuations.remove(0)],
                        },
                        _ => Canvas::Chain {
                            steps: vec![
                                leaf,
                                Canvas::Group {
                                    members: continuations,
                                },
                            ],
                        },
                    })
                }
            }
        }
        .boxed()
    }

    async fn lower_all(&self, nodes: &[SpecNode], ctx: &CompileContext) -> AppResult<Vec<Canvas>> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            out.push(self.lower(node, ctx).await?);
        }
        Ok(out)
    }

    async fn signature(&self, task: &TaskNode, ctx: &CompileContext) -> AppResult<Signature> {
        let task_config = task.config_map();
        let row = self.register(task, &task_config, ctx).await?;

        Ok(Signature {
            task_name: task.task_name.clone(),
            task_id: row.uuid,
            queue: task.queue_name.clone(),
            kwargs: TaskKwargs {
                input_files: ctx.input_files.clone(),
                output_path: ctx.output_path.clone(),
                workflow_id: ctx.workflow_id,
                task_config,
            },
        })
    }

    /// Create the task row for `task`, or reset the one already registered
    /// for its identity in this workflow back to `PENDING` with this run's
    /// config.
    async fn register(
        &self,
        task: &TaskNode,
        config: &serde_json::Map<String, serde_json::Value>,
        ctx: &CompileContext,
    ) -> AppResult<Task> {
        let uuid = match &task.uuid {
            Some(uuid) => uuid.clone(),
            None => self.ids.next_id(),
        };

        let create = CreateTask {
            uuid: uuid.clone(),
            display_name: task.display_name.clone(),
            description: task.description.clone(),
            config: serde_json::Value::Object(config.clone()),
            user_id: ctx.user_id,
            workflow_id: ctx.workflow_id,
        };

        if let Some(existing) = self.tasks.find_task_by_uuid(ctx.workflow_id, &uuid).await? {
            debug!(workflow_id = %ctx.workflow_id, task_uuid = %uuid, "Resetting task row");
            return self.tasks.reset_task(existing.id, &create).await;
        }

        match self.tasks.create_task(&create).await {
            Ok(row) => {
                debug!(
                    workflow_id = %ctx.workflow_id,
                    task_uuid = %row.uuid,
                    task_name = %task.task_name,
                    "Registered task row"
                );
                Ok(row)
            }
            // Lost a race with a concurrent compile of the same workflow.
            Err(e) if e.is(ErrorKind::Conflict) => {
                match self.tasks.find_task_by_uuid(ctx.workflow_id, &uuid).await? {
                    Some(existing) => self.tasks.reset_task(existing.id, &create).await,
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }
}

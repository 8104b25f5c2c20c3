//! The deployment pipeline: login → select stack → generate model → reconcile.
//!
//! Stages run strictly in order and the first failure ends the run. The model
//! artifact is claimed before the first stage and removed when the run ends,
//! whichever way it ends.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::artifact::ModelArtifact;
use crate::builder::ModelBuilder;
use crate::config::{Action, Settings};
use crate::engine::Engine;
use crate::error::{DeployError, Result};
use crate::invocation::{Invocation, Stage};
use crate::runner::Runner;
use crate::shutdown::Shutdown;

// ---------------------------------------------------------------------------
// RunState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Initial,
    BackendReady,
    StackReady,
    ModelReady,
    Done,
    Failed,
}

impl RunState {
    /// The only state reachable from `self` on success.
    pub fn successor(&self) -> Option<RunState> {
        match self {
            RunState::Initial => Some(RunState::BackendReady),
            RunState::BackendReady => Some(RunState::StackReady),
            RunState::StackReady => Some(RunState::ModelReady),
            RunState::ModelReady => Some(RunState::Done),
            RunState::Done | RunState::Failed => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Initial => "initial",
            RunState::BackendReady => "backend_ready",
            RunState::StackReady => "stack_ready",
            RunState::ModelReady => "model_ready",
            RunState::Done => "done",
            RunState::Failed => "failed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RunReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StageRecord {
    pub stage: Stage,
    pub exit_code: i32,
    #[serde(with = "millis")]
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub state: RunState,
    pub stack: String,
    pub action: Action,
    pub stages: Vec<StageRecord>,
}

mod millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}

// ---------------------------------------------------------------------------
// plan
// ---------------------------------------------------------------------------

/// The invocations a run would perform, in order. Nothing is executed.
pub fn plan(settings: &Settings) -> Result<Vec<Invocation>> {
    let engine = Engine::from_settings(settings);
    let builder = ModelBuilder::from_settings(settings);
    let stack = settings.stack_name()?;
    Ok(vec![
        engine.login(&settings.backend),
        engine.select_stack(stack),
        builder.generate(&settings.model_file),
        engine.reconcile(&settings.action, settings.verbosity, &settings.engine_args),
    ])
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct Orchestrator<R> {
    settings: Settings,
    engine: Engine,
    builder: ModelBuilder,
    runner: R,
    shutdown: Shutdown,
    state: RunState,
    stages: Vec<StageRecord>,
}

impl<R: Runner> Orchestrator<R> {
    pub fn new(settings: Settings, runner: R, shutdown: Shutdown) -> Self {
        Self {
            engine: Engine::from_settings(&settings),
            builder: ModelBuilder::from_settings(&settings),
            settings,
            runner,
            shutdown,
            state: RunState::Initial,
            stages: Vec::new(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Drive one run to completion. On success the report's exit code is 0;
    /// any stage failure is returned as an error carrying that stage's code
    /// and leaves the orchestrator in [`RunState::Failed`].
    pub async fn run(&mut self) -> Result<RunReport> {
        let artifact = ModelArtifact::claim(self.settings.model_path());
        info!(
            backend = %self.settings.backend,
            stack = self.settings.stack.as_deref().unwrap_or("<unset>"),
            action = %self.settings.action,
            mutating = self.settings.action.is_mutating(),
            "starting deployment run"
        );

        let result = self.drive(&artifact).await;
        artifact.release();

        match result {
            Ok(()) => {
                info!(stack = %self.stack_label(), action = %self.settings.action, "run complete");
                Ok(RunReport {
                    state: self.state,
                    stack: self.stack_label(),
                    action: self.settings.action.clone(),
                    stages: std::mem::take(&mut self.stages),
                })
            }
            Err(e) => {
                error!(reached = %self.state, error = %e, exit_code = e.exit_code(), "run failed");
                self.state = RunState::Failed;
                Err(e)
            }
        }
    }

    async fn drive(&mut self, artifact: &ModelArtifact) -> Result<()> {
        let login = self.engine.login(&self.settings.backend);
        self.stage(login).await?;
        self.advance(RunState::BackendReady)?;

        // The stack name is only checked once a backend session exists.
        let stack = self.settings.stack_name()?.to_string();
        let select = self.engine.select_stack(&stack);
        self.stage(select).await?;
        self.advance(RunState::StackReady)?;

        let generate = self.builder.generate(&self.settings.model_file);
        self.stage(generate).await?;
        if !artifact.exists() {
            warn!(
                path = %artifact.path().display(),
                "model builder succeeded but wrote no model"
            );
        }
        self.advance(RunState::ModelReady)?;

        let reconcile = self.engine.reconcile(
            &self.settings.action,
            self.settings.verbosity,
            &self.settings.engine_args,
        );
        self.stage(reconcile).await?;
        self.advance(RunState::Done)?;
        Ok(())
    }

    /// Run one stage; a non-zero exit code fails the run with that code.
    async fn stage(&mut self, invocation: Invocation) -> Result<()> {
        if let Some(signal) = self.shutdown.requested() {
            return Err(DeployError::Interrupted(signal));
        }
        let started = Instant::now();
        let code = self.runner.run(&invocation, &mut self.shutdown).await?;
        let elapsed = started.elapsed();
        self.stages.push(StageRecord {
            stage: invocation.stage,
            exit_code: code,
            elapsed,
        });
        if code != 0 {
            return Err(DeployError::StageFailed {
                stage: invocation.stage,
                code,
            });
        }
        info!(
            stage = %invocation.stage,
            elapsed_ms = elapsed.as_millis() as u64,
            "stage succeeded"
        );
        Ok(())
    }

    fn advance(&mut self, next: RunState) -> Result<()> {
        if self.state.successor() != Some(next) {
            return Err(DeployError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }

    fn stack_label(&self) -> String {
        self.settings.stack.clone().unwrap_or_default()
    }
}

use crate::output::{print_json, print_plan};
use crate::{root, signals};
use anyhow::Context;
use clap::Args;
use provisioner_core::config::{
    Action, Backend, ModelBuilderCommand, Settings, DEFAULT_ENGINE, DEFAULT_KILL_GRACE_SECS,
    DEFAULT_MODEL_BUILDER, DEFAULT_VERBOSITY,
};
use provisioner_core::orchestrator::{self, Orchestrator};
use provisioner_core::runner::ProcessRunner;
use provisioner_core::shutdown;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug, Clone)]
pub struct DeployArgs {
    /// State backend URL (default: local backend)
    #[arg(long, env = "PULUMI_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Stack to select, created on first use
    #[arg(long, env = "STACK")]
    pub stack: Option<String>,

    /// Engine log verbosity passed as `-v <level>`
    #[arg(long = "log-level", env = "LOG_LEVEL", default_value_t = DEFAULT_VERBOSITY)]
    pub log_level: u32,

    /// Engine program
    #[arg(long, env = "PROVISIONER_ENGINE", default_value = DEFAULT_ENGINE)]
    pub engine: String,

    /// Model builder command line
    #[arg(long, env = "PROVISIONER_MODEL_BUILDER", default_value = DEFAULT_MODEL_BUILDER)]
    pub model_builder: String,

    /// Working directory (default: nearest Pulumi.yaml above cwd, else cwd)
    #[arg(long, env = "PROVISIONER_WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// Seconds an interrupted stage gets to exit before it is killed
    #[arg(long, env = "PROVISIONER_KILL_GRACE_SECS", default_value_t = DEFAULT_KILL_GRACE_SECS)]
    pub kill_grace_secs: u64,

    /// Print the planned invocations without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long, short = 'j')]
    pub json: bool,

    /// Engine action: preview, up, destroy, refresh, ...
    pub action: Option<String>,

    /// Extra arguments passed to the engine after the action
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub engine_args: Vec<String>,
}

impl DeployArgs {
    /// Resolve every setting once; the orchestrator never looks at the
    /// environment itself.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let workdir = root::resolve_workdir(self.workdir.as_deref())?;
        let mut settings = Settings::new(workdir);
        settings.backend = Backend::from_url(self.backend_url.clone());
        settings.stack = self.stack.clone();
        settings.action = self.action.clone().map(Action::new).unwrap_or_default();
        settings.engine_args = self.engine_args.clone();
        settings.verbosity = self.log_level;
        settings.engine = self.engine.clone();
        settings.model_builder = ModelBuilderCommand::parse(&self.model_builder)?;
        settings.kill_grace = Duration::from_secs(self.kill_grace_secs);
        Ok(settings)
    }
}

pub fn run(args: DeployArgs) -> anyhow::Result<()> {
    let settings = args.settings()?;

    if args.dry_run {
        let plan = orchestrator::plan(&settings)?;
        if args.json {
            print_json(&plan)?;
        } else {
            print_plan(&plan);
        }
        return Ok(());
    }

    let rt = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let report = rt.block_on(async move {
        let (trigger, shutdown) = shutdown::channel();
        signals::spawn_listener(trigger);

        let runner = ProcessRunner::new(settings.kill_grace);
        let mut orchestrator = Orchestrator::new(settings, runner, shutdown);
        orchestrator.run().await
    })?;

    if args.json {
        print_json(&report)?;
    }
    Ok(())
}

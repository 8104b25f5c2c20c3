use crate::output::print_json;
use crate::root;
use anyhow::Context;
use clap::Args;
use provisioner_core::config::DEFAULT_ENGINE;
use provisioner_core::engine::Engine;
use provisioner_core::purge;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct PurgeArgs {
    /// Stack to purge (default: the currently selected stack)
    #[arg(long, env = "STACK")]
    pub stack: Option<String>,

    /// Live RDS endpoint (host:port); repeat or comma-separate
    #[arg(
        long = "endpoint",
        env = "LIVE_RDS_ENDPOINTS",
        value_delimiter = ',',
        required = true
    )]
    pub endpoints: Vec<String>,

    /// Engine program
    #[arg(long, env = "PROVISIONER_ENGINE", default_value = DEFAULT_ENGINE)]
    pub engine: String,

    /// Working directory (default: nearest Pulumi.yaml above cwd, else cwd)
    #[arg(long, env = "PROVISIONER_WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// Report what would be purged without importing
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long, short = 'j')]
    pub json: bool,
}

pub fn run(args: PurgeArgs) -> anyhow::Result<()> {
    let workdir = root::resolve_workdir(args.workdir.as_deref())?;
    let engine = Engine::new(&args.engine, workdir);
    let live: HashSet<String> = args
        .endpoints
        .iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect();
    if live.is_empty() {
        anyhow::bail!("no live endpoints given; refusing to treat every MySQL provider as stale");
    }

    let rt = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let outcome = rt.block_on(purge::purge_stack(
        &engine,
        args.stack.as_deref(),
        &live,
        args.dry_run,
    ))?;

    if args.json {
        print_json(&outcome)?;
    } else if outcome.removed == 0 {
        println!("Nothing to purge.");
    } else if outcome.imported {
        println!("Purged {} resource(s) from the stack.", outcome.removed);
    } else {
        println!("Would purge {} resource(s) (dry run).", outcome.removed);
    }
    Ok(())
}

//! Command lines for the reconciliation engine (the Pulumi CLI).

use crate::config::{Action, Backend, Settings};
use crate::invocation::{Invocation, Stage};
use std::path::PathBuf;

const NON_INTERACTIVE: &str = "--non-interactive";

#[derive(Debug, Clone)]
pub struct Engine {
    program: String,
    cwd: PathBuf,
}

impl Engine {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            cwd: cwd.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.engine, &settings.workdir)
    }

    fn invocation(&self, stage: Stage) -> Invocation {
        Invocation::new(stage, &self.program, &self.cwd).arg(NON_INTERACTIVE)
    }

    pub fn login(&self, backend: &Backend) -> Invocation {
        let inv = self.invocation(Stage::Login).arg("login");
        match backend {
            Backend::Remote(url) => inv.arg(url),
            Backend::Local => inv.arg("--local"),
        }
    }

    /// Select the stack, creating it first if it does not exist.
    pub fn select_stack(&self, stack: &str) -> Invocation {
        self.invocation(Stage::SelectStack)
            .args(["stack", "select", "--create", stack])
    }

    /// Run `action` against the selected stack. The model is not an argument:
    /// the program reads it from its working directory.
    pub fn reconcile(&self, action: &Action, verbosity: u32, extra: &[String]) -> Invocation {
        self.invocation(Stage::Reconcile)
            .arg(action.as_str())
            .arg("-v")
            .arg(verbosity.to_string())
            .args(extra.iter().cloned())
    }

    pub fn export_stack(&self, stack: Option<&str>) -> Invocation {
        with_stack(self.invocation(Stage::ExportStack).args(["stack", "export"]), stack)
    }

    pub fn import_stack(&self, stack: Option<&str>) -> Invocation {
        with_stack(self.invocation(Stage::ImportStack).args(["stack", "import"]), stack)
    }
}

fn with_stack(inv: Invocation, stack: Option<&str>) -> Invocation {
    match stack {
        Some(name) => inv.args(["--stack", name]),
        None => inv,
    }
}

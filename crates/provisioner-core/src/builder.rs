use crate::config::{ModelBuilderCommand, Settings};
use crate::invocation::{Invocation, Stage};
use std::path::PathBuf;

/// Runs the external model builder, which writes the desired-state model and
/// purges stale resources from the selected stack.
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    command: ModelBuilderCommand,
    cwd: PathBuf,
}

impl ModelBuilder {
    pub fn new(command: ModelBuilderCommand, cwd: impl Into<PathBuf>) -> Self {
        Self {
            command,
            cwd: cwd.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.model_builder.clone(), &settings.workdir)
    }

    /// `model_file` is relative to the working directory.
    pub fn generate(&self, model_file: &str) -> Invocation {
        Invocation::new(Stage::GenerateModel, &self.command.program, &self.cwd)
            .args(self.command.args.iter().cloned())
            .args(["--model", model_file, "--purge-pulumi-stack"])
    }
}

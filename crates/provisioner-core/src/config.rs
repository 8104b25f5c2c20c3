use crate::error::{DeployError, Result};
use crate::stack;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_ENGINE: &str = "pulumi";
pub const DEFAULT_MODEL_BUILDER: &str = "./build-model.py";
pub const DEFAULT_ACTION: &str = "preview";
pub const DEFAULT_VERBOSITY: u32 = 3;
pub const DEFAULT_KILL_GRACE_SECS: u64 = 30;

/// The engine program reads the model from this file in its working directory.
pub const MODEL_FILE: &str = "model.json";

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Where the engine persists stack state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "url", rename_all = "snake_case")]
pub enum Backend {
    Remote(String),
    Local,
}

impl Backend {
    /// A present, non-blank URL selects the remote backend; anything else
    /// selects the local one.
    pub fn from_url(url: Option<String>) -> Self {
        match url {
            Some(url) if !url.trim().is_empty() => Backend::Remote(url.trim().to_string()),
            _ => Backend::Local,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Remote(url) => f.write_str(url),
            Backend::Local => f.write_str("local"),
        }
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

const MUTATING_ACTIONS: &[&str] = &["up", "update", "destroy", "refresh", "import"];

/// Engine verb for the reconcile stage. Passed to the engine verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Action(String);

impl Action {
    pub fn new(verb: impl Into<String>) -> Self {
        let verb = verb.into();
        if verb.trim().is_empty() {
            return Self::default();
        }
        Action(verb)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_mutating(&self) -> bool {
        MUTATING_ACTIONS.contains(&self.0.as_str())
    }
}

impl Default for Action {
    fn default() -> Self {
        Action(DEFAULT_ACTION.to_string())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ModelBuilderCommand
// ---------------------------------------------------------------------------

/// Program and leading arguments used to run the model builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelBuilderCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ModelBuilderCommand {
    /// Split a command line such as `python3 build-model.py` on whitespace.
    pub fn parse(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .ok_or_else(|| DeployError::InvalidConfig("model builder command is empty".into()))?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }
}

impl Default for ModelBuilderCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_MODEL_BUILDER.to_string(),
            args: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Everything one run needs, resolved once at startup and handed to the
/// orchestrator. Nothing in this crate reads the process environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: Backend,
    pub stack: Option<String>,
    pub action: Action,
    /// Extra arguments appended to the reconcile invocation.
    pub engine_args: Vec<String>,
    pub verbosity: u32,
    pub engine: String,
    pub model_builder: ModelBuilderCommand,
    pub workdir: PathBuf,
    pub model_file: String,
    /// How long an interrupted stage gets to exit before it is killed.
    pub kill_grace: Duration,
}

impl Settings {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::Local,
            stack: None,
            action: Action::default(),
            engine_args: Vec::new(),
            verbosity: DEFAULT_VERBOSITY,
            engine: DEFAULT_ENGINE.to_string(),
            model_builder: ModelBuilderCommand::default(),
            workdir: workdir.into(),
            model_file: MODEL_FILE.to_string(),
            kill_grace: Duration::from_secs(DEFAULT_KILL_GRACE_SECS),
        }
    }

    pub fn model_path(&self) -> PathBuf {
        self.workdir.join(&self.model_file)
    }

    /// The configured stack name, validated.
    pub fn stack_name(&self) -> Result<&str> {
        let name = self
            .stack
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(DeployError::MissingStack)?;
        stack::validate_stack_name(name)?;
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_absent_is_local() {
        assert_eq!(Backend::from_url(None), Backend::Local);
    }

    #[test]
    fn backend_blank_is_local() {
        assert_eq!(Backend::from_url(Some("".into())), Backend::Local);
        assert_eq!(Backend::from_url(Some("   ".into())), Backend::Local);
    }

    #[test]
    fn backend_url_is_remote() {
        assert_eq!(
            Backend::from_url(Some("https://state.example.com".into())),
            Backend::Remote("https://state.example.com".into())
        );
    }

    #[test]
    fn action_defaults_to_preview() {
        assert_eq!(Action::default().as_str(), "preview");
        assert_eq!(Action::new("").as_str(), "preview");
        assert!(!Action::default().is_mutating());
    }

    #[test]
    fn action_is_passed_through() {
        let action = Action::new("destroy");
        assert_eq!(action.as_str(), "destroy");
        assert!(action.is_mutating());
        assert!(Action::new("up").is_mutating());
        assert!(!Action::new("stack").is_mutating());
    }

    #[test]
    fn model_builder_command_splits_words() {
        let cmd = ModelBuilderCommand::parse("python3  build-model.py ").unwrap();
        assert_eq!(cmd.program, "python3");
        assert_eq!(cmd.args, vec!["build-model.py"]);
    }

    #[test]
    fn empty_model_builder_command_is_rejected() {
        let err = ModelBuilderCommand::parse("  ").unwrap_err();
        assert!(matches!(err, DeployError::InvalidConfig(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn stack_name_required() {
        let settings = Settings::new("/tmp");
        assert!(matches!(settings.stack_name(), Err(DeployError::MissingStack)));

        let mut settings = Settings::new("/tmp");
        settings.stack = Some(" ".into());
        assert!(matches!(settings.stack_name(), Err(DeployError::MissingStack)));

        settings.stack = Some("prod-east".into());
        assert_eq!(settings.stack_name().unwrap(), "prod-east");
    }

    #[test]
    fn model_path_is_in_workdir() {
        let settings = Settings::new("/srv/deploy");
        assert_eq!(settings.model_path(), PathBuf::from("/srv/deploy/model.json"));
    }
}

use crate::invocation::Stage;
use crate::shutdown::Signal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("stack name not set: export STACK=<name> or pass --stack")]
    MissingStack,

    #[error("invalid stack name '{0}': use letters, digits, '-', '_' or '.', optionally as org/project/stack")]
    InvalidStackName(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("'{0}' not found on PATH")]
    ToolNotFound(String),

    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} failed with exit code {code}")]
    StageFailed { stage: Stage, code: i32 },

    #[error("interrupted by {0}")]
    Interrupted(Signal),

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("invalid stack export: {0}")]
    InvalidStackExport(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DeployError {
    /// Process exit code for this failure. Stage failures propagate the
    /// stage's own code unchanged.
    pub fn exit_code(&self) -> i32 {
        match self {
            DeployError::StageFailed { code, .. } => *code,
            DeployError::Interrupted(signal) => signal.exit_code(),
            DeployError::MissingStack
            | DeployError::InvalidStackName(_)
            | DeployError::InvalidConfig(_) => 2,
            DeployError::ToolNotFound(_) => 127,
            DeployError::Spawn { .. } => 126,
            DeployError::InvalidTransition { .. }
            | DeployError::InvalidStackExport(_)
            | DeployError::Io(_)
            | DeployError::Json(_) => 1,
        }
    }

    /// Bad or missing settings, as opposed to a failure while running.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            DeployError::MissingStack
                | DeployError::InvalidStackName(_)
                | DeployError::InvalidConfig(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;

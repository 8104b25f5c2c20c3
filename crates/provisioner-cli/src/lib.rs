pub mod cmd;
pub mod logging;
pub mod output;
pub mod root;
pub mod signals;

use provisioner_core::DeployError;

fn deploy_error(err: &anyhow::Error) -> Option<&DeployError> {
    err.chain().find_map(|e| e.downcast_ref::<DeployError>())
}

/// Exit code for a failed command: the core error's own code when there is
/// one (stage failures keep the stage's code), 1 otherwise.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    deploy_error(err).map(DeployError::exit_code).unwrap_or(1)
}

/// Whether the failure came from settings rather than a running stage.
pub fn is_config_error(err: &anyhow::Error) -> bool {
    deploy_error(err).is_some_and(DeployError::is_config)
}

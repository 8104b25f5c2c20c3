use crate::error::{DeployError, Result};
use regex::Regex;
use std::sync::OnceLock;

const MAX_STACK_NAME_LEN: usize = 100;

static STACK_RE: OnceLock<Regex> = OnceLock::new();

fn stack_re() -> &'static Regex {
    STACK_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.\-]+(/[A-Za-z0-9_.\-]+){0,2}$").expect("stack name regex")
    })
}

/// Accepts `stack`, `project/stack` and `org/project/stack`.
pub fn validate_stack_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_STACK_NAME_LEN || !stack_re().is_match(name) {
        return Err(DeployError::InvalidStackName(name.to_string()));
    }
    Ok(())
}

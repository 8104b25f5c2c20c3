pub mod deploy;
pub mod purge;

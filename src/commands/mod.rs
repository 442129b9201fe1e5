//! Top-level subcommand orchestration.
pub mod init;

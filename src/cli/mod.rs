//! CLI command implementations

pub mod admin;
pub mod init;
pub mod serve;
pub mod status;

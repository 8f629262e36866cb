// ABOUTME: Library exports for the bgfade harness modules for testing and external use
// ABOUTME: Makes internal modules available to the binary and integration tests

pub mod cli;
pub mod cli_output;
pub mod config;
pub mod constants;
pub mod output;
pub mod scene;
pub mod session;

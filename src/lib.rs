pub mod ai_provider;
pub mod cli;
pub mod config;
pub mod core;
pub mod logging;
pub mod mcp;
pub mod persona;

// Library interface for newsbrief modules
// This allows tests and the binary to import modules

pub mod error;
pub mod llm;
pub mod models;
pub mod news;
pub mod processing;
pub mod server;
pub mod styles;

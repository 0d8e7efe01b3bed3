// Infrastructure layer - Configuration and file-backed adapters
pub mod chat_log;
pub mod config;
pub mod json_repository;

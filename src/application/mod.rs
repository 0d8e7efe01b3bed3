// Application layer - Figure composition and chart use cases
pub mod chart_service;
pub mod chat_repository;
pub mod figure_composer;
pub mod figure_updater;

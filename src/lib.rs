// Chat activity charts - multi-resolution aggregation of chat events into figure descriptions
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

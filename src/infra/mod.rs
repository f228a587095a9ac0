pub use sqlscope_app as app;
pub use sqlscope_domain as domain;

pub mod adapters;
pub mod config;

pub use sqlscope_app as app;
pub use sqlscope_domain as domain;
pub use sqlscope_infra as infra;

pub mod error;

pub mod document;
pub mod error;
pub mod namespace;
pub mod operator_config;

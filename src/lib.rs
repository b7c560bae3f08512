pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod llm;
pub mod safety;
pub mod summarize;
pub mod synthesis;
pub mod validate;

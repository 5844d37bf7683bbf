pub mod config;
pub mod infer;
pub mod prompts;
pub mod proxy;
pub mod service;

pub use config::Config;
pub use infer::Provider;

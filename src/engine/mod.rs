pub mod content;
pub mod engine;
pub mod llm_client;
pub mod prompt_builder;
pub mod protocol;
pub mod resolver;
pub mod session;

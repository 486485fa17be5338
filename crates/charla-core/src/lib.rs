pub mod ai;
pub mod command;
pub mod config;
pub mod conversation;
pub mod message;
pub mod store;

// Re-export main types for convenience
pub use ai::{GatewayError, ModelGateway, OllamaClient, SamplingParams};
pub use command::Command;
pub use config::Config;
pub use conversation::{ConversationManager, ConversationSettings};
pub use message::{Message, Role};
pub use store::{MemoryStore, StoreError};

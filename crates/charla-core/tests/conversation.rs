//! End-to-end behavior of the conversation manager against a temporary store
//! and stub gateways.

use async_trait::async_trait;
use charla_core::{
    ConversationManager, ConversationSettings, GatewayError, MemoryStore, ModelGateway, Role,
    SamplingParams,
};
use tempfile::TempDir;

struct StubGateway {
    reply: &'static str,
}

#[async_trait]
impl ModelGateway for StubGateway {
    async fn infer(&self, _prompt: &str, _params: SamplingParams) -> Result<String, GatewayError> {
        Ok(self.reply.to_string())
    }
}

struct FailingGateway;

#[async_trait]
impl ModelGateway for FailingGateway {
    async fn infer(&self, _prompt: &str, _params: SamplingParams) -> Result<String, GatewayError> {
        Err(GatewayError::Backend {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            message: "backend unavailable".to_string(),
        })
    }
}

fn manager_in(dir: &TempDir) -> ConversationManager {
    let store = MemoryStore::new(dir.path().join("memory.json"));
    ConversationManager::new(store, ConversationSettings::default())
}

fn load_file(dir: &TempDir) -> Vec<charla_core::Message> {
    MemoryStore::new(dir.path().join("memory.json"))
        .load()
        .unwrap()
}

fn file_exists(dir: &TempDir) -> bool {
    dir.path().join("memory.json").exists()
}

#[test]
fn unsaved_records_never_touch_the_backing_file() {
    let dir = TempDir::new().unwrap();
    let mut manager = manager_in(&dir);

    manager.record(Role::User, "hello", false);
    manager.record(Role::Assistant, "hi there", false);
    manager.record(Role::User, "more", false);

    assert!(!file_exists(&dir));
}

#[test]
fn saved_record_writes_exactly_the_saved_subset() {
    let dir = TempDir::new().unwrap();
    let mut manager = manager_in(&dir);

    manager.record(Role::User, "hello", false);
    manager.record(Role::User, "remember me", true);

    let stored = load_file(&dir);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].role, Role::User);
    assert_eq!(stored[0].content, "remember me");
    assert!(stored[0].saved);
}

#[test]
fn clear_saved_memory_truncates_the_file_and_keeps_unsaved_messages() {
    let dir = TempDir::new().unwrap();
    let mut manager = manager_in(&dir);

    manager.record(Role::User, "first fact", true);
    manager.record(Role::User, "second fact", true);
    manager.record(Role::User, "just chatting", false);

    manager.clear_saved_memory();

    assert!(load_file(&dir).is_empty());
    assert_eq!(manager.saved_count(), 0);
    let remaining: Vec<_> = manager.messages().iter().map(|m| m.content.as_str()).collect();
    assert_eq!(remaining, ["just chatting"]);
}

#[test]
fn saved_history_reloads_across_manager_instances() {
    let dir = TempDir::new().unwrap();

    {
        let mut manager = manager_in(&dir);
        manager.record(Role::User, "my cat is called Turing", true);
        manager.record(Role::User, "ephemeral", false);
    }

    let manager = manager_in(&dir);
    assert_eq!(manager.messages().len(), 1);
    assert_eq!(manager.messages()[0].content, "my cat is called Turing");
    assert!(manager.build_context_prompt().contains("User: my cat is called Turing"));
}

#[tokio::test]
async fn unsaved_exchange_with_a_stub_gateway() {
    let dir = TempDir::new().unwrap();
    let mut manager = manager_in(&dir);
    let gateway = StubGateway { reply: "  hi  " };

    manager.record(Role::User, "hello", false);
    let reply = manager.generate_reply(&gateway, "hello").await;

    assert_eq!(reply, "hi");
    let log: Vec<_> = manager
        .messages()
        .iter()
        .map(|m| (m.role, m.content.as_str(), m.saved))
        .collect();
    assert_eq!(
        log,
        [(Role::User, "hello", false), (Role::Assistant, "hi", false)]
    );
    assert!(!file_exists(&dir));
}

#[tokio::test]
async fn gateway_failure_surfaces_as_chat_text() {
    let dir = TempDir::new().unwrap();
    let mut manager = manager_in(&dir);

    manager.record(Role::User, "hello", false);
    let reply = manager.generate_reply(&FailingGateway, "hello").await;

    assert!(reply.starts_with("Error generating response:"));
    // Nothing recorded for the failed call, nothing persisted
    assert_eq!(manager.messages().len(), 1);
    assert!(!file_exists(&dir));
}

#[tokio::test]
async fn saved_context_reaches_the_gateway_prompt() {
    struct CapturingGateway {
        seen: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ModelGateway for CapturingGateway {
        async fn infer(
            &self,
            prompt: &str,
            _params: SamplingParams,
        ) -> Result<String, GatewayError> {
            self.seen.lock().unwrap().push(prompt.to_string());
            Ok("ok".to_string())
        }
    }

    let dir = TempDir::new().unwrap();
    let mut manager = manager_in(&dir);
    let gateway = CapturingGateway {
        seen: std::sync::Mutex::new(Vec::new()),
    };

    manager.record(Role::User, "I prefer short answers", true);
    manager.generate_reply(&gateway, "hello").await;

    let prompts = gateway.seen.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("User: I prefer short answers"));
    assert!(prompts[0].ends_with("User: hello\nAssistant:"));
}

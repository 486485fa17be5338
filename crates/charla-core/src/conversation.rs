//! Conversation state: the message log, save/delete policy, and prompt
//! assembly for the model gateway.

use std::fmt;

use tracing::warn;

use crate::ai::{GatewayError, ModelGateway, SamplingParams};
use crate::message::{Message, Role};
use crate::store::MemoryStore;

/// Preamble that opens every context prompt
const CONTEXT_PREAMBLE: &str = "You are Charla, a local chat assistant. Important context:\n";
/// Marker appended after the (possibly truncated) saved context
const CONVERSATION_MARKER: &str = "\n\nCurrent conversation:\n";

/// Context budget and sampling knobs for a conversation
#[derive(Debug, Clone, Copy)]
pub struct ConversationSettings {
    /// Budget in characters, not tokens
    pub context_window: usize,
    pub sampling: SamplingParams,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            context_window: 2048,
            sampling: SamplingParams::default(),
        }
    }
}

/// Owns the in-memory message log and mirrors its saved subset to the store.
///
/// The log is append-only except for [`clear_saved_memory`], and the backing
/// file always holds exactly the saved subset as of the last write. Store
/// failures are absorbed here: logged, then degraded to empty history on load
/// or to a skipped write on save.
///
/// [`clear_saved_memory`]: ConversationManager::clear_saved_memory
pub struct ConversationManager {
    store: MemoryStore,
    log: Vec<Message>,
    settings: ConversationSettings,
}

impl ConversationManager {
    pub fn new(store: MemoryStore, settings: ConversationSettings) -> Self {
        let log = match store.load() {
            Ok(messages) => messages,
            Err(err) => {
                warn!(error = %err, "could not load saved messages, starting with empty history");
                Vec::new()
            }
        };
        Self {
            store,
            log,
            settings,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.log
    }

    pub fn saved_count(&self) -> usize {
        self.log.iter().filter(|message| message.saved).count()
    }

    pub fn sampling(&self) -> SamplingParams {
        self.settings.sampling
    }

    /// Appends a message; a persisted message triggers a full rewrite of the
    /// store with the current saved subset.
    pub fn record(&mut self, role: Role, content: impl Into<String>, persist: bool) {
        self.log.push(Message::new(role, content, persist));
        if persist {
            self.flush_saved();
        }
    }

    /// Drops every saved message and truncates the backing file. Unsaved
    /// messages stay in memory.
    pub fn clear_saved_memory(&mut self) {
        self.log.retain(|message| !message.saved);
        self.flush_saved();
    }

    /// Priming prefix for a model query: the preamble, one `Role: content`
    /// line per saved message in insertion order, cut to the character
    /// budget, then the conversation marker.
    pub fn build_context_prompt(&self) -> String {
        let mut context = String::from(CONTEXT_PREAMBLE);
        let lines: Vec<String> = self
            .log
            .iter()
            .filter(|message| message.saved)
            .map(|message| format!("{}: {}", message.role.display_name(), message.content))
            .collect();
        context.push_str(&lines.join("\n"));

        let mut prompt: String = context.chars().take(self.settings.context_window).collect();
        prompt.push_str(CONVERSATION_MARKER);
        prompt
    }

    /// Full prompt for one exchange
    pub fn turn_prompt(&self, user_input: &str) -> String {
        format!(
            "{}User: {}\nAssistant:",
            self.build_context_prompt(),
            user_input
        )
    }

    /// One sequential exchange: build the prompt, call the gateway, record
    /// the reply. Gateway failures come back as chat text, never as errors.
    pub async fn generate_reply(&mut self, gateway: &dyn ModelGateway, user_input: &str) -> String {
        let prompt = self.turn_prompt(user_input);
        let result = gateway.infer(&prompt, self.settings.sampling).await;
        self.complete_reply(result)
    }

    /// Turns a finished gateway call into the text shown to the user. A
    /// successful reply is trimmed and recorded as an unsaved assistant
    /// message; a failure is logged and formatted in-band.
    pub fn complete_reply(&mut self, result: Result<String, GatewayError>) -> String {
        match result {
            Ok(text) => {
                let text = text.trim().to_string();
                self.record(Role::Assistant, text.clone(), false);
                text
            }
            Err(err) => {
                warn!(error = %err, "model call failed");
                reply_error(&err)
            }
        }
    }

    fn flush_saved(&mut self) {
        let saved: Vec<Message> = self
            .log
            .iter()
            .filter(|message| message.saved)
            .cloned()
            .collect();
        if let Err(err) = self.store.save(&saved) {
            warn!(error = %err, "could not write saved messages");
        }
    }
}

/// In-band error text for a failed model call
pub fn reply_error(err: &impl fmt::Display) -> String {
    format!("Error generating response: {err}")
}

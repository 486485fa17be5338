use charla_core::conversation::reply_error;
use charla_core::{Command, ConversationManager, GatewayError, ModelGateway, OllamaClient, Role};
use tokio::task::{JoinError, JoinHandle};

/// One entry in the visible transcript.
///
/// The transcript is display state only and holds just the latest exchange
/// (or the latest system notice); the conversation manager owns the durable
/// log.
#[derive(Debug, Clone)]
pub struct DisplayMessage {
    pub role: Role,
    pub content: String,
}

impl DisplayMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

pub struct App {
    pub should_quit: bool,

    // Input line state
    pub input: String,
    pub cursor: usize, // cursor position in chars

    // Transcript display state
    pub transcript: Vec<DisplayMessage>,
    pub loading: bool,
    pub scroll: u16,
    pub chat_height: u16, // inner chat dimensions, updated during render
    pub chat_width: u16,
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Pending model call
    pub reply_task: Option<JoinHandle<Result<String, GatewayError>>>,

    // Core state
    pub manager: ConversationManager,
    pub gateway: OllamaClient,
}

impl App {
    pub fn new(manager: ConversationManager, gateway: OllamaClient) -> Self {
        Self {
            should_quit: false,
            input: String::new(),
            cursor: 0,
            transcript: Vec::new(),
            loading: false,
            scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            reply_task: None,
            manager,
            gateway,
        }
    }

    /// Interpret the current input line and act on it. Queries go to the
    /// model on a background task so the UI keeps rendering.
    pub fn submit(&mut self) {
        if self.loading {
            return;
        }

        let line = std::mem::take(&mut self.input);
        self.cursor = 0;

        let Some(command) = Command::parse(&line) else {
            return;
        };

        match command {
            Command::Exit => self.should_quit = true,
            Command::DeleteMemory => {
                self.manager.clear_saved_memory();
                self.transcript =
                    vec![DisplayMessage::new(Role::System, "All saved memory deleted")];
                self.scroll = 0;
            }
            Command::Save(content) => {
                if content.is_empty() {
                    return;
                }
                self.manager.record(Role::User, content.clone(), true);
                self.transcript = vec![DisplayMessage::new(
                    Role::System,
                    format!("Saved to memory: {content}"),
                )];
                self.scroll = 0;
            }
            Command::Query(text) => {
                self.manager.record(Role::User, text.clone(), false);
                let prompt = self.manager.turn_prompt(&text);
                let params = self.manager.sampling();
                let gateway = self.gateway.clone();

                self.transcript = vec![DisplayMessage::new(Role::User, text)];
                self.loading = true;
                self.scroll = 0;

                self.reply_task =
                    Some(tokio::spawn(
                        async move { gateway.infer(&prompt, params).await },
                    ));
            }
        }
    }

    /// Fold a finished model call back into the conversation and transcript
    pub fn finish_reply(&mut self, joined: Result<Result<String, GatewayError>, JoinError>) {
        self.loading = false;

        let reply = match joined {
            Ok(result) => self.manager.complete_reply(result),
            Err(err) => {
                tracing::error!(error = %err, "reply task aborted");
                reply_error(&err)
            }
        };

        self.transcript
            .push(DisplayMessage::new(Role::Assistant, reply));
        self.scroll_to_bottom();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Transcript scrolling

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        if self.scroll < self.max_scroll() {
            self.scroll = self.scroll.saturating_add(1);
        }
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(self.chat_height / 2);
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll = (self.scroll + self.chat_height / 2).min(self.max_scroll());
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    fn max_scroll(&self) -> u16 {
        let visible = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.transcript_lines().saturating_sub(visible)
    }

    /// Estimate of rendered transcript height, using character counts for
    /// proper UTF-8 handling (same approximation the renderer wraps with)
    fn transcript_lines(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total: u16 = 0;
        for msg in &self.transcript {
            total += 1; // role line
            for line in msg.content.lines() {
                let char_count = line.chars().count();
                if char_count == 0 {
                    total += 1;
                } else {
                    total += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total += 1; // blank line after message
        }

        if self.loading {
            total += 2; // role line + "Thinking..."
        }

        total
    }
}

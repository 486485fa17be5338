//! Free-text command layer above the conversation manager

/// Token that ends the session
pub const EXIT_TOKEN: &str = "/exit";
/// Leading token that clears all saved memory
pub const DELETE_MEMORY_TOKEN: &str = "/dmem";
/// Leading token that persists the rest of the line
pub const SAVE_TOKEN: &str = "/save";

/// What a line of user input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    DeleteMemory,
    /// Persist the content as a saved user message. Empty content still
    /// dispatches here; the executor drops it without recording anything.
    Save(String),
    Query(String),
}

impl Command {
    /// Classify one line of input.
    ///
    /// Tokens match case-insensitively after trimming. `/exit` must be the
    /// whole line; `/dmem` ignores any trailing text; `/save` takes the rest
    /// of the line as content with its original casing. Empty input maps to
    /// nothing, everything else is a model query.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.eq_ignore_ascii_case(EXIT_TOKEN) {
            return Some(Command::Exit);
        }
        if strip_token(trimmed, DELETE_MEMORY_TOKEN).is_some() {
            return Some(Command::DeleteMemory);
        }
        if let Some(rest) = strip_token(trimmed, SAVE_TOKEN) {
            return Some(Command::Save(rest.trim().to_string()));
        }
        Some(Command::Query(trimmed.to_string()))
    }
}

fn strip_token<'a>(input: &'a str, token: &str) -> Option<&'a str> {
    let head = input.get(..token.len())?;
    head.eq_ignore_ascii_case(token)
        .then(|| &input[token.len()..])
}

use std::collections::VecDeque;

/// Maximum number of fragments (greeting + turns) a window retains.
pub const MAX_FRAGMENTS: usize = 12;

/// Delimiter used by the legacy wire encoding of a transcript.
/// The window itself is typed; the joined form exists only at the
/// upstream-payload and response-rendering boundaries.
pub const FRAGMENT_DELIMITER: char = '|';

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

/// One message exchange unit: a single user or bot utterance.
/// Turns are append-only; they are never edited, only evicted by truncation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Turn {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Turn {
            role: Role::Bot,
            text: text.into(),
        }
    }
}

/// Bounded, ordered record of the recent conversation.
///
/// The greeting occupies a pinned slot that is always logically first and
/// never evicted; the tail holds the most recent turns, oldest first. After
/// any update the window holds at most [`MAX_FRAGMENTS`] fragments and the
/// greeting appears exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryWindow {
    greeting: Option<Turn>,
    tail: VecDeque<Turn>,
}

impl HistoryWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the greeting. Idempotent: calling twice with the same text is the
    /// same as calling once. A different text replaces the pinned greeting
    /// (the product configuration changed mid-session).
    ///
    /// This guards the race where the client renders the greeting before the
    /// server has recorded it: whichever request arrives first establishes
    /// the same window state.
    pub fn ensure_greeting(&mut self, greeting: &str) {
        match &self.greeting {
            Some(turn) if turn.text == greeting => {}
            _ => self.greeting = Some(Turn::bot(greeting)),
        }
        self.evict_overflow();
    }

    /// Append one completed exchange: the user turn, then the bot turn.
    /// Oldest tail turns are evicted until the window fits [`MAX_FRAGMENTS`].
    ///
    /// Callers must reject empty user input before reaching this point; the
    /// window itself does not validate text.
    pub fn append(&mut self, user_text: &str, bot_text: &str) {
        self.tail.push_back(Turn::user(user_text));
        self.tail.push_back(Turn::bot(bot_text));
        self.evict_overflow();
    }

    /// Total fragments held: pinned greeting (if any) plus tail turns.
    pub fn fragment_count(&self) -> usize {
        usize::from(self.greeting.is_some()) + self.tail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.greeting.is_none() && self.tail.is_empty()
    }

    pub fn greeting(&self) -> Option<&str> {
        self.greeting.as_ref().map(|turn| turn.text.as_str())
    }

    /// Turns in logical order: greeting first, then tail oldest → newest.
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.greeting.iter().chain(self.tail.iter())
    }

    /// Render the legacy delimiter-joined transcript. Sent to the upstream
    /// engine and echoed to clients; an empty window encodes as "".
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (i, turn) in self.turns().enumerate() {
            if i > 0 {
                out.push(FRAGMENT_DELIMITER);
            }
            out.push_str(&turn.text);
        }
        out
    }

    fn evict_overflow(&mut self) {
        while self.fragment_count() > MAX_FRAGMENTS {
            self.tail.pop_front();
        }
    }
}

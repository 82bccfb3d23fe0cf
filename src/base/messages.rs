//! Messages — validation output of loads and reference passes.
//!
//! A [`MessageContainer`] is the message log of a manager. Bulk loads and
//! reference passes append to it; a reset or initialization that leaves error
//! messages behind fails with `RepositoryError::ValidationFailed`.

use std::fmt;

use smol_str::SmolStr;

/// Severity level of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// A single validation message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Severity level.
    pub severity: Severity,
    /// The model the message is about, if any.
    pub model: Option<SmolStr>,
    /// Qualifier text of the item the message is about, if any.
    pub item: Option<String>,
    /// The message text.
    pub text: String,
}

impl Message {
    /// Create a new error message.
    pub fn error(model: Option<&str>, text: impl Into<String>) -> Self {
        Self::new(Severity::Error, model, text)
    }

    /// Create a new warning message.
    pub fn warning(model: Option<&str>, text: impl Into<String>) -> Self {
        Self::new(Severity::Warning, model, text)
    }

    /// Create a new informational message.
    pub fn info(model: Option<&str>, text: impl Into<String>) -> Self {
        Self::new(Severity::Info, model, text)
    }

    fn new(severity: Severity, model: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            severity,
            model: model.map(SmolStr::new),
            item: None,
            text: text.into(),
        }
    }

    /// Attach the qualifier text of the offending item.
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.severity.as_str())?;
        match (&self.model, &self.item) {
            (_, Some(item)) => write!(f, " {item}:")?,
            (Some(model), None) => write!(f, " {model}:")?,
            (None, None) => {}
        }
        write!(f, " {}", self.text)
    }
}

/// Ordered collection of messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageContainer {
    messages: Vec<Message>,
}

impl MessageContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn extend(&mut self, other: MessageContainer) {
        self.messages.extend(other.messages);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Returns true if at least one message has error severity.
    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(Message::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_error())
    }

    /// Names of the models that have at least one error, in first-seen order.
    pub fn models_with_errors(&self) -> Vec<SmolStr> {
        let mut names: Vec<SmolStr> = Vec::new();
        for model in self.errors().filter_map(|m| m.model.as_ref()) {
            if !names.contains(model) {
                names.push(model.clone());
            }
        }
        names
    }
}

impl fmt::Display for MessageContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, message) in self.messages.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "  {message}")?;
        }
        Ok(())
    }
}

impl FromIterator<Message> for MessageContainer {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for MessageContainer {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

//! Chat message routed between sessions

/// A chat message on its way through the router.
///
/// `to == None` is a broadcast to every registered session except the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub from: String,
    pub to: Option<String>,
    pub content: String,
}

impl Message {
    pub fn broadcast(from: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: None,
            content: content.into(),
        }
    }

    pub fn directed(
        from: impl Into<String>,
        to: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: Some(to.into()),
            content: content.into(),
        }
    }

    /// Wire form delivered to recipients: `[from]: content\n`
    pub fn format(&self) -> String {
        format!("[{}]: {}\n", self.from, self.content)
    }
}

//! Rendering seam between the controller and whatever displays the chat.

/// Who a bubble belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

/// One rendered bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub role: Role,
}

impl Message {
    pub fn new(text: impl Into<String>, role: Role) -> Self {
        Self {
            text: text.into(),
            role,
        }
    }
}

/// The surface a [`ChatWidgetController`](super::ChatWidgetController)
/// draws on: a message container, a text input and a typing indicator.
///
/// The controller guarantees `show_typing`/`hide_typing` alternate, so
/// implementations need no bookkeeping of their own for the indicator.
pub trait ChatView {
    /// Append a bubble to the message container.
    fn append_message(&mut self, message: &Message);

    /// Scroll the container so the newest bubble is visible.
    fn scroll_to_latest(&mut self) {}

    /// Empty the text input.
    fn clear_input(&mut self);

    /// Enable or disable the text input.
    fn set_input_enabled(&mut self, enabled: bool) {
        let _ = enabled;
    }

    /// Display the typing indicator.
    fn show_typing(&mut self);

    /// Remove the typing indicator.
    fn hide_typing(&mut self);
}

/// In-memory view, for embedding the widget in tests or headless tools.
#[derive(Debug, Clone)]
pub struct MemoryView {
    pub messages: Vec<Message>,
    pub input: String,
    pub input_enabled: bool,
    pub typing_visible: bool,
    /// Index of the bubble last scrolled into view.
    pub scrolled_to: Option<usize>,
    pub typing_shown_count: usize,
    pub typing_hidden_count: usize,
}

impl Default for MemoryView {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            input_enabled: true,
            typing_visible: false,
            scrolled_to: None,
            typing_shown_count: 0,
            typing_hidden_count: 0,
        }
    }
}

impl MemoryView {
    /// Bubbles with the given role, in order.
    pub fn texts(&self, role: Role) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.role == role)
            .map(|m| m.text.as_str())
            .collect()
    }
}

impl ChatView for MemoryView {
    fn append_message(&mut self, message: &Message) {
        self.messages.push(message.clone());
    }

    fn scroll_to_latest(&mut self) {
        self.scrolled_to = self.messages.len().checked_sub(1);
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn show_typing(&mut self) {
        self.typing_visible = true;
        self.typing_shown_count += 1;
    }

    fn hide_typing(&mut self) {
        self.typing_visible = false;
        self.typing_hidden_count += 1;
    }
}

//! Line-oriented terminal front end for the widget.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::controller::{ChatWidgetController, SubmitEvent};
use super::transport::ChatTransport;
use super::view::{ChatView, Message, Role};

const TYPING_TEXT: &str = "HelpMate is typing...";
const USER_PREFIX: &str = "you> ";
const BOT_PREFIX: &str = "helpmate> ";

/// Input line that ends the session.
pub const QUIT_COMMAND: &str = ":quit";

/// Renders bubbles as prefixed lines on a writer, usually stdout.
///
/// The typing indicator is a line without a newline that is erased again
/// when hidden.
#[derive(Debug)]
pub struct TerminalView<W: Write> {
    out: W,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to write to terminal");
        }
    }
}

impl<W: Write> ChatView for TerminalView<W> {
    fn append_message(&mut self, message: &Message) {
        let prefix = match message.role {
            Role::User => USER_PREFIX,
            Role::Bot => BOT_PREFIX,
        };
        let indent = " ".repeat(prefix.len());
        let mut rendered = String::new();
        for (i, line) in message.text.lines().enumerate() {
            rendered.push_str(if i == 0 { prefix } else { indent.as_str() });
            rendered.push_str(line);
            rendered.push('\n');
        }
        if rendered.is_empty() {
            rendered = format!("{prefix}\n");
        }
        self.emit(&rendered);
    }

    fn clear_input(&mut self) {}

    fn show_typing(&mut self) {
        self.emit(TYPING_TEXT);
    }

    fn hide_typing(&mut self) {
        // Carriage return, then erase the whole line.
        self.emit("\r\x1b[2K");
    }
}

/// Feed lines from `input` to the controller until EOF or [`QUIT_COMMAND`].
///
/// Each line is submitted and fully answered before the next is read.
pub async fn run_repl<T, V, R>(
    controller: &mut ChatWidgetController<T, V>,
    input: R,
) -> std::io::Result<()>
where
    T: ChatTransport,
    V: ChatView,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == QUIT_COMMAND {
            break;
        }
        controller.handle_submit(SubmitEvent::new(line)).await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(message: &Message) -> String {
        let mut view = TerminalView::new(Vec::new());
        view.append_message(message);
        String::from_utf8(view.into_inner()).unwrap()
    }

    #[test]
    fn test_user_line() {
        assert_eq!(rendered(&Message::new("hello", Role::User)), "you> hello\n");
    }

    #[test]
    fn test_multiline_bot_text_is_indented() {
        assert_eq!(
            rendered(&Message::new("a: 1\nb: 2", Role::Bot)),
            "helpmate> a: 1\n          b: 2\n"
        );
    }

    #[test]
    fn test_empty_bubble() {
        assert_eq!(rendered(&Message::new("", Role::Bot)), "helpmate> \n");
    }

    #[test]
    fn test_typing_indicator_is_erased() {
        let mut view = TerminalView::new(Vec::new());
        view.show_typing();
        view.hide_typing();
        let out = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(out, "HelpMate is typing...\r\x1b[2K");
    }
}

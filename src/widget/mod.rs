//! Chat widget: the client half of HelpMate.
//!
//! A [`ChatWidgetController`] mediates between form submissions and the chat
//! endpoint. It is independent of any particular UI or HTTP stack:
//!
//! - [`ChatView`] is where bubbles, the text input and the typing indicator
//!   live ([`MemoryView`] and [`TerminalView`] are provided);
//! - [`ChatTransport`] delivers requests
//!   ([`ChatClient`](crate::client::ChatClient) is the HTTP implementation).
//!
//! # Example
//!
//! ```rust,no_run
//! use helpmate::client::ChatClient;
//! use helpmate::widget::{ChatWidgetController, MemoryView, Role, SubmitEvent};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ChatClient::new("http://127.0.0.1:8000/api/chat/")?;
//! let mut widget = ChatWidgetController::new(client, MemoryView::default());
//!
//! widget.handle_submit(SubmitEvent::new("12/4+3")).await;
//! assert_eq!(widget.view().texts(Role::Bot), ["The answer is 6.0"]);
//! # Ok(())
//! # }
//! ```

mod controller;
pub mod reply;
pub mod terminal;
mod transport;
mod view;

pub use controller::{ChatWidgetController, SubmitEvent, SubmitOutcome, TypingIndicator, WidgetState};
pub use reply::{ChatRequest, Exchange, ExchangeError, RawReply, ReplyPayload, ServerFailure};
pub use terminal::{TerminalView, run_repl};
pub use transport::ChatTransport;
pub use view::{ChatView, MemoryView, Message, Role};

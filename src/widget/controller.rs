//! The chat widget controller.

use super::reply::{ChatRequest, Exchange, ExchangeError, render_error};
use super::transport::ChatTransport;
use super::view::{ChatView, Message, Role};

/// A form submission carrying the current value of the text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitEvent {
    pub value: String,
}

impl SubmitEvent {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// What a submission led to.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The input was blank; nothing happened.
    Ignored,
    /// The server answered; the rendered bot bubble came from this exchange.
    Answered(Exchange),
    /// No answer could be obtained; the error was rendered as a bot bubble.
    Failed(ExchangeError),
}

/// Controller lifecycle. Each submission goes `Idle → AwaitingResponse → Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetState {
    #[default]
    Idle,
    AwaitingResponse,
}

/// The typing indicator, owned by the controller.
///
/// Showing twice or hiding while hidden does not reach the view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypingIndicator {
    visible: bool,
}

impl TypingIndicator {
    pub fn is_visible(self) -> bool {
        self.visible
    }

    fn set(&mut self, view: &mut impl ChatView, visible: bool) {
        if self.visible == visible {
            return;
        }
        if visible {
            view.show_typing();
            view.scroll_to_latest();
        } else {
            view.hide_typing();
        }
        self.visible = visible;
    }
}

/// Drives one chat widget: turns submissions into requests and renders
/// everything that follows into the view.
///
/// `handle_submit` borrows the controller mutably for the whole exchange, so
/// a second submission cannot start until the first has settled; the view's
/// input is disabled meanwhile.
#[derive(Debug)]
pub struct ChatWidgetController<T, V> {
    transport: T,
    view: V,
    typing: TypingIndicator,
    state: WidgetState,
}

impl<T, V> ChatWidgetController<T, V>
where
    T: ChatTransport,
    V: ChatView,
{
    pub fn new(transport: T, view: V) -> Self {
        Self {
            transport,
            view,
            typing: TypingIndicator::default(),
            state: WidgetState::Idle,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn typing(&self) -> TypingIndicator {
        self.typing
    }

    pub fn into_parts(self) -> (T, V) {
        (self.transport, self.view)
    }

    /// Append a bubble and scroll it into view.
    pub fn append_message(&mut self, text: impl Into<String>, role: Role) {
        append(&mut self.view, Message::new(text, role));
    }

    /// Show or hide the typing indicator. Idempotent.
    pub fn set_typing_indicator(&mut self, visible: bool) {
        self.typing.set(&mut self.view, visible);
    }

    /// Handle one form submission.
    ///
    /// Blank input is ignored. Otherwise the user bubble is appended, the
    /// input cleared, the typing indicator shown and a single request sent.
    /// Whatever happens next is rendered as one bot bubble, after which the
    /// indicator is removed and the input re-enabled. That cleanup also runs
    /// if the returned future is dropped mid-flight.
    pub async fn handle_submit(&mut self, event: SubmitEvent) -> SubmitOutcome {
        let text = event.value.trim();
        if text.is_empty() {
            return SubmitOutcome::Ignored;
        }
        let request = ChatRequest {
            message: text.to_string(),
        };

        append(&mut self.view, Message::new(text, Role::User));
        self.view.clear_input();

        let mut pending = PendingExchange::begin(&mut self.view, &mut self.typing, &mut self.state);

        let result = match self.transport.send(&request).await {
            Ok(raw) => Exchange::decode(raw),
            Err(e) => Err(ExchangeError::Transport(e.to_string())),
        };

        match result {
            Ok(exchange) => {
                if let Exchange::Failure { status, .. } = &exchange {
                    tracing::warn!(status = *status, "Chat endpoint returned an error");
                }
                pending.reply(exchange.render());
                SubmitOutcome::Answered(exchange)
            }
            Err(e) => {
                tracing::error!(error = %e, "Chat request failed");
                pending.reply(render_error(&e));
                SubmitOutcome::Failed(e)
            }
        }
    }
}

fn append(view: &mut impl ChatView, message: Message) {
    view.append_message(&message);
    view.scroll_to_latest();
}

/// Holds the widget in `AwaitingResponse` until dropped.
struct PendingExchange<'a, V: ChatView> {
    view: &'a mut V,
    typing: &'a mut TypingIndicator,
    state: &'a mut WidgetState,
}

impl<'a, V: ChatView> PendingExchange<'a, V> {
    fn begin(view: &'a mut V, typing: &'a mut TypingIndicator, state: &'a mut WidgetState) -> Self {
        typing.set(&mut *view, true);
        view.set_input_enabled(false);
        *state = WidgetState::AwaitingResponse;
        Self { view, typing, state }
    }

    fn reply(&mut self, text: String) {
        append(&mut *self.view, Message::new(text, Role::Bot));
    }
}

impl<V: ChatView> Drop for PendingExchange<'_, V> {
    fn drop(&mut self) {
        self.typing.set(&mut *self.view, false);
        self.view.set_input_enabled(true);
        *self.state = WidgetState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::widget::reply::RawReply;
    use crate::widget::view::MemoryView;

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Refused;

    /// Transport answering from a canned result and recording requests.
    #[derive(Debug)]
    struct Canned {
        reply: Option<RawReply>,
        sent: Mutex<Vec<ChatRequest>>,
    }

    impl Canned {
        fn answering(reply: RawReply) -> Self {
            Self {
                reply: Some(reply),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<ChatRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatTransport for Canned {
        type Error = Refused;

        async fn send(&self, request: &ChatRequest) -> Result<RawReply, Refused> {
            self.sent.lock().unwrap().push(request.clone());
            self.reply.clone().ok_or(Refused)
        }
    }

    /// Transport that never answers.
    #[derive(Debug)]
    struct Stalled;

    #[async_trait]
    impl ChatTransport for Stalled {
        type Error = Refused;

        async fn send(&self, _request: &ChatRequest) -> Result<RawReply, Refused> {
            std::future::pending().await
        }
    }

    /// View whose state the transport below can also read.
    #[derive(Debug, Clone, Default)]
    struct SharedView(Arc<Mutex<MemoryView>>);

    impl ChatView for SharedView {
        fn append_message(&mut self, message: &Message) {
            self.0.lock().unwrap().append_message(message);
        }

        fn scroll_to_latest(&mut self) {
            self.0.lock().unwrap().scroll_to_latest();
        }

        fn clear_input(&mut self) {
            self.0.lock().unwrap().clear_input();
        }

        fn set_input_enabled(&mut self, enabled: bool) {
            self.0.lock().unwrap().set_input_enabled(enabled);
        }

        fn show_typing(&mut self) {
            self.0.lock().unwrap().show_typing();
        }

        fn hide_typing(&mut self) {
            self.0.lock().unwrap().hide_typing();
        }
    }

    /// Transport that records what the view looked like when it was called.
    #[derive(Debug)]
    struct Observing {
        view: SharedView,
        seen: Mutex<Option<MemoryView>>,
    }

    #[async_trait]
    impl ChatTransport for Observing {
        type Error = Refused;

        async fn send(&self, _request: &ChatRequest) -> Result<RawReply, Refused> {
            let snapshot = self.view.0.lock().unwrap().clone();
            *self.seen.lock().unwrap() = Some(snapshot);
            Ok(RawReply::new(200, "application/json", r#"{"response":"ok"}"#))
        }
    }

    fn controller(transport: Canned) -> ChatWidgetController<Canned, MemoryView> {
        let mut view = MemoryView::default();
        view.input = "typed text".into();
        ChatWidgetController::new(transport, view)
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let mut widget = controller(Canned::answering(RawReply::new(200, "", "ok")));

        let outcome = widget.handle_submit(SubmitEvent::new("   \t")).await;

        assert!(matches!(outcome, SubmitOutcome::Ignored));
        assert!(widget.view().messages.is_empty());
        assert_eq!(widget.view().typing_shown_count, 0);
        assert!(widget.transport().sent().is_empty());
        assert_eq!(widget.view().input, "typed text");
    }

    #[tokio::test]
    async fn test_successful_exchange() {
        let mut widget = controller(Canned::answering(RawReply::new(
            200,
            "application/json",
            r#"{"response":"hi there"}"#,
        )));

        let outcome = widget.handle_submit(SubmitEvent::new("  hello ")).await;

        assert!(matches!(outcome, SubmitOutcome::Answered(_)));
        let view = widget.view();
        assert_eq!(view.texts(Role::User), ["hello"]);
        assert_eq!(view.texts(Role::Bot), ["hi there"]);
        assert!(view.input.is_empty());
        assert!(view.input_enabled);
        assert!(!view.typing_visible);
        assert_eq!(view.typing_shown_count, 1);
        assert_eq!(view.typing_hidden_count, 1);
        assert_eq!(view.scrolled_to, Some(1));
        assert_eq!(
            widget.transport().sent(),
            [ChatRequest {
                message: "hello".into()
            }]
        );
        assert_eq!(widget.state(), WidgetState::Idle);
    }

    #[tokio::test]
    async fn test_view_is_prepared_before_sending() {
        let view = SharedView::default();
        view.0.lock().unwrap().input = "hello".into();
        let transport = Observing {
            view: view.clone(),
            seen: Mutex::new(None),
        };
        let mut widget = ChatWidgetController::new(transport, view.clone());

        widget.handle_submit(SubmitEvent::new("hello")).await;

        let seen = widget
            .transport()
            .seen
            .lock()
            .unwrap()
            .clone()
            .expect("transport was called");
        assert_eq!(seen.texts(Role::User), ["hello"]);
        assert!(seen.texts(Role::Bot).is_empty());
        assert!(seen.input.is_empty());
        assert!(seen.typing_visible);
        assert!(!seen.input_enabled);
        assert_eq!(seen.scrolled_to, Some(0));

        let after = view.0.lock().unwrap();
        assert_eq!(after.texts(Role::Bot), ["ok"]);
        assert!(!after.typing_visible);
        assert!(after.input_enabled);
    }

    #[tokio::test]
    async fn test_transport_failure_is_rendered() {
        let mut widget = controller(Canned::failing());

        let outcome = widget.handle_submit(SubmitEvent::new("hello")).await;

        assert!(matches!(outcome, SubmitOutcome::Failed(ExchangeError::Transport(_))));
        assert_eq!(
            widget.view().texts(Role::Bot),
            ["Network or parsing error: connection refused"]
        );
        assert!(!widget.view().typing_visible);
        assert_eq!(widget.view().typing_hidden_count, 1);
    }

    #[tokio::test]
    async fn test_http_error_is_rendered() {
        let mut widget = controller(Canned::answering(RawReply::new(
            500,
            "application/json",
            r#"{"error":"boom"}"#,
        )));

        widget.handle_submit(SubmitEvent::new("hello")).await;

        assert_eq!(widget.view().texts(Role::Bot), ["Error: boom"]);
        assert!(!widget.view().typing_visible);
    }

    #[tokio::test]
    async fn test_cancelled_exchange_cleans_up() {
        let mut widget = ChatWidgetController::new(Stalled, MemoryView::default());

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(10),
            widget.handle_submit(SubmitEvent::new("hello")),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(widget.state(), WidgetState::Idle);
        assert!(!widget.typing().is_visible());
        assert!(!widget.view().typing_visible);
        assert!(widget.view().input_enabled);
        assert_eq!(widget.view().texts(Role::User), ["hello"]);
        assert!(widget.view().texts(Role::Bot).is_empty());
    }

    #[test]
    fn test_typing_indicator_is_idempotent() {
        let mut widget = controller(Canned::failing());

        widget.set_typing_indicator(true);
        widget.set_typing_indicator(true);
        assert_eq!(widget.view().typing_shown_count, 1);

        widget.set_typing_indicator(false);
        widget.set_typing_indicator(false);
        assert_eq!(widget.view().typing_hidden_count, 1);
    }

    #[test]
    fn test_append_message_scrolls() {
        let mut widget = controller(Canned::failing());
        widget.append_message("one", Role::Bot);
        widget.append_message("two", Role::User);
        assert_eq!(widget.view().scrolled_to, Some(1));
    }
}

use futures::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{ AtomicBool, Ordering };
use std::time::Duration;

use super::bubbles::{ pace_bubbles, split_into_bubbles, BUBBLE_DELAY };
use super::transport::ProxyTransport;
use super::ChatError;
use crate::models::chat::Message;

pub const GREETING: &str =
    "Hi! I’m the AI simulated client. Hope you are ready for a simulated counseling session. What kind of real-world client issues you want to practice?";

pub const APOLOGY: &str = "Sorry, I couldn't respond just now.";

/// Shown when the proxy answers with an empty reply.
pub const EMPTY_REPLY: &str = "…";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Sending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered { bubbles: usize },
    Failed { error: String },
}

/// Read-only view of the send lock, for busy indicators.
#[derive(Clone)]
pub struct BusyIndicator(Arc<AtomicBool>);

impl BusyIndicator {
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Held for the whole send, from the request until the last bubble or the apology.
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(flag.clone()))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ChatSession<T: ProxyTransport> {
    transport: T,
    messages: Vec<Message>,
    busy: Arc<AtomicBool>,
    error: Option<String>,
    bubble_delay: Duration,
}

impl<T: ProxyTransport> ChatSession<T> {
    pub fn new(transport: T) -> Self {
        Self::with_delay(transport, BUBBLE_DELAY)
    }

    pub fn with_delay(transport: T, bubble_delay: Duration) -> Self {
        Self {
            transport,
            messages: vec![Message::assistant(GREETING)],
            busy: Arc::new(AtomicBool::new(false)),
            error: None,
            bubble_delay,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn busy_indicator(&self) -> BusyIndicator {
        BusyIndicator(self.busy.clone())
    }

    pub fn state(&self) -> SessionState {
        if self.busy.load(Ordering::Acquire) {
            SessionState::Sending
        } else {
            SessionState::Idle
        }
    }

    /// Drops every turn and any error, leaving only the greeting.
    pub fn restart(&mut self) {
        self.messages = vec![Message::assistant(GREETING)];
        self.error = None;
    }

    /// Sends one user turn and appends the reply bubbles one at a time.
    ///
    /// `on_message` sees each appended message as it lands: the user turn,
    /// then every bubble (or the apology on failure).
    pub async fn send<F>(&mut self, input: &str, mut on_message: F) -> Result<SendOutcome, ChatError>
        where F: FnMut(&Message) + Send
    {
        let text = input.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyInput);
        }
        let _guard = BusyGuard::acquire(&self.busy).ok_or(ChatError::Busy)?;
        self.error = None;

        self.push(Message::user(text), &mut on_message);

        // the greeting is display-only
        let outbound = &self.messages[1..];
        let result = self.transport.request_reply(outbound).await;
        match result {
            Ok(reply) => {
                let reply = match reply.trim() {
                    "" => EMPTY_REPLY,
                    trimmed => trimmed,
                };
                let mut bubbles = pace_bubbles(split_into_bubbles(reply), self.bubble_delay);
                let mut delivered = 0;
                while let Some(bubble) = bubbles.next().await {
                    self.push(Message::assistant(bubble), &mut on_message);
                    delivered += 1;
                }
                Ok(SendOutcome::Delivered { bubbles: delivered })
            }
            Err(e) => {
                let detail = e.to_string();
                self.error = Some(detail.clone());
                self.push(Message::assistant(APOLOGY), &mut on_message);
                Ok(SendOutcome::Failed { error: detail })
            }
        }
    }

    fn push<F: FnMut(&Message)>(&mut self, message: Message, on_message: &mut F) {
        self.messages.push(message);
        if let Some(last) = self.messages.last() {
            on_message(last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time::Instant;

    struct FakeTransport {
        reply: Result<String, String>,
        seen: Mutex<Vec<Vec<Message>>>,
        busy: Mutex<Option<BusyIndicator>>,
        busy_during_call: Mutex<Vec<bool>>,
    }

    impl FakeTransport {
        fn new(reply: Result<&str, &str>) -> Self {
            Self {
                reply: reply.map(str::to_string).map_err(str::to_string),
                seen: Mutex::new(Vec::new()),
                busy: Mutex::new(None),
                busy_during_call: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ProxyTransport for FakeTransport {
        async fn request_reply(&self, messages: &[Message]) -> Result<String, ChatError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            if let Some(indicator) = self.busy.lock().unwrap().as_ref() {
                self.busy_during_call.lock().unwrap().push(indicator.is_busy());
            }
            self.reply.clone().map_err(ChatError::Transport)
        }
    }

    fn session(reply: Result<&str, &str>) -> ChatSession<FakeTransport> {
        ChatSession::with_delay(FakeTransport::new(reply), Duration::from_millis(350))
    }

    #[test]
    fn starts_with_greeting() {
        let session = session(Ok("x"));
        assert_eq!(session.messages(), &[Message::assistant(GREETING)]);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.error().is_none());
    }

    #[test]
    fn busy_guard_is_exclusive_and_released() {
        let flag = Arc::new(AtomicBool::new(false));
        let guard = BusyGuard::acquire(&flag).unwrap();
        assert!(BusyGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(BusyGuard::acquire(&flag).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn delivers_bubbles_sequentially() {
        let long = format!("{}.", "a".repeat(199));
        let reply = format!("{} Second part. {}", long, long);
        let mut session = session(Ok(&reply));

        let start = Instant::now();
        let mut log = Vec::new();
        let outcome = session.send("  Client with anxiety ", |m| log.push((m.clone(), start.elapsed()))).await.unwrap();

        assert_eq!(outcome, SendOutcome::Delivered { bubbles: 2 });
        assert_eq!(log[0].0, Message::user("Client with anxiety"));
        assert_eq!(log[1].0.role, Role::Assistant);
        assert!(log[2].1 >= Duration::from_millis(350));
        assert_eq!(session.messages().len(), 4);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn greeting_is_not_sent() {
        let mut session = session(Ok("Okay."));
        session.send("hello", |_| {}).await.unwrap();
        session.send("again", |_| {}).await.unwrap();

        let seen = session.transport.seen.lock().unwrap();
        assert_eq!(seen[0], vec![Message::user("hello")]);
        assert_eq!(
            seen[1],
            vec![Message::user("hello"), Message::assistant("Okay."), Message::user("again")]
        );
    }

    #[tokio::test]
    async fn busy_while_request_is_outstanding() {
        let mut session = session(Ok("Fine."));
        *session.transport.busy.lock().unwrap() = Some(session.busy_indicator());
        session.send("hi", |_| {}).await.unwrap();
        assert_eq!(*session.transport.busy_during_call.lock().unwrap(), vec![true]);
        assert!(!session.busy_indicator().is_busy());
    }

    #[tokio::test]
    async fn indicator_is_busy_when_the_user_turn_lands() {
        let mut session = session(Ok("Fine."));
        let indicator = session.busy_indicator();
        let mut busy_on_append = Vec::new();
        session.send("hi", |m| busy_on_append.push((m.role, indicator.is_busy()))).await.unwrap();
        assert_eq!(busy_on_append, vec![(Role::User, true), (Role::Assistant, true)]);
        assert!(!indicator.is_busy());
    }

    #[tokio::test]
    async fn empty_reply_shows_placeholder() {
        let mut session = session(Ok("   "));
        session.send("hi", |_| {}).await.unwrap();
        assert_eq!(session.messages().last().unwrap().content, EMPTY_REPLY);
    }

    #[tokio::test]
    async fn failure_appends_apology_and_records_error() {
        let mut session = session(Err("OpenAI error 429: slow down"));
        let outcome = session.send("hi", |_| {}).await.unwrap();

        assert_eq!(outcome, SendOutcome::Failed { error: "OpenAI error 429: slow down".into() });
        assert_eq!(session.error(), Some("OpenAI error 429: slow down"));
        assert_eq!(session.messages().last().unwrap(), &Message::assistant(APOLOGY));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn blank_input_is_rejected_without_a_call() {
        let mut session = session(Ok("x"));
        let err = session.send("  \n", |_| {}).await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyInput));
        assert!(session.transport.seen.lock().unwrap().is_empty());
        assert_eq!(session.messages().len(), 1);
    }

    #[tokio::test]
    async fn restart_resets_history_and_error() {
        let mut session = session(Err("boom"));
        for _ in 0..5 {
            session.send("hi", |_| {}).await.unwrap();
        }
        assert_eq!(session.messages().len(), 11);

        session.restart();
        assert_eq!(session.messages(), &[Message::assistant(GREETING)]);
        assert!(session.error().is_none());
    }
}

//! Page controller: owns everything the guestbook page knows at runtime.
//!
//! Created once per page and driven by the host through `load_entries`,
//! `handle_submit`, `on_resize`, `poll` and `click`. Every timed behavior
//! reads the `now` offset passed in, so the controller never touches a clock.

use crate::client::{ClientError, GuestbookApi};
use crate::entry::Entry;
use crate::error::EMPTY_ANSWER_MESSAGE;
use crate::layout::{BubbleBoard, MAX_BUBBLES, Viewport};
use crate::render::{BubbleView, render_bubble};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;
use tracing::{debug, warn};

pub const SUBMIT_FAILED_MESSAGE: &str = "방명록 작성에 실패했습니다.";
pub const NETWORK_ERROR_MESSAGE: &str =
    "서버와의 통신 중 오류가 발생했습니다. 서버가 실행 중인지 확인해주세요.";

/// How long a transient message stays up.
pub const MESSAGE_TTL: Duration = Duration::from_millis(3000);
/// Quiet period after the last resize before the board is rebuilt.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(300);

/// A transient error shown above the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    expires_at: Duration,
}

pub struct UiController<A> {
    api: A,
    anonymous_name: String,
    entries: Vec<Entry>,
    board: BubbleBoard,
    viewport: Viewport,
    header_bottom: Option<f64>,
    resize_due: Option<Duration>,
    message: Option<Message>,
    rng: StdRng,
}

impl<A: GuestbookApi> UiController<A> {
    pub fn new(api: A, anonymous_name: impl Into<String>, viewport: Viewport) -> Self {
        Self::with_rng(api, anonymous_name, viewport, StdRng::from_entropy())
    }

    /// Same as [`UiController::new`] with a caller-supplied RNG, for
    /// reproducible layouts.
    pub fn with_rng(
        api: A,
        anonymous_name: impl Into<String>,
        viewport: Viewport,
        rng: StdRng,
    ) -> Self {
        Self {
            api,
            anonymous_name: anonymous_name.into(),
            entries: Vec::new(),
            board: BubbleBoard::new(),
            viewport,
            header_bottom: None,
            resize_due: None,
            message: None,
            rng,
        }
    }

    /// Records where the page header ends; `None` when there is no header.
    pub fn set_header_bottom(&mut self, header_bottom: Option<f64>) {
        self.header_bottom = header_bottom;
    }

    /// Fetches the active log and rebuilds the board from its first entries.
    ///
    /// A failed or empty fetch leaves whatever is displayed untouched.
    pub async fn load_entries(&mut self, now: Duration) {
        let Some(fetched) = self.fetch().await else {
            return;
        };
        self.entries = fetched;
        self.rebuild(now);
    }

    /// Submits an answer on behalf of the anonymous visitor.
    ///
    /// Returns the stored entry when the server accepted it, which is the
    /// host's cue to clear the input.
    pub async fn handle_submit(&mut self, answer: &str, now: Duration) -> Option<Entry> {
        let answer = answer.trim();
        if answer.is_empty() {
            self.show_error(EMPTY_ANSWER_MESSAGE, now);
            return None;
        }

        let name = Some(self.anonymous_name.as_str());
        let stored = match self.api.submit(name, answer).await {
            Ok(entry) => entry,
            Err(ClientError::Rejected { status, message }) => {
                warn!(status, "submission rejected");
                let text = message.unwrap_or_else(|| SUBMIT_FAILED_MESSAGE.to_string());
                self.show_error(&text, now);
                return None;
            }
            Err(e) => {
                warn!(error = %e, "submission failed");
                self.show_error(NETWORK_ERROR_MESSAGE, now);
                return None;
            }
        };

        if let Some(fetched) = self.fetch().await {
            if is_single_new_head(&self.entries, &fetched) {
                self.board.insert(
                    &fetched[0],
                    &self.viewport,
                    self.header_bottom,
                    now,
                    &mut self.rng,
                );
                self.entries = fetched;
            } else {
                self.entries = fetched;
                self.rebuild(now);
            }
        }
        Some(stored)
    }

    /// Notes a viewport change. The rebuild happens in [`UiController::poll`]
    /// once resizing has been quiet for [`RESIZE_DEBOUNCE`].
    pub fn on_resize(&mut self, viewport: Viewport, now: Duration) {
        self.viewport = viewport;
        self.resize_due = Some(now + RESIZE_DEBOUNCE);
    }

    /// Runs every timer that is due: the resize rebuild, message expiry and
    /// bubble animations.
    pub fn poll(&mut self, now: Duration) {
        if self.resize_due.is_some_and(|due| now >= due) {
            self.resize_due = None;
            if !self.entries.is_empty() {
                self.rebuild(now);
            }
        }
        if self.message.as_ref().is_some_and(|m| now >= m.expires_at) {
            self.message = None;
        }
        self.board.advance(now);
    }

    /// Forwards a click or touch on a bubble.
    pub fn click(&mut self, entry_id: &str, now: Duration) -> bool {
        self.board.dismiss(entry_id, now)
    }

    /// Views for every bubble that has been revealed, newest first.
    pub fn view(&self) -> Vec<BubbleView> {
        self.board
            .bubbles()
            .iter()
            .filter(|b| b.is_revealed())
            .map(|b| render_bubble(b, &self.anonymous_name))
            .collect()
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn board(&self) -> &BubbleBoard {
        &self.board
    }

    async fn fetch(&self) -> Option<Vec<Entry>> {
        match self.api.list().await {
            Ok(mut entries) if !entries.is_empty() => {
                entries.truncate(MAX_BUBBLES);
                Some(entries)
            }
            Ok(_) => {
                debug!("no entries to display");
                None
            }
            Err(e) => {
                warn!(error = %e, "failed to load entries");
                None
            }
        }
    }

    fn rebuild(&mut self, now: Duration) {
        self.board.rebuild(
            &self.entries,
            &self.viewport,
            self.header_bottom,
            now,
            &mut self.rng,
        );
    }

    fn show_error(&mut self, text: &str, now: Duration) {
        self.message = Some(Message {
            text: text.to_string(),
            expires_at: now + MESSAGE_TTL,
        });
    }
}

/// True when `fetched` is `previous` with exactly one new entry in front.
fn is_single_new_head(previous: &[Entry], fetched: &[Entry]) -> bool {
    let Some((head, rest)) = fetched.split_first() else {
        return false;
    };
    !previous.iter().any(|e| e.id == head.id)
        && rest.len() <= previous.len()
        && rest.iter().zip(previous).all(|(a, b)| a.id == b.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ErrorBody;
    use crate::layout::tests::{entries, entry};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory server with switchable failure modes.
    #[derive(Default)]
    struct FakeApi {
        log: Mutex<Vec<Entry>>,
        fail: Mutex<Option<fn() -> ClientError>>,
    }

    impl FakeApi {
        fn with_entries(entries: Vec<Entry>) -> Self {
            Self {
                log: Mutex::new(entries),
                fail: Mutex::new(None),
            }
        }

        fn failure(&self) -> Option<ClientError> {
            self.fail.lock().unwrap().map(|make| make())
        }
    }

    #[async_trait]
    impl GuestbookApi for FakeApi {
        async fn list(&self) -> Result<Vec<Entry>, ClientError> {
            if let Some(err) = self.failure() {
                return Err(err);
            }
            Ok(self.log.lock().unwrap().clone())
        }

        async fn submit(&self, name: Option<&str>, answer: &str) -> Result<Entry, ClientError> {
            if let Some(err) = self.failure() {
                return Err(err);
            }
            let mut log = self.log.lock().unwrap();
            let id = log.first().map_or(1, |e| e.id.parse::<u64>().unwrap() + 1);
            let mut new = entry(id, answer);
            new.name = name.unwrap_or("익명").to_string();
            log.insert(0, new.clone());
            Ok(new)
        }
    }

    fn rejected_with_message() -> ClientError {
        ClientError::Rejected {
            status: 400,
            message: Some("custom".to_string()),
        }
    }

    fn rejected_without_message() -> ClientError {
        ClientError::Rejected {
            status: 500,
            message: None,
        }
    }

    fn undecodable() -> ClientError {
        ClientError::Decode(serde_json::from_str::<ErrorBody>("not json").unwrap_err())
    }

    fn controller(api: FakeApi) -> UiController<FakeApi> {
        UiController::with_rng(
            api,
            "익명",
            Viewport::new(1280.0, 900.0),
            StdRng::seed_from_u64(11),
        )
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test]
    async fn test_load_entries_truncates_and_rebuilds() {
        let mut ui = controller(FakeApi::with_entries(entries(20)));
        ui.load_entries(ms(0)).await;
        assert_eq!(ui.entries().len(), 12);
        assert_eq!(ui.board().len(), 12);

        // Staggered reveal: only the first bubble is visible immediately.
        assert_eq!(ui.view().len(), 1);
        ui.poll(ms(2000));
        assert_eq!(ui.view().len(), 12);
    }

    #[tokio::test]
    async fn test_empty_fetch_keeps_display() {
        let api = FakeApi::with_entries(entries(3));
        let mut ui = controller(api);
        ui.load_entries(ms(0)).await;
        assert_eq!(ui.board().len(), 3);

        ui.api.log.lock().unwrap().clear();
        ui.load_entries(ms(10)).await;
        assert_eq!(ui.board().len(), 3);
        assert_eq!(ui.entries().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_display() {
        let mut ui = controller(FakeApi::with_entries(entries(3)));
        ui.load_entries(ms(0)).await;
        *ui.api.fail.lock().unwrap() = Some(undecodable);
        ui.load_entries(ms(10)).await;
        assert_eq!(ui.board().len(), 3);
    }

    #[tokio::test]
    async fn test_submit_empty_answer_shows_message_without_request() {
        let mut ui = controller(FakeApi::default());
        assert!(ui.handle_submit("   ", ms(0)).await.is_none());

        let message = ui.message().unwrap();
        assert_eq!(message.text, EMPTY_ANSWER_MESSAGE);
        assert!(ui.api.log.lock().unwrap().is_empty());

        ui.poll(ms(2999));
        assert!(ui.message().is_some());
        ui.poll(ms(3000));
        assert!(ui.message().is_none());
    }

    #[tokio::test]
    async fn test_submit_single_new_entry_inserts_incrementally() {
        let mut ui = controller(FakeApi::with_entries(entries(12)));
        ui.load_entries(ms(0)).await;
        ui.poll(ms(2000));

        let stored = ui.handle_submit("  새 글  ", ms(2000)).await.unwrap();
        assert_eq!(stored.answer, "새 글");
        assert_eq!(stored.name, "익명");

        // Incremental insert keeps the board at 12 and puts the new bubble
        // first; the untouched bubbles are already idle.
        let board = ui.board();
        assert_eq!(board.len(), 12);
        assert_eq!(board.bubbles()[0].entry().id, stored.id);
        assert!(board.bubbles()[1].is_interactive());
        assert_eq!(ui.entries()[0].id, stored.id);
        assert_eq!(ui.entries().len(), 12);
    }

    #[tokio::test]
    async fn test_submit_with_other_changes_rebuilds() {
        let mut ui = controller(FakeApi::with_entries(entries(4)));
        ui.load_entries(ms(0)).await;
        ui.poll(ms(2000));

        // Someone else posted in between, so two new entries arrive at once.
        ui.api.log.lock().unwrap().insert(0, entry(5000, "other"));
        ui.handle_submit("mine", ms(2000)).await.unwrap();

        assert_eq!(ui.board().len(), 6);
        assert!(ui.board().bubbles().iter().all(|b| !b.is_interactive()));
    }

    #[tokio::test]
    async fn test_submit_error_messages() {
        let mut ui = controller(FakeApi::default());

        *ui.api.fail.lock().unwrap() = Some(rejected_with_message);
        ui.handle_submit("hi", ms(0)).await;
        assert_eq!(ui.message().unwrap().text, "custom");

        *ui.api.fail.lock().unwrap() = Some(rejected_without_message);
        ui.handle_submit("hi", ms(0)).await;
        assert_eq!(ui.message().unwrap().text, SUBMIT_FAILED_MESSAGE);

        *ui.api.fail.lock().unwrap() = Some(undecodable);
        ui.handle_submit("hi", ms(0)).await;
        assert_eq!(ui.message().unwrap().text, NETWORK_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_resize_is_debounced() {
        let mut ui = controller(FakeApi::with_entries(entries(2)));
        ui.load_entries(ms(0)).await;
        ui.poll(ms(1000));
        let before = ui.board().bubbles()[0].placement().x;

        ui.on_resize(Viewport::new(2400.0, 900.0), ms(1000));
        ui.on_resize(Viewport::new(2000.0, 900.0), ms(1200));
        ui.poll(ms(1400));
        assert!(ui.board().bubbles()[0].is_interactive(), "rebuilt too early");

        ui.poll(ms(1500));
        let bubble = &ui.board().bubbles()[0];
        assert!(!bubble.is_interactive());
        assert_ne!(bubble.placement().x, before);
    }

    #[tokio::test]
    async fn test_click_dismisses_idle_bubble() {
        let mut ui = controller(FakeApi::with_entries(entries(1)));
        ui.load_entries(ms(0)).await;
        assert!(!ui.click("1000", ms(100)));

        ui.poll(ms(600));
        assert!(ui.click("1000", ms(700)));
        ui.poll(ms(1100));
        assert!(ui.view().is_empty());
    }

    #[test]
    fn test_is_single_new_head() {
        let old = entries(3);
        let mut fetched = old.clone();
        fetched.insert(0, entry(9000, "new"));
        assert!(is_single_new_head(&old, &fetched));

        // Capped list: the oldest displayed entry falls off the end.
        let full = entries(12);
        let mut next = full.clone();
        next.insert(0, entry(9000, "new"));
        next.truncate(12);
        assert!(is_single_new_head(&full, &next));

        assert!(!is_single_new_head(&old, &old));
        let mut two_new = fetched.clone();
        two_new.insert(0, entry(9001, "newer"));
        assert!(!is_single_new_head(&old, &two_new));
        assert!(!is_single_new_head(&old, &[]));
    }
}

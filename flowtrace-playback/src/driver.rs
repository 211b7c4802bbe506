//! The `BrowserDriver` trait: the one seam where the playback loop drives
//! an actual browser (spec.md §4.7, §6 "Browser driver").

use crate::snapshot::{ActionResult, PageSnapshot};
use async_trait::async_trait;
use flowtrace_gateway::schema::Action;

/// A single tab the playback loop drives. Multi-tab interactions (popups,
/// OAuth windows) are out of scope; every method acts on the current tab
/// (spec.md §5 "Playback-specific resources").
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Capture the current viewport as PNG bytes.
    async fn capture_screenshot(&self) -> Result<Vec<u8>, String>;

    /// Capture a structured snapshot of the current page.
    async fn snapshot_page(&self) -> Result<PageSnapshot, String>;

    /// Dispatch one action. `selector` has already been resolved from the
    /// action's `element_index` against the snapshot that chose it.
    /// Per spec.md §6: `input` clears then types, firing input+change;
    /// `click` scrolls into view then dispatches a trusted click;
    /// `keydown` focuses then dispatches the keyboard event. Implementations
    /// report failures through [`ActionResult`], never by erroring.
    async fn execute_action(&self, action: &Action, selector: Option<&str>) -> ActionResult;

    /// Navigate the tab to a URL outright (used for the `navigate` action
    /// kind, which carries no element index).
    async fn navigate(&self, url: &str) -> ActionResult;

    /// Block until the page has settled after an action (network idle,
    /// no pending navigation).
    async fn await_load_stable(&self);
}

#[cfg(test)]
mod object_safety {
    use super::*;

    fn _assert_object_safe(_: &dyn BrowserDriver) {}
}

/// A scripted [`BrowserDriver`] for tests, mirroring [`flowtrace_gateway::mock::MockGateway`]:
/// a queue of canned results per method, with a capture of every action
/// dispatched.
pub mod mock {
    use super::*;
    use crate::snapshot::PageSnapshot;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A [`BrowserDriver`] whose responses are pre-scripted. Each method pops
    /// the next queued result (panicking if the queue is empty) and records
    /// what it was called with.
    #[derive(Default)]
    pub struct MockDriver {
        screenshots: Mutex<VecDeque<Result<Vec<u8>, String>>>,
        snapshots: Mutex<VecDeque<Result<PageSnapshot, String>>>,
        action_results: Mutex<VecDeque<ActionResult>>,
        navigate_results: Mutex<VecDeque<ActionResult>>,
        executed_actions: Mutex<Vec<Action>>,
        navigated_urls: Mutex<Vec<String>>,
        load_stable_calls: Mutex<u32>,
    }

    impl MockDriver {
        /// An empty mock; every method panics until a response is queued.
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a `capture_screenshot` response.
        pub fn push_screenshot(&self, result: Result<Vec<u8>, String>) {
            self.screenshots.lock().unwrap().push_back(result);
        }

        /// Queue a `snapshot_page` response.
        pub fn push_snapshot(&self, result: Result<PageSnapshot, String>) {
            self.snapshots.lock().unwrap().push_back(result);
        }

        /// Queue an `execute_action` result.
        pub fn push_action_result(&self, result: ActionResult) {
            self.action_results.lock().unwrap().push_back(result);
        }

        /// Every action dispatched so far, in order.
        pub fn executed_actions(&self) -> Vec<Action> {
            self.executed_actions.lock().unwrap().clone()
        }

        /// How many times `await_load_stable` was called.
        pub fn load_stable_calls(&self) -> u32 {
            *self.load_stable_calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl BrowserDriver for MockDriver {
        async fn capture_screenshot(&self) -> Result<Vec<u8>, String> {
            self.screenshots
                .lock()
                .unwrap()
                .pop_front()
                .expect("MockDriver: no more screenshots queued")
        }

        async fn snapshot_page(&self) -> Result<PageSnapshot, String> {
            self.snapshots
                .lock()
                .unwrap()
                .pop_front()
                .expect("MockDriver: no more snapshots queued")
        }

        async fn execute_action(&self, action: &Action, _selector: Option<&str>) -> ActionResult {
            self.executed_actions.lock().unwrap().push(action.clone());
            self.action_results
                .lock()
                .unwrap()
                .pop_front()
                .expect("MockDriver: no more action results queued")
        }

        async fn navigate(&self, url: &str) -> ActionResult {
            self.navigated_urls.lock().unwrap().push(url.to_string());
            self.navigate_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(ActionResult::ok)
        }

        async fn await_load_stable(&self) {
            *self.load_stable_calls.lock().unwrap() += 1;
        }
    }
}

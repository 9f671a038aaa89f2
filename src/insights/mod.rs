pub mod client;
pub mod parse;
pub mod prompt;

use std::sync::{Arc, Mutex};

use crate::error::InsightError;

pub use client::{GeminiClient, InsightClient};
pub use parse::parse_insights;
pub use prompt::{build_prompt, InsightRequest};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum InsightState {
    #[default]
    Idle,
    Loading,
    Success(Vec<String>),
    Failure(InsightError),
}

impl InsightState {
    pub fn is_loading(&self) -> bool {
        matches!(self, InsightState::Loading)
    }

    fn from_result(result: Result<Vec<String>, InsightError>) -> Self {
        match result {
            Ok(list) => InsightState::Success(list),
            Err(e) => InsightState::Failure(e),
        }
    }
}

/// Ask the client for insights on an already-built prompt and parse the reply.
pub fn fetch_insights(client: &dyn InsightClient, prompt: &str) -> Result<Vec<String>, InsightError> {
    let text = client.request_insights(prompt)?;
    let insights = parse_insights(&text);
    tracing::info!("Received {} insights", insights.len());
    Ok(insights)
}

/// Validate and run a request on the calling thread.
pub fn run_insights(client: &dyn InsightClient, request: &InsightRequest) -> InsightState {
    InsightState::from_result(build_prompt(request).and_then(|prompt| fetch_insights(client, &prompt)))
}

/// An insight request running on a worker thread.
pub struct InsightJob {
    result: Arc<Mutex<Option<Result<Vec<String>, InsightError>>>>,
}

impl InsightJob {
    /// Validate on the caller's thread, then send the request from a worker.
    /// A validation failure is returned immediately and nothing is spawned.
    pub fn start(client: Arc<dyn InsightClient>, request: &InsightRequest) -> Result<Self, InsightError> {
        let prompt = build_prompt(request)?;
        let result = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&result);
        std::thread::spawn(move || {
            let outcome = fetch_insights(client.as_ref(), &prompt);
            *slot.lock().unwrap() = Some(outcome);
        });
        Ok(Self { result })
    }

    /// The final state once the worker has finished.
    pub fn poll(&self) -> Option<InsightState> {
        self.result.lock().unwrap().take().map(InsightState::from_result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::prompt::tests::{numbered_dataset, request_2d};
    use crate::insights::prompt::CHART_TYPE_3D;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct MockClient {
        calls: AtomicUsize,
        reply: Result<String, InsightError>,
    }

    impl MockClient {
        fn replying(reply: Result<String, InsightError>) -> Self {
            Self { calls: AtomicUsize::new(0), reply }
        }
    }

    impl InsightClient for MockClient {
        fn request_insights(&self, _prompt: &str) -> Result<String, InsightError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    #[test]
    fn successful_reply_is_parsed() {
        let client = MockClient::replying(Ok("1. **Trend A**\n\n2. Trend B".into()));
        let state = run_insights(&client, &request_2d(Some(numbered_dataset(3))));
        assert_eq!(state, InsightState::Success(vec!["**Trend A**".into(), "Trend B".into()]));
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invalid_selection_never_reaches_the_client() {
        let client = MockClient::replying(Ok(String::new()));

        let mut req = request_2d(Some(numbered_dataset(3)));
        req.chart_type = CHART_TYPE_3D.into();
        assert_eq!(run_insights(&client, &req), InsightState::Failure(InsightError::MissingAxes3D));

        assert_eq!(
            run_insights(&client, &request_2d(None)),
            InsightState::Failure(InsightError::MissingData)
        );
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn client_errors_become_failures() {
        let client = MockClient::replying(Err(InsightError::QuotaExceeded));
        let state = run_insights(&client, &request_2d(Some(numbered_dataset(1))));
        assert_eq!(state, InsightState::Failure(InsightError::QuotaExceeded));
    }

    #[test]
    fn job_publishes_its_result() {
        let client: Arc<dyn InsightClient> = Arc::new(MockClient::replying(Ok("Only one".into())));
        let job = InsightJob::start(client, &request_2d(Some(numbered_dataset(2)))).unwrap();
        let mut state = None;
        for _ in 0..200 {
            state = job.poll();
            if state.is_some() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(state, Some(InsightState::Success(vec!["Only one".into()])));
    }

    #[test]
    fn job_rejects_invalid_requests_up_front() {
        let client: Arc<dyn InsightClient> = Arc::new(MockClient::replying(Ok(String::new())));
        let mut req = request_2d(Some(numbered_dataset(2)));
        req.x = None;
        assert!(matches!(InsightJob::start(client, &req), Err(InsightError::MissingAxes)));
    }
}

//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver, then
//! [`expect_request`] to pull the next request and answer it by hand.
//! For scripted conversations use [`MockClient`].

use crate::framework::{ActorState, Envelope, FrameworkError, Response, StateClient};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// A canned reply, optionally guarded by a check on the incoming request.
struct Expectation<S: ActorState> {
    matcher: Option<Box<dyn Fn(&S::Request) -> bool + Send>>,
    response: Result<S::Response, S::Error>,
}

/// A mock client with expectation tracking for fluent testing.
///
/// # Example
/// ```ignore
/// let mut mock = MockClient::<Engine>::new();
/// mock.expect(|r| matches!(r, EngineRequest::AssignNext))
///     .return_ok(EngineResponse::Assignments(vec![]));
///
/// let client = BaristaClient::new(mock.client());
/// // Use client in tests...
/// mock.verify(); // Ensures all expectations were met
/// ```
pub struct MockClient<S: ActorState> {
    client: StateClient<S>,
    expectations: Arc<Mutex<VecDeque<Expectation<S>>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<S: ActorState> MockClient<S> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<Envelope<S>>(100);
        let expectations: Arc<Mutex<VecDeque<Expectation<S>>>> =
            Arc::new(Mutex::new(VecDeque::new()));
        let expectations_clone = expectations.clone();

        // Spawn background task to handle requests
        let handle = tokio::spawn(async move {
            while let Some(envelope) = receiver.recv().await {
                let Envelope::Request {
                    request,
                    respond_to,
                } = envelope
                else {
                    continue;
                };
                let expectation = expectations_clone
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .pop_front();

                match expectation {
                    Some(exp) => {
                        if let Some(matcher) = &exp.matcher {
                            assert!(matcher(&request), "Unexpected request: {:?}", request);
                        }
                        let _ = respond_to.send(exp.response);
                    }
                    None => panic!("Unexpected request with no expectation: {:?}", request),
                }
            }
        });

        Self {
            client: StateClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> StateClient<S> {
        self.client.clone()
    }

    /// Expects any request.
    pub fn expect_any(&mut self) -> ExpectationBuilder<S> {
        ExpectationBuilder {
            matcher: None,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a request satisfying `matcher`.
    pub fn expect(
        &mut self,
        matcher: impl Fn(&S::Request) -> bool + Send + 'static,
    ) -> ExpectationBuilder<S> {
        ExpectationBuilder {
            matcher: Some(Box::new(matcher)),
            expectations: self.expectations.clone(),
        }
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = self
            .expectations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len();
        if remaining != 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

impl<S: ActorState> Default for MockClient<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a single expectation.
pub struct ExpectationBuilder<S: ActorState> {
    matcher: Option<Box<dyn Fn(&S::Request) -> bool + Send>>,
    expectations: Arc<Mutex<VecDeque<Expectation<S>>>>,
}

impl<S: ActorState> ExpectationBuilder<S> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, response: S::Response) {
        self.push(Ok(response));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: S::Error) {
        self.push(Err(error));
    }

    fn push(self, response: Result<S::Response, S::Error>) {
        self.expectations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(Expectation {
                matcher: self.matcher,
                response,
            });
    }
}

// =============================================================================
// LOW-LEVEL HELPERS
// =============================================================================

/// Creates a mock client and a receiver for asserting requests.
///
/// # Testing Strategy
/// In unit tests we don't want to spin up the real actor if we are just
/// testing *client* logic (request construction, response unpacking, error
/// mapping). The returned client sends to a channel we control; the test
/// inspects each request and answers it with whatever it wants to simulate.
pub fn create_mock_client<S: ActorState>(
    buffer_size: usize,
) -> (StateClient<S>, mpsc::Receiver<Envelope<S>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StateClient::new(sender), receiver)
}

/// Waits for the next request, skipping ticks. `None` once the channel closes.
pub async fn expect_request<S: ActorState>(
    receiver: &mut mpsc::Receiver<Envelope<S>>,
) -> Option<(S::Request, Response<S>)> {
    while let Some(envelope) = receiver.recv().await {
        if let Envelope::Request {
            request,
            respond_to,
        } = envelope
        {
            return Some((request, respond_to));
        }
    }
    None
}

/// Answers a request with a transport failure, as if the actor had gone away.
pub fn reply_closed<S: ActorState>(respond_to: Response<S>) {
    let _ = respond_to.send(Err(FrameworkError::ActorDropped.into()));
}

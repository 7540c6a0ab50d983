//! Port bridge between the application and the sign-in provider.
//!
//! The application sends sign-in options on the request port; the bridge
//! makes exactly one provider call per request and sends the outcome on the
//! result port. Failures travel as data in the result record, never as
//! panics, and there is no retry or timeout logic.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Port buffer depth. Sign-in attempts are serial, so this only has to
/// absorb requests queued while one is in flight.
const PORT_CAPACITY: usize = 16;

/// Caller-supplied options for the sign-in prompt, passed through to the
/// widget unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SignInOptions(pub serde_json::Value);

/// Authenticated session delivered on success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// User profile as returned by the provider
    pub profile: serde_json::Value,

    /// Access token
    pub token: String,
}

/// Error reported by the sign-in provider.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Sign-in failed: {details}")]
pub struct SignInError {
    /// Provider-supplied failure details
    pub details: String,
}

impl SignInError {
    pub fn new(details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
        }
    }
}

/// Result record delivered to the application.
///
/// Exactly one of `err` and `ok` is set; the other serializes as an
/// explicit `null` so the record always has both fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResult {
    pub err: Option<String>,
    pub ok: Option<Session>,
}

impl AuthResult {
    pub fn success(profile: serde_json::Value, token: impl Into<String>) -> Self {
        Self {
            err: None,
            ok: Some(Session {
                profile,
                token: token.into(),
            }),
        }
    }

    pub fn failure(details: impl Into<String>) -> Self {
        Self {
            err: Some(details.into()),
            ok: None,
        }
    }
}

/// The seam for the external authentication widget.
pub trait SignInProvider: Send + Sync {
    /// Provider identifier (e.g. "auth0")
    fn name(&self) -> &'static str;

    /// Show the sign-in prompt and resolve to a session or an error.
    ///
    /// Called once per request; the bridge never retries.
    fn sign_in(
        &self,
        options: &SignInOptions,
    ) -> impl std::future::Future<Output = Result<Session, SignInError>> + Send;
}

/// Application-side handles: send sign-in requests, receive results.
pub struct BridgePorts {
    pub requests: mpsc::Sender<SignInOptions>,
    pub results: mpsc::Receiver<AuthResult>,
}

/// Relay task connecting the ports to a provider.
pub struct AuthBridge<P> {
    provider: P,
    requests: mpsc::Receiver<SignInOptions>,
    results: mpsc::Sender<AuthResult>,
}

impl<P: SignInProvider> AuthBridge<P> {
    /// Create a bridge around a provider, returning the application-side
    /// port pair.
    pub fn new(provider: P) -> (Self, BridgePorts) {
        let (request_tx, request_rx) = mpsc::channel(PORT_CAPACITY);
        let (result_tx, result_rx) = mpsc::channel(PORT_CAPACITY);

        (
            Self {
                provider,
                requests: request_rx,
                results: result_tx,
            },
            BridgePorts {
                requests: request_tx,
                results: result_rx,
            },
        )
    }

    /// Run the relay until the application drops its ports.
    ///
    /// Requests are handled one at a time: a single outstanding provider
    /// call, resolved to exactly one of the two result shapes.
    pub async fn run(mut self) {
        while let Some(options) = self.requests.recv().await {
            let result = match self.provider.sign_in(&options).await {
                Ok(session) => {
                    tracing::debug!("Sign-in succeeded via {}", self.provider.name());
                    AuthResult {
                        err: None,
                        ok: Some(session),
                    }
                }
                Err(e) => {
                    tracing::debug!("Sign-in failed via {}: {}", self.provider.name(), e.details);
                    AuthResult::failure(e.details)
                }
            };

            if self.results.send(result).await.is_err() {
                // Application hung up
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Provider that replays a scripted sequence of outcomes.
    struct ScriptedProvider {
        outcomes: Mutex<VecDeque<Result<Session, SignInError>>>,
    }

    impl ScriptedProvider {
        fn new(outcomes: Vec<Result<Session, SignInError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
            }
        }
    }

    impl SignInProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn sign_in(
            &self,
            _options: &SignInOptions,
        ) -> Result<Session, SignInError> {
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected sign-in call")
        }
    }

    fn session() -> Session {
        Session {
            profile: serde_json::json!({"name": "Ada"}),
            token: "tok-123".to_string(),
        }
    }

    #[tokio::test]
    async fn success_is_forwarded_with_null_err() {
        let provider = ScriptedProvider::new(vec![Ok(session())]);
        let (bridge, mut ports) = AuthBridge::new(provider);
        tokio::spawn(bridge.run());

        ports.requests.send(SignInOptions::default()).await.unwrap();
        let result = ports.results.recv().await.unwrap();

        assert_eq!(result, AuthResult::success(serde_json::json!({"name": "Ada"}), "tok-123"));

        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"err":null,"ok":{"profile":{"name":"Ada"},"token":"tok-123"}}"#
        );
    }

    #[tokio::test]
    async fn failure_is_forwarded_with_null_ok() {
        let provider =
            ScriptedProvider::new(vec![Err(SignInError::new("invalid credentials"))]);
        let (bridge, mut ports) = AuthBridge::new(provider);
        tokio::spawn(bridge.run());

        ports.requests.send(SignInOptions::default()).await.unwrap();
        let result = ports.results.recv().await.unwrap();

        assert_eq!(result, AuthResult::failure("invalid credentials"));

        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"err":"invalid credentials","ok":null}"#);
    }

    #[tokio::test]
    async fn sequential_requests_are_answered_in_order() {
        let provider = ScriptedProvider::new(vec![
            Err(SignInError::new("popup closed")),
            Ok(session()),
        ]);
        let (bridge, mut ports) = AuthBridge::new(provider);
        tokio::spawn(bridge.run());

        ports.requests.send(SignInOptions::default()).await.unwrap();
        ports.requests.send(SignInOptions::default()).await.unwrap();

        let first = ports.results.recv().await.unwrap();
        let second = ports.results.recv().await.unwrap();

        assert_eq!(first.err.as_deref(), Some("popup closed"));
        assert!(first.ok.is_none());
        assert!(second.err.is_none());
        assert_eq!(second.ok.unwrap().token, "tok-123");
    }

    #[tokio::test]
    async fn relay_stops_when_application_hangs_up() {
        let provider = ScriptedProvider::new(vec![Ok(session())]);
        let (bridge, ports) = AuthBridge::new(provider);

        let requests = ports.requests.clone();
        drop(ports);

        let handle = tokio::spawn(bridge.run());
        requests.send(SignInOptions::default()).await.unwrap();
        drop(requests);

        // Run to completion: the send fails and the relay exits
        handle.await.unwrap();
    }

    #[test]
    fn options_pass_through_arbitrary_json() {
        let options = SignInOptions(serde_json::json!({
            "authParams": {"scope": "openid email"},
            "icon": "/img/logo.png",
        }));

        let json = serde_json::to_string(&options).unwrap();
        let back: SignInOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }
}

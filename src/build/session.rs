//! build::session
//!
//! One build session over a WebSocket.
//!
//! # State machine
//!
//! ```text
//! Connecting --connect--> Building --disconnect/close--> Closed (outcome)
//!     |                      |
//!     +--connect timer-------+--session timer / error--> Closed (error)
//! ```
//!
//! The connect timer and the session timer both start when the session is
//! opened. The connect timer is only armed while `Connecting`; the session
//! timer is pushed back on every liveness event. Whichever of the timers or
//! the channel wins a poll decides the terminal transition, and the socket is
//! closed on every path out of the loop.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use semver::Version;
use tokio::time::{sleep_until, timeout_at, Instant};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use super::protocol::{is_failure_action, start_build_frame, BuildEvent};
use super::BuildError;
use crate::core::config::Settings;
use crate::core::types::PublishTarget;
use crate::ui::output::Reporter;

/// Parameters sent to the build service when the session opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildParams {
    /// Clone URL of the remote repository.
    pub repo: String,
    /// Project name.
    pub name: String,
    /// Working branch to build.
    pub branch: String,
    pub version: Version,
    /// Build command, e.g. `npm run build`.
    pub build_cmd: String,
    /// Production release.
    pub prod: bool,
    pub target: PublishTarget,
}

impl BuildParams {
    /// Session URL: `base` with the parameters as its query string.
    ///
    /// # Example
    ///
    /// ```
    /// use semver::Version;
    /// use shipyard::build::BuildParams;
    /// use shipyard::core::types::PublishTarget;
    ///
    /// let params = BuildParams {
    ///     repo: "git@github.com:ada/widget.git".into(),
    ///     name: "widget".into(),
    ///     branch: "dev/1.0.0".into(),
    ///     version: Version::new(1, 0, 0),
    ///     build_cmd: "npm run build".into(),
    ///     prod: false,
    ///     target: PublishTarget::Oss,
    /// };
    /// let url = params.session_url("ws://127.0.0.1:7001").unwrap();
    /// assert!(url.as_str().contains("branch=dev%2F1.0.0"));
    /// ```
    pub fn session_url(&self, base: &str) -> Result<Url, BuildError> {
        let mut url = Url::parse(base).map_err(|e| BuildError::InvalidUrl {
            url: base.to_string(),
            message: e.to_string(),
        })?;
        match url.scheme() {
            "ws" | "wss" => {}
            other => {
                return Err(BuildError::InvalidUrl {
                    url: base.to_string(),
                    message: format!("unsupported scheme '{}'", other),
                })
            }
        }
        url.query_pairs_mut()
            .append_pair("repo", &self.repo)
            .append_pair("name", &self.name)
            .append_pair("branch", &self.branch)
            .append_pair("version", &self.version.to_string())
            .append_pair("buildCmd", &self.build_cmd)
            .append_pair("prod", if self.prod { "true" } else { "false" })
            .append_pair("type", self.target.as_str());
        Ok(url)
    }
}

/// The two session timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimeouts {
    /// Time allowed for the handshake and the `connect` event.
    pub connect: Duration,
    /// Maximum silence once the session is open.
    pub session: Duration,
}

impl SessionTimeouts {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            connect: settings.connect_timeout(),
            session: settings.session_timeout(),
        }
    }
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            session: Duration::from_secs(5 * 60),
        }
    }
}

/// Session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Building { session_id: String },
    Closed,
}

/// Terminal result of a session that ended with a disconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub success: bool,
    /// Id assigned by the service; `None` if it disconnected before `connect`.
    pub session_id: Option<String>,
    /// Failure actions seen during the session, in order.
    pub failures: Vec<String>,
}

enum Wake {
    ConnectTimer,
    SessionTimer,
    Frame(Option<Result<Message, tokio_tungstenite::tungstenite::Error>>),
}

enum Step {
    Continue,
    StartBuild,
    Finish(Result<BuildOutcome, BuildError>),
}

/// One build session.
#[derive(Debug)]
pub struct BuildSession {
    url: Url,
    timeouts: SessionTimeouts,
    state: SessionState,
    failures: Vec<String>,
}

impl BuildSession {
    pub fn new(
        base: &str,
        params: &BuildParams,
        timeouts: SessionTimeouts,
    ) -> Result<Self, BuildError> {
        Ok(Self {
            url: params.session_url(base)?,
            timeouts,
            state: SessionState::Connecting,
            failures: Vec::new(),
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    fn session_id(&self) -> Option<&str> {
        match &self.state {
            SessionState::Building { session_id } => Some(session_id),
            _ => None,
        }
    }

    /// Run the session to its terminal transition.
    pub async fn run(mut self, reporter: &dyn Reporter) -> Result<BuildOutcome, BuildError> {
        let started = Instant::now();
        let connect_deadline = started + self.timeouts.connect;

        tracing::info!(host = self.url.host_str().unwrap_or_default(), "opening build session");
        reporter.stage("Connecting to the build service");

        let (mut socket, _) = match timeout_at(connect_deadline, connect_async(self.url.as_str()))
            .await
        {
            Err(_) => {
                self.state = SessionState::Closed;
                return Err(BuildError::ConnectTimeout(self.timeouts.connect));
            }
            Ok(Err(e)) => {
                self.state = SessionState::Closed;
                return Err(BuildError::Connect(e.to_string()));
            }
            Ok(Ok(pair)) => pair,
        };

        let connect_timer = sleep_until(connect_deadline);
        let session_timer = sleep_until(started + self.timeouts.session);
        tokio::pin!(connect_timer);
        tokio::pin!(session_timer);

        let result = loop {
            let connecting = self.state == SessionState::Connecting;
            let wake = tokio::select! {
                _ = &mut connect_timer, if connecting => Wake::ConnectTimer,
                _ = &mut session_timer => Wake::SessionTimer,
                frame = socket.next() => Wake::Frame(frame),
            };

            let step = match wake {
                Wake::ConnectTimer => {
                    Step::Finish(Err(BuildError::ConnectTimeout(self.timeouts.connect)))
                }
                Wake::SessionTimer => {
                    Step::Finish(Err(BuildError::SessionTimeout(self.timeouts.session)))
                }
                Wake::Frame(None) | Wake::Frame(Some(Ok(Message::Close(_)))) => {
                    Step::Finish(Ok(self.disconnected()))
                }
                Wake::Frame(Some(Err(e))) => Step::Finish(Err(BuildError::Transport(e.to_string()))),
                Wake::Frame(Some(Ok(Message::Text(text)))) => {
                    match BuildEvent::parse(&text, self.session_id()) {
                        Some(event) => {
                            if event.is_liveness() {
                                session_timer
                                    .as_mut()
                                    .reset(Instant::now() + self.timeouts.session);
                            }
                            self.handle(event, reporter)
                        }
                        None => {
                            tracing::warn!(frame = %text, "ignoring malformed frame");
                            Step::Continue
                        }
                    }
                }
                Wake::Frame(Some(Ok(_))) => Step::Continue,
            };

            match step {
                Step::Continue => {}
                Step::StartBuild => {
                    if let Err(e) = socket.send(Message::Text(start_build_frame())).await {
                        break Err(BuildError::Transport(e.to_string()));
                    }
                }
                Step::Finish(result) => break result,
            }
        };

        self.state = SessionState::Closed;
        if let Err(e) = socket.close(None).await {
            tracing::debug!(error = %e, "closing build channel");
        }

        match &result {
            Ok(outcome) => tracing::info!(success = outcome.success, "build session finished"),
            Err(e) => tracing::error!(error = %e, "build session aborted"),
        }
        result
    }

    fn handle(&mut self, event: BuildEvent, reporter: &dyn Reporter) -> Step {
        match event {
            BuildEvent::Connect { id } => {
                if self.state != SessionState::Connecting {
                    tracing::debug!(id = %id, "ignoring repeated connect");
                    return Step::Continue;
                }
                tracing::info!(session = %id, "build session connected");
                reporter.success("Build session", &id);
                self.state = SessionState::Building { session_id: id };
                Step::StartBuild
            }
            BuildEvent::Progress { action, message } => {
                if is_failure_action(&action) {
                    tracing::error!(action = %action, message = %message, "build step failed");
                    reporter.failure(&action, &message);
                    self.failures.push(action);
                } else {
                    tracing::info!(action = %action, message = %message, "build progress");
                    reporter.success(&action, &message);
                }
                Step::Continue
            }
            BuildEvent::Disconnect => Step::Finish(Ok(self.disconnected())),
            BuildEvent::Error { message } => {
                reporter.failure("Build service", &message);
                Step::Finish(Err(BuildError::Remote(message)))
            }
            BuildEvent::Other { event } => {
                tracing::debug!(event = %event, "ignoring unknown event");
                Step::Continue
            }
        }
    }

    fn disconnected(&self) -> BuildOutcome {
        let session_id = self.session_id().map(str::to_string);
        BuildOutcome {
            success: session_id.is_some() && self.failures.is_empty(),
            session_id,
            failures: self.failures.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::output::{Report, RecordingReporter};

    fn params() -> BuildParams {
        BuildParams {
            repo: "git@gitee.com:ada/widget.git".into(),
            name: "widget".into(),
            branch: "dev/1.2.0".into(),
            version: Version::new(1, 2, 0),
            build_cmd: "npm run build".into(),
            prod: true,
            target: PublishTarget::Oss,
        }
    }

    fn session() -> BuildSession {
        BuildSession::new("ws://127.0.0.1:7001", &params(), SessionTimeouts::default()).unwrap()
    }

    mod query {
        use super::*;

        #[test]
        fn carries_every_parameter() {
            let url = params().session_url("ws://build.test:7001/").unwrap();
            let pairs: Vec<(String, String)> = url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            assert_eq!(
                pairs,
                vec![
                    ("repo".into(), "git@gitee.com:ada/widget.git".into()),
                    ("name".into(), "widget".into()),
                    ("branch".into(), "dev/1.2.0".into()),
                    ("version".into(), "1.2.0".into()),
                    ("buildCmd".into(), "npm run build".into()),
                    ("prod".into(), "true".into()),
                    ("type".into(), "oss".into()),
                ]
            );
        }

        #[test]
        fn rejects_http_and_garbage() {
            assert!(matches!(
                params().session_url("http://build.test"),
                Err(BuildError::InvalidUrl { .. })
            ));
            assert!(params().session_url("not a url").is_err());
        }
    }

    mod transitions {
        use super::*;

        #[test]
        fn connect_moves_to_building_and_starts_build() {
            let mut s = session();
            let reporter = RecordingReporter::new();
            let step = s.handle(BuildEvent::Connect { id: "s1".into() }, &reporter);
            assert!(matches!(step, Step::StartBuild));
            assert_eq!(
                s.state(),
                &SessionState::Building {
                    session_id: "s1".into()
                }
            );

            let again = s.handle(BuildEvent::Connect { id: "s2".into() }, &reporter);
            assert!(matches!(again, Step::Continue));
            assert_eq!(s.session_id(), Some("s1"));
        }

        #[test]
        fn failure_action_does_not_finish() {
            let mut s = session();
            let reporter = RecordingReporter::new();
            s.handle(BuildEvent::Connect { id: "s1".into() }, &reporter);
            let step = s.handle(
                BuildEvent::Progress {
                    action: "build failed".into(),
                    message: "exit 1".into(),
                },
                &reporter,
            );
            assert!(matches!(step, Step::Continue));

            match s.handle(BuildEvent::Disconnect, &reporter) {
                Step::Finish(Ok(outcome)) => {
                    assert!(!outcome.success);
                    assert_eq!(outcome.failures, vec!["build failed".to_string()]);
                }
                _ => panic!("expected a finished outcome"),
            }
            assert!(reporter
                .events()
                .contains(&Report::Failure("build failed".into(), "exit 1".into())));
        }

        #[test]
        fn clean_disconnect_is_success() {
            let mut s = session();
            let reporter = RecordingReporter::new();
            s.handle(BuildEvent::Connect { id: "s1".into() }, &reporter);
            s.handle(
                BuildEvent::Progress {
                    action: "publish success".into(),
                    message: "done".into(),
                },
                &reporter,
            );
            let outcome = s.disconnected();
            assert!(outcome.success);
            assert_eq!(outcome.session_id.as_deref(), Some("s1"));
        }

        #[test]
        fn disconnect_before_connect_is_failure() {
            let s = session();
            let outcome = s.disconnected();
            assert!(!outcome.success);
            assert_eq!(outcome.session_id, None);
        }

        #[test]
        fn error_event_is_terminal() {
            let mut s = session();
            let reporter = RecordingReporter::new();
            match s.handle(
                BuildEvent::Error {
                    message: "queue full".into(),
                },
                &reporter,
            ) {
                Step::Finish(Err(BuildError::Remote(m))) => assert_eq!(m, "queue full"),
                _ => panic!("expected a remote error"),
            }
        }
    }

    #[test]
    fn timeouts_from_settings() {
        let timeouts = SessionTimeouts::from_settings(&Settings::default());
        assert_eq!(timeouts, SessionTimeouts::default());
    }
}

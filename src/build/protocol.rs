//! build::protocol
//!
//! Build service wire format.
//!
//! Every frame is a JSON text message `{"event": "<name>", "data": <json>}`.
//!
//! | Event | Direction | Data |
//! |-------|-----------|------|
//! | `connect` | server | `{"id": "<session id>"}` |
//! | `build`, `building` | server | `{"action": "...", "payload": {"message": "..."}}` |
//! | `disconnect` | server | ignored |
//! | `error` | server | `{"message": "..."}` |
//! | `build` | client | none; starts the build |
//!
//! The server may also address progress to an event named after the
//! session id; those frames are treated like `building`.

use serde::Deserialize;
use serde_json::Value;

/// Progress actions that mark the build as failed.
pub const FAILED_ACTIONS: &[&str] = &[
    "prepare failed",
    "download failed",
    "install failed",
    "build failed",
    "pre-publish failed",
    "publish failed",
];

/// Whether a progress action marks the build as failed.
///
/// # Example
///
/// ```
/// use shipyard::build::protocol::is_failure_action;
///
/// assert!(is_failure_action("build failed"));
/// assert!(!is_failure_action("build success"));
/// ```
pub fn is_failure_action(action: &str) -> bool {
    FAILED_ACTIONS.contains(&action)
}

#[derive(Debug, Deserialize)]
struct Frame {
    event: String,
    #[serde(default)]
    data: Value,
}

/// An inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// The server assigned a session.
    Connect { id: String },
    /// A progress message.
    Progress { action: String, message: String },
    /// The server ended the session.
    Disconnect,
    /// The server reported a terminal error.
    Error { message: String },
    /// Any other event name.
    Other { event: String },
}

impl BuildEvent {
    /// Parse a text frame.
    ///
    /// `session_id` is the id assigned by an earlier `connect`, if any.
    /// Returns `None` for frames that are not valid JSON frames, and for a
    /// `connect` without a session id.
    pub fn parse(text: &str, session_id: Option<&str>) -> Option<Self> {
        let frame: Frame = serde_json::from_str(text).ok()?;
        let data = &frame.data;

        Some(match frame.event.as_str() {
            "connect" => {
                let id = str_at(data, "/id");
                if id.is_empty() {
                    return None;
                }
                BuildEvent::Connect { id }
            }
            "disconnect" => BuildEvent::Disconnect,
            "error" => BuildEvent::Error {
                message: match data {
                    Value::String(s) => s.clone(),
                    _ => str_at(data, "/message"),
                },
            },
            "build" | "building" => Self::progress(data),
            other if Some(other) == session_id => Self::progress(data),
            other => BuildEvent::Other {
                event: other.to_string(),
            },
        })
    }

    fn progress(data: &Value) -> Self {
        BuildEvent::Progress {
            action: str_at(data, "/action"),
            message: str_at(data, "/payload/message"),
        }
    }

    /// Whether the event suggests the build service is alive.
    pub fn is_liveness(&self) -> bool {
        matches!(self, BuildEvent::Connect { .. } | BuildEvent::Progress { .. })
    }
}

/// String at `pointer` in `data`, or empty when absent or not a string.
fn str_at(data: &Value, pointer: &str) -> String {
    data.pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// The frame a client sends to start the build after `connect`.
pub fn start_build_frame() -> String {
    serde_json::json!({ "event": "build" }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_connect() {
        let event = BuildEvent::parse(r#"{"event":"connect","data":{"id":"abc"}}"#, None);
        assert_eq!(event, Some(BuildEvent::Connect { id: "abc".into() }));
    }

    #[test]
    fn connect_without_id_is_malformed() {
        assert_eq!(BuildEvent::parse(r#"{"event":"connect","data":{}}"#, None), None);
        assert_eq!(BuildEvent::parse(r#"{"event":"connect"}"#, None), None);
        assert_eq!(
            BuildEvent::parse(r#"{"event":"connect","data":{"id":""}}"#, None),
            None
        );
        assert_eq!(
            BuildEvent::parse(r#"{"event":"connect","data":{"id":7}}"#, None),
            None
        );
    }

    #[test]
    fn parses_progress_with_nested_message() {
        let text = r#"{"event":"build","data":{"action":"install","payload":{"message":"npm install"}}}"#;
        assert_eq!(
            BuildEvent::parse(text, None),
            Some(BuildEvent::Progress {
                action: "install".into(),
                message: "npm install".into()
            })
        );
    }

    #[test]
    fn building_without_payload_has_empty_message() {
        let text = r#"{"event":"building","data":{"action":"build"}}"#;
        assert_eq!(
            BuildEvent::parse(text, None),
            Some(BuildEvent::Progress {
                action: "build".into(),
                message: String::new()
            })
        );
    }

    #[test]
    fn session_id_event_is_progress() {
        let text = r#"{"event":"abc","data":{"action":"prepare","payload":{"message":"ok"}}}"#;
        assert!(matches!(
            BuildEvent::parse(text, Some("abc")),
            Some(BuildEvent::Progress { .. })
        ));
        assert_eq!(
            BuildEvent::parse(text, None),
            Some(BuildEvent::Other {
                event: "abc".into()
            })
        );
    }

    #[test]
    fn parses_error_forms() {
        assert_eq!(
            BuildEvent::parse(r#"{"event":"error","data":{"message":"boom"}}"#, None),
            Some(BuildEvent::Error {
                message: "boom".into()
            })
        );
        assert_eq!(
            BuildEvent::parse(r#"{"event":"error","data":"boom"}"#, None),
            Some(BuildEvent::Error {
                message: "boom".into()
            })
        );
    }

    #[test]
    fn disconnect_without_data() {
        assert_eq!(
            BuildEvent::parse(r#"{"event":"disconnect"}"#, None),
            Some(BuildEvent::Disconnect)
        );
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(BuildEvent::parse("hello", None), None);
        assert_eq!(BuildEvent::parse(r#"{"data":{}}"#, None), None);
    }

    #[test]
    fn failure_actions() {
        for action in FAILED_ACTIONS {
            assert!(is_failure_action(action));
        }
        assert!(!is_failure_action("publish success"));
        assert!(!is_failure_action(""));
    }

    #[test]
    fn liveness() {
        assert!(BuildEvent::Connect { id: "x".into() }.is_liveness());
        assert!(!BuildEvent::Disconnect.is_liveness());
    }

    #[test]
    fn start_frame() {
        let v: Value = serde_json::from_str(&start_build_frame()).unwrap();
        assert_eq!(v["event"], "build");
    }
}

//! Defines the WebSocket communication protocol between client and server.
//!
//! All messages are JSON objects tagged by a `type` field. The client drives
//! the session with two messages; everything else flows server to client.

use serde::{Deserialize, Serialize};
use wardsim_core::engine::MessageKind;
use wardsim_core::result::SimulationResult;
use wardsim_core::scenario::Scenario;

/// Messages sent from the client to the server.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Begin (or restart) playback of a scenario.
    Start { scenario_id: String },
    /// Submit the learner's answer to the current nurse prompt.
    Submit { text: String },
}

/// Messages sent from the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Playback has begun; carries the full scenario for client display.
    Started { scenario: Scenario },
    /// A scripted or echoed chat message to render.
    Message { kind: MessageKind, text: String },
    /// The input box should unlock; the learner is expected to answer.
    AwaitingInput,
    /// The input box should lock while scripted playback continues.
    InputLocked,
    /// One second of countdown has elapsed.
    TimerTick { remaining_seconds: u32 },
    /// Show or hide the countdown display.
    TimerVisibility { visible: bool },
    /// The session finished; carries the graded outcome.
    SessionComplete { result: SimulationResult },
    /// Something went wrong; the session may continue or be restarted.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_deserialization() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "start", "scenario_id": "chest-pain-assessment"}"#)
                .unwrap();
        assert!(matches!(
            msg,
            ClientMessage::Start { scenario_id } if scenario_id == "chest-pain-assessment"
        ));

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "submit", "text": "I will check your vitals"}"#)
                .unwrap();
        assert!(matches!(
            msg,
            ClientMessage::Submit { text } if text == "I will check your vitals"
        ));
    }

    #[test]
    fn test_unknown_client_message_rejected() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type": "reboot", "text": "now"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_server_message_serialization() {
        let msg = ServerMessage::Message {
            kind: MessageKind::Patient,
            text: "My chest hurts.".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"type":"message","kind":"patient","text":"My chest hurts."}"#
        );

        let msg = ServerMessage::TimerTick {
            remaining_seconds: 42,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"timer_tick","remaining_seconds":42}"#);

        let json = serde_json::to_string(&ServerMessage::AwaitingInput).unwrap();
        assert_eq!(json, r#"{"type":"awaiting_input"}"#);
    }
}

//! WebSocket event DTOs for the communication hub.
//!
//! One tagged enum per direction; the `type` field carries the kebab-case
//! event name. Signals are `serde_json::Value` and pass through untouched.

use serde::{Deserialize, Serialize};

use crate::domain::{
    ChatMessageRecord, MessageBody, NotificationRecord, RoomStatus, SignalPayload,
};

/// Inbound events, client -> hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Bind this transport to a member identity
    RegisterMember { identity: String },
    /// Bind this transport to a coach identity
    RegisterCoach { identity: String },
    /// Bind this transport to an operator identity
    RegisterOperator { identity: String },
    /// Start watching a user's online status
    SubscribeStatus { target_id: String },
    /// Stop watching a user's online status
    UnsubscribeStatus { target_id: String },
    /// Send a point-to-point chat message
    PrivateMessage { to_id: String, body: MessageBody },
    /// Join the video room of a booked session
    JoinVideoRoom {
        session_id: String,
        participant_id: String,
        display_name: String,
    },
    /// Leave the video room of a booked session
    LeaveVideoRoom { session_id: String },
    /// Relay an offer/ICE blob to a room peer
    SendSignal {
        session_id: String,
        to_connection: String,
        signal: SignalPayload,
    },
    /// Relay an answer blob back to a room peer
    ReturnSignal {
        session_id: String,
        to_connection: String,
        signal: SignalPayload,
    },
}

/// Roster entry carried by `room-joined`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomMemberInfo {
    pub connection_id: String,
    pub participant_id: String,
    pub display_name: String,
}

/// Machine-readable error codes surfaced to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    /// Operation attempted before `register-<role>` on this transport
    NotRegistered,
    /// Join or signal against an ended session
    SessionEnded,
    /// Malformed or invalid event payload
    InvalidPayload,
    /// Chat persistence failed; the message was not relayed
    DeliveryFailed,
}

/// Outbound events, hub -> client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Registration acknowledgement carrying the client's connection ref
    Registered {
        connection_id: String,
        role: String,
        registered_at: i64,
    },
    /// Presence transition of a watched user
    UserStatusChange { target_id: String, is_online: bool },
    /// Echo of the persisted record back to the sender
    MessageSent { message: ChatMessageRecord },
    /// Persisted chat record relayed to the recipient
    ReceiveMessage { message: ChatMessageRecord },
    /// Persisted notification relayed to the recipient
    NewNotification { notification: NotificationRecord },
    /// Join acknowledgement with the current roster
    RoomJoined {
        session_id: String,
        status: RoomStatus,
        connection_id: String,
        members: Vec<RoomMemberInfo>,
    },
    /// A newcomer joined the room; the receiving member initiates its offer
    UserJoined {
        connection_id: String,
        participant_id: String,
        display_name: String,
    },
    /// A member left the room (explicitly or by disconnect)
    UserLeft {
        connection_id: String,
        participant_id: String,
    },
    /// Offer/ICE blob relayed from a peer
    ReceiveSignal {
        from_connection: String,
        signal: SignalPayload,
    },
    /// Answer blob relayed back from a peer
    ReceivingReturnedSignal {
        from_connection: String,
        signal: SignalPayload,
    },
    /// Rejected operation or delivery failure
    Error { code: ErrorCode, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_tags_are_kebab_case() {
        // テスト項目: イベント名が仕様のワイヤ名どおりに serialize される
        let event = ClientEvent::JoinVideoRoom {
            session_id: "S1".to_string(),
            participant_id: "alice".to_string(),
            display_name: "Alice".to_string(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(json["type"], "join-video-room");
    }

    #[test]
    fn test_register_events_parse() {
        // テスト項目: register-<role> がそれぞれの variant に deserialize される
        let member: ClientEvent =
            serde_json::from_str(r#"{"type":"register-member","identity":"alice"}"#).unwrap();
        assert!(matches!(member, ClientEvent::RegisterMember { .. }));

        let coach: ClientEvent =
            serde_json::from_str(r#"{"type":"register-coach","identity":"coach-1"}"#).unwrap();
        assert!(matches!(coach, ClientEvent::RegisterCoach { .. }));

        let operator: ClientEvent =
            serde_json::from_str(r#"{"type":"register-operator","identity":"ops"}"#).unwrap();
        assert!(matches!(operator, ClientEvent::RegisterOperator { .. }));
    }

    #[test]
    fn test_signal_payload_roundtrips_verbatim() {
        // テスト項目: signal は opaque なまま往復する
        let raw = r#"{"type":"send-signal","session_id":"S1","to_connection":"c1","signal":{"sdp":"v=0","nested":[1,2,3]}}"#;
        let event: ClientEvent = serde_json::from_str(raw).unwrap();
        let ClientEvent::SendSignal { signal, .. } = &event else {
            panic!("expected send-signal");
        };
        assert_eq!(signal.as_value()["nested"][2], 3);
    }

    #[test]
    fn test_server_event_receiving_returned_signal_tag() {
        let event = ServerEvent::ReceivingReturnedSignal {
            from_connection: "c1".to_string(),
            signal: SignalPayload::new(serde_json::json!({"sdp": "answer"})),
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(json["type"], "receiving-returned-signal");
    }

    #[test]
    fn test_error_code_wire_names() {
        let json = serde_json::to_string(&ErrorCode::SessionEnded).unwrap();
        assert_eq!(json, r#""session-ended""#);
    }
}

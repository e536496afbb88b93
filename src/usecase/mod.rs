//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。
//!
//! 各 UseCase は「どの接続に何を届けるか」の配信計画を返すだけで、
//! 実際のチャンネル送信は UI 層が行います。collaborator 呼び出しは
//! 全てロックの外で await されます。

pub mod disconnect;
pub mod error;
pub mod join_room;
pub mod leave_room;
pub mod push_notification;
pub mod register_connection;
pub mod relay_signal;
pub mod send_message;
pub mod session_status;
pub mod watch_status;

pub use disconnect::{DisconnectOutcome, DisconnectUseCase, RoomDeparture};
pub use error::SendMessageError;
pub use join_room::{JoinRoomOutcome, JoinRoomUseCase};
pub use leave_room::LeaveRoomUseCase;
pub use push_notification::PushNotificationUseCase;
pub use register_connection::{PresenceUpdate, RegisterConnectionOutcome, RegisterConnectionUseCase};
pub use relay_signal::RelaySignalUseCase;
pub use send_message::{SendMessageOutcome, SendMessageUseCase};
pub use session_status::SessionStatusUseCase;
pub use watch_status::WatchStatusUseCase;

mod participant;
mod room;
mod signaling;

pub use participant::{ConnectionId, ParticipantId};
pub use room::RoomId;
pub use signaling::{ClientEvent, ServerEvent};

mod room;
mod room_command;
mod room_manager;
mod sessions;

pub use room::*;
pub use room_command::*;
pub use room_manager::*;
pub use sessions::*;

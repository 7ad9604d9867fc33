pub mod engagement;
pub mod error;
pub mod persistence;
pub mod room;
pub mod signaling;

pub use engagement::*;
pub use error::*;
pub use persistence::*;
pub use room::*;
pub use signaling::*;

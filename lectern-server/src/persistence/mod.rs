mod gateway;
mod memory;

pub use gateway::*;
pub use memory::*;

mod scorer;
mod sweep;

pub use scorer::*;
pub use sweep::*;

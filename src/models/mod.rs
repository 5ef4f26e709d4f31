pub mod common;
pub mod events;
pub mod generation;

pub use common::*;
pub use events::*;
pub use generation::*;

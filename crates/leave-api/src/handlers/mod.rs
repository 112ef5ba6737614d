//! API request handlers.

pub mod health;
pub mod leave;
pub mod telegram;

pub use health::*;
pub use leave::*;
pub use telegram::*;

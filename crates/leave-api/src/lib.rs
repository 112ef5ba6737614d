//! HTTP surface of the leave bot.
//!
//! - `POST /telegram/webhook`: Bot API updates into the webhook pipeline
//! - `POST /telegram/setup-user`: admin account-link bootstrap
//! - `/api/...`: leave request endpoints for the web app
//!
//! # Example
//!
//! ```ignore
//! use leave_api::{serve, ApiConfig, AppState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = AppState::assemble(/* ... */);
//!     serve(ApiConfig::default(), state).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod types;

pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use router::{create_router, serve};
pub use state::AppState;

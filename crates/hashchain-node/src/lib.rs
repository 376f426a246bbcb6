//! HTTP shell around a single injected [`hashchain_core::Ledger`].

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::Args;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;

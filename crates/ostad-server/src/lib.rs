pub mod admin;
pub mod aggregation;
pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod rollup;
pub mod server;
pub mod state;

pub use config::AppConfig;
pub use server::{OstadServer, ServerBuilder, build_app};
pub use state::AppState;

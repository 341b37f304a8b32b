//! HTTP relay that answers queries either with a local single-turn model
//! chain or by streaming a run of a hosted agent graph.

pub mod chain;
pub mod config;
pub mod error;
pub mod graph;
pub mod handlers;
pub mod input_types;
pub mod logging;
pub mod output_types;
pub mod processor;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;

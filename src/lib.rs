pub mod app;
pub mod config;
pub mod curves;
pub mod error;
pub mod errors;
pub mod handlers;
pub mod ingest;
pub mod models;
pub mod network;
pub mod seasonality;
pub mod seeds;
pub mod state;
pub mod summary;
pub mod timeline;
pub mod trend;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use error::{Result, SimError};
pub use state::AppState;

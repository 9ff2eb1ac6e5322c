pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub mod favorites;
pub mod notifications;
pub mod profiles;
pub mod reports;
pub mod requests;
pub mod votes;

pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, AppStateInner};

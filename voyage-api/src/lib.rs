pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{router, run};
pub use state::ApiState;

mod error;
pub mod models;
mod pages;
mod server;
pub mod services;
pub mod state;
mod validation;

pub use error::ApiError;
pub use pages::escape_html;
pub use server::{build_router, run};
pub use validation::{FormValidationError, validate_form};

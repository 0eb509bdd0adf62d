// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Estate, NewEstate};
pub use requests::{CreateEstateRequest, PageParams};
pub use responses::{ErrorResponse, HealthResponse};

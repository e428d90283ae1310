pub mod handlers;
pub mod questions;
pub mod routes;

pub use routes::survey_routes;

pub mod handlers;
pub mod openai;
pub mod rate_limit;
pub mod routes;

pub use openai::AssistantClient;
pub use rate_limit::AssistantRateLimits;
pub use routes::assistant_routes;

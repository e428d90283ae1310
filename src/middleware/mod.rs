pub mod tracing;

pub use self::tracing::{client_ip, observability_middleware};

mod response;

#[allow(unused)]
pub use response::*;

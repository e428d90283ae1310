pub mod assistant;
pub mod survey;

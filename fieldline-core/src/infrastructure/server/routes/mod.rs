pub mod context;
pub mod integrations;
pub mod tools;

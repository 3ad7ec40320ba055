pub mod context;
pub mod freshness;
pub mod invoke;
pub mod log;
pub mod parser;

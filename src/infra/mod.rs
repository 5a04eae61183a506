pub mod dataset;
pub mod query;
pub mod session;
pub mod terminal;

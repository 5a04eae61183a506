pub mod chart;
pub mod models;
pub mod scoring;
pub mod text;

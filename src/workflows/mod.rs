pub mod controller;
pub mod debounce;
pub mod page;
pub mod projector;
pub mod search;

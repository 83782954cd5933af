pub mod location;
pub mod service;

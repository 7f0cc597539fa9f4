pub mod error;
pub mod models;
pub mod ports;
pub mod repo;
pub mod service;

// Library module for the JWKS simulator

pub mod clock;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod expiry;
pub mod jwks;
pub mod key_management;
pub mod server;
pub mod store;
pub mod token;
pub mod types;

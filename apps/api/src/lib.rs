pub mod config;
pub mod contact;
pub mod content;
pub mod errors;
pub mod routes;
pub mod state;

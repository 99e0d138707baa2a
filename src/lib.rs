pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod paths;
pub mod quiz;
pub mod routes;
pub mod session;
pub mod state;
pub mod study;

#[cfg(test)]
pub mod testing;

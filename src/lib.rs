pub mod access_control;
pub mod adapters;
pub mod app_config;
pub mod cancel;
pub mod commands;
pub mod db;
pub mod documents;
pub mod entities;
mod error;
pub use error::{Error, Result};
pub mod http;
pub mod ports;
pub mod queries;
pub mod users;

#[cfg(test)]
mod test_utils;

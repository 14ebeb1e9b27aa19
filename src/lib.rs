//! Ghost Factory dashboard server - data API and metrics intake

pub mod auth;
pub mod config;
pub mod ledger;
pub mod metrics;
pub mod server;

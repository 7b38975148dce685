//! Roommate Chat - real-time direct messaging between roommates
//!
//! Users connect over WebSocket, send each other messages that are stored
//! durably and relayed live to every open session of the recipient, and
//! query their conversation list and history over HTTP.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

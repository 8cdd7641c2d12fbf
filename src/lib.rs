//! # Diameter
//!
//! Rust implementation of the Diameter Base Protocol.
//!
//! ## Reference
//! Based on [RFC 6733](https://tools.ietf.org/html/rfc6733), with Credit-Control
//! (RFC 4006) and Accounting as worked application-layer examples on top of
//! the base protocol.
//!
//! ## Examples
//! See `demos/client.rs` and `demos/server.rs` for a minimal client/server
//! pair built on [`transport::DiameterClient`] and [`transport::DiameterServer`].

pub mod avp;
pub mod commands;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod message;
pub mod node;
pub mod peer;
pub mod result_code;
pub mod session;
pub mod transport;

pub use crate::error::{Error, Result};
pub use crate::message::{command_codes, application_ids, flags, CommandFlags, DiameterHeader, DiameterMessage};
pub use crate::node::Node;

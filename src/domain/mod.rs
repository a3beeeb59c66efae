//! Value types and ports of the gateway adapter. Nothing in here performs I/O.

pub mod basket;
pub mod card;
pub mod config;
pub mod context;
pub mod customer;
pub mod money;
pub mod ports;
pub mod request;
pub mod response;
pub mod result;

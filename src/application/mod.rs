//! Application layer: the gateway adapter and the steps it is made of.
//!
//! `GatewayAdapter` is the entry point. Each operation loads what it needs
//! from the host, builds one vendor request, awaits one reply and turns it
//! into a host-shaped result.

pub mod callback;
pub mod gateway;
pub mod interpreter;
pub mod params;
pub mod request_builder;

//! Surfaces the billing host talks to: module metadata, the settings form and
//! the JSON envelope each call arrives in.

pub mod host;

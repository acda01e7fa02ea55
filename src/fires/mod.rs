//! Fires math used by the front end and checked against model answers

pub mod salvo;

pub use salvo::{cumulative_pk, hughes_exchange, rounds_required, SalvoExchange, SalvoForce};

//! Domain layer: the payment entity, its state machine, and the ports the
//! application layer depends on.

pub mod payment;
pub mod ports;

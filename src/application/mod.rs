//! Application layer containing the payment lifecycle orchestration.
//!
//! This module defines the `PaymentController`, the entry point callers use to
//! create payments and move them through their lifecycle. It coordinates the
//! domain state machine with the repository and gateway ports.

pub mod controller;

//! Base types and error handling.
//!
//! Provides foundational types shared by every exchange:
//! - [`NetError`](neterror::NetError): construction, transmission and transport errors
//! - [`Context`](cancel::Context): deadline and cancellation carried by a request

pub mod cancel;
pub mod context;
pub mod neterror;

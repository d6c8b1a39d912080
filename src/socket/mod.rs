//! Socket handling.
//!
//! - [`udp`]: UDP socket with a read deadline that can move mid-read
//! - [`config`]: socket options and exchange timing

pub mod config;
pub mod udp;

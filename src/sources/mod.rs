//! One crawler per museum website. Every crawler follows the same two-phase
//! shape: discover the exhibition detail addresses, then fetch and parse
//! each one, absorbing per-item failures.

pub mod parse;

pub mod fubon;
pub mod huashan;
pub mod moca;
pub mod npm;
pub mod ntnu;
pub mod songshan;
pub mod tfam;

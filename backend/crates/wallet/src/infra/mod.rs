//! Infrastructure Layer

pub mod midtrans;
pub mod postgres;

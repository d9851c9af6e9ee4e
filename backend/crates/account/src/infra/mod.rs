//! Infrastructure Layer

pub mod ledger;
pub mod postgres;

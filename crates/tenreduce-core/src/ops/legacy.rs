//! Operators kept compatible with the legacy op-number calling convention

pub mod reduce_bool;

pub use reduce_bool::LegacyReduceBoolOp;

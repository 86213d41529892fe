//! Boolean reduction building blocks
//!
//! - **common**: axis normalization and scalar/axis path classification
//! - **tad**: sub-array (TAD) planning over a strided source
//! - **kernels**: the boolean reduce ops and the kernel contract

pub mod common;
pub mod kernels;
pub mod tad;

pub use common::{
    is_reduce_all, normalize_axes, normalize_axis, AxisSet, AxisSource, ReductionRequest,
    REDUCE_ALL_SENTINEL,
};
pub use kernels::{BoolElement, BoolReduceOp, Combine, CpuReduceBoolKernel, ReduceBoolKernel};
pub use tad::{strided_offsets, TadPlan};

//! Boolean reductions over strided n-dimensional arrays.
//!
//! The entry point is [`LegacyReduceBoolOp`], which reduces an input of any
//! element type either to a single boolean or along a set of axes, with the
//! axes given as integer arguments or as a runtime index tensor.
//!
//! ```
//! use tenreduce_core::{BoolReduceOp, DeclarableOp, LegacyReduceBoolOp, NDArray, OpContext};
//!
//! let x = NDArray::from_vec(vec![1.0f32, 0.0, 2.0, 3.0], &[2, 2]).unwrap();
//! let mut ctx = OpContext::new().with_input(x).with_i_args(vec![1]);
//! LegacyReduceBoolOp::new(BoolReduceOp::All).execute(&mut ctx).unwrap();
//!
//! let z = ctx.output(0).unwrap();
//! assert_eq!(z.dims(), &[2]);
//! assert_eq!(z.to_bool_vec().unwrap(), vec![false, true]);
//! ```
#![allow(clippy::result_large_err)]

pub mod array;
pub mod dtype;
pub mod error;
pub mod memory;
pub mod ops;
pub mod shape;

pub use array::{DataBuffer, Element, NDArray};
pub use dtype::DType;
pub use error::{Result, TensorError};
pub use half::{bf16, f16};
pub use memory::{global_workspace, Workspace, WorkspaceConfig};
pub use ops::{
    eval_reduce_shape, BoolReduceOp, DeclarableOp, LegacyReduceBoolOp, OpContext, ShapeList,
};
pub use shape::{Order, ShapeDescriptor};

pub mod context;
pub mod declarable;
pub mod legacy;
pub mod reduction;
pub mod shape_inference;

pub use context::OpContext;
pub use declarable::{DeclarableOp, ShapeList};
pub use legacy::LegacyReduceBoolOp;
pub use reduction::{AxisSet, BoolReduceOp, CpuReduceBoolKernel, ReduceBoolKernel, TadPlan};
pub use shape_inference::eval_reduce_shape;

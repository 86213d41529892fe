//! Legacy boolean reduction operator.
//!
//! Reduces an array of any element type to booleans, either to a single
//! scalar or along a set of axes. Axes come from the static integer
//! arguments, or from a second input holding them as a runtime tensor.
//!
//! With axes given as a tensor, the static integer arguments are free to
//! carry flags: `i_args[0] == 1` requests TF-style `keepDims`, applied after
//! the kernel by re-describing the output with unit axes at the reduced
//! positions. With static axes, `keepDims` and the legacy shape format come
//! from the bool arguments through [`DeclarableOp::calculate_output_shape`].

use crate::memory::Workspace;
use crate::ops::context::OpContext;
use crate::ops::declarable::{DeclarableOp, ShapeList};
use crate::ops::reduction::common::{
    is_reduce_all, normalize_axes, AxisSet, AxisSource, ReductionRequest,
};
use crate::ops::reduction::kernels::{BoolReduceOp, CpuReduceBoolKernel, ReduceBoolKernel};
use crate::ops::reduction::tad::TadPlan;
use crate::ops::shape_inference::eval_reduce_shape;
use crate::{require_true, DType, NDArray, Result, ShapeDescriptor, TensorError};
use log::debug;
use std::sync::Arc;

const OP_NAME: &str = "legacy_reduce_bool";

#[derive(Clone)]
pub struct LegacyReduceBoolOp {
    op: BoolReduceOp,
    kernel: Arc<dyn ReduceBoolKernel>,
}

impl LegacyReduceBoolOp {
    /// Operator backed by the CPU kernel
    pub fn new(op: BoolReduceOp) -> Self {
        Self::with_kernel(op, Arc::new(CpuReduceBoolKernel::new()))
    }

    /// Operator for a legacy op number
    pub fn from_op_num(op_num: i64) -> Result<Self> {
        Ok(Self::new(BoolReduceOp::try_from(op_num)?))
    }

    pub fn with_kernel(op: BoolReduceOp, kernel: Arc<dyn ReduceBoolKernel>) -> Self {
        Self { op, kernel }
    }

    pub fn op(&self) -> BoolReduceOp {
        self.op
    }

    /// A non-negative op number in the context overrides the operator's own
    fn resolve_op(&self, ctx: &OpContext) -> Result<BoolReduceOp> {
        match ctx.op_num() {
            Some(n) if n >= 0 => BoolReduceOp::try_from(n),
            _ => Ok(self.op),
        }
    }

    fn validate_and_execute(&self, op: BoolReduceOp, ctx: &OpContext) -> Result<NDArray> {
        let x = ctx.input(0)?;
        let dynamic = ctx.width() > 1;
        let source = axis_source(ctx)?;
        let extra = if ctx.t_args().is_empty() {
            None
        } else {
            Some(ctx.t_args())
        };
        let workspace = x.workspace().unwrap_or(ctx.workspace());

        match ReductionRequest::classify(source, ctx.i_args(), x.rank())? {
            ReductionRequest::Scalar => {
                debug!("{op}: scalar reduction of {}", x.shape());
                let target = match ctx.output(0) {
                    Some(z) if z.length() == 1 && z.dtype() == DType::Bool => z.shape().clone(),
                    _ => self.inferred_shape(x.shape(), ctx)?,
                };
                let mut z = NDArray::allocate(&target, workspace)?;
                self.kernel.exec_scalar(op, x, extra, &mut z)?;
                Ok(z)
            }
            ReductionRequest::Axes(axes) => {
                debug!("{op}: reduction of {} along {:?}", x.shape(), axes.as_slice());
                let z = self.exec_along_axes(op, x, extra, &axes, dynamic, ctx, workspace)?;
                if dynamic && ctx.int_arg(0) == Some(1) {
                    let kept = z.shape().with_inserted_unit_axes(axes.as_slice())?;
                    return z.with_shape(kept);
                }
                Ok(z)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn exec_along_axes(
        &self,
        op: BoolReduceOp,
        x: &NDArray,
        extra: Option<&[f64]>,
        axes: &AxisSet,
        dynamic: bool,
        ctx: &OpContext,
        workspace: &Arc<Workspace>,
    ) -> Result<NDArray> {
        require_true!(
            !axes.is_empty(),
            OP_NAME,
            "Some dimensions required for reduction!"
        );

        let plan = TadPlan::new(x.shape(), axes)?;
        let resolved = workspace.scoped_shape(
            eval_reduce_shape(x.ordering(), axes.as_slice(), x.shape(), false, false)?
                .with_dtype(DType::Bool),
        )?;

        // Static axes take their geometry (keepDims, legacy format) from the
        // framework: a preallocated output of the right length, else shape
        // inference. The resolved shape is still held as the call's temporary.
        let target = if dynamic {
            (*resolved).clone()
        } else {
            match ctx.output(0) {
                Some(z) if z.length() == plan.num_tads() && z.dtype() == DType::Bool => {
                    z.shape().clone()
                }
                _ => self.inferred_shape(x.shape(), ctx)?,
            }
        };

        let mut z = NDArray::allocate(&target, workspace)?;
        self.kernel
            .exec_tad(op, x, extra, &mut z, axes.as_slice(), &plan)?;
        Ok(z)
    }

    fn inferred_shape(&self, input: &ShapeDescriptor, ctx: &OpContext) -> Result<ShapeDescriptor> {
        self.calculate_output_shape(std::slice::from_ref(input), ctx)?
            .into_iter()
            .next()
            .ok_or_else(|| TensorError::invalid_shape(OP_NAME, "no output shape inferred", None))
    }
}

fn axis_source(ctx: &OpContext) -> Result<AxisSource<'_>> {
    if ctx.width() > 1 {
        Ok(AxisSource::Dynamic(ctx.input(1)?))
    } else {
        Ok(AxisSource::Static(ctx.i_args()))
    }
}

impl DeclarableOp for LegacyReduceBoolOp {
    fn name(&self) -> &str {
        OP_NAME
    }

    fn execute(&self, ctx: &mut OpContext) -> Result<()> {
        let op = self.resolve_op(ctx)?;
        debug!("Executing LegacyReduceBoolOp: [{}]", op.op_num());

        match self.validate_and_execute(op, ctx) {
            Ok(z) => {
                ctx.set_output(0, z);
                Ok(())
            }
            Err(err) => {
                debug!("LegacyReduceBoolOp [{}] failed: {err}", op.op_num());
                Err(err)
            }
        }
    }

    /// Either a scalar or the reduced array; depends only on the input shape
    /// and the requested dimensions. Always tagged `Bool`.
    fn calculate_output_shape(
        &self,
        input_shapes: &[ShapeDescriptor],
        ctx: &OpContext,
    ) -> Result<ShapeList> {
        let in_shape = input_shapes.first().ok_or_else(|| {
            TensorError::invalid_argument_op(OP_NAME, "no input shape to infer from")
        })?;

        let keep_dims = ctx.bool_arg(0).unwrap_or(false);
        let new_format = ctx.bool_arg(1).unwrap_or(true);

        let axes = if is_reduce_all(ctx.i_args()) {
            AxisSet::default()
        } else {
            normalize_axes(axis_source(ctx)?.raw_axes()?, in_shape.rank())?
        };

        let shape = eval_reduce_shape(
            in_shape.order(),
            axes.as_slice(),
            in_shape,
            keep_dims,
            !new_format,
        )?;
        Ok(vec![shape.with_dtype(DType::Bool)])
    }
}

impl std::fmt::Debug for LegacyReduceBoolOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyReduceBoolOp")
            .field("op", &self.op)
            .field("kernel", &self.kernel.name())
            .finish()
    }
}

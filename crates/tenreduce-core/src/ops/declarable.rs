use crate::ops::context::OpContext;
use crate::{Result, ShapeDescriptor};

/// Output shapes produced by shape inference, one per output
pub type ShapeList = Vec<ShapeDescriptor>;

/// Contract between an operator and the graph framework
pub trait DeclarableOp: Send + Sync {
    /// Operator name as registered with the framework
    fn name(&self) -> &str;

    /// Run the operator, storing its outputs in `ctx`
    fn execute(&self, ctx: &mut OpContext) -> Result<()>;

    /// Output shapes for the given input shapes, without executing
    fn calculate_output_shape(
        &self,
        input_shapes: &[ShapeDescriptor],
        ctx: &OpContext,
    ) -> Result<ShapeList>;
}

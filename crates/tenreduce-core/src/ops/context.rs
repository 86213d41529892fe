use crate::memory::{global_workspace, Workspace};
use crate::{NDArray, Result, TensorError};
use std::sync::Arc;

/// Execution context of a single operator invocation
///
/// Holds the input arrays, the operator's static integer/float/bool
/// arguments, the output slots and the workspace outputs are charged to.
#[derive(Debug, Clone)]
pub struct OpContext {
    inputs: Vec<NDArray>,
    outputs: Vec<Option<NDArray>>,
    i_args: Vec<i64>,
    t_args: Vec<f64>,
    b_args: Vec<bool>,
    op_num: Option<i64>,
    workspace: Arc<Workspace>,
}

impl OpContext {
    /// Create a context that allocates from the global workspace
    pub fn new() -> Self {
        Self::with_workspace(global_workspace())
    }

    pub fn with_workspace(workspace: Arc<Workspace>) -> Self {
        Self {
            inputs: Vec::new(),
            outputs: Vec::new(),
            i_args: Vec::new(),
            t_args: Vec::new(),
            b_args: Vec::new(),
            op_num: None,
            workspace,
        }
    }

    pub fn with_input(mut self, input: NDArray) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_i_args(mut self, args: Vec<i64>) -> Self {
        self.i_args = args;
        self
    }

    pub fn with_t_args(mut self, args: Vec<f64>) -> Self {
        self.t_args = args;
        self
    }

    pub fn with_b_args(mut self, args: Vec<bool>) -> Self {
        self.b_args = args;
        self
    }

    /// Override the op number of the operator executing this context
    pub fn with_op_num(mut self, op_num: i64) -> Self {
        self.op_num = Some(op_num);
        self
    }

    /// Preallocate output slot 0
    pub fn with_output(mut self, output: NDArray) -> Self {
        self.set_output(0, output);
        self
    }

    /// Number of inputs
    pub fn width(&self) -> usize {
        self.inputs.len()
    }

    pub fn input(&self, index: usize) -> Result<&NDArray> {
        self.inputs.get(index).ok_or_else(|| {
            TensorError::invalid_argument_op(
                "input",
                &format!("input {index} requested but only {} given", self.inputs.len()),
            )
        })
    }

    pub fn i_args(&self) -> &[i64] {
        &self.i_args
    }

    pub fn t_args(&self) -> &[f64] {
        &self.t_args
    }

    pub fn b_args(&self) -> &[bool] {
        &self.b_args
    }

    pub fn int_arg(&self, index: usize) -> Option<i64> {
        self.i_args.get(index).copied()
    }

    pub fn bool_arg(&self, index: usize) -> Option<bool> {
        self.b_args.get(index).copied()
    }

    pub fn op_num(&self) -> Option<i64> {
        self.op_num
    }

    pub fn workspace(&self) -> &Arc<Workspace> {
        &self.workspace
    }

    pub fn output(&self, index: usize) -> Option<&NDArray> {
        self.outputs.get(index).and_then(|o| o.as_ref())
    }

    /// Remove an output from its slot, leaving the slot empty
    pub fn take_output(&mut self, index: usize) -> Option<NDArray> {
        self.outputs.get_mut(index).and_then(|o| o.take())
    }

    /// Store an output, replacing whatever the slot held
    pub fn set_output(&mut self, index: usize, output: NDArray) {
        if self.outputs.len() <= index {
            self.outputs.resize(index + 1, None);
        }
        self.outputs[index] = Some(output);
    }
}

impl Default for OpContext {
    fn default() -> Self {
        Self::new()
    }
}

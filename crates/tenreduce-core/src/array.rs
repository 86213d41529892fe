//! Dense strided array: a typed flat buffer plus a shape descriptor.
//!
//! The buffer is reference counted so that arrays sharing storage (for
//! example an output whose shape was rewritten for `keepDims`) account for
//! their workspace bytes exactly once.

use crate::memory::{Workspace, WorkspaceLease};
use crate::{DType, Order, Result, ShapeDescriptor, TensorError};
use half::{bf16, f16};
use std::sync::Arc;

/// Typed flat storage
#[derive(Debug, Clone, PartialEq)]
pub enum DataBuffer {
    Float16(Vec<f16>),
    BFloat16(Vec<bf16>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt8(Vec<u8>),
    Bool(Vec<bool>),
}

/// Dispatch `$body` over every variant of a [`DataBuffer`], binding the
/// inner vector to `$data`.
#[macro_export]
macro_rules! dispatch_buffer {
    ($buffer:expr, $data:ident => $body:expr) => {
        match $buffer {
            $crate::array::DataBuffer::Float16($data) => $body,
            $crate::array::DataBuffer::BFloat16($data) => $body,
            $crate::array::DataBuffer::Float32($data) => $body,
            $crate::array::DataBuffer::Float64($data) => $body,
            $crate::array::DataBuffer::Int8($data) => $body,
            $crate::array::DataBuffer::Int16($data) => $body,
            $crate::array::DataBuffer::Int32($data) => $body,
            $crate::array::DataBuffer::Int64($data) => $body,
            $crate::array::DataBuffer::UInt8($data) => $body,
            $crate::array::DataBuffer::Bool($data) => $body,
        }
    };
}

impl DataBuffer {
    /// Zero-filled buffer of `len` elements
    pub fn zeros(dtype: DType, len: usize) -> Self {
        match dtype {
            DType::Float16 => DataBuffer::Float16(vec![f16::ZERO; len]),
            DType::BFloat16 => DataBuffer::BFloat16(vec![bf16::ZERO; len]),
            DType::Float32 => DataBuffer::Float32(vec![0.0; len]),
            DType::Float64 => DataBuffer::Float64(vec![0.0; len]),
            DType::Int8 => DataBuffer::Int8(vec![0; len]),
            DType::Int16 => DataBuffer::Int16(vec![0; len]),
            DType::Int32 => DataBuffer::Int32(vec![0; len]),
            DType::Int64 => DataBuffer::Int64(vec![0; len]),
            DType::UInt8 => DataBuffer::UInt8(vec![0; len]),
            DType::Bool => DataBuffer::Bool(vec![false; len]),
        }
    }

    pub fn dtype(&self) -> DType {
        match self {
            DataBuffer::Float16(_) => DType::Float16,
            DataBuffer::BFloat16(_) => DType::BFloat16,
            DataBuffer::Float32(_) => DType::Float32,
            DataBuffer::Float64(_) => DType::Float64,
            DataBuffer::Int8(_) => DType::Int8,
            DataBuffer::Int16(_) => DType::Int16,
            DataBuffer::Int32(_) => DType::Int32,
            DataBuffer::Int64(_) => DType::Int64,
            DataBuffer::UInt8(_) => DType::UInt8,
            DataBuffer::Bool(_) => DType::Bool,
        }
    }

    pub fn len(&self) -> usize {
        dispatch_buffer!(self, data => data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read element `offset` as an integer, for index tensors
    pub fn index_value(&self, offset: usize) -> Option<i64> {
        match self {
            DataBuffer::Int8(d) => d.get(offset).map(|&v| v as i64),
            DataBuffer::Int16(d) => d.get(offset).map(|&v| v as i64),
            DataBuffer::Int32(d) => d.get(offset).map(|&v| v as i64),
            DataBuffer::Int64(d) => d.get(offset).copied(),
            DataBuffer::UInt8(d) => d.get(offset).map(|&v| v as i64),
            _ => None,
        }
    }
}

/// Rust element types that can back an [`NDArray`]
pub trait Element: Copy + Send + Sync + 'static {
    const DTYPE: DType;

    fn into_buffer(data: Vec<Self>) -> DataBuffer;
}

macro_rules! impl_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = DType::$variant;

                fn into_buffer(data: Vec<Self>) -> DataBuffer {
                    DataBuffer::$variant(data)
                }
            }
        )*
    };
}

impl_element!(
    f16 => Float16,
    bf16 => BFloat16,
    f32 => Float32,
    f64 => Float64,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    bool => Bool,
);

#[derive(Debug)]
struct Storage {
    data: DataBuffer,
    // Returns the buffer's bytes to the workspace when the last owner drops
    lease: Option<WorkspaceLease>,
}

#[derive(Debug, Clone)]
pub struct NDArray {
    storage: Arc<Storage>,
    shape: ShapeDescriptor,
}

impl NDArray {
    /// Wrap a C-ordered vector
    pub fn from_vec<T: Element>(data: Vec<T>, dims: &[usize]) -> Result<Self> {
        Self::from_vec_with_order(data, dims, Order::C)
    }

    pub fn from_vec_with_order<T: Element>(data: Vec<T>, dims: &[usize], order: Order) -> Result<Self> {
        let shape = ShapeDescriptor::new(dims, order, T::DTYPE);
        if data.len() != shape.length() {
            return Err(TensorError::invalid_shape(
                "from_vec",
                &format!(
                    "data length {} does not match shape with {} elements",
                    data.len(),
                    shape.length()
                ),
                Some(dims),
            ));
        }
        Self::from_parts(T::into_buffer(data), shape)
    }

    /// Build an array over an existing buffer with arbitrary strides
    pub fn from_parts(data: DataBuffer, shape: ShapeDescriptor) -> Result<Self> {
        if data.dtype() != shape.dtype() {
            return Err(TensorError::dtype_mismatch(
                "from_parts",
                shape.dtype(),
                data.dtype(),
            ));
        }
        let span = required_span(&shape);
        if data.len() < span {
            return Err(TensorError::invalid_shape(
                "from_parts",
                &format!(
                    "buffer of {} elements is too small for a span of {span}",
                    data.len()
                ),
                Some(shape.dims()),
            ));
        }
        Ok(Self {
            storage: Arc::new(Storage { data, lease: None }),
            shape,
        })
    }

    /// Allocate a zero-filled contiguous array, charging `workspace` for it
    pub fn allocate(shape: &ShapeDescriptor, workspace: &Arc<Workspace>) -> Result<Self> {
        let shape = ShapeDescriptor::new(shape.dims(), shape.order(), shape.dtype());
        let len = shape.length();
        let bytes = len * shape.dtype().size();
        let lease = workspace.lease(bytes, "allocate")?;
        Ok(Self {
            storage: Arc::new(Storage {
                data: DataBuffer::zeros(shape.dtype(), len),
                lease: Some(lease),
            }),
            shape,
        })
    }

    /// Rank-0 boolean array
    pub fn scalar_bool(value: bool) -> Self {
        Self {
            storage: Arc::new(Storage {
                data: DataBuffer::Bool(vec![value]),
                lease: None,
            }),
            shape: ShapeDescriptor::scalar(DType::Bool),
        }
    }

    pub fn shape(&self) -> &ShapeDescriptor {
        &self.shape
    }

    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn length(&self) -> usize {
        self.shape.length()
    }

    pub fn dtype(&self) -> DType {
        self.shape.dtype()
    }

    pub fn ordering(&self) -> Order {
        self.shape.order()
    }

    pub fn buffer(&self) -> &DataBuffer {
        &self.storage.data
    }

    /// Workspace the buffer is charged to, if any
    pub fn workspace(&self) -> Option<&Arc<Workspace>> {
        self.storage.lease.as_ref().map(|lease| lease.workspace())
    }

    /// Mutable access to the buffer; fails when the storage is shared
    pub fn buffer_mut(&mut self) -> Result<&mut DataBuffer> {
        Arc::get_mut(&mut self.storage)
            .map(|storage| &mut storage.data)
            .ok_or_else(|| {
                TensorError::invalid_argument_op(
                    "buffer_mut",
                    "array storage is shared and cannot be written",
                )
            })
    }

    /// Same storage viewed through a new descriptor with the same length and
    /// element type. The previous descriptor is dropped, never edited.
    pub fn with_shape(self, shape: ShapeDescriptor) -> Result<Self> {
        if shape.length() != self.length() || shape.dtype() != self.dtype() {
            return Err(TensorError::invalid_shape(
                "with_shape",
                &format!("cannot view {} as {}", self.shape, shape),
                Some(shape.dims()),
            ));
        }
        if !self.shape.is_contiguous() || !shape.is_contiguous() {
            return Err(TensorError::invalid_shape(
                "with_shape",
                "only contiguous arrays can be re-described",
                Some(shape.dims()),
            ));
        }
        Ok(Self {
            storage: self.storage,
            shape,
        })
    }

    /// Reshape keeping the current order
    pub fn reshape(self, dims: &[usize]) -> Result<Self> {
        let shape = self.shape.reshaped(dims)?;
        self.with_shape(shape)
    }

    /// Elements in logical order (last axis fastest), resolved through strides
    pub fn logical_offsets(&self) -> Vec<usize> {
        let dims = self.shape.dims();
        let strides = self.shape.strides();
        let mut offsets = Vec::with_capacity(self.length());
        if dims.iter().any(|&d| d == 0) {
            return offsets;
        }
        let mut index = vec![0usize; dims.len()];
        loop {
            offsets.push(index.iter().zip(strides).map(|(i, s)| i * s).sum());
            let mut axis = dims.len();
            loop {
                if axis == 0 {
                    return offsets;
                }
                axis -= 1;
                index[axis] += 1;
                if index[axis] < dims[axis] {
                    break;
                }
                index[axis] = 0;
            }
        }
    }

    /// Integer elements in logical order, as read from an indices tensor
    pub fn to_i64_vec(&self) -> Result<Vec<i64>> {
        if !self.dtype().is_integer() {
            return Err(TensorError::invalid_argument_op(
                "to_i64_vec",
                &format!("expected an integer array, got {}", self.dtype()),
            ));
        }
        self.logical_offsets()
            .into_iter()
            .map(|offset| {
                self.buffer().index_value(offset).ok_or_else(|| {
                    TensorError::invalid_argument_op("to_i64_vec", "offset outside buffer")
                })
            })
            .collect()
    }

    /// Boolean elements in logical order
    pub fn to_bool_vec(&self) -> Option<Vec<bool>> {
        match self.buffer() {
            DataBuffer::Bool(data) => Some(
                self.logical_offsets()
                    .into_iter()
                    .map(|offset| data[offset])
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// Number of buffer elements a descriptor can touch
fn required_span(shape: &ShapeDescriptor) -> usize {
    if shape.is_empty() {
        return 0;
    }
    shape
        .dims()
        .iter()
        .zip(shape.strides())
        .map(|(&d, &s)| (d - 1) * s)
        .sum::<usize>()
        + 1
}

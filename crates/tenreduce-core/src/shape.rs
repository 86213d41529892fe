//! Shape descriptors: dimensions, memory order, strides and element type.
//!
//! A [`ShapeDescriptor`] never changes after construction. Operations that
//! produce a different geometry (retagging the data type, reshaping, inserting
//! unit axes) return a fresh descriptor and leave the original untouched, so a
//! descriptor can be shared between arrays without aliasing surprises.

use crate::{DType, Result, TensorError};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Memory ordering of a dense buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Order {
    /// Row-major, last axis varies fastest
    #[default]
    C,
    /// Column-major, first axis varies fastest
    F,
}

impl Order {
    pub fn as_char(&self) -> char {
        match self {
            Order::C => 'c',
            Order::F => 'f',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'c' | 'C' => Some(Order::C),
            'f' | 'F' => Some(Order::F),
            _ => None,
        }
    }

    /// Contiguous strides (in elements) for `dims` in this order
    pub fn contiguous_strides(&self, dims: &[usize]) -> Vec<usize> {
        let mut strides = vec![1usize; dims.len()];
        match self {
            Order::C => {
                for i in (0..dims.len().saturating_sub(1)).rev() {
                    strides[i] = strides[i + 1] * dims[i + 1];
                }
            }
            Order::F => {
                for i in 1..dims.len() {
                    strides[i] = strides[i - 1] * dims[i - 1];
                }
            }
        }
        strides
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ShapeDescriptor {
    dims: Vec<usize>,
    strides: Vec<usize>,
    order: Order,
    dtype: DType,
}

impl ShapeDescriptor {
    /// Create a contiguous descriptor for `dims` in the given order
    pub fn new(dims: &[usize], order: Order, dtype: DType) -> Self {
        Self {
            dims: dims.to_vec(),
            strides: order.contiguous_strides(dims),
            order,
            dtype,
        }
    }

    /// Rank-0 descriptor holding a single element
    pub fn scalar(dtype: DType) -> Self {
        Self::new(&[], Order::C, dtype)
    }

    /// Create a descriptor with explicit strides, as used for sub-tensor views
    pub fn with_strides(
        dims: &[usize],
        strides: &[usize],
        order: Order,
        dtype: DType,
    ) -> Result<Self> {
        if dims.len() != strides.len() {
            return Err(TensorError::invalid_shape(
                "shape_descriptor",
                &format!(
                    "Shape and strides must have same length: {} != {}",
                    dims.len(),
                    strides.len()
                ),
                Some(dims),
            ));
        }

        Ok(Self {
            dims: dims.to_vec(),
            strides: strides.to_vec(),
            order,
            dtype,
        })
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Number of elements; a rank-0 shape holds one
    pub fn length(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// True when the descriptor addresses zero elements
    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// Check whether the strides match the contiguous layout for the order
    pub fn is_contiguous(&self) -> bool {
        self.strides == self.order.contiguous_strides(&self.dims)
    }

    /// Element-wise stride: 1 for contiguous buffers, 0 otherwise
    pub fn ews(&self) -> i64 {
        if self.is_contiguous() {
            1
        } else {
            0
        }
    }

    /// Flat element offset of a multi-dimensional index
    pub fn offset_of(&self, index: &[usize]) -> Result<usize> {
        if index.len() != self.rank() {
            return Err(TensorError::invalid_argument_op(
                "offset_of",
                &format!(
                    "Index dimension mismatch: {} != {}",
                    index.len(),
                    self.rank()
                ),
            ));
        }

        let mut offset = 0usize;
        for (axis, (&idx, &dim)) in index.iter().zip(&self.dims).enumerate() {
            if idx >= dim {
                return Err(TensorError::invalid_argument_op(
                    "offset_of",
                    &format!("Index out of bounds on axis {axis}: {idx} >= {dim}"),
                ));
            }
            offset += idx * self.strides[axis];
        }
        Ok(offset)
    }

    /// Same geometry, different element type
    pub fn with_dtype(&self, dtype: DType) -> Self {
        Self {
            dtype,
            ..self.clone()
        }
    }

    /// Contiguous descriptor with new dimensions and the same element count
    pub fn reshaped(&self, dims: &[usize]) -> Result<Self> {
        let new_len: usize = dims.iter().product();
        if new_len != self.length() {
            return Err(TensorError::invalid_shape(
                "reshape",
                &format!(
                    "cannot reshape {} elements into {:?}",
                    self.length(),
                    dims
                ),
                Some(dims),
            ));
        }
        Ok(Self::new(dims, self.order, self.dtype))
    }

    /// Insert a size-1 axis at each position of `axes`, processed in ascending
    /// order, so each position refers to the rank reached after the previous
    /// insertions.
    pub fn with_inserted_unit_axes(&self, axes: &[usize]) -> Result<Self> {
        let mut sorted = axes.to_vec();
        sorted.sort_unstable();

        let mut dims = self.dims.clone();
        for &axis in &sorted {
            if axis > dims.len() {
                return Err(TensorError::invalid_axis(
                    "insert_unit_axes",
                    axis as i64,
                    dims.len(),
                ));
            }
            dims.insert(axis, 1);
        }
        self.reshaped(&dims)
    }

    /// Flat encoding: `[rank, dims.., strides.., dtype, ews, order]`
    pub fn to_shape_info(&self) -> Vec<i64> {
        let mut info = Vec::with_capacity(2 * self.rank() + 4);
        info.push(self.rank() as i64);
        info.extend(self.dims.iter().map(|&d| d as i64));
        info.extend(self.strides.iter().map(|&s| s as i64));
        info.push(self.dtype.code());
        info.push(self.ews());
        info.push(self.order.as_char() as i64);
        info
    }

    /// Decode a descriptor produced by [`ShapeDescriptor::to_shape_info`]
    pub fn from_shape_info(info: &[i64]) -> Result<Self> {
        let malformed = |reason: &str| TensorError::invalid_shape("from_shape_info", reason, None);

        let rank = *info.first().ok_or_else(|| malformed("empty shape info"))?;
        if rank < 0 {
            return Err(malformed("negative rank"));
        }
        let rank = rank as usize;
        if info.len() != 2 * rank + 4 {
            return Err(malformed(&format!(
                "expected {} entries for rank {rank}, got {}",
                2 * rank + 4,
                info.len()
            )));
        }

        let to_usize = |v: i64| {
            usize::try_from(v).map_err(|_| malformed(&format!("negative extent {v}")))
        };
        let dims = info[1..=rank]
            .iter()
            .map(|&v| to_usize(v))
            .collect::<Result<Vec<_>>>()?;
        let strides = info[rank + 1..=2 * rank]
            .iter()
            .map(|&v| to_usize(v))
            .collect::<Result<Vec<_>>>()?;
        let dtype = DType::from_code(info[2 * rank + 1])
            .ok_or_else(|| malformed(&format!("unknown dtype code {}", info[2 * rank + 1])))?;
        let order = u8::try_from(info[2 * rank + 3])
            .ok()
            .and_then(|c| Order::from_char(c as char))
            .ok_or_else(|| malformed("unknown order tag"))?;

        Self::with_strides(&dims, &strides, order, dtype)
    }
}

impl std::fmt::Display for ShapeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, dim) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{dim}")?;
        }
        write!(f, "] {} {}", self.order.as_char(), self.dtype)
    }
}

//! Tensor-along-dimension (TAD) planning.
//!
//! A TAD is the sub-tensor obtained by fixing every kept axis of the source
//! and letting the reduced axes vary. The plan records the geometry of one
//! such slice (the reduced dims with the source's strides) and the flat start
//! offset of every slice, so a kernel can reduce each slice in place.
//!
//! Slices are enumerated in the source's memory order over the kept axes,
//! which is also the element order of the contiguous reduced output: TAD `i`
//! produces output element `i`.

use super::common::AxisSet;
use crate::{require_true, Order, Result, ShapeDescriptor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TadPlan {
    tad_shape: ShapeDescriptor,
    offsets: Vec<usize>,
    kept_axes: Vec<usize>,
}

impl TadPlan {
    pub fn new(source: &ShapeDescriptor, axes: &AxisSet) -> Result<Self> {
        require_true!(
            !axes.is_empty(),
            "tad_plan",
            "Some dimensions required for reduction!"
        );
        require_true!(
            axes.rank() == source.rank(),
            "tad_plan",
            "axis set was normalized against a different rank"
        );

        let dims = source.dims();
        let strides = source.strides();

        let tad_dims: Vec<usize> = axes.iter().map(|&a| dims[a]).collect();
        let tad_strides: Vec<usize> = axes.iter().map(|&a| strides[a]).collect();
        let tad_shape =
            ShapeDescriptor::with_strides(&tad_dims, &tad_strides, source.order(), source.dtype())?;

        let kept_axes = axes.complement();
        let kept_dims: Vec<usize> = kept_axes.iter().map(|&a| dims[a]).collect();
        let kept_strides: Vec<usize> = kept_axes.iter().map(|&a| strides[a]).collect();
        let offsets = strided_offsets(&kept_dims, &kept_strides, source.order());

        log::trace!(
            "TAD plan for {}: slice {:?}, {} slices",
            source,
            tad_dims,
            offsets.len()
        );

        Ok(Self {
            tad_shape,
            offsets,
            kept_axes,
        })
    }

    /// Geometry of a single slice
    pub fn tad_shape(&self) -> &ShapeDescriptor {
        &self.tad_shape
    }

    /// Start offset of every slice within the source buffer
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn num_tads(&self) -> usize {
        self.offsets.len()
    }

    /// Elements per slice
    pub fn tad_length(&self) -> usize {
        self.tad_shape.length()
    }

    pub fn kept_axes(&self) -> &[usize] {
        &self.kept_axes
    }

    /// Offsets of a slice's elements relative to its start
    pub fn slice_offsets(&self) -> Vec<usize> {
        strided_offsets(
            self.tad_shape.dims(),
            self.tad_shape.strides(),
            self.tad_shape.order(),
        )
    }
}

/// Every flat offset addressed by `dims`/`strides`, visiting the fastest axis
/// for `order` first. Rank 0 yields the single offset 0.
pub fn strided_offsets(dims: &[usize], strides: &[usize], order: Order) -> Vec<usize> {
    let count: usize = dims.iter().product();
    let mut offsets = Vec::with_capacity(count);
    if count == 0 {
        return offsets;
    }

    let sweep: Vec<usize> = match order {
        Order::C => (0..dims.len()).rev().collect(),
        Order::F => (0..dims.len()).collect(),
    };

    let mut index = vec![0usize; dims.len()];
    let mut offset = 0usize;
    for _ in 0..count {
        offsets.push(offset);
        for &axis in &sweep {
            index[axis] += 1;
            offset += strides[axis];
            if index[axis] < dims[axis] {
                break;
            }
            offset -= strides[axis] * dims[axis];
            index[axis] = 0;
        }
    }
    offsets
}

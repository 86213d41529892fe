//! Axis handling shared by every reduction entry point
//!
//! Axes reach a reduction either as static operator arguments or as the
//! contents of a runtime indices tensor. Both sources are funnelled through
//! [`normalize_axes`] and [`ReductionRequest::classify`], so negative-axis
//! rebasing and the "reduce everything" detection are written once.

use crate::{NDArray, Result, TensorError};

/// Static-argument sentinel meaning "reduce along every axis"
pub const REDUCE_ALL_SENTINEL: i64 = i32::MAX as i64;

/// Normalize negative axis indices
///
/// Converts negative axis indices to positive ones and validates that the axis
/// is within the valid range for a tensor of the given rank.
///
/// # Examples
/// ```
/// use tenreduce_core::ops::reduction::normalize_axis;
/// assert_eq!(normalize_axis(0, 3).unwrap(), 0);
/// assert_eq!(normalize_axis(-1, 3).unwrap(), 2);
/// assert!(normalize_axis(3, 3).is_err());
/// assert!(normalize_axis(-4, 3).is_err());
/// ```
pub fn normalize_axis(axis: i64, rank: usize) -> Result<usize> {
    let normalized = if axis < 0 { axis + rank as i64 } else { axis };
    if normalized < 0 || normalized >= rank as i64 {
        Err(TensorError::invalid_axis("normalize_axis", axis, rank))
    } else {
        Ok(normalized as usize)
    }
}

/// Sorted, deduplicated set of in-range axes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AxisSet {
    axes: Vec<usize>,
    rank: usize,
}

impl AxisSet {
    /// Build from already non-negative axes
    pub fn from_axes(axes: &[usize], rank: usize) -> Result<Self> {
        if let Some(&bad) = axes.iter().find(|&&a| a >= rank) {
            return Err(TensorError::invalid_axis("axis_set", bad as i64, rank));
        }
        let mut axes = axes.to_vec();
        axes.sort_unstable();
        axes.dedup();
        Ok(Self { axes, rank })
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.axes
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Rank of the array the set was normalized against
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn contains(&self, axis: usize) -> bool {
        self.axes.binary_search(&axis).is_ok()
    }

    /// True when every dimension of the source is reduced
    pub fn spans_all(&self) -> bool {
        self.axes.len() == self.rank
    }

    /// Axes not in the set, ascending
    pub fn complement(&self) -> Vec<usize> {
        (0..self.rank).filter(|&a| !self.contains(a)).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, usize> {
        self.axes.iter()
    }
}

/// True for the static argument list `[REDUCE_ALL_SENTINEL]`
pub fn is_reduce_all(i_args: &[i64]) -> bool {
    i_args.len() == 1 && i_args[0] == REDUCE_ALL_SENTINEL
}

/// Rebase negative axes against `rank`, then sort and deduplicate.
///
/// More raw axes than `rank` is rejected before any rebasing.
pub fn normalize_axes<I>(raw: I, rank: usize) -> Result<AxisSet>
where
    I: IntoIterator<Item = i64>,
{
    let raw: Vec<i64> = raw.into_iter().collect();
    if raw.len() > rank {
        return Err(TensorError::invalid_argument_op(
            "normalize_axes",
            &format!("{} axes requested for an input of rank {rank}", raw.len()),
        ));
    }
    let axes = raw
        .into_iter()
        .map(|axis| normalize_axis(axis, rank))
        .collect::<Result<Vec<_>>>()?;
    AxisSet::from_axes(&axes, rank)
}

/// Where a reduction's axes come from
#[derive(Debug, Clone, Copy)]
pub enum AxisSource<'a> {
    /// Integer arguments baked into the operator configuration
    Static(&'a [i64]),
    /// Contents of a runtime integer tensor
    Dynamic(&'a NDArray),
}

impl AxisSource<'_> {
    /// Raw axis values in the order supplied
    pub fn raw_axes(&self) -> Result<Vec<i64>> {
        match self {
            AxisSource::Static(args) => Ok(args.to_vec()),
            AxisSource::Dynamic(indices) => indices.to_i64_vec(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, AxisSource::Dynamic(_))
    }
}

/// Outcome of classifying a reduction's axis arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReductionRequest {
    /// Collapse the whole input to one value
    Scalar,
    /// Reduce along the given axes, keeping the others
    Axes(AxisSet),
}

impl ReductionRequest {
    /// Decide between the scalar path and the per-axis path.
    ///
    /// `i_args` are the operator's static integer arguments; for a static
    /// source they are the axes themselves. The scalar path is taken for an
    /// empty static axis list, for the single reduce-all sentinel, or when
    /// the normalized set covers every dimension. An empty dynamic list stays
    /// on the axis path so the executor can reject it.
    pub fn classify(source: AxisSource<'_>, i_args: &[i64], rank: usize) -> Result<Self> {
        if is_reduce_all(i_args) {
            return Ok(Self::Scalar);
        }

        let raw = source.raw_axes()?;
        if raw.is_empty() && !source.is_dynamic() {
            return Ok(Self::Scalar);
        }

        let axes = normalize_axes(raw, rank)?;
        if axes.spans_all() {
            Ok(Self::Scalar)
        } else {
            Ok(Self::Axes(axes))
        }
    }
}

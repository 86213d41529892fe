//! Output-shape inference for reductions
//!
//! For all reductions the rules are simple: either the result is a scalar,
//! or it is the input with the reduced axes removed (or kept at size 1).
//! It depends only on the input shape and the requested dimensions.

use crate::{Order, Result, ShapeDescriptor, TensorError};

/// Compute the output descriptor of a reduction.
///
/// * `axes` – non-negative axes; an empty list reduces every dimension.
/// * `keep_dims` – keep reduced axes at size 1 instead of dropping them.
/// * `legacy_format` – old shape convention: scalars become `[1, 1]` and a
///   rank-1 result becomes `[1, n]` (first reduced axis is 0) or `[n, 1]`.
///
/// The element type is copied from `source`; callers retag it as needed.
pub fn eval_reduce_shape(
    order: Order,
    axes: &[usize],
    source: &ShapeDescriptor,
    keep_dims: bool,
    legacy_format: bool,
) -> Result<ShapeDescriptor> {
    let rank = source.rank();
    let dtype = source.dtype();

    if axes.is_empty() {
        return Ok(if keep_dims {
            ShapeDescriptor::new(&vec![1; rank], order, dtype)
        } else if legacy_format {
            ShapeDescriptor::new(&[1, 1], Order::C, dtype)
        } else {
            ShapeDescriptor::scalar(dtype)
        });
    }

    let mut axes = axes.to_vec();
    axes.sort_unstable();
    axes.dedup();
    if axes.len() > rank {
        return Err(TensorError::invalid_argument_op(
            "eval_reduce_shape",
            &format!("{} axes requested for rank {rank}", axes.len()),
        ));
    }
    if let Some(&bad) = axes.iter().find(|&&a| a >= rank) {
        return Err(TensorError::invalid_axis("eval_reduce_shape", bad as i64, rank));
    }

    let dims = source.dims();

    if keep_dims {
        let kept: Vec<usize> = dims
            .iter()
            .enumerate()
            .map(|(i, &d)| if axes.binary_search(&i).is_ok() { 1 } else { d })
            .collect();
        return Ok(ShapeDescriptor::new(&kept, order, dtype));
    }

    let reduced: Vec<usize> = dims
        .iter()
        .enumerate()
        .filter(|(i, _)| axes.binary_search(i).is_err())
        .map(|(_, &d)| d)
        .collect();

    if reduced.is_empty() {
        return Ok(if legacy_format {
            ShapeDescriptor::new(&[1, 1], Order::C, dtype)
        } else {
            ShapeDescriptor::scalar(dtype)
        });
    }

    if reduced.len() == 1 && legacy_format {
        let n = reduced[0];
        let legacy = if axes[0] == 0 { [1, n] } else { [n, 1] };
        return Ok(ShapeDescriptor::new(&legacy, order, dtype));
    }

    Ok(ShapeDescriptor::new(&reduced, order, dtype))
}

//! Property-based tests for boolean reductions.
//!
//! Key invariants:
//! - The output rank is the input rank with keepDims, otherwise rank minus
//!   the number of distinct reduced axes
//! - Execution produces exactly the shape inference reports
//! - A TAD plan visits every input element exactly once
//! - Results agree with a brute-force reduction

use std::collections::BTreeSet;
use tenreduce_core::ops::reduction::{normalize_axes, TadPlan};
use tenreduce_core::{
    BoolReduceOp, DType, DeclarableOp, LegacyReduceBoolOp, NDArray, OpContext, Order,
    ShapeDescriptor,
};
use proptest::prelude::*;

/// Dimensions plus a non-empty subset of axes given as raw, possibly
/// negative, values
fn shape_and_axes() -> impl Strategy<Value = (Vec<usize>, Vec<i64>)> {
    prop::collection::vec(1usize..4, 1..5).prop_flat_map(|dims| {
        let rank = dims.len();
        let axes = prop::collection::btree_set(0..rank, 1..=rank).prop_flat_map(move |set| {
            let n = set.len();
            (Just(set), prop::collection::vec(any::<bool>(), n))
        });
        (Just(dims), axes).prop_map(move |(dims, (set, negate))| {
            let raw = set
                .into_iter()
                .zip(negate)
                .map(|(axis, neg)| {
                    if neg {
                        axis as i64 - rank as i64
                    } else {
                        axis as i64
                    }
                })
                .collect();
            (dims, raw)
        })
    })
}

fn distinct(raw: &[i64], rank: usize) -> BTreeSet<usize> {
    raw.iter()
        .map(|&a| if a < 0 { (a + rank as i64) as usize } else { a as usize })
        .collect()
}

fn brute_force_all(data: &[u8], dims: &[usize], reduced: &BTreeSet<usize>) -> Vec<bool> {
    let kept: Vec<usize> = (0..dims.len()).filter(|a| !reduced.contains(a)).collect();
    let groups: usize = kept.iter().map(|&a| dims[a]).product();
    let mut out = vec![true; groups];
    for (flat, &value) in data.iter().enumerate() {
        // C-order multi-index of `flat`
        let mut rem = flat;
        let mut index = vec![0; dims.len()];
        for axis in (0..dims.len()).rev() {
            index[axis] = rem % dims[axis];
            rem /= dims[axis];
        }
        let key = kept.iter().fold(0, |acc, &a| acc * dims[a] + index[a]);
        out[key] &= value != 0;
    }
    out
}

proptest! {
    #[test]
    fn output_rank_follows_keep_dims(
        (dims, raw) in shape_and_axes(),
        keep_dims in any::<bool>()
    ) {
        let rank = dims.len();
        let reduced = distinct(&raw, rank);
        let input = ShapeDescriptor::new(&dims, Order::C, DType::Float32);
        let ctx = OpContext::new().with_i_args(raw).with_b_args(vec![keep_dims]);

        let shapes = LegacyReduceBoolOp::new(BoolReduceOp::Any)
            .calculate_output_shape(&[input], &ctx)
            .unwrap();
        let out = &shapes[0];

        if keep_dims {
            prop_assert_eq!(out.rank(), rank);
            for axis in 0..rank {
                let expected = if reduced.contains(&axis) { 1 } else { dims[axis] };
                prop_assert_eq!(out.dims()[axis], expected);
            }
        } else {
            prop_assert_eq!(out.rank(), rank - reduced.len());
        }
    }

    #[test]
    fn execution_matches_inferred_shape(
        (dims, raw) in shape_and_axes(),
        keep_dims in any::<bool>(),
        dynamic in any::<bool>()
    ) {
        let len: usize = dims.iter().product();
        let x = NDArray::from_vec(vec![1.0f32; len], &dims).unwrap();
        let op = LegacyReduceBoolOp::new(BoolReduceOp::All);

        let mut ctx = OpContext::new().with_input(x.clone()).with_b_args(vec![keep_dims]);
        if dynamic {
            let n = raw.len();
            ctx = ctx
                .with_input(NDArray::from_vec(raw, &[n]).unwrap())
                .with_i_args(vec![i64::from(keep_dims)]);
        } else {
            ctx = ctx.with_i_args(raw);
        }

        let inferred = op.calculate_output_shape(&[x.shape().clone()], &ctx).unwrap();
        op.execute(&mut ctx).unwrap();
        let z = ctx.output(0).unwrap();
        prop_assert_eq!(z.dims(), inferred[0].dims());
        prop_assert!(z.to_bool_vec().unwrap().into_iter().all(|v| v));
    }

    #[test]
    fn tad_plan_covers_every_element((dims, raw) in shape_and_axes()) {
        let rank = dims.len();
        let axes = normalize_axes(raw, rank).unwrap();
        let shape = ShapeDescriptor::new(&dims, Order::C, DType::Int32);
        let plan = TadPlan::new(&shape, &axes).unwrap();

        let kept: usize = (0..rank).filter(|a| !axes.contains(*a)).map(|a| dims[a]).product();
        prop_assert_eq!(plan.num_tads(), kept);
        prop_assert_eq!(plan.num_tads() * plan.tad_length(), shape.length());

        let slice = plan.slice_offsets();
        let mut seen: Vec<usize> = plan
            .offsets()
            .iter()
            .flat_map(|&base| slice.iter().map(move |&rel| base + rel))
            .collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..shape.length()).collect::<Vec<_>>());
    }

    #[test]
    fn all_agrees_with_brute_force(
        (dims, raw) in shape_and_axes(),
        seed in prop::collection::vec(0u8..4, 81)
    ) {
        let rank = dims.len();
        let reduced = distinct(&raw, rank);
        let len: usize = dims.iter().product();
        let data: Vec<u8> = seed[..len].to_vec();

        let x = NDArray::from_vec(data.clone(), &dims).unwrap();
        let mut ctx = OpContext::new().with_input(x).with_i_args(raw);
        LegacyReduceBoolOp::new(BoolReduceOp::All).execute(&mut ctx).unwrap();

        let got = ctx.output(0).unwrap().to_bool_vec().unwrap();
        prop_assert_eq!(got, brute_force_all(&data, &dims, &reduced));
    }
}

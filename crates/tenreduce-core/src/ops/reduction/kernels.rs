//! Boolean reduction kernels.
//!
//! The executor talks to kernels only through [`ReduceBoolKernel`]. The
//! operation itself is an explicit [`BoolReduceOp`] tag resolved once when
//! the operator is built, instead of a bare integer carried to the kernel.

use super::tad::{strided_offsets, TadPlan};
use crate::{dispatch_buffer, DType, DataBuffer, NDArray, Result, TensorError};
use half::{bf16, f16};
use num_traits::{Float, Zero};
use rayon::prelude::*;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Boolean reduction operations, numbered as in the legacy op table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum BoolReduceOp {
    Any,
    All,
    IsFinite,
    IsInfOrNan,
    IsNan,
    IsInf,
    IsPositive,
    IsNegative,
}

/// How per-element predicates are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    /// True when every element satisfies the predicate; empty input is true
    Every,
    /// True when some element satisfies the predicate; empty input is false
    Exists,
}

impl BoolReduceOp {
    pub const ALL_OPS: [BoolReduceOp; 8] = [
        BoolReduceOp::Any,
        BoolReduceOp::All,
        BoolReduceOp::IsFinite,
        BoolReduceOp::IsInfOrNan,
        BoolReduceOp::IsNan,
        BoolReduceOp::IsInf,
        BoolReduceOp::IsPositive,
        BoolReduceOp::IsNegative,
    ];

    pub fn op_num(&self) -> i64 {
        match self {
            BoolReduceOp::Any => 0,
            BoolReduceOp::All => 1,
            BoolReduceOp::IsFinite => 2,
            BoolReduceOp::IsInfOrNan => 3,
            BoolReduceOp::IsNan => 4,
            BoolReduceOp::IsInf => 5,
            BoolReduceOp::IsPositive => 6,
            BoolReduceOp::IsNegative => 7,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BoolReduceOp::Any => "any",
            BoolReduceOp::All => "all",
            BoolReduceOp::IsFinite => "is_finite",
            BoolReduceOp::IsInfOrNan => "is_inf_or_nan",
            BoolReduceOp::IsNan => "is_nan",
            BoolReduceOp::IsInf => "is_inf",
            BoolReduceOp::IsPositive => "is_positive",
            BoolReduceOp::IsNegative => "is_negative",
        }
    }

    pub fn combine(&self) -> Combine {
        match self {
            BoolReduceOp::All
            | BoolReduceOp::IsFinite
            | BoolReduceOp::IsPositive
            | BoolReduceOp::IsNegative => Combine::Every,
            BoolReduceOp::Any
            | BoolReduceOp::IsInfOrNan
            | BoolReduceOp::IsNan
            | BoolReduceOp::IsInf => Combine::Exists,
        }
    }

    /// Per-element predicate
    pub fn test<T: BoolElement>(&self, value: T) -> bool {
        match self {
            BoolReduceOp::Any | BoolReduceOp::All => value.is_truthy(),
            BoolReduceOp::IsFinite => !value.is_nan_value() && !value.is_inf_value(),
            BoolReduceOp::IsInfOrNan => value.is_nan_value() || value.is_inf_value(),
            BoolReduceOp::IsNan => value.is_nan_value(),
            BoolReduceOp::IsInf => value.is_inf_value(),
            BoolReduceOp::IsPositive => value.is_positive_value(),
            BoolReduceOp::IsNegative => value.is_negative_value(),
        }
    }

    /// Result of reducing zero elements
    pub fn identity(&self) -> bool {
        self.combine() == Combine::Every
    }
}

impl TryFrom<i64> for BoolReduceOp {
    type Error = TensorError;

    fn try_from(op_num: i64) -> Result<Self> {
        Self::ALL_OPS
            .iter()
            .copied()
            .find(|op| op.op_num() == op_num)
            .ok_or_else(|| {
                TensorError::unsupported_operation(
                    "reduce_bool",
                    &format!("unknown boolean reduction op number {op_num}"),
                )
            })
    }
}

impl std::fmt::Display for BoolReduceOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Element classification used by the boolean predicates
pub trait BoolElement: Copy + Send + Sync {
    fn is_truthy(self) -> bool;
    fn is_nan_value(self) -> bool;
    fn is_inf_value(self) -> bool;
    fn is_positive_value(self) -> bool;
    fn is_negative_value(self) -> bool;
}

macro_rules! impl_float_element {
    ($($ty:ty),*) => {
        $(
            impl BoolElement for $ty {
                fn is_truthy(self) -> bool {
                    self != <$ty as Zero>::zero()
                }
                fn is_nan_value(self) -> bool {
                    Float::is_nan(self)
                }
                fn is_inf_value(self) -> bool {
                    Float::is_infinite(self)
                }
                fn is_positive_value(self) -> bool {
                    self > <$ty as Zero>::zero()
                }
                fn is_negative_value(self) -> bool {
                    self < <$ty as Zero>::zero()
                }
            }
        )*
    };
}

macro_rules! impl_int_element {
    ($($ty:ty),*) => {
        $(
            impl BoolElement for $ty {
                fn is_truthy(self) -> bool {
                    self != 0
                }
                fn is_nan_value(self) -> bool {
                    false
                }
                fn is_inf_value(self) -> bool {
                    false
                }
                #[allow(unused_comparisons)]
                fn is_positive_value(self) -> bool {
                    self > 0
                }
                #[allow(unused_comparisons)]
                fn is_negative_value(self) -> bool {
                    self < 0
                }
            }
        )*
    };
}

impl_float_element!(f16, bf16, f32, f64);
impl_int_element!(i8, i16, i32, i64, u8);

impl BoolElement for bool {
    fn is_truthy(self) -> bool {
        self
    }
    fn is_nan_value(self) -> bool {
        false
    }
    fn is_inf_value(self) -> bool {
        false
    }
    fn is_positive_value(self) -> bool {
        self
    }
    fn is_negative_value(self) -> bool {
        false
    }
}

/// Calling contract of the numeric boolean-reduction kernels
pub trait ReduceBoolKernel: Send + Sync {
    /// Reduce the whole of `x` into the single element of `z`
    fn exec_scalar(
        &self,
        op: BoolReduceOp,
        x: &NDArray,
        extra: Option<&[f64]>,
        z: &mut NDArray,
    ) -> Result<()>;

    /// Reduce every TAD of `x` described by `plan` into the elements of `z`
    fn exec_tad(
        &self,
        op: BoolReduceOp,
        x: &NDArray,
        extra: Option<&[f64]>,
        z: &mut NDArray,
        axes: &[usize],
        plan: &TadPlan,
    ) -> Result<()>;

    fn name(&self) -> &str;
}

/// Reference CPU kernel; slices are reduced in parallel above a work threshold
#[derive(Debug, Clone)]
pub struct CpuReduceBoolKernel {
    parallel_threshold: usize,
}

impl CpuReduceBoolKernel {
    pub fn new() -> Self {
        Self {
            parallel_threshold: 1 << 15,
        }
    }

    /// Minimum number of visited elements before rayon is used
    pub fn with_parallel_threshold(parallel_threshold: usize) -> Self {
        Self { parallel_threshold }
    }

    fn reduce_slices<T: BoolElement>(
        &self,
        op: BoolReduceOp,
        data: &[T],
        starts: &[usize],
        slice: &[usize],
    ) -> Vec<bool> {
        if starts.len() * slice.len() >= self.parallel_threshold {
            starts
                .par_iter()
                .map(|&base| reduce_slice(op, data, base, slice))
                .collect()
        } else {
            starts
                .iter()
                .map(|&base| reduce_slice(op, data, base, slice))
                .collect()
        }
    }
}

impl Default for CpuReduceBoolKernel {
    fn default() -> Self {
        Self::new()
    }
}

fn reduce_slice<T: BoolElement>(op: BoolReduceOp, data: &[T], base: usize, slice: &[usize]) -> bool {
    reduce_values(op, slice.iter().map(|&rel| data[base + rel]))
}

fn reduce_values<T: BoolElement>(op: BoolReduceOp, mut values: impl Iterator<Item = T>) -> bool {
    match op.combine() {
        Combine::Every => values.all(|v| op.test(v)),
        Combine::Exists => values.any(|v| op.test(v)),
    }
}

fn bool_output<'a>(z: &'a mut NDArray, operation: &str) -> Result<&'a mut Vec<bool>> {
    match z.buffer_mut()? {
        DataBuffer::Bool(out) => Ok(out),
        other => Err(TensorError::dtype_mismatch(
            operation,
            DType::Bool,
            other.dtype(),
        )),
    }
}

impl ReduceBoolKernel for CpuReduceBoolKernel {
    fn exec_scalar(
        &self,
        op: BoolReduceOp,
        x: &NDArray,
        extra: Option<&[f64]>,
        z: &mut NDArray,
    ) -> Result<()> {
        if z.length() != 1 {
            return Err(TensorError::invalid_shape(
                "exec_reduce_bool_scalar",
                &format!("scalar output expected, got {}", z.shape()),
                Some(z.dims()),
            ));
        }
        log::trace!("{op} scalar over {} (extra args: {extra:?})", x.shape());

        // a contiguous buffer holds exactly the array's elements, in some order
        let value = if x.shape().is_contiguous() {
            let len = x.length();
            dispatch_buffer!(x.buffer(), data => reduce_values(op, data[..len].iter().copied()))
        } else {
            let all = x.logical_offsets();
            let values =
                dispatch_buffer!(x.buffer(), data => self.reduce_slices(op, data, &[0], &all));
            values[0]
        };
        bool_output(z, "exec_reduce_bool_scalar")?[0] = value;
        Ok(())
    }

    fn exec_tad(
        &self,
        op: BoolReduceOp,
        x: &NDArray,
        extra: Option<&[f64]>,
        z: &mut NDArray,
        axes: &[usize],
        plan: &TadPlan,
    ) -> Result<()> {
        if z.length() != plan.num_tads() {
            return Err(TensorError::invalid_shape(
                "exec_reduce_bool",
                &format!(
                    "output {} cannot hold {} TAD results",
                    z.shape(),
                    plan.num_tads()
                ),
                Some(z.dims()),
            ));
        }
        log::trace!(
            "{op} over axes {axes:?} of {}: {} slices of {} (extra args: {extra:?})",
            x.shape(),
            plan.num_tads(),
            plan.tad_length()
        );

        let slice = plan.slice_offsets();
        let results =
            dispatch_buffer!(x.buffer(), data => self.reduce_slices(op, data, plan.offsets(), &slice));

        // output positions visited in the same order as the TADs
        let positions = strided_offsets(z.dims(), z.shape().strides(), x.ordering());
        let out = bool_output(z, "exec_reduce_bool")?;
        for (pos, value) in positions.into_iter().zip(results) {
            out[pos] = value;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "cpu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::reduction::common::AxisSet;
    use crate::{Order, ShapeDescriptor};

    #[test]
    fn test_op_numbers_roundtrip() {
        for op in BoolReduceOp::ALL_OPS {
            assert_eq!(BoolReduceOp::try_from(op.op_num()).unwrap(), op);
        }
        assert!(BoolReduceOp::try_from(42).is_err());
    }

    #[test]
    fn test_predicates() {
        assert!(BoolReduceOp::IsNan.test(f32::NAN));
        assert!(BoolReduceOp::IsInf.test(f64::NEG_INFINITY));
        assert!(!BoolReduceOp::IsFinite.test(f16::INFINITY));
        assert!(BoolReduceOp::IsPositive.test(3i32));
        assert!(!BoolReduceOp::IsNegative.test(0u8));
        assert!(BoolReduceOp::Any.test(true));
        assert!(!BoolReduceOp::All.test(bf16::ZERO));
    }

    #[test]
    fn test_exec_scalar() {
        let kernel = CpuReduceBoolKernel::new();
        let x = NDArray::from_vec(vec![1.0f32, 0.0, 2.0, 3.0], &[2, 2]).unwrap();
        let mut z = NDArray::scalar_bool(false);
        kernel.exec_scalar(BoolReduceOp::Any, &x, None, &mut z).unwrap();
        assert_eq!(z.to_bool_vec().unwrap(), vec![true]);
        kernel.exec_scalar(BoolReduceOp::All, &x, None, &mut z).unwrap();
        assert_eq!(z.to_bool_vec().unwrap(), vec![false]);
    }

    #[test]
    fn test_exec_scalar_reads_only_addressed_elements() {
        let kernel = CpuReduceBoolKernel::new();
        let mut z = NDArray::scalar_bool(false);

        // contiguous view over the head of a longer buffer
        let head = NDArray::from_parts(
            DataBuffer::Float32(vec![1.0, 1.0, 0.0]),
            ShapeDescriptor::new(&[2], Order::C, DType::Float32),
        )
        .unwrap();
        assert!(head.shape().is_contiguous());
        kernel.exec_scalar(BoolReduceOp::All, &head, None, &mut z).unwrap();
        assert_eq!(z.to_bool_vec().unwrap(), vec![true]);

        // every other element
        let strided = NDArray::from_parts(
            DataBuffer::UInt8(vec![1, 0, 1, 0]),
            ShapeDescriptor::with_strides(&[2], &[2], Order::C, DType::UInt8).unwrap(),
        )
        .unwrap();
        assert!(!strided.shape().is_contiguous());
        kernel.exec_scalar(BoolReduceOp::All, &strided, None, &mut z).unwrap();
        assert_eq!(z.to_bool_vec().unwrap(), vec![true]);
        kernel.exec_scalar(BoolReduceOp::IsNegative, &strided, None, &mut z).unwrap();
        assert_eq!(z.to_bool_vec().unwrap(), vec![false]);
    }

    #[test]
    fn test_exec_tad_rows_and_columns() {
        let kernel = CpuReduceBoolKernel::new();
        // [[1, 0, 1],
        //  [1, 1, 1]]
        let x = NDArray::from_vec(vec![1i32, 0, 1, 1, 1, 1], &[2, 3]).unwrap();

        let axes = AxisSet::from_axes(&[1], 2).unwrap();
        let plan = TadPlan::new(x.shape(), &axes).unwrap();
        let mut z = NDArray::from_vec(vec![false; 2], &[2]).unwrap();
        kernel
            .exec_tad(BoolReduceOp::All, &x, None, &mut z, axes.as_slice(), &plan)
            .unwrap();
        assert_eq!(z.to_bool_vec().unwrap(), vec![false, true]);

        let axes = AxisSet::from_axes(&[0], 2).unwrap();
        let plan = TadPlan::new(x.shape(), &axes).unwrap();
        let mut z = NDArray::from_vec(vec![false; 3], &[3]).unwrap();
        kernel
            .exec_tad(BoolReduceOp::All, &x, None, &mut z, axes.as_slice(), &plan)
            .unwrap();
        assert_eq!(z.to_bool_vec().unwrap(), vec![true, false, true]);
    }

    #[test]
    fn test_exec_tad_parallel_matches_serial() {
        let data: Vec<f64> = (0..4 * 64).map(|i| if i % 7 == 0 { f64::NAN } else { i as f64 }).collect();
        let x = NDArray::from_vec(data, &[4, 64]).unwrap();
        let axes = AxisSet::from_axes(&[0], 2).unwrap();
        let plan = TadPlan::new(x.shape(), &axes).unwrap();

        let mut serial = NDArray::from_vec(vec![false; 64], &[64]).unwrap();
        let mut parallel = NDArray::from_vec(vec![false; 64], &[64]).unwrap();
        CpuReduceBoolKernel::with_parallel_threshold(usize::MAX)
            .exec_tad(BoolReduceOp::IsNan, &x, None, &mut serial, &[0], &plan)
            .unwrap();
        CpuReduceBoolKernel::with_parallel_threshold(1)
            .exec_tad(BoolReduceOp::IsNan, &x, None, &mut parallel, &[0], &plan)
            .unwrap();
        assert_eq!(serial.to_bool_vec(), parallel.to_bool_vec());
    }

    #[test]
    fn test_empty_slices_use_identity() {
        let kernel = CpuReduceBoolKernel::new();
        let x = NDArray::from_vec(Vec::<f32>::new(), &[2, 0]).unwrap();
        let axes = AxisSet::from_axes(&[1], 2).unwrap();
        let plan = TadPlan::new(x.shape(), &axes).unwrap();
        let mut z = NDArray::from_vec(vec![false; 2], &[2]).unwrap();
        kernel
            .exec_tad(BoolReduceOp::All, &x, None, &mut z, &[1], &plan)
            .unwrap();
        assert_eq!(z.to_bool_vec().unwrap(), vec![true, true]);
    }

    #[test]
    fn test_exec_tad_rejects_wrong_output() {
        let kernel = CpuReduceBoolKernel::new();
        let x = NDArray::from_vec(vec![1.0f32; 6], &[2, 3]).unwrap();
        let axes = AxisSet::from_axes(&[1], 2).unwrap();
        let plan = TadPlan::new(x.shape(), &axes).unwrap();

        let mut too_long = NDArray::from_vec(vec![false; 3], &[3]).unwrap();
        assert!(kernel
            .exec_tad(BoolReduceOp::Any, &x, None, &mut too_long, &[1], &plan)
            .is_err());

        let shape = ShapeDescriptor::new(&[2], Order::C, DType::Float32);
        let mut not_bool = NDArray::from_vec(vec![0.0f32; 2], shape.dims()).unwrap();
        assert!(kernel
            .exec_tad(BoolReduceOp::Any, &x, None, &mut not_bool, &[1], &plan)
            .is_err());
    }
}

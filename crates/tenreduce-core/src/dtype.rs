#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum DType {
    Float16,  // Half precision IEEE 754-2008
    BFloat16, // Brain floating point
    Float32,
    Float64,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    Bool,
}

impl DType {
    pub fn size(&self) -> usize {
        match self {
            DType::Float16 => 2,
            DType::BFloat16 => 2,
            DType::Float32 => 4,
            DType::Float64 => 8,
            DType::Int8 => 1,
            DType::Int16 => 2,
            DType::Int32 => 4,
            DType::Int64 => 8,
            DType::UInt8 => 1,
            DType::Bool => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DType::Float16 => "float16",
            DType::BFloat16 => "bfloat16",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::UInt8 => "uint8",
            DType::Bool => "bool",
        }
    }

    /// Stable numeric tag used in the flat shape-info encoding
    pub fn code(&self) -> i64 {
        match self {
            DType::Bool => 1,
            DType::Float16 => 2,
            DType::BFloat16 => 3,
            DType::Float32 => 4,
            DType::Float64 => 5,
            DType::Int8 => 6,
            DType::Int16 => 7,
            DType::Int32 => 8,
            DType::Int64 => 9,
            DType::UInt8 => 10,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        let dtype = match code {
            1 => DType::Bool,
            2 => DType::Float16,
            3 => DType::BFloat16,
            4 => DType::Float32,
            5 => DType::Float64,
            6 => DType::Int8,
            7 => DType::Int16,
            8 => DType::Int32,
            9 => DType::Int64,
            10 => DType::UInt8,
            _ => return None,
        };
        Some(dtype)
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DType::Int8 | DType::Int16 | DType::Int32 | DType::Int64 | DType::UInt8
        )
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for dtype in [
            DType::Float16,
            DType::BFloat16,
            DType::Float32,
            DType::Float64,
            DType::Int8,
            DType::Int16,
            DType::Int32,
            DType::Int64,
            DType::UInt8,
            DType::Bool,
        ] {
            assert_eq!(DType::from_code(dtype.code()), Some(dtype));
        }
        assert_eq!(DType::from_code(0), None);
    }

    #[test]
    fn test_element_tags() {
        use crate::Element;
        assert_eq!(<bool as Element>::DTYPE, DType::Bool);
        assert_eq!(<half::f16 as Element>::DTYPE, DType::Float16);
        assert_eq!(<i64 as Element>::DTYPE, DType::Int64);
        assert_eq!(<u8 as Element>::DTYPE.size(), 1);
    }
}

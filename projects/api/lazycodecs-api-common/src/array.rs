//! Decoded array buffers.
//!
//! Every decode callable returns an [`ArrayBuffer`]: raw little-endian element bytes plus a
//! shape and an [`ElementType`]. A decoder that recognises its input but cannot tell what the
//! elements are returns a buffer typed [`ElementType::Undetermined`]. The dispatcher treats such
//! a buffer as a failed attempt rather than a result.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use derive_enum_all_values::AllValues;
use thiserror::Error;

/// Element type of an [`ArrayBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AllValues)]
pub enum ElementType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F16,
    F32,
    F64,
    /// The decoder could not determine the element type.
    Undetermined,
}

impl ElementType {
    /// Size of a single element in bytes. Zero for [`ElementType::Undetermined`].
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::Bool | Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 | Self::F16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
            Self::Undetermined => 0,
        }
    }

    pub const fn is_determined(self) -> bool {
        !matches!(self, Self::Undetermined)
    }

    /// Conventional lower-case name, e.g. `uint16` or `float32`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::F16 => "float16",
            Self::F32 => "float32",
            Self::F64 => "float64",
            Self::Undetermined => "undetermined",
        }
    }

    /// Looks up an element type by its [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all_values()
            .iter()
            .copied()
            .find(|kind| kind.is_determined() && kind.name() == name)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors constructing an [`ArrayBuffer`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArrayError {
    /// The byte length does not match shape times element size.
    #[error("buffer of {actual} bytes does not match shape requiring {expected} bytes")]
    LengthMismatch { expected: usize, actual: usize },

    /// The shape's element count overflows `usize`.
    #[error("array shape is too large")]
    ShapeOverflow,
}

/// A decoded n-dimensional array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayBuffer {
    data: Vec<u8>,
    shape: Vec<usize>,
    element_type: ElementType,
}

impl ArrayBuffer {
    /// Creates a buffer, validating that `data` holds exactly `shape` elements of `element_type`.
    ///
    /// Buffers of [`ElementType::Undetermined`] accept any byte length.
    pub fn new(
        data: Vec<u8>,
        shape: Vec<usize>,
        element_type: ElementType,
    ) -> Result<Self, ArrayError> {
        if element_type.is_determined() {
            let expected = Self::byte_len_of(&shape, element_type)?;
            if expected != data.len() {
                return Err(ArrayError::LengthMismatch {
                    expected,
                    actual: data.len(),
                });
            }
        }

        Ok(Self {
            data,
            shape,
            element_type,
        })
    }

    /// Wraps raw bytes as a one-dimensional `uint8` array.
    pub fn from_vec(data: Vec<u8>) -> Self {
        let shape = vec![data.len()];
        Self {
            data,
            shape,
            element_type: ElementType::U8,
        }
    }

    /// Copies raw bytes into a one-dimensional `uint8` array.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::from_vec(data.to_vec())
    }

    /// A buffer whose element type could not be determined.
    pub fn undetermined(data: Vec<u8>) -> Self {
        let shape = vec![data.len()];
        Self {
            data,
            shape,
            element_type: ElementType::Undetermined,
        }
    }

    /// Number of bytes needed by `shape` elements of `element_type`.
    pub fn byte_len_of(shape: &[usize], element_type: ElementType) -> Result<usize, ArrayError> {
        shape
            .iter()
            .try_fold(element_type.size_in_bytes(), |acc, &dim| acc.checked_mul(dim))
            .ok_or(ArrayError::ShapeOverflow)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![2, 3], ElementType::U16, 12)]
    #[case(vec![4], ElementType::F64, 32)]
    #[case(vec![], ElementType::U8, 1)]
    #[case(vec![5, 0], ElementType::I32, 0)]
    fn validates_byte_length(
        #[case] shape: Vec<usize>,
        #[case] element_type: ElementType,
        #[case] bytes: usize,
    ) {
        let array = ArrayBuffer::new(vec![0; bytes], shape.clone(), element_type).unwrap();
        assert_eq!(array.shape(), shape.as_slice());

        let error = ArrayBuffer::new(vec![0; bytes + 1], shape, element_type).unwrap_err();
        assert_eq!(
            error,
            ArrayError::LengthMismatch {
                expected: bytes,
                actual: bytes + 1
            }
        );
    }

    #[test]
    fn rejects_overflowing_shapes() {
        let error = ArrayBuffer::new(vec![], vec![usize::MAX, 2], ElementType::U16).unwrap_err();
        assert_eq!(error, ArrayError::ShapeOverflow);
    }

    #[test]
    fn undetermined_accepts_any_length() {
        let array = ArrayBuffer::new(vec![1, 2, 3], vec![7], ElementType::Undetermined).unwrap();
        assert!(!array.element_type().is_determined());
        assert!(!ArrayBuffer::undetermined(vec![1]).element_type().is_determined());
    }

    #[test]
    fn element_names_round_trip() {
        for kind in ElementType::all_values().iter().copied() {
            if kind.is_determined() {
                assert_eq!(ElementType::from_name(kind.name()), Some(kind));
            }
        }
        assert_eq!(ElementType::from_name("undetermined"), None);
    }
}

use ndarray::Array1;
use std::fmt;
use std::mem;
use crate::common::error::MeasureError;

/// Fixed-width unsigned element types, narrowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dtype {
    U8,
    U16,
    U32,
    U64,
}

/// The representation every measurement is compared against.
pub const BASELINE_DTYPE: Dtype = Dtype::U64;

impl Dtype {
    pub const ALL: [Dtype; 4] = [Dtype::U8, Dtype::U16, Dtype::U32, Dtype::U64];

    /// Smallest type that can hold `value`.
    pub fn for_max_value(value: u64) -> Self {
        Self::ALL
            .into_iter()
            .find(|dtype| value <= dtype.max_value())
            .unwrap_or(Dtype::U64)
    }

    /// Smallest type able to index an array of `elements` entries.
    /// An empty array has nothing to index and gets `U8`.
    pub fn for_len(elements: usize) -> Self {
        match elements.checked_sub(1) {
            Some(max) => Self::for_max_value(max as u64),
            None => Dtype::U8,
        }
    }

    pub fn width_bytes(self) -> usize {
        match self {
            Dtype::U8 => mem::size_of::<u8>(),
            Dtype::U16 => mem::size_of::<u16>(),
            Dtype::U32 => mem::size_of::<u32>(),
            Dtype::U64 => mem::size_of::<u64>(),
        }
    }

    pub fn max_value(self) -> u64 {
        match self {
            Dtype::U8 => u8::MAX as u64,
            Dtype::U16 => u16::MAX as u64,
            Dtype::U32 => u32::MAX as u64,
            Dtype::U64 => u64::MAX,
        }
    }

    pub fn bits(self) -> usize {
        self.width_bytes() * 8
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "uint{}", self.bits())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub elements: usize,
    /// Largest value stored, `None` for an empty array.
    pub max_value: Option<usize>,
    pub dtype: Dtype,
    pub bytes: u64,
}

/// Allocates `0..elements` at the narrowest width and reports its size.
#[derive(Debug, Clone)]
pub struct Measurer {
    max_allocation_bytes: u64,
}

impl Measurer {
    pub fn new(max_allocation_bytes: u64) -> Self {
        Self { max_allocation_bytes }
    }

    pub fn measure(&self, elements: usize) -> Result<Measurement, MeasureError> {
        let dtype = Dtype::for_len(elements);
        let requested = elements as u128 * dtype.width_bytes() as u128;

        if requested > self.max_allocation_bytes as u128 {
            return Err(MeasureError::AllocationTooLarge {
                elements,
                requested,
                limit: self.max_allocation_bytes,
            });
        }

        tracing::debug!("Allocating {} elements as {} ({} bytes)", elements, dtype, requested);

        let bytes = match dtype {
            Dtype::U8 => nbytes(&allocate_range(elements, |i| i as u8)?),
            Dtype::U16 => nbytes(&allocate_range(elements, |i| i as u16)?),
            Dtype::U32 => nbytes(&allocate_range(elements, |i| i as u32)?),
            Dtype::U64 => nbytes(&allocate_range(elements, |i| i as u64)?),
        };

        Ok(Measurement {
            elements,
            max_value: elements.checked_sub(1),
            dtype,
            bytes,
        })
    }
}

/// Fills `0..elements` through `narrow`. The dtype is chosen from
/// `elements - 1`, so every index fits and the `as` casts never truncate.
fn allocate_range<T>(elements: usize, narrow: impl Fn(usize) -> T) -> Result<Array1<T>, MeasureError> {
    let mut values: Vec<T> = Vec::new();
    values.try_reserve_exact(elements).map_err(|_| MeasureError::AllocationFailed {
        bytes: elements as u128 * mem::size_of::<T>() as u128,
    })?;
    values.extend((0..elements).map(narrow));

    Ok(Array1::from_vec(values))
}

fn nbytes<T>(array: &Array1<T>) -> u64 {
    (array.len() * mem::size_of::<T>()) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurer() -> Measurer {
        Measurer::new(1 << 30)
    }

    #[test]
    fn dtype_boundaries() {
        assert_eq!(Dtype::for_max_value(0), Dtype::U8);
        assert_eq!(Dtype::for_max_value(255), Dtype::U8);
        assert_eq!(Dtype::for_max_value(256), Dtype::U16);
        assert_eq!(Dtype::for_max_value(65_535), Dtype::U16);
        assert_eq!(Dtype::for_max_value(65_536), Dtype::U32);
        assert_eq!(Dtype::for_max_value(u32::MAX as u64), Dtype::U32);
        assert_eq!(Dtype::for_max_value(u32::MAX as u64 + 1), Dtype::U64);
        assert_eq!(Dtype::for_max_value(u64::MAX), Dtype::U64);
    }

    #[test]
    fn for_len_covers_last_index() {
        assert_eq!(Dtype::for_len(256), Dtype::U8);
        assert_eq!(Dtype::for_len(257), Dtype::U16);
        assert_eq!(Dtype::for_len(65_537), Dtype::U32);
    }

    #[test]
    fn display_names() {
        assert_eq!(Dtype::U8.to_string(), "uint8");
        assert_eq!(Dtype::U16.to_string(), "uint16");
        assert_eq!(Dtype::U32.to_string(), "uint32");
        assert_eq!(BASELINE_DTYPE.to_string(), "uint64");
    }

    #[test]
    fn single_element_uses_one_byte() {
        let m = measurer().measure(1).unwrap();
        assert_eq!(m.dtype, Dtype::U8);
        assert_eq!(m.bytes, 1);
        assert_eq!(m.max_value, Some(0));
    }

    #[test]
    fn three_hundred_elements_need_uint16() {
        let m = measurer().measure(300).unwrap();
        assert_eq!(m.dtype, Dtype::U16);
        assert_eq!(m.bytes, 600);
        assert_eq!(m.max_value, Some(299));
    }

    #[test]
    fn seventy_thousand_elements_need_uint32() {
        let m = measurer().measure(70_000).unwrap();
        assert_eq!(m.dtype, Dtype::U32);
        assert_eq!(m.bytes, 280_000);
    }

    #[test]
    fn empty_array_is_zero_bytes() {
        let m = measurer().measure(0).unwrap();
        assert_eq!(m.dtype, Dtype::U8);
        assert_eq!(m.bytes, 0);
        assert_eq!(m.max_value, None);
    }

    #[test]
    fn over_limit_is_rejected_before_allocating() {
        let err = Measurer::new(100).measure(300).unwrap_err();
        match err {
            MeasureError::AllocationTooLarge { elements, requested, limit } => {
                assert_eq!(elements, 300);
                assert_eq!(requested, 600);
                assert_eq!(limit, 100);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn huge_counts_do_not_overflow_the_size_check() {
        let err = measurer().measure(usize::MAX).unwrap_err();
        assert_eq!(err.kind(), "AllocationTooLarge");
    }

    #[test]
    fn last_index_survives_narrowing() {
        let array = allocate_range(256, |i| i as u8).unwrap();
        assert_eq!(array[255], 255);
        let array = allocate_range(65_536, |i| i as u16).unwrap();
        assert_eq!(array[65_535], u16::MAX);
        assert_eq!(Dtype::for_len(65_536), Dtype::U16);
    }

    #[test]
    fn limit_is_inclusive() {
        let m = Measurer::new(600).measure(300).unwrap();
        assert_eq!(m.bytes, 600);
    }
}

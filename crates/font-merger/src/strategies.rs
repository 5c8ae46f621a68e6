//! How a field is combined across fonts.

use crate::{MergeError, Result};

pub fn max<T: Ord + Clone>(values: &[T]) -> Result<T> {
    values.iter().max().cloned().ok_or(MergeError::NoFonts)
}

pub fn min<T: Ord + Clone>(values: &[T]) -> Result<T> {
    values.iter().min().cloned().ok_or(MergeError::NoFonts)
}

/// How one bit of a flag word is merged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bit {
    /// Set when any font sets it
    Any,
    /// Set when every font sets it
    All,
    /// Taken from the first font
    First,
}

/// Merge flag words bit by bit.
pub fn merge_bits(values: &[u16], bit_map: &[Bit; 16]) -> Result<u16> {
    let first = *values.first().ok_or(MergeError::NoFonts)?;

    Ok(bit_map.iter().enumerate().fold(0u16, |result, (bit, mode)| {
        let mask = 1u16 << bit;
        let set = match mode {
            Bit::Any => values.iter().any(|v| v & mask != 0),
            Bit::All => values.iter().all(|v| v & mask != 0),
            Bit::First => first & mask != 0,
        };
        if set { result | mask } else { result }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_strategies() {
        let values = [3, 9, -2];
        assert_eq!(max(&values).unwrap(), 9);
        assert_eq!(min(&values).unwrap(), -2);
        assert!(matches!(max::<i16>(&[]), Err(MergeError::NoFonts)));
    }

    #[test]
    fn test_merge_bits() {
        let mut map = [Bit::First; 16];
        map[0] = Bit::Any;
        map[1] = Bit::All;

        assert_eq!(merge_bits(&[0b001, 0b000], &map).unwrap(), 0b001);
        assert_eq!(merge_bits(&[0b010, 0b000], &map).unwrap(), 0b000);
        assert_eq!(merge_bits(&[0b010, 0b010], &map).unwrap(), 0b010);
        assert_eq!(merge_bits(&[0b100, 0b000], &map).unwrap(), 0b100);
        assert_eq!(merge_bits(&[0b000, 0b100], &map).unwrap(), 0b000);
    }
}

// Sat Oct 17 2026 - Alex

use crate::exttype::{LayoutError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Alignment {
    value: usize,
}

impl Alignment {
    pub const BYTE: Alignment = Alignment { value: 1 };

    pub fn new(value: usize) -> Result<Self> {
        if value == 0 || !value.is_power_of_two() {
            return Err(LayoutError::InvalidConfig(format!(
                "alignment {} is not a power of two",
                value
            )));
        }
        Ok(Self { value })
    }

    /// Natural alignment of a scalar of `size` bytes.
    pub fn natural(size: usize) -> Self {
        Self {
            value: size.max(1).next_power_of_two(),
        }
    }

    pub fn as_usize(&self) -> usize {
        self.value
    }

    /// Round `offset` up to a multiple of this alignment. `None` on overflow.
    pub fn align(&self, offset: usize) -> Option<usize> {
        offset
            .checked_add(self.value - 1)
            .map(|end| end & !(self.value - 1))
    }

    pub fn max(self, other: Alignment) -> Alignment {
        if other.value > self.value {
            other
        } else {
            self
        }
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Self { value: 8 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_power_of_two() {
        assert!(Alignment::new(0).is_err());
        assert!(Alignment::new(12).is_err());
        assert_eq!(Alignment::new(16).unwrap().as_usize(), 16);
    }

    #[test]
    fn test_natural_and_align() {
        assert_eq!(Alignment::natural(4).as_usize(), 4);
        assert_eq!(Alignment::natural(16).as_usize(), 16);
        assert_eq!(Alignment::natural(0), Alignment::BYTE);
        assert_eq!(Alignment::natural(4).align(5), Some(8));
        assert_eq!(Alignment::natural(8).align(usize::MAX), None);
        assert_eq!(Alignment::natural(1).max(Alignment::natural(8)).as_usize(), 8);
    }
}

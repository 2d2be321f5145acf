use std::iter::Sum;
use std::ops::Add;

use derive_more::{Display, From, Into};

/// Byte size of a file, or the aggregate size of a directory.
///
/// Addition saturates at `u64::MAX`, so totals over huge listings never wrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Into)]
pub struct Size(u64);

impl Size {
    pub const ZERO: Size = Size(0);

    pub const fn new(bytes: u64) -> Self {
        Size(bytes)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn saturating_sub(self, other: Size) -> Size {
        Size(self.0.saturating_sub(other.0))
    }

    pub const fn saturating_add(self, other: Size) -> Size {
        Size(self.0.saturating_add(other.0))
    }
}

impl Add for Size {
    type Output = Size;

    fn add(self, other: Size) -> Size {
        self.saturating_add(other)
    }
}

impl Sum for Size {
    fn sum<I: Iterator<Item = Size>>(iter: I) -> Self {
        iter.fold(Size::ZERO, Add::add)
    }
}

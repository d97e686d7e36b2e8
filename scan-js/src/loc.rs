use crate::error::ScanError;
use crate::error::ScanErrorType;
use std::cmp::{max, min};

/// A half-open range within the current source file expressed as UTF-8 byte
/// offsets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  pub fn is_empty(&self) -> bool {
    self.0 >= self.1
  }

  pub fn len(&self) -> usize {
    self.1 - self.0
  }

  pub fn extend(&mut self, other: Loc) {
    self.0 = min(self.0, other.0);
    self.1 = max(self.1, other.1);
  }

  pub fn error(self, typ: ScanErrorType) -> ScanError {
    ScanError::new(typ, self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extend_covers_both_ranges() {
    let mut loc = Loc(4, 10);
    loc.extend(Loc(2, 6));
    assert_eq!(loc, Loc(2, 10));
    loc.extend(Loc(8, 14));
    assert_eq!(loc, Loc(2, 14));
  }

  #[test]
  fn len_and_is_empty() {
    assert_eq!(Loc(3, 7).len(), 4);
    assert!(!Loc(3, 7).is_empty());
    assert!(Loc(5, 5).is_empty());
  }
}

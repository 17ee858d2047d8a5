//! Bounded integers, used to constrain component port counts.
//!
//! Writes outside `[min, max]` are clamped to the nearest bound rather than
//! rejected. The value may be unset; reading it then fails with
//! [`LfError::Uninitialized`].

use crate::error::{LfError, LfResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClampedValue {
    value: Option<i64>,
    min: i64,
    max: i64,
}

impl ClampedValue {
    /// Bounded value; `value` is clamped into `[min, max]` immediately.
    /// Swapped bounds are normalized.
    pub fn new(value: i64, min: i64, max: i64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            value: Some(value.clamp(min, max)),
            min,
            max,
        }
    }

    /// A value that can never change (`min == max == value`).
    pub fn fixed(value: i64) -> Self {
        Self::new(value, value, value)
    }

    /// Bounds without a value yet.
    pub fn unset(min: i64, max: i64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            value: None,
            min,
            max,
        }
    }

    pub fn value(&self) -> LfResult<i64> {
        self.value.ok_or(LfError::Uninitialized {
            what: "clamped value",
        })
    }

    /// The value as a count. Bounds are expected to be non-negative.
    pub fn count(&self) -> LfResult<usize> {
        let v = self.value()?;
        usize::try_from(v).map_err(|_| LfError::InvalidArg {
            what: "negative count",
        })
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// Whether `v` lies inside the bounds (i.e. would be stored unchanged).
    pub fn accepts(&self, v: i64) -> bool {
        (self.min..=self.max).contains(&v)
    }

    pub fn set_value(&mut self, v: i64) -> &mut Self {
        self.value = Some(v.clamp(self.min, self.max));
        self
    }

    /// Move the lower bound. The upper bound follows if it would be crossed.
    pub fn set_min(&mut self, min: i64) -> &mut Self {
        self.min = min;
        self.max = self.max.max(min);
        self.reclamp()
    }

    /// Move the upper bound. The lower bound follows if it would be crossed.
    pub fn set_max(&mut self, max: i64) -> &mut Self {
        self.max = max;
        self.min = self.min.min(max);
        self.reclamp()
    }

    fn reclamp(&mut self) -> &mut Self {
        if let Some(v) = self.value {
            self.value = Some(v.clamp(self.min, self.max));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_law() {
        assert_eq!(ClampedValue::new(5, 0, 10).set_value(15).value(), Ok(10));
        assert_eq!(ClampedValue::new(5, 0, 10).set_value(-3).value(), Ok(0));
        assert_eq!(ClampedValue::new(5, 0, 10).set_value(7).value(), Ok(7));
    }

    #[test]
    fn unset_read_fails() {
        let v = ClampedValue::unset(2, 8);
        assert_eq!(
            v.value(),
            Err(LfError::Uninitialized {
                what: "clamped value"
            })
        );
        assert!(v.count().is_err());
    }

    #[test]
    fn fixed_never_moves() {
        let mut v = ClampedValue::fixed(1);
        v.set_value(4);
        assert_eq!(v.count(), Ok(1));
        assert!(!v.accepts(0));
    }

    #[test]
    fn bound_changes_reclamp() {
        let mut v = ClampedValue::new(6, 2, 8);
        v.set_max(4);
        assert_eq!(v.value(), Ok(4));
        v.set_min(5);
        assert_eq!((v.min(), v.max()), (5, 5));
        assert_eq!(v.value(), Ok(5));
    }

    #[test]
    fn swapped_bounds_are_normalized() {
        let v = ClampedValue::new(3, 10, 0);
        assert_eq!((v.min(), v.max()), (0, 10));
        assert_eq!(v.value(), Ok(3));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn stored_value_stays_in_bounds(
            lo in -50_i64..50,
            span in 0_i64..50,
            writes in prop::collection::vec(-200_i64..200, 1..20),
        ) {
            let mut v = ClampedValue::unset(lo, lo + span);
            for w in writes {
                v.set_value(w);
                let stored = v.value().unwrap();
                prop_assert!(v.min() <= stored && stored <= v.max());
                if v.accepts(w) {
                    prop_assert_eq!(stored, w);
                }
            }
        }
    }
}

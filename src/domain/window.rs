//! Fixed-capacity FIFO window with a running sum.

use std::collections::VecDeque;

/// Keeps the most recent `capacity` values and their sum, O(1) per push.
///
/// A capacity of zero is treated as one.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    values: VecDeque<f64>,
    capacity: usize,
    sum: f64,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        RollingWindow {
            values: VecDeque::with_capacity(capacity),
            capacity,
            sum: 0.0,
        }
    }

    /// Appends `value`, returning the evicted oldest value once the window is full.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let evicted = if self.is_full() {
            self.values.pop_front()
        } else {
            None
        };
        if let Some(old) = evicted {
            self.sum -= old;
        }
        self.sum += value;
        self.values.push_back(value);
        evicted
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
impl RollingWindow {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn fills_then_evicts_oldest() {
        let mut window = RollingWindow::new(3);
        assert_eq!(window.push(1.0), None);
        assert_eq!(window.push(2.0), None);
        assert!(!window.is_full());
        assert_eq!(window.push(3.0), None);
        assert!(window.is_full());
        assert_eq!(window.push(4.0), Some(1.0));
        assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
        assert_relative_eq!(window.sum(), 9.0);
    }

    #[test]
    fn zero_capacity_behaves_as_one() {
        let mut window = RollingWindow::new(0);
        assert_eq!(window.capacity(), 1);
        window.push(5.0);
        assert_eq!(window.push(6.0), Some(5.0));
        assert_relative_eq!(window.sum(), 6.0);
    }

    #[test]
    fn empty_window() {
        let window = RollingWindow::new(4);
        assert!(window.is_empty());
        assert_eq!(window.len(), 0);
        assert_relative_eq!(window.sum(), 0.0);
    }

    proptest! {
        #[test]
        fn keeps_only_most_recent_values(
            capacity in 1usize..20,
            values in prop::collection::vec(-1_000i32..1_000, 0..60),
        ) {
            let mut window = RollingWindow::new(capacity);
            for v in &values {
                window.push(*v as f64);
            }
            let start = values.len().saturating_sub(capacity);
            let expected: Vec<f64> = values[start..].iter().map(|v| *v as f64).collect();
            let held: Vec<f64> = window.iter().copied().collect();
            prop_assert_eq!(&held, &expected);
            // integer inputs keep the running sum exact
            prop_assert_eq!(window.sum(), expected.iter().sum::<f64>());
        }
    }
}

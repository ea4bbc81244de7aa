use std::collections::VecDeque;

/// Count-bounded ring buffer: once `capacity` items are held, each push
/// drops the oldest item.
#[derive(Clone, Debug, PartialEq)]
pub struct RollingWindow<T> {
    window: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(item);
    }

    pub fn latest(&self) -> Option<&T> {
        self.window.back()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.window.get(idx)
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.window.iter()
    }

    /// The most recent `n` items, oldest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &T> {
        self.window.iter().skip(self.window.len().saturating_sub(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut w = RollingWindow::new(3);
        for i in 0..5 {
            w.push(i);
        }

        assert_eq!(w.len(), 3);
        assert_eq!(w.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(w.latest(), Some(&4));
    }

    #[test]
    fn tail_returns_most_recent_in_order() {
        let mut w = RollingWindow::new(10);
        for i in 0..6 {
            w.push(i);
        }

        assert_eq!(w.tail(2).copied().collect::<Vec<_>>(), vec![4, 5]);
        assert_eq!(w.tail(50).count(), 6);
    }

    #[test]
    fn zero_capacity_is_treated_as_one() {
        let mut w = RollingWindow::new(0);
        w.push('a');
        w.push('b');

        assert_eq!(w.capacity(), 1);
        assert_eq!(w.latest(), Some(&'b'));
    }
}

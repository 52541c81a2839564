//! Reference model of the FIFO contents.

/// Bounded ring buffer standing in for the device's storage.
///
/// Pushing into a full model or popping an empty one is refused instead of
/// blocking, so the caller can turn the request into a flag check.
#[derive(Debug, Clone)]
pub struct RefModel {
    slots: Box<[u32]>,
    head: usize,
    len: usize,
    mask: u32,
}

impl RefModel {
    pub fn new(capacity: usize, data_width: u32) -> Self {
        assert!(capacity > 0, "reference model needs capacity");
        let mask = if data_width >= 32 {
            u32::MAX
        } else {
            (1u32 << data_width) - 1
        };
        Self {
            slots: vec![0; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
            mask,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Append `value` (truncated to the data width). Returns `false` and
    /// leaves the model untouched when full.
    pub fn try_push(&mut self, value: u32) -> bool {
        if self.is_full() {
            return false;
        }
        let tail = (self.head + self.len) % self.capacity();
        self.slots[tail] = value & self.mask;
        self.len += 1;
        true
    }

    /// Remove the oldest value, or `None` when empty.
    pub fn try_pop(&mut self) -> Option<u32> {
        if self.is_empty() {
            return None;
        }
        let value = self.slots[self.head];
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        Some(value)
    }

    pub fn peek(&self) -> Option<u32> {
        (!self.is_empty()).then(|| self.slots[self.head])
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Contents from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len).map(move |i| self.slots[(self.head + i) % self.capacity()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut model = RefModel::new(4, 8);
        assert!(model.is_empty());
        for v in [5, 200, 0, 255] {
            assert!(model.try_push(v));
        }
        assert!(model.is_full());
        assert_eq!(model.iter().collect::<Vec<_>>(), vec![5, 200, 0, 255]);
        assert_eq!(model.try_pop(), Some(5));
        assert_eq!(model.try_pop(), Some(200));
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn test_full_push_is_noop() {
        let mut model = RefModel::new(2, 8);
        assert!(model.try_push(1));
        assert!(model.try_push(2));
        assert!(!model.try_push(3));
        assert_eq!(model.len(), 2);
        assert_eq!(model.iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_empty_pop_is_noop() {
        let mut model = RefModel::new(2, 8);
        assert_eq!(model.try_pop(), None);
        assert_eq!(model.peek(), None);
        assert!(model.is_empty());
    }

    #[test]
    fn test_wraparound() {
        let mut model = RefModel::new(3, 8);
        for round in 0..10u32 {
            assert!(model.try_push(round));
            assert!(model.try_push(round + 100));
            assert_eq!(model.try_pop(), Some(round));
            assert_eq!(model.try_pop(), Some(round + 100));
        }
        assert!(model.is_empty());
    }

    #[test]
    fn test_values_truncated_to_width() {
        let mut model = RefModel::new(2, 8);
        assert!(model.try_push(0x1ff));
        assert_eq!(model.try_pop(), Some(0xff));
    }

    #[test]
    fn test_clear() {
        let mut model = RefModel::new(2, 8);
        assert!(model.try_push(9));
        model.clear();
        assert!(model.is_empty());
        assert!(!model.is_full());
    }
}

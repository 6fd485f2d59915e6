/// Fixed-capacity circular buffer.
///
/// Items are written at `tail` and read from `head`; both advance modulo the
/// capacity. Not synchronized; [`CommandQueue`](super::CommandQueue) wraps it.
pub(super) struct Ring<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    tail: usize,
    count: usize,
}

impl<T> Ring<T> {
    pub(super) fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    #[inline]
    pub(super) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(super) fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub(super) fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub(super) fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Caller guarantees the ring is not full.
    pub(super) fn push_back(&mut self, item: T) {
        debug_assert!(!self.is_full());
        debug_assert!(self.slots[self.tail].is_none());
        self.slots[self.tail] = Some(item);
        self.tail = (self.tail + 1) % self.capacity();
        self.count += 1;
    }

    pub(super) fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.capacity();
        self.count -= 1;
        item
    }

    pub(super) fn front(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        self.slots[self.head].as_ref()
    }

    /// Removes every item in FIFO order.
    pub(super) fn drain(&mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.count);
        while let Some(item) = self.pop_front() {
            out.push(item);
        }
        self.head = 0;
        self.tail = 0;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_around_preserving_order() {
        let mut r = Ring::with_capacity(3);
        r.push_back(1);
        r.push_back(2);
        assert_eq!(r.pop_front(), Some(1));
        r.push_back(3);
        r.push_back(4);
        assert!(r.is_full());
        assert_eq!(r.front(), Some(&2));
        assert_eq!(r.drain(), vec![2, 3, 4]);
        assert!(r.is_empty());
    }

    #[test]
    fn pop_on_empty_is_none() {
        let mut r: Ring<u8> = Ring::with_capacity(1);
        assert_eq!(r.pop_front(), None);
        r.push_back(9);
        assert_eq!(r.len(), 1);
        assert_eq!(r.pop_front(), Some(9));
        assert_eq!(r.pop_front(), None);
    }
}

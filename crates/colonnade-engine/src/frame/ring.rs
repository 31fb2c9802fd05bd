use super::error::FrameError;

/// Fixed-size circular set of per-frame resources.
///
/// The cursor starts just before slot 0, so the first `advance` selects slot 0
/// and frame `k` always lands on slot `k % len`.
#[derive(Debug)]
pub struct FrameRing<R> {
    slots: Vec<R>,
    cursor: usize,
}

impl<R> FrameRing<R> {
    pub fn new(slots: Vec<R>) -> Result<Self, FrameError> {
        if slots.is_empty() {
            return Err(FrameError::EmptyRing);
        }
        let cursor = slots.len() - 1;
        Ok(Self { slots, cursor })
    }

    /// Builds `len` slots with `make(index)`, stopping at the first error.
    pub fn build<F>(len: usize, make: F) -> Result<Self, FrameError>
    where
        F: FnMut(usize) -> Result<R, FrameError>,
    {
        let slots = (0..len).map(make).collect::<Result<Vec<_>, _>>()?;
        Self::new(slots)
    }

    /// Moves to the next slot and returns it.
    pub fn advance(&mut self) -> &mut R {
        self.cursor = (self.cursor + 1) % self.slots.len();
        &mut self.slots[self.cursor]
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn current(&self) -> &R {
        &self.slots[self.cursor]
    }

    #[inline]
    pub fn current_mut(&mut self) -> &mut R {
        &mut self.slots[self.cursor]
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&R> {
        self.slots.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.slots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ring_is_rejected() {
        assert!(matches!(
            FrameRing::<u32>::new(Vec::new()),
            Err(FrameError::EmptyRing)
        ));
    }

    #[test]
    fn first_advance_selects_slot_zero() {
        let mut ring = FrameRing::new(vec!['a', 'b', 'c']).unwrap();
        assert_eq!(*ring.advance(), 'a');
        assert_eq!(ring.current_index(), 0);
    }

    #[test]
    fn advance_wraps_round_robin() {
        let mut ring = FrameRing::new(vec![0, 1, 2]).unwrap();
        let seen: Vec<i32> = (0..7).map(|_| *ring.advance()).collect();
        assert_eq!(seen, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn single_slot_ring_always_returns_it() {
        let mut ring = FrameRing::new(vec!["only"]).unwrap();
        for _ in 0..3 {
            assert_eq!(*ring.advance(), "only");
        }
    }

    #[test]
    fn build_propagates_errors() {
        let result = FrameRing::<usize>::build(3, |i| {
            if i == 1 {
                Err(FrameError::allocation("slot", "no memory"))
            } else {
                Ok(i)
            }
        });
        assert!(matches!(result, Err(FrameError::Allocation { .. })));
    }
}

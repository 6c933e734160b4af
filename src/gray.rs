//! The gray worklist: a dynamic LIFO stack of slot indices pending tracing.
//!
//! This is the "gray" side of the tricolor abstraction used by the mark
//! phase (see [`crate::collect`]): white is `IN_USE` and absent from the
//! list and not `MARKED`; gray is present here; black is `IN_USE | MARKED`.

/// Initial and growth behavior mirror the slot table: start small, double
/// when full. Unlike the slot table this is a plain `Vec`, so Rust's own
/// amortized growth already gives us this for free -- kept as an explicit
/// wrapper so the tracing loop reads as its own component, matching the
/// source's `grayList`/`grayCount`/`grayCapacity` triple being a distinct
/// piece of collector state from the slot table.
#[derive(Default)]
pub struct GrayWorklist {
    indices: Vec<usize>,
}

impl GrayWorklist {
    pub const fn new() -> Self {
        Self {
            indices: Vec::new(),
        }
    }

    /// `markGray`: push a slot index onto the worklist. Slots already
    /// `MARKED` are still pushed here if re-encountered as a root or from
    /// another object's interior -- `trace` is responsible for skipping an
    /// already-marked slot without rescanning it, so the list itself does
    /// not need to deduplicate on push.
    #[inline]
    pub fn push(&mut self, idx: usize) {
        self.indices.push(idx);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<usize> {
        self.indices.pop()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.indices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifo_order() {
        let mut wl = GrayWorklist::new();
        wl.push(1);
        wl.push(2);
        wl.push(3);
        assert_eq!(wl.pop(), Some(3));
        assert_eq!(wl.pop(), Some(2));
        assert_eq!(wl.pop(), Some(1));
        assert_eq!(wl.pop(), None);
    }
}

//! Root sources and the conservative scanning primitive.
//!
//! Two kinds of roots are recognized: the mutator's call stack, bounded by
//! a user-supplied stack bottom and a freshly captured stack top taken at
//! the start of every collection; and static-lifetime data ranges the
//! client registers explicitly (see [`StaticRoots`]).
//!
//! [`scan_region`] is the crate's one raw-memory-reading primitive. Every
//! other root-scanning helper in this module funnels through it --
//! conservative scanning needs exactly one narrow `unsafe` boundary, not
//! one per caller.

use std::mem::size_of;

/// Pointer-width stride used when walking a region for root candidates.
const WORD_SIZE: usize = size_of::<usize>();

/// Obtains an address usable as a stack bound.
///
/// This takes the address of a local variable in the current call frame.
/// On every platform with a downward-growing call stack this is numerically
/// no further from the true stack top than any mutator local declared
/// before this function was called -- a portable substitute for reading
/// the frame-base register directly.
///
/// # Safety
/// The returned value is only meaningful as a *bound* for a subsequent
/// [`scan_region`] call; it must never be dereferenced.
#[inline(never)]
pub fn capture_stack_pointer() -> usize {
    let mut anchor: usize = 0;
    let ptr = &mut anchor as *mut usize;
    ptr as usize
}

/// Scan every pointer-aligned word in `[min(begin, end), max(begin, end))`
/// and invoke `candidate` with each word's value reinterpreted as an
/// address. Iteration direction is tolerated both ways because the stack
/// bottom may be numerically above or below the top depending on platform.
///
/// # Safety
/// `begin` and `end` must both be valid, currently-mapped addresses, and
/// every word in the implied range must be safely readable as a `usize`
/// (true for the stack and for ranges the client has vouched are static
/// data). This is the collector's sole unsafe read of memory it does not
/// itself own.
pub unsafe fn scan_region(begin: usize, end: usize, mut candidate: impl FnMut(usize)) {
    if begin == end {
        return;
    }
    let (lo, hi) = if begin < end { (begin, end) } else { (end, begin) };
    let lo = lo - (lo % WORD_SIZE);
    let mut ptr = lo;
    while ptr < hi {
        let word = (ptr as *const usize).read_unaligned();
        candidate(word);
        ptr += WORD_SIZE;
    }
}

/// Static-lifetime root ranges the client has registered explicitly.
///
/// Linker-provided data-segment symbols are not reachable from portable
/// Rust without a build-script/platform-specific shim that this crate does
/// not carry. Instead, the client registers static ranges it wants
/// scanned, e.g. the backing range of a `static`-lifetime pointer table
/// the program keeps its own roots in.
#[derive(Default)]
pub struct StaticRoots {
    ranges: Vec<(usize, usize)>,
}

impl StaticRoots {
    pub const fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    pub fn register(&mut self, start: usize, end: usize) {
        self.ranges.push((start, end));
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.ranges.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_region_visits_every_word_in_either_direction() {
        let words: [usize; 4] = [0xAAAA, 0xBBBB, 0xCCCC, 0xDDDD];
        let begin = words.as_ptr() as usize;
        let end = begin + words.len() * WORD_SIZE;

        let mut seen = vec![];
        unsafe { scan_region(begin, end, |w| seen.push(w)) };
        assert_eq!(seen, vec![0xAAAA, 0xBBBB, 0xCCCC, 0xDDDD]);

        let mut seen_rev = vec![];
        unsafe { scan_region(end, begin, |w| seen_rev.push(w)) };
        assert_eq!(seen_rev, vec![0xAAAA, 0xBBBB, 0xCCCC, 0xDDDD]);
    }

    #[test]
    fn scan_region_empty_range_is_a_noop() {
        let mut seen = vec![];
        unsafe { scan_region(0x1000, 0x1000, |w| seen.push(w)) };
        assert!(seen.is_empty());
    }

    #[test]
    fn static_roots_iterate_in_registration_order() {
        let mut roots = StaticRoots::new();
        roots.register(1, 2);
        roots.register(3, 4);
        assert_eq!(roots.iter().collect::<Vec<_>>(), vec![(1, 2), (3, 4)]);
    }
}

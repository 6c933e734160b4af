//! The mark-and-sweep engine: root phase, trace phase, sweep phase.
//!
//! Phase order is load-bearing: sweeping before tracing completes would
//! free memory still reachable from an untraced root. Within the trace
//! phase, pop order off the gray worklist is not observable and is left
//! as whatever the `Vec`-backed worklist gives us (LIFO), a depth-first
//! mark stack.

use crate::collector::Collector;
use crate::config::HEAP_GROW_FACTOR;
use crate::roots::{capture_stack_pointer, scan_region};
use crate::slot::Flags;
use crate::slot_table::Lookup;

impl Collector {
    /// Force a full collection cycle: root scan, trace, sweep, retune.
    pub fn collect(&mut self) {
        self.gray.clear();

        self.scan_static_roots();
        self.scan_stack();

        self.trace();
        let freed = self.sweep();

        self.next_gc = self.bytes_allocated * HEAP_GROW_FACTOR;
        self.total_collections += 1;
        self.total_bytes_freed += freed;

        #[cfg(feature = "verbose")]
        eprintln!(
            "[sgc] collect #{}: freed {} bytes, {} bytes live, next GC at {}",
            self.total_collections, freed, self.bytes_allocated, self.next_gc
        );
    }

    fn scan_stack(&mut self) {
        let top = capture_stack_pointer();
        let bottom = self.stack_bottom;
        // SAFETY: `bottom` was supplied by the client as a bound that
        // encloses every mutator stack frame; `top` was just captured from
        // within this same call chain, so `[bottom, top)` (in whichever
        // order the platform's stack grows) is entirely mutator stack.
        unsafe {
            scan_region(bottom, top, |candidate| self.check_address(candidate));
        }
    }

    fn scan_static_roots(&mut self) {
        let ranges: Vec<(usize, usize)> = self.static_roots.iter().collect();
        for (start, end) in ranges {
            // SAFETY: the client vouched for this range when it called
            // `register_static_root`.
            unsafe {
                scan_region(start, end, |candidate| self.check_address(candidate));
            }
        }
    }

    /// `checkAddress`: reject candidates outside the managed address
    /// bounds cheaply, then look the rest up precisely and queue any hit.
    fn check_address(&mut self, candidate: usize) {
        if self.slots.is_empty() {
            return;
        }
        if candidate < self.min_address || candidate > self.max_address {
            return;
        }
        if let Lookup::Hit(idx) = self.slots.find_slot(candidate) {
            if self.slots.get(idx).flags.is_in_use() {
                self.gray.push(idx);
            }
        }
    }

    /// Drain the gray worklist, scanning the interior of each newly
    /// discovered slot for further pointer candidates. A slot already
    /// `MARKED` is popped and skipped without rescanning -- the worklist
    /// need not deduplicate on push because this check does it on pop.
    fn trace(&mut self) {
        while let Some(idx) = self.gray.pop() {
            let slot = *self.slots.get(idx);
            if slot.flags.is_marked() {
                continue;
            }
            // SAFETY: `slot` is `IN_USE`, so `[address, address + size)` is
            // a live region this collector obtained from the host
            // allocator and has not yet freed.
            unsafe {
                scan_region(slot.address, slot.end(), |candidate| {
                    self.check_address(candidate)
                });
            }
            self.slots.get_mut(idx).flags.insert(Flags::MARKED);
        }
    }

    /// Walk every slot; unmarked `IN_USE` entries are unreachable and are
    /// freed and tombstoned, marked entries have `MARKED` cleared for the
    /// next cycle. Returns the number of bytes freed.
    fn sweep(&mut self) -> usize {
        let mut freed = 0;
        for idx in self.slots.iter_indices() {
            let slot = *self.slots.get(idx);
            if !slot.flags.is_in_use() {
                continue;
            }
            if slot.flags.is_marked() {
                self.slots.get_mut(idx).flags.remove(Flags::MARKED);
            } else {
                #[cfg(feature = "debug_ids")]
                #[cfg(feature = "verbose")]
                eprintln!("[sgc] free #{}", slot.id);

                // SAFETY: slot.address was obtained from the host
                // allocator and has not been freed since.
                unsafe { libc::free(slot.address as *mut libc::c_void) };
                self.slots.tombstone(idx);
                self.bytes_allocated -= slot.size;
                freed += slot.size;
            }
        }
        freed
    }
}

//! The collector handle and its allocator facade: `allocate`, `reallocate`
//! and the release logic backing `shutdown`/`Drop`.
//!
//! This is a drop-in substitute for the host allocator: callers request
//! memory and never explicitly release it. `Collector` owns the slot
//! table, the gray worklist and the address bounds used to reject
//! out-of-range root candidates cheaply (see [`crate::collect`] for the
//! mark-and-sweep engine these tables feed).

use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::config::Config;
use crate::gray::GrayWorklist;
use crate::roots::StaticRoots;
use crate::slot_table::{Lookup, SlotTable};
use crate::statistics::CollectorStatistics;

/// A conservative mark-and-sweep collector.
///
/// `Collector` is an explicit handle rather than a process-wide singleton
/// (see [`crate::global`] for an optional convenience wrapper around a
/// single process-global instance). It assumes exactly one mutator thread
/// drives it and is therefore neither `Send` nor `Sync`.
pub struct Collector {
    pub(crate) stack_bottom: usize,
    pub(crate) min_address: usize,
    pub(crate) max_address: usize,
    pub(crate) bytes_allocated: usize,
    pub(crate) next_gc: usize,
    pub(crate) slots: SlotTable,
    pub(crate) gray: GrayWorklist,
    pub(crate) static_roots: StaticRoots,
    pub(crate) config: Config,
    pub(crate) total_collections: usize,
    pub(crate) total_bytes_freed: usize,
    _not_sync: PhantomData<*mut ()>,
}

impl Collector {
    /// Create a collector anchored at `stack_bottom`.
    ///
    /// `stack_bottom` must be an address that lies no closer to the true
    /// stack top than any pointer-holding local the mutator will later
    /// declare (see [`crate::roots::capture_stack_pointer`] for a portable
    /// way to obtain one, called from the program's top-level function
    /// before any allocation).
    pub fn new(stack_bottom: usize) -> Self {
        Self::with_config(stack_bottom, Config::default())
    }

    pub fn with_config(stack_bottom: usize, config: Config) -> Self {
        Self {
            stack_bottom,
            min_address: usize::MAX,
            max_address: 0,
            bytes_allocated: 0,
            next_gc: config.initial_next_gc,
            slots: SlotTable::new(),
            gray: GrayWorklist::new(),
            static_roots: StaticRoots::new(),
            config,
            total_collections: 0,
            total_bytes_freed: 0,
            _not_sync: PhantomData,
        }
    }

    /// Register an additional static-lifetime root range to be scanned on
    /// every collection, e.g. the address range backing a `static`
    /// pointer table. See [`crate::roots::StaticRoots`].
    pub fn register_static_root(&mut self, start: usize, end: usize) {
        self.static_roots.register(start, end);
    }

    pub fn statistics(&self) -> CollectorStatistics {
        CollectorStatistics {
            bytes_allocated: self.bytes_allocated,
            next_gc: self.next_gc,
            slots_in_use: self.slots.len(),
            slots_capacity: self.slots.capacity(),
            min_address: self.min_address,
            max_address: self.max_address,
            total_collections: self.total_collections,
            total_bytes_freed: self.total_bytes_freed,
        }
    }

    /// Allocate `size` bytes from the host allocator and begin tracking
    /// the resulting region. Returns `None` without any bookkeeping
    /// change if the host allocator is out of memory.
    pub fn allocate(&mut self, size: usize) -> Option<NonNull<u8>> {
        // SAFETY: libc::malloc's contract; the pointer is only ever
        // dereferenced by the caller, who owns the bytes it addresses.
        let raw = unsafe { libc::malloc(size) };
        let raw = NonNull::new(raw as *mut u8)?;
        let address = raw.as_ptr() as usize;

        self.maybe_collect();

        let idx = self.slots.get_slot(address);
        self.slots.get_mut(idx).size = size;
        self.bytes_allocated += size;
        self.widen_bounds(address, size);

        #[cfg(feature = "verbose")]
        eprintln!("[sgc] allocate {} bytes at {:#x}", size, address);

        Some(raw)
    }

    /// Resize a previously allocated region, or allocate fresh memory if
    /// `ptr` is `None` or not currently tracked.
    ///
    /// Shrinking (`new_size <= originalSize(ptr)`) is a no-op that returns
    /// `ptr` unchanged: the slot's recorded size is deliberately *not*
    /// updated, so `bytesAllocated` diverges from the client-visible size
    /// after a shrink. See `DESIGN.md` for why this is left as-is rather
    /// than silently corrected.
    pub fn reallocate(&mut self, ptr: Option<NonNull<u8>>, new_size: usize) -> Option<NonNull<u8>> {
        let ptr = match ptr {
            None => return self.allocate(new_size),
            Some(p) => p,
        };
        let old_address = ptr.as_ptr() as usize;

        let old_idx = match self.slots.find_slot(old_address) {
            Lookup::Hit(idx) if self.slots.get(idx).flags.is_in_use() => idx,
            _ => return self.allocate(new_size),
        };
        if new_size <= self.slots.get(old_idx).size {
            return Some(ptr);
        }

        self.maybe_collect();

        let old_idx = match self.slots.find_slot(old_address) {
            Lookup::Hit(idx) => idx,
            _ => return self.allocate(new_size),
        };
        let old_size = self.slots.get(old_idx).size;

        // SAFETY: old_address was obtained from a prior `allocate`/
        // `reallocate` call on this same collector and is still `IN_USE`.
        let new_raw = unsafe { libc::realloc(old_address as *mut libc::c_void, new_size) };
        let new_raw = NonNull::new(new_raw as *mut u8)?;
        let new_address = new_raw.as_ptr() as usize;

        if new_address == old_address {
            self.bytes_allocated += new_size - old_size;
            self.slots.get_mut(old_idx).size = new_size;
            self.widen_bounds(new_address, new_size);
            return Some(new_raw);
        }

        let new_idx = self.slots.get_slot(new_address);
        self.slots.get_mut(new_idx).size = new_size;
        self.bytes_allocated += new_size;
        self.widen_bounds(new_address, new_size);

        // The system allocator already released the old region; tombstone
        // its slot without freeing it again.
        if let Lookup::Hit(idx) = self.slots.find_slot(old_address) {
            self.slots.tombstone(idx);
            self.bytes_allocated -= old_size;
        }

        #[cfg(feature = "verbose")]
        eprintln!(
            "[sgc] reallocate {:#x} -> {:#x} ({} bytes)",
            old_address, new_address, new_size
        );

        Some(new_raw)
    }

    /// Run a collection iff stress mode is configured, or the heap has
    /// grown past `next_gc` (strictly: `bytes_allocated > next_gc`).
    pub(crate) fn maybe_collect(&mut self) {
        if self.config.stress_test || self.bytes_allocated > self.next_gc {
            self.collect();
        }
    }

    pub(crate) fn widen_bounds(&mut self, address: usize, size: usize) {
        if address < self.min_address {
            self.min_address = address;
        }
        let end = address + size;
        if end > self.max_address {
            self.max_address = end;
        }
    }

    /// Release every still-managed region along with the collector's own
    /// tables. Equivalent to letting the collector drop, spelled out for
    /// callers who want teardown to happen at a precise point.
    pub fn shutdown(self) {}
}

impl Drop for Collector {
    fn drop(&mut self) {
        for idx in self.slots.iter_indices() {
            let slot = *self.slots.get(idx);
            if slot.flags.is_in_use() {
                unsafe { libc::free(slot.address as *mut libc::c_void) };
                self.slots.tombstone(idx);
                self.bytes_allocated -= slot.size;
            }
        }
    }
}

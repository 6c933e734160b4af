//! Tunable constants, grouped into a `Config` passed at construction time
//! rather than scattered as cargo-feature-gated constants through the
//! collector itself.

/// Capacity of a freshly created slot table.
pub const INITIAL_CAPACITY: usize = 8;
/// Factor by which the slot table grows when it would otherwise overflow
/// [`MAX_LOAD`].
pub const GROW_FACTOR: usize = 2;
/// Load factor above which the slot table must grow before inserting.
pub const MAX_LOAD: f64 = 0.75;
/// Factor applied to `bytesAllocated` after a collection to compute the
/// next collection threshold.
pub const HEAP_GROW_FACTOR: usize = 2;
/// `nextGC` threshold in effect before the first collection ever runs.
pub const INITIAL_NEXT_GC: usize = 1024;

/// Construction-time collector configuration.
///
/// The hash table and gray-list tunables (`INITIAL_CAPACITY`, `GROW_FACTOR`,
/// `MAX_LOAD`) are fixed constants and are not exposed here; only the
/// knobs that used to be build-time `#ifdef` toggles are runtime
/// configurable, since a `Config` the client builds once is the idiomatic
/// replacement for a compile-time flag.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// `bytesAllocated` threshold that triggers the first collection.
    pub initial_next_gc: usize,
    /// Run a full collection before every allocation. Useful to surface
    /// missing roots; drastically slower.
    pub stress_test: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_next_gc: INITIAL_NEXT_GC,
            stress_test: cfg!(feature = "stress"),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_next_gc(mut self, bytes: usize) -> Self {
        self.initial_next_gc = bytes;
        self
    }

    pub fn with_stress_test(mut self, stress: bool) -> Self {
        self.stress_test = stress;
        self
    }
}

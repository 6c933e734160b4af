//! A conservative, stop-the-world, mark-and-sweep garbage collector for
//! single-threaded native programs.
//!
//! [`Collector`] is a drop-in substitute for the host allocator: call
//! [`Collector::allocate`] the way you would call `malloc`, keep the
//! returned pointer reachable from the stack or from a registered static
//! root, and never free anything yourself. Periodically -- when the heap
//! has grown past a threshold, or whenever [`Collector::collect`] is
//! called explicitly -- the collector conservatively scans the mutator's
//! stack and any registered static ranges, treating any bit pattern that
//! happens to equal a currently managed address as a live pointer, and
//! frees everything it did not find.
//!
//! This is conservative scanning, not a type-aware tracing GC: the
//! collector has no notion of object layout, cannot follow interior
//! pointers (only exact base addresses are recognized), and will retain
//! memory on a false-positive root rather than risk freeing something
//! live. See the module docs on [`collect`] and [`roots`] for the
//! scanning algorithm.

mod collect;
mod collector;
mod config;
mod gray;
mod roots;
mod slot;
mod slot_table;
mod statistics;

pub mod global;

pub use collector::Collector;
pub use config::Config;
pub use roots::capture_stack_pointer;
pub use statistics::CollectorStatistics;

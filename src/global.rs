//! Optional process-global collector instance.
//!
//! [`crate::Collector`] is an explicit handle; this module wraps a single
//! instance of it behind a process-wide `static mut` guarded by an init
//! flag, for callers who want `malloc`/`realloc`/`free` drop-in parity
//! without threading a handle through their program. Accessors panic
//! rather than silently operate on absent state.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::collector::Collector;

static mut COLLECTOR: Option<Collector> = None;
static INIT: AtomicBool = AtomicBool::new(false);

/// Initialize the global collector. Must be called before any of the
/// other functions in this module.
///
/// # Panics
/// Panics if the global collector is already initialized.
pub fn init(stack_bottom: usize) {
    if INIT.swap(true, Ordering::AcqRel) {
        panic!("global collector is already initialized");
    }
    unsafe {
        COLLECTOR = Some(Collector::new(stack_bottom));
    }
}

fn collector() -> &'static mut Collector {
    unsafe {
        COLLECTOR
            .as_mut()
            .expect("global collector is not initialized; call sgc::global::init first")
    }
}

/// Allocate `size` bytes through the global collector. See
/// [`Collector::allocate`].
pub fn allocate(size: usize) -> Option<std::ptr::NonNull<u8>> {
    collector().allocate(size)
}

/// Reallocate through the global collector. See [`Collector::reallocate`].
pub fn reallocate(
    ptr: Option<std::ptr::NonNull<u8>>,
    new_size: usize,
) -> Option<std::ptr::NonNull<u8>> {
    collector().reallocate(ptr, new_size)
}

/// Force a collection on the global collector. See [`Collector::collect`].
pub fn collect() {
    collector().collect();
}

/// Tear down the global collector, releasing every region it still
/// manages. A subsequent `init` call may start a new one.
pub fn shutdown() {
    unsafe {
        COLLECTOR = None;
    }
    INIT.store(false, Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // The global collector is process-wide state; serialize tests that
    // touch it so they don't stomp on each other.
    static GUARD: Mutex<()> = Mutex::new(());

    fn with_lock(f: impl FnOnce()) {
        let guard = GUARD.lock().unwrap_or_else(|e| e.into_inner());
        f();
        drop(guard);
    }

    #[test]
    fn init_allocate_and_shutdown() {
        with_lock(|| {
            init(crate::roots::capture_stack_pointer());
            let p = allocate(64);
            assert!(p.is_some());
            shutdown();
        });
    }

    #[test]
    fn double_init_panics() {
        with_lock(|| {
            init(crate::roots::capture_stack_pointer());
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                init(crate::roots::capture_stack_pointer());
            }));
            assert!(result.is_err());
            shutdown();
        });
    }
}

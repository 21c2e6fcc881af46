use crate::util::address::{Address, ByteSize};
use std::panic;
use std::sync::Mutex;

pub mod fixtures;
pub mod frames;

// Address ranges for synthetic heaps and stacks. They must not overlap, so that a stack
// address never passes the heap bounds check.
pub(crate) struct TestRegion {
    pub start: Address,
    pub size: ByteSize,
}

impl TestRegion {
    pub const HEAP: TestRegion = TestRegion {
        start: Address::from_usize(0x1000_0000),
        size: 0x10_0000,
    };
    pub const STACK: TestRegion = TestRegion {
        start: Address::from_usize(0x7000_0000),
        size: 0x1_0000,
    };
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_regions_do_not_overlap() {
        let heap = TestRegion::HEAP;
        let stack = TestRegion::STACK;
        assert!(heap.start.add(heap.size) <= stack.start);
    }
}

lazy_static! {
    static ref SERIAL_TEST_LOCK: Mutex<()> = Mutex::default();
}

// force some tests to be executed serially
pub fn serial_test<F>(f: F)
where
    F: FnOnce(),
{
    // A panicking test poisons the lock. The lock only serializes, so carry on.
    let _lock = SERIAL_TEST_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f();
}

// Always execute a cleanup closure no matter the test panics or not.
pub fn with_cleanup<T, C>(test: T, cleanup: C)
where
    T: FnOnce() + panic::UnwindSafe,
    C: FnOnce(),
{
    let res = panic::catch_unwind(test);
    cleanup();
    if let Err(e) = res {
        panic::resume_unwind(e);
    }
}

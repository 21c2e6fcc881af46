// All functions here are extern function. There is no point for marking them as unsafe.
#![allow(clippy::not_unsafe_ptr_arg_deref)]

//! The C boundary used by compiled programs.
//!
//! The runtime registers its heap and its stack bottom once with [`tagheap_init`]. The
//! code it generates calls [`try_gc`] when a bump allocation would pass the heap end.

use crate::memory_manager::{self, GcContext};
use crate::plan::MarkCompact;
use crate::policy::markcompactspace::MarkCompactSpace;
use crate::util::constants::Word;
use crate::util::options::Options;
use crate::util::Address;
use crate::vm::MutatorStack;
use spin::Mutex;
use std::ffi::{c_char, CStr};
use std::fmt;

/// Misuse of the C boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ApiError {
    /// A collection was requested before `tagheap_init`.
    NotInitialized,
    /// An option name or value is not valid UTF-8.
    InvalidString,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::NotInitialized => write!(f, "tagheap_init has not been called"),
            ApiError::InvalidString => write!(f, "string argument is not valid UTF-8"),
        }
    }
}

impl std::error::Error for ApiError {}

/// The status the process exits with when the boundary is misused.
const API_ERROR_EXIT_CODE: i32 = 1;

struct Runtime {
    context: GcContext,
    plan: MarkCompact,
}

lazy_static! {
    static ref RUNTIME: Mutex<Option<Runtime>> = Mutex::new(None);
    /// Options set before `tagheap_init`.
    static ref PENDING_OPTIONS: Mutex<Options> = Mutex::new(Options::default());
}

/// Register the heap `[heap_start, heap_start + heap_words)` and the stack-bottom
/// sentinel. Calling it again replaces the registration and resets the statistics.
#[no_mangle]
pub extern "C" fn tagheap_init(heap_start: *mut Word, heap_words: usize, stack_bottom: *mut Word) {
    memory_manager::init_logger();
    let context = GcContext::new(
        Address::from_mut_ptr(heap_start),
        heap_words,
        Address::from_mut_ptr(stack_bottom),
    );
    info!(
        "tagheap: heap [{}, {}), stack bottom {}",
        context.heap_start, context.heap_end, context.stack_bottom
    );
    let options = PENDING_OPTIONS.lock().clone();
    *RUNTIME.lock() = Some(Runtime {
        context,
        plan: MarkCompact::new(options),
    });
}

fn set_option(name: *const c_char, value: *const c_char) -> Result<bool, ApiError> {
    let name_str: &CStr = unsafe { CStr::from_ptr(name) };
    let value_str: &CStr = unsafe { CStr::from_ptr(value) };
    let name = name_str.to_str().map_err(|_| ApiError::InvalidString)?;
    let value = value_str.to_str().map_err(|_| ApiError::InvalidString)?;
    let mut runtime = RUNTIME.lock();
    Ok(match runtime.as_mut() {
        Some(runtime) => runtime.plan.options_mut().set_from_camelcase_str(name, value),
        None => PENDING_OPTIONS.lock().set_from_camelcase_str(name, value),
    })
}

/// Set an option by its camelCase name (e.g. `deadSpace`, `verifyHeap`). Returns false if
/// the option is unknown or the value is invalid.
#[no_mangle]
pub extern "C" fn tagheap_set_option(name: *const c_char, value: *const c_char) -> bool {
    match set_option(name, value) {
        Ok(set) => set,
        Err(e) => {
            warn!("tagheap_set_option: {}", e);
            false
        }
    }
}

/// Lend the registered heap and the stack above `stack_top` to `f`.
fn with_heap_and_stack<R>(
    alloc_ptr: *mut Word,
    stack_top: *mut Word,
    f: impl FnOnce(&mut MarkCompact, &mut MutatorStack, &mut MarkCompactSpace) -> R,
) -> Result<R, ApiError> {
    let mut runtime = RUNTIME.lock();
    let Runtime { context, plan } = runtime.as_mut().ok_or(ApiError::NotInitialized)?;
    let stack_top = Address::from_mut_ptr(stack_top);
    let stack_words = context.stack_words(stack_top);

    // The runtime is stopped inside this call, and the heap and the stack are disjoint
    // regions it registered with `tagheap_init`.
    let heap = unsafe { std::slice::from_raw_parts_mut(context.heap_start.to_mut_ptr::<Word>(), context.heap_words()) };
    let stack = unsafe { std::slice::from_raw_parts_mut(stack_top.to_mut_ptr::<Word>(), stack_words) };

    let mut space = MarkCompactSpace::new(context.heap_start, heap, Address::from_mut_ptr(alloc_ptr));
    let mut stack = MutatorStack::new(stack_top, stack);
    Ok(f(plan, &mut stack, &mut space))
}

fn exit_with(message: &dyn fmt::Display, code: i32) -> ! {
    eprintln!("{}", message);
    std::process::exit(code)
}

/// Collect the heap unconditionally. `alloc_ptr` is the high-water mark. Returns the
/// new one.
#[no_mangle]
pub extern "C" fn tagheap_gc(alloc_ptr: *mut Word, first_frame: *mut Word, stack_top: *mut Word) -> *mut Word {
    let first_frame = Address::from_mut_ptr(first_frame);
    match with_heap_and_stack(alloc_ptr, stack_top, |plan, stack, space| {
        memory_manager::gc(plan, stack, first_frame, space)
    }) {
        Ok(cursor) => cursor.to_mut_ptr(),
        Err(e) => exit_with(&e, API_ERROR_EXIT_CODE),
    }
}

/// Called by compiled code when allocating `bytes_needed` bytes at `alloc_ptr` would pass
/// the heap end. Returns the allocation pointer to continue from. Exits the process with
/// status 10 if the request can never fit, or 9 if a collection frees too little.
#[no_mangle]
pub extern "C" fn try_gc(alloc_ptr: *mut Word, bytes_needed: usize, first_frame: *mut Word, stack_top: *mut Word) -> *mut Word {
    let first_frame = Address::from_mut_ptr(first_frame);
    let result = with_heap_and_stack(alloc_ptr, stack_top, |plan, stack, space| {
        memory_manager::try_gc(plan, stack, first_frame, space, bytes_needed)
    });
    match result {
        Ok(Ok(cursor)) => cursor.to_mut_ptr(),
        Ok(Err(e)) => exit_with(&e, e.exit_code()),
        Err(e) => exit_with(&e, API_ERROR_EXIT_CODE),
    }
}

//! C-ABI wrapper around `todo-store`.
//!
//! # Overview
//! Exposes the todo loader and saver through `extern "C"` functions so a
//! host that owns the actual key-value store (a browser shell, a native app)
//! can turn stored text into todos and todos into stored text. The host reads
//! and writes the store itself under the key returned by `todo_storage_key`.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `todo_storage_decode` / `todo_storage_encode` mirror the core
//!   `decode` / `encode` 1:1; decoding never fails, like the core loader.
//! - Input todos from C go through the same normalizer as stored data.
//! - A single `FfiStoreResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call
//!   `todo_storage_free` / `todo_free_result` to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use todo_store::{StorageConfig, TodoStorage};
use tracing_subscriber::EnvFilter;

use types::*;

// ---------------------------------------------------------------------------
// Storage lifecycle
// ---------------------------------------------------------------------------

/// Create a new `TodoStorage`.
///
/// `diagnostics` is tri-state: -1 = read `TODO_STORE_DIAGNOSTICS` from the
/// environment (falling back to the build default), 0 = off, 1 = on.
/// The caller must free the returned pointer with `todo_storage_free`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_storage_new(diagnostics: i32) -> *mut FfiTodoStorage {
    catch_unwind(|| {
        let config = match diagnostics {
            0 => StorageConfig::default().with_diagnostics(false),
            1 => StorageConfig::default().with_diagnostics(true),
            _ => StorageConfig::from_env().unwrap_or_default(),
        };
        let storage = TodoStorage::new(config);
        Box::into_raw(Box::new(FfiTodoStorage { inner: storage }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a `TodoStorage` created by `todo_storage_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_storage_free(storage: *mut FfiTodoStorage) {
    if !storage.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(storage) });
        });
    }
}

/// The key the host must read and write. Static; do not free.
#[unsafe(no_mangle)]
pub extern "C" fn todo_storage_key() -> *const c_char {
    c"todoItems".as_ptr()
}

/// Install a `tracing` subscriber writing diagnostics to stderr.
///
/// The filter comes from `RUST_LOG`, defaulting to `todo_store=debug`.
/// Returns false if a subscriber was already installed.
#[unsafe(no_mangle)]
pub extern "C" fn todo_init_logging() -> bool {
    catch_unwind(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("todo_store=debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok()
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Decode / encode
// ---------------------------------------------------------------------------

/// Decode the text stored under the storage key into todos.
///
/// `raw` may be null, meaning the key is absent. Malformed text and
/// malformed elements are dropped, so a non-null `storage` always yields a
/// result with `data_tag = TodoList` (possibly empty).
///
/// C strings cannot hold NUL, so an interior `\u0000` in any decoded string
/// field is removed from the returned copy: a stored title `"a\u0000b"`
/// comes back as `"ab"`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_storage_decode(
    storage: *const FfiTodoStorage,
    raw: *const c_char,
) -> *mut FfiStoreResult {
    catch_unwind(|| {
        if storage.is_null() {
            return FfiStoreResult::null_arg("storage");
        }
        let storage = unsafe { &*storage };
        let raw = if raw.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(raw) }.to_string_lossy())
        };
        let todos = storage.inner.decode(raw.as_deref());
        FfiStoreResult::ok_todo_list(todos)
    })
    .unwrap_or_else(|_| FfiStoreResult::panic("panic in todo_storage_decode"))
}

/// Encode `len` todos starting at `todos` into the text to store.
///
/// Returns a result with `data_tag = Text` on success. If any input todo
/// fails validation the result carries `InvalidRecord` and the index of the
/// first bad element. `todos` may be null only when `len` is 0.
#[unsafe(no_mangle)]
pub extern "C" fn todo_storage_encode(
    storage: *const FfiTodoStorage,
    todos: *const FfiTodo,
    len: u32,
) -> *mut FfiStoreResult {
    catch_unwind(|| {
        if storage.is_null() {
            return FfiStoreResult::null_arg("storage");
        }
        if todos.is_null() && len > 0 {
            return FfiStoreResult::null_arg("todos");
        }
        let storage = unsafe { &*storage };
        let inputs: &[FfiTodo] = if len == 0 {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(todos, len as usize) }
        };

        let mut validated = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            let candidate = unsafe { input.to_candidate() };
            match storage.inner.normalizer().normalize(&candidate) {
                Ok(todo) => validated.push(todo),
                Err(reason) => return FfiStoreResult::invalid_record(index, reason),
            }
        }

        match storage.inner.encode(&validated) {
            Ok(text) => FfiStoreResult::ok_text(text),
            Err(e) => FfiStoreResult::from_save_error(e),
        }
    })
    .unwrap_or_else(|_| FfiStoreResult::panic("panic in todo_storage_encode"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiStoreResult` returned by `todo_storage_decode` or
/// `todo_storage_encode`. Safe to call with null. Uses `data_tag` to
/// determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn todo_free_result(result: *mut FfiStoreResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::TodoList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiTodoList) };
                if !list.items.is_null() && list.len > 0 {
                    let items = unsafe {
                        Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                            list.items,
                            list.len as usize,
                        ))
                    };
                    for item in items.iter() {
                        item.free_fields();
                    }
                }
            }
            FfiDataTag::Text => {
                drop(unsafe { CString::from_raw(result.data as *mut c_char) });
            }
            FfiDataTag::None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

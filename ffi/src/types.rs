//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, epoch milliseconds instead of
//! `DateTime<Utc>`, raw pointers instead of `Vec`, and tagged enums with
//! explicit discriminants. Conversion functions live here to keep `lib.rs`
//! focused on the `extern "C"` surface.

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;

use todo_store::{format_instant, Rejection, SaveError, Todo};

/// Opaque handle to a `TodoStorage`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiTodoStorage {
    pub(crate) inner: todo_store::TodoStorage,
}

// ---------------------------------------------------------------------------
// Todo types
// ---------------------------------------------------------------------------

/// A single todo item exposed to C.
///
/// `description` may be null on input (treated as empty). `due_date` is null
/// when the todo has no due date, otherwise a `YYYY-MM-DD` string.
#[repr(C)]
pub struct FfiTodo {
    pub id: *mut c_char,
    pub title: *mut c_char,
    pub description: *mut c_char,
    pub completed: bool,
    pub created_at_ms: i64,
    pub due_date: *mut c_char,
}

/// A list of todo items exposed to C.
#[repr(C)]
pub struct FfiTodoList {
    pub items: *mut FfiTodo,
    pub len: u32,
}

impl FfiTodo {
    fn from_core(todo: Todo) -> Self {
        FfiTodo {
            id: into_c_string(todo.id),
            title: into_c_string(todo.title),
            description: into_c_string(todo.description),
            completed: todo.completed,
            created_at_ms: todo.created_at.timestamp_millis(),
            due_date: match todo.due_date {
                Some(d) => into_c_string(d.to_string()),
                None => std::ptr::null_mut(),
            },
        }
    }

    /// Render a caller-owned `FfiTodo` as the JSON object the normalizer
    /// expects, so C input is validated by the same rules as stored data.
    ///
    /// # Safety
    /// Every non-null string field must point to a valid NUL-terminated
    /// string.
    pub(crate) unsafe fn to_candidate(&self) -> serde_json::Value {
        let mut fields = serde_json::Map::new();
        fields.insert("id".to_string(), optional_str(self.id).into());
        fields.insert("title".to_string(), optional_str(self.title).into());
        fields.insert("description".to_string(), optional_str(self.description).into());
        fields.insert("completed".to_string(), self.completed.into());
        let created_at = chrono::DateTime::from_timestamp_millis(self.created_at_ms)
            .map(|instant| format_instant(&instant));
        fields.insert("createdAt".to_string(), created_at.into());
        fields.insert("dueDate".to_string(), optional_str(self.due_date).into());
        serde_json::Value::Object(fields)
    }

    /// Free the C-string fields (but not the struct itself).
    pub(crate) fn free_fields(&self) {
        for field in [self.id, self.title, self.description, self.due_date] {
            if !field.is_null() {
                drop(unsafe { CString::from_raw(field) });
            }
        }
    }
}

/// Read a nullable C string. Invalid UTF-8 reads as absent.
unsafe fn optional_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .ok()
        .map(str::to_string)
}

/// Move a Rust string to the C heap. Interior NULs cannot cross the
/// boundary and are removed.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') { s.replace('\0', "") } else { s };
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiStoreResult`.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidRecord = 1,
    Serialization = 2,
    Panic = 3,
    NullArg = 4,
}

/// Tag that tells `todo_free_result` what `FfiStoreResult::data` points to.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    TodoList = 1,
    Text = 2,
}

/// Result envelope for decode and encode.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the payload (tagged by `data_tag`). On failure `error_code`
/// describes the category, `error_message` is a human-readable C string,
/// `data` is null, and for `InvalidRecord` `record_index` names the
/// offending input element.
#[repr(C)]
pub struct FfiStoreResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub record_index: u32,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiStoreResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        record_index: u32,
        data_tag: FfiDataTag,
        data: *mut c_void,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiStoreResult {
            error_code,
            error_message,
            record_index,
            data_tag,
            data,
        }))
    }

    /// Build a success result carrying an `FfiTodoList`.
    pub(crate) fn ok_todo_list(todos: Vec<Todo>) -> *mut Self {
        let len = todos.len() as u32;
        let ffi_todos: Vec<FfiTodo> = todos.into_iter().map(FfiTodo::from_core).collect();

        let items = if ffi_todos.is_empty() {
            std::ptr::null_mut()
        } else {
            Box::into_raw(ffi_todos.into_boxed_slice()) as *mut FfiTodo
        };

        let list = Box::new(FfiTodoList { items, len });
        Self::boxed(
            FfiErrorCode::Ok,
            std::ptr::null_mut(),
            0,
            FfiDataTag::TodoList,
            Box::into_raw(list) as *mut c_void,
        )
    }

    /// Build a success result carrying a C string.
    pub(crate) fn ok_text(text: String) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Ok,
            std::ptr::null_mut(),
            0,
            FfiDataTag::Text,
            into_c_string(text) as *mut c_void,
        )
    }

    /// Build an error result for an input record the normalizer refused.
    pub(crate) fn invalid_record(index: usize, reason: Rejection) -> *mut Self {
        let msg = format!("record {index}: {reason}");
        Self::boxed(
            FfiErrorCode::InvalidRecord,
            into_c_string(msg),
            index as u32,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result from a `SaveError`.
    pub(crate) fn from_save_error(err: SaveError) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Serialization,
            into_c_string(err.to_string()),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            into_c_string(format!("null argument: {name}")),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Panic,
            into_c_string(msg.to_string()),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }
}

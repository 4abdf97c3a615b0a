//! C ABI cdylib for pyshift -- loadable by ctypes, C#, or any FFI consumer.
//!
//! All exported functions follow the convention:
//! - Return `i32` status code: `PYSHIFT_OK=0`, `PYSHIFT_ERROR=-1`
//! - String outputs allocated by Rust, freed via `pyshift_free_string()`
//! - Last error retrievable via `pyshift_last_error()`
//!
//! The converter crosses the boundary as an opaque handle
//! (`pyshift_converter_new` / `pyshift_converter_free`).  A handle is
//! read-only after construction and may be shared across threads.

use std::cell::RefCell;
use std::ffi::{c_char, CStr, CString};
use std::ptr;

use pyshift_core::convert::Converter;
use pyshift_core::detect::SyntaxAnalyzer;

pub const PYSHIFT_OK: i32 = 0;
pub const PYSHIFT_ERROR: i32 = -1;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Write a Rust string out through `*out` as a heap-allocated C string.
fn emit_string(text: String, out: *mut *mut c_char) -> i32 {
    match CString::new(text) {
        Ok(cstr) => {
            unsafe { *out = cstr.into_raw() };
            PYSHIFT_OK
        }
        Err(e) => {
            set_last_error(&format!("CString conversion failed: {e}"));
            PYSHIFT_ERROR
        }
    }
}

/// Retrieve the last error message (thread-local).
///
/// Returns a pointer valid until the next pyshift_* call on this thread.
/// Returns null if no error has occurred.
#[no_mangle]
pub extern "C" fn pyshift_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|s| s.as_ptr())
            .unwrap_or(ptr::null())
    })
}

/// Free a string previously allocated by a pyshift_* function.
///
/// # Safety
///
/// `ptr` must be a pointer returned by a pyshift_* function or null.
#[no_mangle]
pub unsafe extern "C" fn pyshift_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

/// Construct a converter and return it as an opaque handle.
///
/// Returns null on failure (see `pyshift_last_error()`).  Free with
/// `pyshift_converter_free()`.
#[no_mangle]
pub extern "C" fn pyshift_converter_new() -> *mut Converter {
    match Converter::new() {
        Ok(converter) => Box::into_raw(Box::new(converter)),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a converter handle.
///
/// # Safety
///
/// `converter` must be a pointer returned by `pyshift_converter_new()`
/// or null.
#[no_mangle]
pub unsafe extern "C" fn pyshift_converter_free(converter: *mut Converter) {
    if !converter.is_null() {
        drop(unsafe { Box::from_raw(converter) });
    }
}

/// Convert Python 2 source text to Python 3.
///
/// # Safety
///
/// `converter` must be a valid handle from `pyshift_converter_new()`,
/// `source` a valid null-terminated UTF-8 C string, and `out` a valid
/// pointer to a `*mut c_char`.  On success, `*out` is set to a
/// heap-allocated C string; free with `pyshift_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn pyshift_convert(
    converter: *const Converter,
    source: *const c_char,
    out: *mut *mut c_char,
) -> i32 {
    if converter.is_null() || source.is_null() || out.is_null() {
        set_last_error("null pointer argument");
        return PYSHIFT_ERROR;
    }

    let source_str = match unsafe { CStr::from_ptr(source) }.to_str() {
        Ok(s) => s,
        Err(e) => {
            set_last_error(&format!("Invalid UTF-8: {e}"));
            return PYSHIFT_ERROR;
        }
    };

    let converted = unsafe { &*converter }.convert(source_str);
    emit_string(converted, out)
}

/// Detect the Python dialect of source text, reported as a JSON string.
///
/// # Safety
///
/// `source` must be a valid null-terminated UTF-8 C string and
/// `out_json` a valid pointer to a `*mut c_char`.  On success,
/// `*out_json` is set to a heap-allocated JSON C string; free with
/// `pyshift_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn pyshift_detect(
    source: *const c_char,
    out_json: *mut *mut c_char,
) -> i32 {
    if source.is_null() || out_json.is_null() {
        set_last_error("null pointer argument");
        return PYSHIFT_ERROR;
    }

    let source_str = match unsafe { CStr::from_ptr(source) }.to_str() {
        Ok(s) => s,
        Err(e) => {
            set_last_error(&format!("Invalid UTF-8: {e}"));
            return PYSHIFT_ERROR;
        }
    };

    let report = SyntaxAnalyzer::analyze(source_str);
    match serde_json::to_string(&report) {
        Ok(json) => emit_string(json, out_json),
        Err(e) => {
            set_last_error(&format!("JSON serialization failed: {e}"));
            PYSHIFT_ERROR
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

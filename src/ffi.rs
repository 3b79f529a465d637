//! FFI bindings for MindBridge Risk
//!
//! This module provides C-compatible functions for calling the risk pipeline
//! from the mobile and web shells. All functions take and return C strings
//! (null-terminated JSON) and return allocated memory that must be freed by
//! the caller using `mindbridge_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::error::RiskError;
use crate::pipeline::{
    alerts_json, patient_summaries_json, session_report_json, session_risk_score, severity_json,
    RiskProcessor,
};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Read a JSON argument, run `f`, and hand back its result as a C string
unsafe fn call_with_json<F>(json: *const c_char, f: F) -> *mut c_char
where
    F: FnOnce(String) -> Result<String, RiskError>,
{
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match f(json_str) {
        Ok(result) => string_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Score a single session JSON object.
///
/// # Safety
/// - `session_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `mindbridge_free_string`.
/// - Returns NULL on error; call `mindbridge_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mindbridge_session_risk_score(session_json: *const c_char) -> *mut c_char {
    call_with_json(session_json, session_risk_score)
}

/// Build the analysis report for a single session JSON object.
///
/// # Safety
/// Same contract as `mindbridge_session_risk_score`.
#[no_mangle]
pub unsafe extern "C" fn mindbridge_session_report(session_json: *const c_char) -> *mut c_char {
    call_with_json(session_json, session_report_json)
}

/// Generate alerts for a JSON array of sessions.
///
/// # Safety
/// Same contract as `mindbridge_session_risk_score`.
#[no_mangle]
pub unsafe extern "C" fn mindbridge_generate_alerts(sessions_json: *const c_char) -> *mut c_char {
    call_with_json(sessions_json, alerts_json)
}

/// Summarize risk history per patient for a JSON array of sessions.
///
/// # Safety
/// Same contract as `mindbridge_session_risk_score`.
#[no_mangle]
pub unsafe extern "C" fn mindbridge_patient_summaries(sessions_json: *const c_char) -> *mut c_char {
    call_with_json(sessions_json, patient_summaries_json)
}

/// Classify a risk score into its clinical severity tier.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with `mindbridge_free_string`.
#[no_mangle]
pub unsafe extern "C" fn mindbridge_severity(score: f64) -> *mut c_char {
    clear_last_error();

    match severity_json(score) {
        Ok(result) => string_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Configured Processor API
// ============================================================================

/// Opaque handle to a RiskProcessor
pub struct RiskProcessorHandle {
    processor: RiskProcessor,
}

/// Create a RiskProcessor.
///
/// # Safety
/// - `config_json` may be NULL for the default configuration, otherwise it
///   must be a valid null-terminated C string.
/// - Must be freed with `mindbridge_processor_free`.
/// - Returns NULL if the configuration is invalid.
#[no_mangle]
pub unsafe extern "C" fn mindbridge_processor_new(
    config_json: *const c_char,
) -> *mut RiskProcessorHandle {
    clear_last_error();

    let mut processor = RiskProcessor::new();

    if !config_json.is_null() {
        let json = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        };
        if let Err(e) = processor.load_config(&json) {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    }

    Box::into_raw(Box::new(RiskProcessorHandle { processor }))
}

/// Free a RiskProcessor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `mindbridge_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn mindbridge_processor_free(processor: *mut RiskProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Score a session with a configured processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `mindbridge_processor_new`.
/// - `session_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `mindbridge_free_string`.
/// - Returns NULL on error; call `mindbridge_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mindbridge_processor_score(
    processor: *const RiskProcessorHandle,
    session_json: *const c_char,
) -> *mut c_char {
    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }
    let handle = &*processor;
    call_with_json(session_json, |json| handle.processor.score(&json))
}

/// Generate alerts with a configured processor.
///
/// # Safety
/// Same contract as `mindbridge_processor_score`.
#[no_mangle]
pub unsafe extern "C" fn mindbridge_processor_alerts(
    processor: *const RiskProcessorHandle,
    sessions_json: *const c_char,
) -> *mut c_char {
    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }
    let handle = &*processor;
    call_with_json(sessions_json, |json| handle.processor.alerts(&json))
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by any mindbridge function.
///
/// # Safety
/// - `ptr` must be a pointer returned by a mindbridge function, or NULL.
#[no_mangle]
pub unsafe extern "C" fn mindbridge_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local string; do not free it.
/// - The pointer is valid until the next mindbridge call on this thread.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn mindbridge_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sessions_json() -> CString {
        CString::new(
            r#"[{
                "id": "s-100",
                "patientId": "patient-0420",
                "startTime": "2024-02-01T09:00:00Z",
                "endTime": "2024-02-01T09:30:00Z",
                "emotionData": [],
                "voiceData": [],
                "riskScore": 91.2
            }]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_generate_alerts() {
        let json = sample_sessions_json();

        unsafe {
            let result = mindbridge_generate_alerts(json.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.starts_with('['));
            assert!(result_str.contains("risk-s-100"));

            mindbridge_free_string(result);
        }
    }

    #[test]
    fn test_ffi_error_reporting() {
        let bad = CString::new("{ nope").unwrap();

        unsafe {
            let result = mindbridge_session_risk_score(bad.as_ptr());
            assert!(result.is_null());

            let error = mindbridge_last_error();
            assert!(!error.is_null());
            let message = CStr::from_ptr(error).to_str().unwrap();
            assert!(message.contains("Invalid JSON"));
        }
    }

    #[test]
    fn test_ffi_null_input() {
        unsafe {
            let result = mindbridge_session_report(ptr::null());
            assert!(result.is_null());
            assert!(!mindbridge_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_severity() {
        unsafe {
            let result = mindbridge_severity(50.0);
            assert!(!result.is_null());
            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.contains("Moderate Depression"));
            mindbridge_free_string(result);
        }
    }

    #[test]
    fn test_ffi_processor_lifecycle() {
        let config = CString::new(r#"{"alerts": {"critical_threshold": 95}}"#).unwrap();
        let json = sample_sessions_json();

        unsafe {
            let processor = mindbridge_processor_new(config.as_ptr());
            assert!(!processor.is_null());

            let result = mindbridge_processor_alerts(processor, json.as_ptr());
            assert!(!result.is_null());
            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.contains("\"type\":\"high_risk\""));

            mindbridge_free_string(result);
            mindbridge_processor_free(processor);
        }
    }

    #[test]
    fn test_ffi_processor_rejects_bad_config() {
        let config = CString::new(r#"{"emotion_window": 0}"#).unwrap();
        unsafe {
            let processor = mindbridge_processor_new(config.as_ptr());
            assert!(processor.is_null());
            assert!(!mindbridge_last_error().is_null());
        }
    }
}

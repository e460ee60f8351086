//! Internal-consistency reporting channel.
//!
//! Ownership-contract violations (detaching an item that is not where its
//! location says, double-binding a handle, dereferencing an empty strict
//! handle) are not recoverable errors the caller is expected to match on;
//! they are bugs. They are reported here: logged through `tracing` and fatal
//! in debug builds, a logged no-op in release builds.
//!
//! Tests assert on error paths by wrapping them in [`capture_reports`], which
//! diverts reports into a buffer instead of asserting.

use std::cell::RefCell;

thread_local! {
    static CAPTURE: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Reports an internal-consistency failure.
///
/// Prefer the [`report!`](crate::diag::report) macro, which accepts format
/// arguments.
pub fn report_message(message: String) {
    let captured = CAPTURE.with(|capture| {
        if let Some(buffer) = capture.borrow_mut().as_mut() {
            buffer.push(message.clone());
            true
        } else {
            false
        }
    });
    if captured {
        return;
    }
    tracing::error!(target: "wastefall_core", "{message}");
    debug_assert!(false, "{message}");
}

/// Runs `f` with report capturing enabled, returning its result and every
/// report issued on this thread while it ran.
pub fn capture_reports<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    CAPTURE.with(|capture| {
        *capture.borrow_mut() = Some(Vec::new());
    });
    let result = f();
    let reports = CAPTURE.with(|capture| capture.borrow_mut().take().unwrap_or_default());
    (result, reports)
}

macro_rules! report {
    ($($arg:tt)*) => {
        $crate::diag::report_message(format!($($arg)*))
    };
}

pub(crate) use report;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_collects_reports() {
        let ((), reports) = capture_reports(|| {
            report!("first: {}", 1);
            report!("second");
        });
        assert_eq!(reports, vec!["first: 1".to_string(), "second".to_string()]);
    }

    #[test]
    fn capture_is_scoped() {
        let (_, outer) = capture_reports(|| {
            let (_, inner) = capture_reports(|| report!("inner"));
            assert_eq!(inner, vec!["inner".to_string()]);
        });
        // The outer scope was replaced by the inner one; nothing leaks across.
        assert!(outer.is_empty());
    }
}

//! mockarena-test: test domain for conformance testing
//!
//! Provides mock bodies for a tiny POSIX-style file API and helpers for
//! asserting on a context's error record. This is the reference for how to
//! write mock bodies on top of mockarena.
//!
//! # Example
//!
//! ```
//! use mockarena_test::prelude::*;
//!
//! let mut mocks = recording(DEFAULT_ARENA_BUDGET);
//! mocks.configure("open", &[Matcher::str_eq("/etc/hosts"), Matcher::any()], &[Responder::returns(3_i32)]);
//!
//! assert_eq!(posix::open(&mut mocks, "/etc/hosts", 0), 3);
//! assert_eq!(posix::open(&mut mocks, "/etc/passwd", 0), 0);
//! assert_last_error(&mocks, ErrorKind::NoMappingMatched);
//! ```

use mockarena::prelude::*;

#[cfg(feature = "fixtures")]
pub mod fixture;

/// A context whose handler records errors instead of panicking.
#[must_use]
pub fn recording<'a>(budget: usize) -> MockContext<'a> {
    let mut mocks = MockContext::new(budget);
    mocks.set_error_handler(handlers::record);
    mocks
}

/// Assert that the context's last error is of `kind`.
///
/// # Panics
///
/// If there is no last error or it is of another kind.
#[track_caller]
pub fn assert_last_error(mocks: &MockContext<'_>, kind: ErrorKind) {
    match mocks.last_error() {
        Some(record) => assert_eq!(
            record.kind(),
            kind,
            "expected {kind} error, got: {}",
            record.message()
        ),
        None => panic!("expected {kind} error, got none"),
    }
}

/// Assert that the context has no last error.
///
/// # Panics
///
/// If a last error is recorded.
#[track_caller]
pub fn assert_no_error(mocks: &MockContext<'_>) {
    if let Some(record) = mocks.last_error() {
        panic!("unexpected error: {}", record.message());
    }
}

/// Mock bodies for a POSIX-style file API.
///
/// Each function forwards its parameters to the context under its own name
/// and converts the answer to its return type. An unanswered call returns
/// the return type's default.
pub mod posix {
    use std::cell::Cell;

    use mockarena::prelude::*;

    /// `int open(const char *path, int flags)`
    pub fn open(mocks: &mut MockContext<'_>, path: &str, flags: i32) -> i32 {
        mocks
            .dispatch(mock_name!(open), TypeTag::INT, &[path.into(), flags.into()])
            .get_or_default()
    }

    /// `long read(int fd, char *buf)`
    ///
    /// Responders may write into `buf` through its mutable address.
    pub fn read(mocks: &mut MockContext<'_>, fd: i32, buf: &[Cell<u8>]) -> i64 {
        mocks
            .dispatch(mock_name!(read), TypeTag::LONG, &[fd.into(), buf.into()])
            .get_or_default()
    }

    /// `long write(int fd, const char *data)`
    pub fn write(mocks: &mut MockContext<'_>, fd: i32, data: &[u8]) -> i64 {
        mocks
            .dispatch(mock_name!(write), TypeTag::LONG, &[fd.into(), data.into()])
            .get_or_default()
    }

    /// `int close(int fd)`
    pub fn close(mocks: &mut MockContext<'_>, fd: i32) -> i32 {
        mocks
            .dispatch(mock_name!(close), TypeTag::INT, &[fd.into()])
            .get_or_default()
    }

    /// `void sync(void)`
    pub fn sync(mocks: &mut MockContext<'_>) {
        mocks.dispatch(mock_name!(sync), TypeTag::VOID, &[]);
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{assert_last_error, assert_no_error, posix, recording};
    pub use mockarena::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::cell::Cell;

    #[test]
    fn unanswered_calls_default() {
        let mut mocks = recording(DEFAULT_ARENA_BUDGET);
        assert_eq!(posix::close(&mut mocks, 3), 0);
        assert_last_error(&mocks, ErrorKind::FunctionNotFound);
    }

    #[test]
    fn sync_counts_calls() {
        let syncs = Cell::new(0_i32);
        let mut mocks = recording(DEFAULT_ARENA_BUDGET);
        mocks.configure("sync", &[], &[Responder::count(&syncs)]);
        posix::sync(&mut mocks);
        posix::sync(&mut mocks);
        assert_eq!(syncs.get(), 2);
        assert_no_error(&mocks);
    }

    #[test]
    #[should_panic(expected = "expected no mappings matched for call error, got none")]
    fn assert_last_error_without_error() {
        let mocks = recording(DEFAULT_ARENA_BUDGET);
        assert_last_error(&mocks, ErrorKind::NoMappingMatched);
    }
}

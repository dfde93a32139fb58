//! mockarena - an in-process test-double engine
//!
//! A test configures *mappings* for named functions: a list of matchers over
//! the call's parameters plus a group of responders. The mock body forwards
//! each call to [`MockContext::dispatch`], which finds the first mapping whose
//! matchers all accept, runs the responders of its current group and rotates
//! to the next group.
//!
//! # Architecture
//!
//! - [`TypeTag`] - `(kind, indirection)` pair describing a C-style scalar type
//! - [`Value`] - a tagged scalar or address; the currency of matchers and responders
//! - [`Matcher`] - a predicate over one parameter or the whole call
//! - [`Responder`] - an action producing a value or a side effect
//! - [`MockContext`] - the registry, its arena, the last error and the error handler
//!
//! All registry storage comes from a fixed byte budget split evenly into five
//! regions (functions, mappings, matchers, responders, list nodes). A
//! configuration that does not fit fails with a capacity error and changes
//! nothing.
//!
//! # Example
//!
//! ```
//! use mockarena::prelude::*;
//!
//! fn read(mocks: &mut MockContext<'_>, fd: i32, buf: &str) -> i64 {
//!     mocks
//!         .dispatch(mock_name!(read), TypeTag::LONG, &[fd.into(), buf.into()])
//!         .get_or_default()
//! }
//!
//! let mut mocks = MockContext::new(DEFAULT_ARENA_BUDGET);
//! let fd3 = [Matcher::eq(3_i32), Matcher::any()];
//! mocks.configure("read", &fd3, &[Responder::returns(512_i64)]);
//! mocks.configure("read", &fd3, &[Responder::returns(0_i64)]);
//!
//! assert_eq!(read(&mut mocks, 3, ""), 512);
//! assert_eq!(read(&mut mocks, 3, ""), 0);
//! assert_eq!(read(&mut mocks, 3, ""), 512);
//! ```
//!
//! # Errors
//!
//! Failures are recorded as the context's last error and handed to the
//! error handler, which panics by default. Install
//! [`handlers::record`] to inspect errors instead, or use the `try_`
//! variants to get them as `Result`s.
//!
//! # Features
//!
//! - `config` - serde-deserializable [`config`] types and
//!   `MockContext::load`

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod arena;
mod context;
mod dispatch;
mod error;
mod matcher;
mod registry;
mod responder;
mod type_tag;
mod value;

#[cfg(feature = "config")]
pub mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use context::MockContext;
pub use matcher::{Call, CallPredicate, MatchMode, MatchOp, Matcher, ParamPredicate};
pub use responder::{CallResponse, ParamResponse, RespondMode, RespondOp, Responder};
pub use type_tag::{Indirection, Kind, ParseTypeTagError, TypeTag};
pub use value::{
    CharData, Comparison, ConstAddr, FnAddr, FromValue, MutAddr, Value, ValueTypeError,
};

// Arena introspection
pub use arena::{Region, RegionUsage, REGIONS};

// Errors
pub use error::{handlers, ErrorHandler, ErrorKind, ErrorRecord, MockError};

// Config types (feature-gated)
#[cfg(feature = "config")]
pub use config::{
    ConfigError, ExtraConfig, MappingConfig, MatcherConfig, MocksConfig, ResponderConfig,
    ValueConfig,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use mockarena::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        fn_addr,
        handlers,
        mock_name,
        Call,
        Comparison,
        // Errors
        ErrorKind,
        ErrorRecord,
        FnAddr,
        Kind,
        // Core types
        Matcher,
        MockContext,
        MockError,
        Responder,
        TypeTag,
        Value,
        DEFAULT_ARENA_BUDGET,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Arena budget, in bytes, used by [`MockContext::default`].
///
/// Enough for a few hundred mappings; pass a larger budget to
/// [`MockContext::new`] for bigger suites.
pub const DEFAULT_ARENA_BUDGET: usize = 64 * 1024;

// ═══════════════════════════════════════════════════════════════════════════════
// Macros
// ═══════════════════════════════════════════════════════════════════════════════

/// The registry name of a function: its identifier as a `&'static str`.
///
/// Keeps mock bodies and configuration in sync when a function is renamed.
///
/// ```
/// fn fetch() {}
/// assert_eq!(mockarena::mock_name!(fetch), "fetch");
/// ```
#[macro_export]
macro_rules! mock_name {
    ($f:ident) => {{
        let _ = $f;
        stringify!($f)
    }};
}

/// The address of a function item or pointer as an [`FnAddr`].
///
/// ```
/// use mockarena::{fn_addr, Value};
///
/// fn on_ready(_: i32) {}
/// let v = Value::from(fn_addr!(on_ready));
/// assert_eq!(v, Value::from(fn_addr!(on_ready)));
/// assert_ne!(v.get::<mockarena::FnAddr>().unwrap().addr(), 0);
/// ```
#[macro_export]
macro_rules! fn_addr {
    ($f:expr) => {
        $crate::FnAddr::from_raw($f as *const () as usize)
    };
}

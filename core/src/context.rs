//! `MockContext`: the object a test owns to configure and answer mocks.
//!
//! One context holds an arena-backed registry, the last error and the error
//! handler. Every mutating operation takes `&mut self`, so a context is used
//! from one place at a time; tests that run concurrently each build their own.

use crate::arena::{RegionUsage, REGIONS};
use crate::error::{handlers, ErrorHandler, ErrorRecord, MockError};
use crate::matcher::Matcher;
use crate::registry::Registry;
use crate::responder::Responder;
use crate::type_tag::TypeTag;
use crate::value::Value;

/// A mock registry plus its error state.
///
/// `'a` bounds everything stored in the registry: mock names, the values
/// inside matchers and responders, and the addresses responders write to.
///
/// # Example
///
/// ```
/// use mockarena::prelude::*;
///
/// let mut mocks = MockContext::new(DEFAULT_ARENA_BUDGET);
/// mocks.configure("area", &[Matcher::gt(0_i32), Matcher::any()], &[Responder::returns(12_i32)]);
///
/// fn area(mocks: &mut MockContext<'_>, w: i32, h: i32) -> i32 {
///     mocks
///         .dispatch("area", TypeTag::INT, &[w.into(), h.into()])
///         .get_or_default()
/// }
///
/// assert_eq!(area(&mut mocks, 3, 4), 12);
/// ```
pub struct MockContext<'a> {
    registry: Registry<'a>,
    last_error: Option<ErrorRecord>,
    handler: ErrorHandler,
}

impl std::fmt::Debug for MockContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockContext")
            .field("budget", &self.registry.arena.budget())
            .field("usage", &self.usage())
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl<'a> MockContext<'a> {
    /// A context whose arena is carved from `budget` bytes.
    ///
    /// The error handler starts as [`handlers::panic`].
    #[must_use]
    pub fn new(budget: usize) -> Self {
        Self {
            registry: Registry::new(budget),
            last_error: None,
            handler: handlers::panic,
        }
    }

    /// Discard every function, mapping and group, start over with
    /// `budget` bytes, restore the default handler and clear the last error.
    pub fn initialize(&mut self, budget: usize) {
        *self = Self::new(budget);
    }

    /// Replace the error handler.
    pub fn set_error_handler(&mut self, handler: ErrorHandler) {
        self.handler = handler;
    }

    /// The most recent failure, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&ErrorRecord> {
        self.last_error.as_ref()
    }

    /// Diagnostic line of the most recent failure, or `""`.
    #[must_use]
    pub fn last_error_message(&self) -> &str {
        self.last_error.as_ref().map_or("", ErrorRecord::message)
    }

    /// Forget the most recent failure.
    pub fn clear_last_error(&mut self) {
        self.last_error = None;
    }

    /// Occupancy of each arena region.
    #[must_use]
    pub fn usage(&self) -> [RegionUsage; REGIONS] {
        self.registry.arena.usage()
    }

    /// Budget the arena was carved from.
    #[must_use]
    pub fn budget(&self) -> usize {
        self.registry.arena.budget()
    }

    /// Store `error` and hand it to the handler.
    fn fail(&mut self, error: MockError) {
        let record = self.last_error.insert(ErrorRecord::new(error));
        (self.handler)(record);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Configuration
    // ═══════════════════════════════════════════════════════════════════════

    /// Answer calls to `name` whose parameters satisfy `ordinary` (one
    /// matcher per parameter) with `responders`.
    ///
    /// Repeating a configuration with identical matchers adds another
    /// responder group; groups then answer in turn.
    pub fn configure(&mut self, name: &'a str, ordinary: &[Matcher<'a>], responders: &[Responder<'a>]) {
        self.configure_extra(name, ordinary, &[], responders);
    }

    /// Like [`configure`](Self::configure), with `extra` matchers that must
    /// also pass.
    pub fn configure_extra(
        &mut self,
        name: &'a str,
        ordinary: &[Matcher<'a>],
        extra: &[Matcher<'a>],
        responders: &[Responder<'a>],
    ) {
        if let Err(error) = self.registry.configure(name, ordinary, extra, responders) {
            self.fail(error);
        }
    }

    /// [`configure`](Self::configure) returning the error instead of
    /// recording it.
    pub fn try_configure(
        &mut self,
        name: &'a str,
        ordinary: &[Matcher<'a>],
        responders: &[Responder<'a>],
    ) -> Result<(), MockError> {
        self.registry.configure(name, ordinary, &[], responders)
    }

    /// [`configure_extra`](Self::configure_extra) returning the error
    /// instead of recording it.
    pub fn try_configure_extra(
        &mut self,
        name: &'a str,
        ordinary: &[Matcher<'a>],
        extra: &[Matcher<'a>],
        responders: &[Responder<'a>],
    ) -> Result<(), MockError> {
        self.registry.configure(name, ordinary, extra, responders)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Dispatch
    // ═══════════════════════════════════════════════════════════════════════

    /// Answer a call to the mock `name`. This is what a mock body calls.
    ///
    /// `expected` is the tag of the mock's return type. On failure the error
    /// is recorded and handled, and the result is [`Value::Void`]. A result
    /// whose tag differs from `expected` is reported but still returned.
    pub fn dispatch<'p>(&mut self, name: &str, expected: TypeTag, params: &[Value<'p>]) -> Value<'p>
    where
        'a: 'p,
    {
        match self.registry.dispatch(name, params) {
            Ok(value) => {
                if value.tag() != expected {
                    self.fail(MockError::UnexpectedReturnType {
                        function: name.to_string(),
                        actual: value.tag(),
                        expected,
                    });
                }
                value
            }
            Err(error) => {
                self.fail(error);
                Value::Void
            }
        }
    }

    /// [`dispatch`](Self::dispatch) returning the error instead of
    /// recording it.
    ///
    /// A return-type mismatch is an error here, although the responders
    /// have already run and the group has rotated.
    pub fn try_dispatch<'p>(
        &mut self,
        name: &str,
        expected: TypeTag,
        params: &[Value<'p>],
    ) -> Result<Value<'p>, MockError>
    where
        'a: 'p,
    {
        let value = self.registry.dispatch(name, params)?;
        if value.tag() != expected {
            return Err(MockError::UnexpectedReturnType {
                function: name.to_string(),
                actual: value.tag(),
                expected,
            });
        }
        Ok(value)
    }
}

impl Default for MockContext<'_> {
    fn default() -> Self {
        Self::new(crate::DEFAULT_ARENA_BUDGET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Region;
    use crate::error::ErrorKind;
    use std::cell::Cell;

    fn recording<'a>() -> MockContext<'a> {
        let mut ctx = MockContext::new(64 * 1024);
        ctx.set_error_handler(handlers::record);
        ctx
    }

    #[test]
    fn failed_dispatch_records_and_returns_void() {
        let mut ctx = recording();
        let result = ctx.dispatch("missing", TypeTag::INT, &[Value::from(1_i32)]);
        assert!(result.is_void());
        assert_eq!(result.get_or_default::<i32>(), 0);
        let record = ctx.last_error().unwrap();
        assert_eq!(record.kind(), ErrorKind::FunctionNotFound);
        assert_eq!(record.code(), 10);
        assert_eq!(ctx.last_error_message(), "function not found in mappings: missing (1)");
    }

    #[test]
    fn return_type_mismatch_still_returns_the_value() {
        let mut ctx = recording();
        ctx.configure("f", &[], &[Responder::returns(5_i64)]);
        let result = ctx.dispatch("f", TypeTag::ULONG, &[]);
        assert_eq!(result, Value::from(5_i64));
        assert_eq!(
            ctx.last_error_message(),
            "unexpected return type: f: (long)<>(unsigned long)"
        );
    }

    #[test]
    fn failed_configuration_changes_nothing() {
        let mut ctx = MockContext::new(0);
        ctx.set_error_handler(handlers::record);
        ctx.configure("f", &[], &[]);
        assert_eq!(ctx.last_error().unwrap().kind(), ErrorKind::FunctionCapacity);
        assert!(ctx.usage().iter().all(|u| u.used == 0));
    }

    #[test]
    fn errors_overwrite_the_record() {
        let mut ctx = recording();
        ctx.dispatch("a", TypeTag::VOID, &[]);
        assert_eq!(ctx.last_error_message(), "function not found in mappings: a");
        ctx.dispatch("b", TypeTag::VOID, &[]);
        assert_eq!(ctx.last_error_message(), "function not found in mappings: b");
        ctx.clear_last_error();
        assert!(ctx.last_error().is_none());
        assert_eq!(ctx.last_error_message(), "");
    }

    #[test]
    fn initialize_resets_everything() {
        let mut ctx = recording();
        ctx.configure("f", &[], &[Responder::returns(1_i32)]);
        ctx.dispatch("g", TypeTag::INT, &[]);
        assert!(ctx.last_error().is_some());

        ctx.initialize(32 * 1024);
        assert!(ctx.last_error().is_none());
        assert_eq!(ctx.budget(), 32 * 1024);
        assert!(ctx.usage().iter().all(|u| u.used == 0));
        assert!(ctx.try_dispatch("f", TypeTag::INT, &[]).is_err());
    }

    #[test]
    #[should_panic(expected = "no mappings matched for call: f (1)")]
    fn default_handler_panics() {
        let mut ctx = MockContext::new(64 * 1024);
        ctx.configure("f", &[Matcher::eq(1_i32)], &[Responder::returns(1_i32)]);
        ctx.dispatch("f", TypeTag::INT, &[Value::from(2_i32)]);
    }

    #[test]
    #[should_panic(expected = "insufficient memory for functions: f")]
    fn initialize_restores_default_handler() {
        let mut ctx = recording();
        ctx.initialize(0);
        ctx.configure("f", &[], &[]);
    }

    #[test]
    fn try_variants_bypass_the_handler() {
        let mut ctx = MockContext::new(64 * 1024);
        let err = ctx.try_dispatch("f", TypeTag::INT, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FunctionNotFound);
        assert!(ctx.last_error().is_none());

        ctx.try_configure("f", &[], &[Responder::returns(2_u32)]).unwrap();
        assert_eq!(ctx.try_dispatch("f", TypeTag::UINT, &[]), Ok(Value::from(2_u32)));
        let err = ctx.try_dispatch("f", TypeTag::INT, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedReturnType);
    }

    #[test]
    fn counting_calls() {
        let calls = Cell::new(0_u32);
        let mut ctx = MockContext::new(64 * 1024);
        ctx.configure("tick", &[], &[Responder::count(&calls)]);
        for _ in 0..3 {
            ctx.dispatch("tick", TypeTag::VOID, &[]);
        }
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn configure_extra_with_custom_predicate() {
        fn divides(param: Value<'_>, stored: Value<'_>) -> bool {
            match (param.get::<i32>(), stored.get::<i32>()) {
                (Ok(p), Ok(s)) if s != 0 => p % s == 0,
                _ => false,
            }
        }

        let mut ctx = MockContext::new(64 * 1024);
        ctx.configure_extra(
            "classify",
            &[Matcher::any_of(TypeTag::INT)],
            &[Matcher::extra(1, divides, 3_i32)],
            &[Responder::returns("fizz")],
        );
        ctx.configure("classify", &[Matcher::any_of(TypeTag::INT)], &[Responder::returns("other")]);

        let fizz = ctx.dispatch("classify", TypeTag::STR, &[Value::from(9_i32)]);
        assert_eq!(fizz.as_str(), Some("fizz"));
        let other = ctx.dispatch("classify", TypeTag::STR, &[Value::from(7_i32)]);
        assert_eq!(other.as_str(), Some("other"));
    }

    #[test]
    fn usage_tracks_regions() {
        let mut ctx = MockContext::new(64 * 1024);
        ctx.configure("f", &[Matcher::any(), Matcher::any()], &[Responder::returns(1_i32)]);
        let usage = ctx.usage();
        let used = |region| usage.iter().find(|u| u.region == region).unwrap().used;
        assert_eq!(used(Region::Functions), 1);
        assert_eq!(used(Region::Mappings), 1);
        assert_eq!(used(Region::Matchers), 2);
        assert_eq!(used(Region::Responders), 1);
        assert_eq!(used(Region::ListNodes), 2);
    }
}

//! Matchers: predicates over one call parameter or over the whole call.
//!
//! A mapping holds one *ordinary* matcher per parameter, in parameter order,
//! and may add any number of *extra* matchers. An extra matcher names the
//! parameter it reads (1-based) or inspects the whole [`Call`]. A mapping is
//! selected when every one of its matchers returns `true`.
//!
//! ```
//! use mockarena::{Comparison, Matcher, MatchOp, TypeTag};
//!
//! let m = Matcher::lt(5_i32);
//! assert_eq!(m.op, MatchOp::Compare(Comparison::Lt));
//! assert_eq!(m.tag, TypeTag::INT);
//! assert!(m.mode.is_checked());
//! ```

use crate::type_tag::TypeTag;
use crate::value::{CharData, Comparison, Value};

/// The call being dispatched: the mock's name and its actual parameters.
#[derive(Debug, Clone, Copy)]
pub struct Call<'c, 'v> {
    pub name: &'c str,
    pub params: &'c [Value<'v>],
}

impl<'c, 'v> Call<'c, 'v> {
    #[must_use]
    pub fn new(name: &'c str, params: &'c [Value<'v>]) -> Self {
        Self { name, params }
    }

    /// Number of parameters.
    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Parameter `n`, counting from 1.
    #[must_use]
    pub fn param(&self, n: usize) -> Option<Value<'v>> {
        n.checked_sub(1).and_then(|i| self.params.get(i)).copied()
    }
}

/// Custom predicate over `(parameter, stored value)`.
pub type ParamPredicate = for<'v> fn(Value<'v>, Value<'v>) -> bool;

/// Custom predicate over `(call, stored value)`.
pub type CallPredicate = for<'c, 'v> fn(&Call<'c, 'v>, Value<'v>) -> bool;

/// What a matcher does with its input.
#[derive(Debug, Clone, Copy)]
pub enum MatchOp {
    /// `param <op> stored` under native semantics.
    Compare(Comparison),
    /// Lexicographic comparison of character data.
    CompareStr(Comparison),
    /// The stored string occurs inside the parameter.
    Substr,
    /// Always true.
    Any,
    Param(ParamPredicate),
    Call(CallPredicate),
}

// Function pointers compare by address.
impl PartialEq for MatchOp {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Compare(a), Self::Compare(b)) | (Self::CompareStr(a), Self::CompareStr(b)) => {
                a == b
            }
            (Self::Substr, Self::Substr) | (Self::Any, Self::Any) => true,
            (Self::Param(a), Self::Param(b)) => *a as usize == *b as usize,
            (Self::Call(a), Self::Call(b)) => *a as usize == *b as usize,
            _ => false,
        }
    }
}

impl MatchOp {
    /// Returns `true` for `<`, `<=`, `>` and `>=` on native values.
    #[must_use]
    pub fn is_ordering(&self) -> bool {
        matches!(self, Self::Compare(op) if op.is_ordering())
    }
}

/// Which input a matcher reads, and whether its type is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Reads the parameter at its own position.
    Ordinary { checked: bool },
    /// Reads parameter `param` (1-based) from an extra position.
    Extra { param: usize, checked: bool },
    /// Reads the whole call from an extra position. Never type checked.
    WholeCall,
}

impl MatchMode {
    /// Returns `true` if the matcher's tag must equal its parameter's tag.
    #[must_use]
    pub fn is_checked(&self) -> bool {
        match self {
            Self::Ordinary { checked } | Self::Extra { checked, .. } => *checked,
            Self::WholeCall => false,
        }
    }
}

/// An operation, a stored value, an expected tag and a mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matcher<'a> {
    pub op: MatchOp,
    pub value: Value<'a>,
    /// Tag checked against the parameter. Normally the stored value's tag.
    pub tag: TypeTag,
    pub mode: MatchMode,
}

impl<'a> Matcher<'a> {
    pub(crate) fn ordinary(op: MatchOp, value: Value<'a>, checked: bool) -> Self {
        Self {
            op,
            value,
            tag: value.tag(),
            mode: MatchMode::Ordinary { checked },
        }
    }

    /// Matches when `param <op> value`.
    pub fn compare(op: Comparison, value: impl Into<Value<'a>>) -> Self {
        Self::ordinary(MatchOp::Compare(op), value.into(), true)
    }

    pub fn eq(value: impl Into<Value<'a>>) -> Self {
        Self::compare(Comparison::Eq, value)
    }

    pub fn ne(value: impl Into<Value<'a>>) -> Self {
        Self::compare(Comparison::Ne, value)
    }

    pub fn lt(value: impl Into<Value<'a>>) -> Self {
        Self::compare(Comparison::Lt, value)
    }

    pub fn le(value: impl Into<Value<'a>>) -> Self {
        Self::compare(Comparison::Le, value)
    }

    pub fn gt(value: impl Into<Value<'a>>) -> Self {
        Self::compare(Comparison::Gt, value)
    }

    pub fn ge(value: impl Into<Value<'a>>) -> Self {
        Self::compare(Comparison::Ge, value)
    }

    /// Matches when the parameter's string compares to `s` under `op`.
    ///
    /// `&str` data matches `const char *` parameters, `&[Cell<u8>]` data
    /// matches `char *` ones.
    ///
    /// ```
    /// use std::cell::Cell;
    /// use mockarena::{Kind, Matcher, TypeTag};
    ///
    /// assert_eq!(Matcher::str_eq("abc").tag, TypeTag::STR);
    /// let buf: Vec<Cell<u8>> = b"abc".iter().copied().map(Cell::new).collect();
    /// assert_eq!(Matcher::str_eq(buf.as_slice()).tag, TypeTag::mut_of(Kind::Char));
    /// ```
    pub fn compare_str(op: Comparison, s: impl CharData<'a>) -> Self {
        Self::ordinary(MatchOp::CompareStr(op), s.into(), true)
    }

    pub fn str_eq(s: impl CharData<'a>) -> Self {
        Self::compare_str(Comparison::Eq, s)
    }

    pub fn str_ne(s: impl CharData<'a>) -> Self {
        Self::compare_str(Comparison::Ne, s)
    }

    pub fn str_lt(s: impl CharData<'a>) -> Self {
        Self::compare_str(Comparison::Lt, s)
    }

    pub fn str_le(s: impl CharData<'a>) -> Self {
        Self::compare_str(Comparison::Le, s)
    }

    pub fn str_gt(s: impl CharData<'a>) -> Self {
        Self::compare_str(Comparison::Gt, s)
    }

    pub fn str_ge(s: impl CharData<'a>) -> Self {
        Self::compare_str(Comparison::Ge, s)
    }

    /// Matches when `s` occurs in the parameter's string. Empty `s` always
    /// matches.
    pub fn substr(s: impl CharData<'a>) -> Self {
        Self::ordinary(MatchOp::Substr, s.into(), true)
    }

    /// Untyped wildcard: matches any parameter of any type.
    #[must_use]
    pub fn any() -> Self {
        Self::ordinary(MatchOp::Any, Value::Void, false)
    }

    /// Typed wildcard: matches any parameter whose tag is `tag`.
    ///
    /// ```
    /// use mockarena::{Matcher, TypeTag};
    ///
    /// let m = Matcher::any_of(TypeTag::STR);
    /// assert_eq!(m.tag, TypeTag::STR);
    /// assert!(m.mode.is_checked());
    /// ```
    #[must_use]
    pub fn any_of(tag: TypeTag) -> Self {
        Self {
            op: MatchOp::Any,
            value: Value::zero_of(tag),
            tag,
            mode: MatchMode::Ordinary { checked: true },
        }
    }

    /// Custom predicate, type checked against `value`'s tag.
    pub fn param(f: ParamPredicate, value: impl Into<Value<'a>>) -> Self {
        Self::ordinary(MatchOp::Param(f), value.into(), true)
    }

    /// Custom predicate without a type check.
    pub fn param_unchecked(f: ParamPredicate, value: impl Into<Value<'a>>) -> Self {
        Self::ordinary(MatchOp::Param(f), value.into(), false)
    }

    /// Extra custom predicate over parameter `param`, type checked.
    pub fn extra(param: usize, f: ParamPredicate, value: impl Into<Value<'a>>) -> Self {
        Self::param(f, value).on_param(param)
    }

    /// Extra custom predicate over parameter `param`, unchecked.
    pub fn extra_unchecked(param: usize, f: ParamPredicate, value: impl Into<Value<'a>>) -> Self {
        Self::param_unchecked(f, value).on_param(param)
    }

    /// Extra predicate over the whole call.
    pub fn call(f: CallPredicate, value: impl Into<Value<'a>>) -> Self {
        let value = value.into();
        Self {
            op: MatchOp::Call(f),
            value,
            tag: value.tag(),
            mode: MatchMode::WholeCall,
        }
    }

    /// Turn an ordinary matcher into an extra one reading parameter `param`.
    ///
    /// Extra and whole-call matchers are returned unchanged.
    ///
    /// ```
    /// use mockarena::{MatchMode, Matcher};
    ///
    /// let m = Matcher::gt(3_i32).on_param(2);
    /// assert_eq!(m.mode, MatchMode::Extra { param: 2, checked: true });
    /// ```
    #[must_use]
    pub fn on_param(mut self, param: usize) -> Self {
        if let MatchMode::Ordinary { checked } = self.mode {
            self.mode = MatchMode::Extra { param, checked };
        }
        self
    }

    /// Run the operation on one input.
    ///
    /// `param` is the parameter this matcher reads; whole-call matchers
    /// ignore it and read `call` instead. No placement or type checks happen
    /// here.
    pub fn test<'v>(&self, call: &Call<'_, 'v>, param: Value<'v>) -> bool
    where
        'a: 'v,
    {
        let stored: Value<'v> = self.value;
        match self.op {
            MatchOp::Compare(op) => param.compare(stored, op),
            MatchOp::CompareStr(op) => param.compare_str(stored, op),
            MatchOp::Substr => param.contains_str(stored),
            MatchOp::Any => true,
            MatchOp::Param(f) => f(param, stored),
            MatchOp::Call(f) => f(call, stored),
        }
    }
}

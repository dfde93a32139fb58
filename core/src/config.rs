//! Declarative mock configuration.
//!
//! These types mirror the runtime matcher and responder types but are
//! serde-deserializable, so a whole mock setup can live in a YAML or JSON
//! file and be lowered into a [`MockContext`] with
//! [`MockContext::load`].
//!
//! | Config type | Runtime type |
//! |-------------|--------------|
//! | [`ValueConfig`] | [`Value`] |
//! | [`CharsConfig`] | `const char *` or `char *` [`Value`] |
//! | [`MatcherConfig`] | [`Matcher`] |
//! | [`ExtraConfig`] | extra [`Matcher`] |
//! | [`ResponderConfig`] | [`Responder`] |
//! | [`MappingConfig`] | one `configure_extra` call |
//!
//! ```yaml
//! counters:
//!   reads: 0
//! mappings:
//!   - function: read
//!     matchers:
//!       - { type: eq, value: { int: 3 } }
//!       - { type: any }
//!     respond:
//!       - { type: count, counter: reads }
//!       - { type: returns, value: { long: 512 } }
//! ```

use std::cell::Cell;
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::context::MockContext;
use crate::error::MockError;
use crate::matcher::{MatchOp, Matcher};
use crate::responder::Responder;
use crate::type_tag::{ParseTypeTagError, TypeTag};
use crate::value::{Comparison, Value};
use crate::DEFAULT_ARENA_BUDGET;

/// Error lowering a configuration into a context.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The engine rejected one mapping.
    #[error("mapping {index} ({function}): {source}")]
    Mock {
        index: usize,
        function: String,
        source: MockError,
    },

    #[error(transparent)]
    TypeName(#[from] ParseTypeTagError),

    /// A `char` value outside `0..=255`.
    #[error("char value {0:?} does not fit in one byte")]
    WideChar(char),

    /// A `count` responder names a counter that is not declared.
    #[error("unknown counter \"{0}\"")]
    UnknownCounter(String),
}

fn cells<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Cell<u8>>, D::Error> {
    let text = String::deserialize(deserializer)?;
    Ok(text.into_bytes().into_iter().map(Cell::new).collect())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Lowering
// ═══════════════════════════════════════════════════════════════════════════════

/// Character data seen so far in one lowering pass, keyed by content.
///
/// Runtime mappings are shared when their stored addresses are identical.
/// Routing every config string through this table gives equal text one
/// address, so repeated mappings in a file share one runtime mapping.
#[derive(Default)]
struct Strings<'a> {
    read_only: BTreeMap<&'a str, &'a str>,
    writable: BTreeMap<Vec<u8>, &'a [Cell<u8>]>,
}

impl<'a> Strings<'a> {
    fn read_only(&mut self, s: &'a str) -> &'a str {
        *self.read_only.entry(s).or_insert(s)
    }

    fn writable(&mut self, buf: &'a [Cell<u8>]) -> &'a [Cell<u8>] {
        let content = buf.iter().map(Cell::get).collect();
        *self.writable.entry(content).or_insert(buf)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Values
// ═══════════════════════════════════════════════════════════════════════════════

/// A [`Value`] in configuration form. Externally tagged by kind:
/// `{ int: 10 }`, `{ str: "abc" }`, `{ buf: "abc" }`, `void`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueConfig {
    Void,
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Schar(i8),
    Uchar(u8),
    Ushort(u16),
    Uint(u32),
    Ulong(u64),
    /// A read-only character address.
    Str(String),
    /// A writable character buffer, given as its text.
    Buf(#[serde(deserialize_with = "cells")] Vec<Cell<u8>>),
}

impl ValueConfig {
    /// Lower to a runtime value borrowing from `self`.
    pub fn to_value(&self) -> Result<Value<'_>, ConfigError> {
        self.lower(&mut Strings::default())
    }

    fn lower<'a>(&'a self, strings: &mut Strings<'a>) -> Result<Value<'a>, ConfigError> {
        Ok(match self {
            Self::Void => Value::Void,
            Self::Char(c) => Value::char(u8::try_from(*c).map_err(|_| ConfigError::WideChar(*c))?),
            Self::Short(v) => Value::from(*v),
            Self::Int(v) => Value::from(*v),
            Self::Long(v) => Value::from(*v),
            Self::Float(v) => Value::from(*v),
            Self::Double(v) => Value::from(*v),
            Self::Schar(v) => Value::from(*v),
            Self::Uchar(v) => Value::from(*v),
            Self::Ushort(v) => Value::from(*v),
            Self::Uint(v) => Value::from(*v),
            Self::Ulong(v) => Value::from(*v),
            Self::Str(s) => Value::from(strings.read_only(s)),
            Self::Buf(buf) => Value::from(strings.writable(buf)),
        })
    }
}

/// Character data for string matchers.
///
/// A plain string is `const char *` data; `{ buf: "..." }` is a writable
/// `char *` buffer and only matches `char *` parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CharsConfig {
    Str(String),
    Buf {
        #[serde(deserialize_with = "cells")]
        buf: Vec<Cell<u8>>,
    },
}

impl CharsConfig {
    fn lower<'a>(&'a self, strings: &mut Strings<'a>) -> Value<'a> {
        match self {
            Self::Str(s) => Value::from(strings.read_only(s)),
            Self::Buf { buf } => Value::from(strings.writable(buf)),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Matchers and responders
// ═══════════════════════════════════════════════════════════════════════════════

/// Configuration for a [`Matcher`].
///
/// Uses `#[serde(tag = "type")]`:
///
/// ```yaml
/// { type: lt, value: { double: 0.5 } }
/// { type: str_eq, value: "GET" }
/// { type: substr, value: { buf: "tmp" } }
/// { type: any }
/// { type: any_of, tag: "const char *" }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatcherConfig {
    Eq { value: ValueConfig },
    Ne { value: ValueConfig },
    Lt { value: ValueConfig },
    Le { value: ValueConfig },
    Gt { value: ValueConfig },
    Ge { value: ValueConfig },
    StrEq { value: CharsConfig },
    StrNe { value: CharsConfig },
    StrLt { value: CharsConfig },
    StrLe { value: CharsConfig },
    StrGt { value: CharsConfig },
    StrGe { value: CharsConfig },
    Substr { value: CharsConfig },
    /// Untyped wildcard.
    Any,
    /// Typed wildcard; `tag` is a C-style type name.
    AnyOf { tag: String },
}

impl MatcherConfig {
    /// Lower to an ordinary runtime matcher.
    pub fn to_matcher(&self) -> Result<Matcher<'_>, ConfigError> {
        self.lower(&mut Strings::default())
    }

    fn lower<'a>(&'a self, strings: &mut Strings<'a>) -> Result<Matcher<'a>, ConfigError> {
        Ok(match self {
            Self::Eq { value } => Matcher::eq(value.lower(strings)?),
            Self::Ne { value } => Matcher::ne(value.lower(strings)?),
            Self::Lt { value } => Matcher::lt(value.lower(strings)?),
            Self::Le { value } => Matcher::le(value.lower(strings)?),
            Self::Gt { value } => Matcher::gt(value.lower(strings)?),
            Self::Ge { value } => Matcher::ge(value.lower(strings)?),
            Self::StrEq { value } => string_matcher(MatchOp::CompareStr(Comparison::Eq), value, strings),
            Self::StrNe { value } => string_matcher(MatchOp::CompareStr(Comparison::Ne), value, strings),
            Self::StrLt { value } => string_matcher(MatchOp::CompareStr(Comparison::Lt), value, strings),
            Self::StrLe { value } => string_matcher(MatchOp::CompareStr(Comparison::Le), value, strings),
            Self::StrGt { value } => string_matcher(MatchOp::CompareStr(Comparison::Gt), value, strings),
            Self::StrGe { value } => string_matcher(MatchOp::CompareStr(Comparison::Ge), value, strings),
            Self::Substr { value } => string_matcher(MatchOp::Substr, value, strings),
            Self::Any => Matcher::any(),
            Self::AnyOf { tag } => Matcher::any_of(tag.parse::<TypeTag>()?),
        })
    }
}

fn string_matcher<'a>(op: MatchOp, value: &'a CharsConfig, strings: &mut Strings<'a>) -> Matcher<'a> {
    Matcher::ordinary(op, value.lower(strings), true)
}

/// An extra matcher: a matcher plus the parameter (1-based) it reads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtraConfig {
    pub param: usize,
    pub matcher: MatcherConfig,
}

/// Configuration for a [`Responder`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponderConfig {
    Returns { value: ValueConfig },
    /// Increment a counter declared in [`MocksConfig::counters`].
    Count { counter: String },
}

/// One configuration call: matchers and a responder group for a function.
///
/// Mappings with identical matchers for the same function share one
/// runtime mapping; their groups answer in turn. Within one
/// [`MockContext::load`], equal string text counts as identical.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MappingConfig {
    pub function: String,
    /// One ordinary matcher per parameter. Their count is the arity.
    #[serde(default)]
    pub matchers: Vec<MatcherConfig>,
    #[serde(default)]
    pub extra: Vec<ExtraConfig>,
    #[serde(default)]
    pub respond: Vec<ResponderConfig>,
}

/// A complete mock setup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MocksConfig {
    /// Arena budget in bytes. Defaults to [`DEFAULT_ARENA_BUDGET`].
    #[serde(default)]
    pub budget: Option<usize>,
    /// Named counters for `count` responders, with their start values.
    #[serde(default)]
    pub counters: BTreeMap<String, Cell<i64>>,
    #[serde(default)]
    pub mappings: Vec<MappingConfig>,
}

impl MocksConfig {
    /// Current value of a counter.
    #[must_use]
    pub fn counter(&self, name: &str) -> Option<i64> {
        self.counters.get(name).map(Cell::get)
    }

    fn to_responder<'a>(
        &'a self,
        config: &'a ResponderConfig,
        strings: &mut Strings<'a>,
    ) -> Result<Responder<'a>, ConfigError> {
        match config {
            ResponderConfig::Returns { value } => Ok(Responder::returns(value.lower(strings)?)),
            ResponderConfig::Count { counter } => self
                .counters
                .get(counter)
                .map(Responder::count)
                .ok_or_else(|| ConfigError::UnknownCounter(counter.clone())),
        }
    }
}

impl<'a> MockContext<'a> {
    /// A context sized by `config.budget` with `config` loaded.
    pub fn from_config(config: &'a MocksConfig) -> Result<Self, ConfigError> {
        let mut ctx = Self::new(config.budget.unwrap_or(DEFAULT_ARENA_BUDGET));
        ctx.load(config)?;
        Ok(ctx)
    }

    /// Configure every mapping of `config`, in order.
    ///
    /// Stops at the first failure; mappings before it stay configured. The
    /// error handler is not involved.
    pub fn load(&mut self, config: &'a MocksConfig) -> Result<(), ConfigError> {
        let mut strings = Strings::default();
        for (index, mapping) in config.mappings.iter().enumerate() {
            let ordinary = mapping
                .matchers
                .iter()
                .map(|m| m.lower(&mut strings))
                .collect::<Result<Vec<_>, _>>()?;
            let extra = mapping
                .extra
                .iter()
                .map(|x| Ok(x.matcher.lower(&mut strings)?.on_param(x.param)))
                .collect::<Result<Vec<_>, ConfigError>>()?;
            let responders = mapping
                .respond
                .iter()
                .map(|r| config.to_responder(r, &mut strings))
                .collect::<Result<Vec<_>, _>>()?;
            self.try_configure_extra(&mapping.function, &ordinary, &extra, &responders)
                .map_err(|source| ConfigError::Mock {
                    index,
                    function: mapping.function.clone(),
                    source,
                })?;
        }
        log::debug!("loaded {} mapping(s)", config.mappings.len());
        Ok(())
    }
}

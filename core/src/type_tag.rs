//! Type tags: the `(kind, indirection)` pair carried by every [`Value`](crate::Value).
//!
//! A tag is one byte encoded as `kind * 4 + indirection`, so tag equality is a
//! single integer comparison. Not every byte is a valid tag: the low two bits
//! may not be `3` and the kind may not exceed [`Kind::Fn`]. Raw tags are
//! representable on purpose (see [`TypeTag::from_raw`]) so that the engine can
//! report them instead of trusting them.

use std::fmt;
use std::str::FromStr;

/// The primitive kind of a value, independent of indirection.
///
/// Codes follow declaration order and are part of the tag encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Kind {
    Void = 0,
    /// Plain `char`. Stored as a byte, ordered as a signed byte.
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    SChar,
    UChar,
    UShort,
    UInt,
    ULong,
    /// Opaque code address. Supports equality only.
    Fn,
}

impl Kind {
    /// Every kind, in code order.
    pub const ALL: [Kind; 13] = [
        Kind::Void,
        Kind::Char,
        Kind::Short,
        Kind::Int,
        Kind::Long,
        Kind::Float,
        Kind::Double,
        Kind::SChar,
        Kind::UChar,
        Kind::UShort,
        Kind::UInt,
        Kind::ULong,
        Kind::Fn,
    ];

    /// Look up a kind by its numeric code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// The numeric code used in the tag encoding.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// C-style spelling, as used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Void => "void",
            Kind::Char => "char",
            Kind::Short => "short",
            Kind::Int => "int",
            Kind::Long => "long",
            Kind::Float => "float",
            Kind::Double => "double",
            Kind::SChar => "signed char",
            Kind::UChar => "unsigned char",
            Kind::UShort => "unsigned short",
            Kind::UInt => "unsigned int",
            Kind::ULong => "unsigned long",
            Kind::Fn => "function",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a value refers to its datum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Indirection {
    /// The datum itself.
    Direct = 0,
    /// A mutable address of the datum.
    Mut = 1,
    /// A read-only address of the datum.
    Const = 2,
}

impl Indirection {
    /// Look up an indirection by its numeric code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Direct),
            1 => Some(Self::Mut),
            2 => Some(Self::Const),
            _ => None,
        }
    }
}

/// The one-byte `(kind, indirection)` tag of a value.
///
/// ```
/// use mockarena::{Indirection, Kind, TypeTag};
///
/// let tag = TypeTag::const_of(Kind::Char);
/// assert_eq!(tag.raw(), 6);
/// assert_eq!(tag.kind(), Some(Kind::Char));
/// assert_eq!(tag.indirection(), Some(Indirection::Const));
/// assert_eq!(tag.to_string(), "(const char *)");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeTag(u8);

impl TypeTag {
    pub const VOID: Self = Self::of(Kind::Void);
    pub const CHAR: Self = Self::of(Kind::Char);
    pub const SHORT: Self = Self::of(Kind::Short);
    pub const INT: Self = Self::of(Kind::Int);
    pub const LONG: Self = Self::of(Kind::Long);
    pub const FLOAT: Self = Self::of(Kind::Float);
    pub const DOUBLE: Self = Self::of(Kind::Double);
    pub const SCHAR: Self = Self::of(Kind::SChar);
    pub const UCHAR: Self = Self::of(Kind::UChar);
    pub const USHORT: Self = Self::of(Kind::UShort);
    pub const UINT: Self = Self::of(Kind::UInt);
    pub const ULONG: Self = Self::of(Kind::ULong);
    pub const FN: Self = Self::of(Kind::Fn);
    /// Read-only character address: the tag of string values.
    pub const STR: Self = Self::const_of(Kind::Char);

    /// Build a tag from its two components.
    #[inline]
    #[must_use]
    pub const fn new(kind: Kind, indirection: Indirection) -> Self {
        Self(kind as u8 * 4 + indirection as u8)
    }

    /// Tag of a direct value of `kind`.
    #[inline]
    #[must_use]
    pub const fn of(kind: Kind) -> Self {
        Self::new(kind, Indirection::Direct)
    }

    /// Tag of a mutable address of `kind`.
    #[inline]
    #[must_use]
    pub const fn mut_of(kind: Kind) -> Self {
        Self::new(kind, Indirection::Mut)
    }

    /// Tag of a read-only address of `kind`.
    #[inline]
    #[must_use]
    pub const fn const_of(kind: Kind) -> Self {
        Self::new(kind, Indirection::Const)
    }

    /// Wrap a raw byte without validating it.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// The encoded byte.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// The kind component, if the kind code is in range.
    #[must_use]
    pub fn kind(self) -> Option<Kind> {
        Kind::from_code(self.0 / 4)
    }

    /// The indirection component, if the low bits are in range.
    #[must_use]
    pub fn indirection(self) -> Option<Indirection> {
        Indirection::from_code(self.0 & 3)
    }

    /// Returns `true` if both components are in range.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.kind().is_some() && self.indirection().is_some()
    }

    /// Returns `true` for the direct function kind, which has no total order.
    #[must_use]
    pub fn is_unordered(self) -> bool {
        self == Self::FN
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind(), self.indirection()) {
            (Some(kind), Some(Indirection::Mut)) => write!(f, "({kind} *)"),
            (Some(kind), Some(Indirection::Const)) => write!(f, "(const {kind} *)"),
            (Some(kind), _) => write!(f, "({kind})"),
            // Out-of-range kinds print their raw code.
            (None, _) => write!(f, "{}", self.0 / 4),
        }
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({}={self})", self.0)
    }
}

/// Error returned when a C-style type name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown type name \"{name}\"; expected a C-style name such as \"int\", \"unsigned long *\" or \"const char *\"")]
pub struct ParseTypeTagError {
    /// The rejected input.
    pub name: String,
}

impl FromStr for TypeTag {
    type Err = ParseTypeTagError;

    /// Parse a C-style spelling: `int`, `unsigned short *`, `const char *`.
    ///
    /// Surrounding parentheses (as printed by `Display`) are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTypeTagError { name: s.to_string() };
        let mut text = s.trim();
        if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            text = inner.trim();
        }

        let (is_const, rest) = match text.strip_prefix("const ") {
            Some(rest) => (true, rest.trim_start()),
            None => (false, text),
        };
        let (is_address, base) = match rest.strip_suffix('*') {
            Some(base) => (true, base.trim_end()),
            None => (false, rest),
        };
        if is_const && !is_address {
            return Err(err());
        }

        let kind = Kind::ALL
            .into_iter()
            .find(|k| k.name() == base)
            .ok_or_else(err)?;
        let indirection = match (is_address, is_const) {
            (false, _) => Indirection::Direct,
            (true, false) => Indirection::Mut,
            (true, true) => Indirection::Const,
        };
        Ok(Self::new(kind, indirection))
    }
}

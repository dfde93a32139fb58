//! `Value`: one primitive datum plus its [`TypeTag`].
//!
//! Values are what crosses the mock boundary in both directions: the
//! arguments a mock body hands to [`dispatch`](crate::MockContext::dispatch),
//! the datum stored in every matcher and responder, and the result handed
//! back. They are small and `Copy`.
//!
//! Addresses borrow. A mutable address is a `&Cell<T>` (a writable character
//! buffer for `char`), a read-only address is a `&T` (a byte string for
//! `char`). The `void` addresses are raw pointers that are only ever compared,
//! never dereferenced.

use std::cell::Cell;
use std::cmp::Ordering;
use std::ptr;

use crate::type_tag::{Indirection, Kind, TypeTag};

/// Opaque code address. Supports equality only.
///
/// Build one from a function item with [`fn_addr!`](crate::fn_addr).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FnAddr(usize);

impl FnAddr {
    /// The null code address.
    pub const NULL: Self = Self(0);

    /// Wrap a raw address.
    #[inline]
    #[must_use]
    pub const fn from_raw(addr: usize) -> Self {
        Self(addr)
    }

    /// The raw address.
    #[inline]
    #[must_use]
    pub const fn addr(self) -> usize {
        self.0
    }
}

/// Mutable address of a datum.
#[derive(Debug, Clone, Copy)]
pub enum MutAddr<'a> {
    Void(*mut ()),
    /// Writable character buffer.
    Char(&'a [Cell<u8>]),
    Short(&'a Cell<i16>),
    Int(&'a Cell<i32>),
    Long(&'a Cell<i64>),
    Float(&'a Cell<f32>),
    Double(&'a Cell<f64>),
    SChar(&'a Cell<i8>),
    UChar(&'a Cell<u8>),
    UShort(&'a Cell<u16>),
    UInt(&'a Cell<u32>),
    ULong(&'a Cell<u64>),
    Fn(&'a Cell<FnAddr>),
}

/// Read-only address of a datum.
#[derive(Debug, Clone, Copy)]
pub enum ConstAddr<'a> {
    Void(*const ()),
    /// Byte string. Reads stop at the first NUL, if any.
    Char(&'a [u8]),
    Short(&'a i16),
    Int(&'a i32),
    Long(&'a i64),
    Float(&'a f32),
    Double(&'a f64),
    SChar(&'a i8),
    UChar(&'a u8),
    UShort(&'a u16),
    UInt(&'a u32),
    ULong(&'a u64),
    Fn(&'a FnAddr),
}

impl MutAddr<'_> {
    /// The kind of the addressed datum.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Void(_) => Kind::Void,
            Self::Char(_) => Kind::Char,
            Self::Short(_) => Kind::Short,
            Self::Int(_) => Kind::Int,
            Self::Long(_) => Kind::Long,
            Self::Float(_) => Kind::Float,
            Self::Double(_) => Kind::Double,
            Self::SChar(_) => Kind::SChar,
            Self::UChar(_) => Kind::UChar,
            Self::UShort(_) => Kind::UShort,
            Self::UInt(_) => Kind::UInt,
            Self::ULong(_) => Kind::ULong,
            Self::Fn(_) => Kind::Fn,
        }
    }

    /// The address as an integer, for identity and ordering.
    #[must_use]
    pub fn addr(&self) -> usize {
        match self {
            Self::Void(p) => *p as usize,
            Self::Char(s) => s.as_ptr() as usize,
            Self::Short(c) => ptr::from_ref(*c) as usize,
            Self::Int(c) => ptr::from_ref(*c) as usize,
            Self::Long(c) => ptr::from_ref(*c) as usize,
            Self::Float(c) => ptr::from_ref(*c) as usize,
            Self::Double(c) => ptr::from_ref(*c) as usize,
            Self::SChar(c) => ptr::from_ref(*c) as usize,
            Self::UChar(c) => ptr::from_ref(*c) as usize,
            Self::UShort(c) => ptr::from_ref(*c) as usize,
            Self::UInt(c) => ptr::from_ref(*c) as usize,
            Self::ULong(c) => ptr::from_ref(*c) as usize,
            Self::Fn(c) => ptr::from_ref(*c) as usize,
        }
    }

    /// Add one to the addressed datum.
    ///
    /// Integers wrap, floats add `1.0`, a character buffer bumps its first
    /// byte. `void` and function addresses are left alone.
    pub fn increment(&self) {
        match self {
            Self::Void(_) | Self::Fn(_) => {}
            Self::Char(buf) => {
                if let Some(first) = buf.first() {
                    first.set(first.get().wrapping_add(1));
                }
            }
            Self::Short(c) => c.set(c.get().wrapping_add(1)),
            Self::Int(c) => c.set(c.get().wrapping_add(1)),
            Self::Long(c) => c.set(c.get().wrapping_add(1)),
            Self::Float(c) => c.set(c.get() + 1.0),
            Self::Double(c) => c.set(c.get() + 1.0),
            Self::SChar(c) => c.set(c.get().wrapping_add(1)),
            Self::UChar(c) => c.set(c.get().wrapping_add(1)),
            Self::UShort(c) => c.set(c.get().wrapping_add(1)),
            Self::UInt(c) => c.set(c.get().wrapping_add(1)),
            Self::ULong(c) => c.set(c.get().wrapping_add(1)),
        }
    }
}

impl ConstAddr<'_> {
    /// The kind of the addressed datum.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Void(_) => Kind::Void,
            Self::Char(_) => Kind::Char,
            Self::Short(_) => Kind::Short,
            Self::Int(_) => Kind::Int,
            Self::Long(_) => Kind::Long,
            Self::Float(_) => Kind::Float,
            Self::Double(_) => Kind::Double,
            Self::SChar(_) => Kind::SChar,
            Self::UChar(_) => Kind::UChar,
            Self::UShort(_) => Kind::UShort,
            Self::UInt(_) => Kind::UInt,
            Self::ULong(_) => Kind::ULong,
            Self::Fn(_) => Kind::Fn,
        }
    }

    /// The address as an integer, for identity and ordering.
    #[must_use]
    pub fn addr(&self) -> usize {
        match self {
            Self::Void(p) => *p as usize,
            Self::Char(s) => s.as_ptr() as usize,
            Self::Short(r) => ptr::from_ref(*r) as usize,
            Self::Int(r) => ptr::from_ref(*r) as usize,
            Self::Long(r) => ptr::from_ref(*r) as usize,
            Self::Float(r) => ptr::from_ref(*r) as usize,
            Self::Double(r) => ptr::from_ref(*r) as usize,
            Self::SChar(r) => ptr::from_ref(*r) as usize,
            Self::UChar(r) => ptr::from_ref(*r) as usize,
            Self::UShort(r) => ptr::from_ref(*r) as usize,
            Self::UInt(r) => ptr::from_ref(*r) as usize,
            Self::ULong(r) => ptr::from_ref(*r) as usize,
            Self::Fn(r) => ptr::from_ref(*r) as usize,
        }
    }
}

/// A tagged primitive datum.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use mockarena::{Kind, TypeTag, Value};
///
/// let v = Value::from(42_i32);
/// assert_eq!(v.tag(), TypeTag::INT);
/// assert_eq!(v.get::<i32>(), Ok(42));
/// assert!(v.get::<i64>().is_err());
///
/// let counter = Cell::new(0_i32);
/// let addr = Value::from(&counter);
/// assert_eq!(addr.tag(), TypeTag::mut_of(Kind::Int));
///
/// let s = Value::from("abc");
/// assert_eq!(s.tag(), TypeTag::STR);
/// assert_eq!(s.as_str(), Some("abc"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub enum Value<'a> {
    /// The neutral value. Also what a failed operation yields.
    #[default]
    Void,
    Char(u8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    SChar(i8),
    UChar(u8),
    UShort(u16),
    UInt(u32),
    ULong(u64),
    Fn(FnAddr),
    Mut(MutAddr<'a>),
    Const(ConstAddr<'a>),
}

// Manual PartialEq: tags first, then address identity or native equality.
impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Void, Self::Void) => true,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::SChar(a), Self::SChar(b)) => a == b,
            (Self::UChar(a), Self::UChar(b)) => a == b,
            (Self::UShort(a), Self::UShort(b)) => a == b,
            (Self::UInt(a), Self::UInt(b)) => a == b,
            (Self::ULong(a), Self::ULong(b)) => a == b,
            (Self::Fn(a), Self::Fn(b)) => a == b,
            (Self::Mut(a), Self::Mut(b)) => a.kind() == b.kind() && a.addr() == b.addr(),
            (Self::Const(a), Self::Const(b)) => a.kind() == b.kind() && a.addr() == b.addr(),
            _ => false,
        }
    }
}

impl<'a> Value<'a> {
    /// A `char` datum. `u8` converts to `unsigned char`, so plain `char`
    /// needs its own constructor.
    #[inline]
    #[must_use]
    pub const fn char(c: u8) -> Self {
        Self::Char(c)
    }

    /// The type tag derived from the variant.
    #[must_use]
    pub fn tag(&self) -> TypeTag {
        match self {
            Self::Void => TypeTag::VOID,
            Self::Char(_) => TypeTag::CHAR,
            Self::Short(_) => TypeTag::SHORT,
            Self::Int(_) => TypeTag::INT,
            Self::Long(_) => TypeTag::LONG,
            Self::Float(_) => TypeTag::FLOAT,
            Self::Double(_) => TypeTag::DOUBLE,
            Self::SChar(_) => TypeTag::SCHAR,
            Self::UChar(_) => TypeTag::UCHAR,
            Self::UShort(_) => TypeTag::USHORT,
            Self::UInt(_) => TypeTag::UINT,
            Self::ULong(_) => TypeTag::ULONG,
            Self::Fn(_) => TypeTag::FN,
            Self::Mut(addr) => TypeTag::new(addr.kind(), Indirection::Mut),
            Self::Const(addr) => TypeTag::new(addr.kind(), Indirection::Const),
        }
    }

    /// Returns `true` for the neutral value.
    #[inline]
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// The zero value of a tag: `0` for numbers, a null address otherwise.
    ///
    /// Address kinds other than `void` cannot be null as references, so
    /// their zero is the null `void` address of the same indirection. Invalid
    /// tags yield [`Value::Void`].
    #[must_use]
    pub fn zero_of(tag: TypeTag) -> Self {
        match (tag.kind(), tag.indirection()) {
            (Some(kind), Some(Indirection::Direct)) => match kind {
                Kind::Void => Self::Void,
                Kind::Char => Self::Char(0),
                Kind::Short => Self::Short(0),
                Kind::Int => Self::Int(0),
                Kind::Long => Self::Long(0),
                Kind::Float => Self::Float(0.0),
                Kind::Double => Self::Double(0.0),
                Kind::SChar => Self::SChar(0),
                Kind::UChar => Self::UChar(0),
                Kind::UShort => Self::UShort(0),
                Kind::UInt => Self::UInt(0),
                Kind::ULong => Self::ULong(0),
                Kind::Fn => Self::Fn(FnAddr::NULL),
            },
            (Some(_), Some(Indirection::Mut)) => Self::Mut(MutAddr::Void(ptr::null_mut())),
            (Some(_), Some(Indirection::Const)) => Self::Const(ConstAddr::Void(ptr::null())),
            _ => Self::Void,
        }
    }

    /// Checked read. Fails with [`ValueTypeError`] when the tag differs.
    ///
    /// ```
    /// use mockarena::Value;
    ///
    /// assert_eq!(Value::from(7_u16).get::<u16>(), Ok(7));
    /// let err = Value::from(7_u16).get::<u32>().unwrap_err();
    /// assert_eq!(err.to_string(), "value has type (unsigned short), not (unsigned int)");
    /// ```
    pub fn get<T: FromValue<'a>>(&self) -> Result<T, ValueTypeError> {
        T::from_value(*self).ok_or(ValueTypeError {
            expected: T::TAG,
            actual: self.tag(),
        })
    }

    /// Unchecked read: the default of `T` when the tag differs.
    ///
    /// Mirrors reading a neutral result, which yields zero.
    #[must_use]
    pub fn get_or_default<T: FromValue<'a> + Default>(&self) -> T {
        T::from_value(*self).unwrap_or_default()
    }

    /// The `char` datum, if this is one.
    #[must_use]
    pub fn as_char(&self) -> Option<u8> {
        match self {
            Self::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// The string behind a read-only character address, up to the first NUL.
    ///
    /// `None` for any other tag or for bytes that are not UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Self::Const(ConstAddr::Char(bytes)) => {
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                std::str::from_utf8(&bytes[..end]).ok()
            }
            _ => None,
        }
    }

    /// Character view of a `char` address of either indirection.
    pub(crate) fn chars(&self) -> Option<CharSeq<'a>> {
        match *self {
            Self::Const(ConstAddr::Char(bytes)) => Some(CharSeq::Bytes(bytes)),
            Self::Mut(MutAddr::Char(cells)) => Some(CharSeq::Cells(cells)),
            _ => None,
        }
    }

    /// `self <op> other` under native semantics.
    ///
    /// False whenever the tags differ. Addresses compare by address. Function
    /// addresses only support [`Comparison::Eq`] and [`Comparison::Ne`]; any
    /// ordering on them is false.
    ///
    /// ```
    /// use mockarena::{Comparison, Value};
    ///
    /// assert!(Value::from(3_i32).compare(Value::from(5_i32), Comparison::Lt));
    /// assert!(!Value::from(3_i32).compare(Value::from(5_i64), Comparison::Lt));
    /// ```
    #[must_use]
    pub fn compare(&self, other: Value<'_>, op: Comparison) -> bool {
        match (*self, other) {
            (Self::Void, Value::Void) => op.apply(&(), &()),
            // Plain `char` orders as signed.
            (Self::Char(a), Value::Char(b)) => op.apply(&(a as i8), &(b as i8)),
            (Self::Short(a), Value::Short(b)) => op.apply(&a, &b),
            (Self::Int(a), Value::Int(b)) => op.apply(&a, &b),
            (Self::Long(a), Value::Long(b)) => op.apply(&a, &b),
            (Self::Float(a), Value::Float(b)) => op.apply(&a, &b),
            (Self::Double(a), Value::Double(b)) => op.apply(&a, &b),
            (Self::SChar(a), Value::SChar(b)) => op.apply(&a, &b),
            (Self::UChar(a), Value::UChar(b)) => op.apply(&a, &b),
            (Self::UShort(a), Value::UShort(b)) => op.apply(&a, &b),
            (Self::UInt(a), Value::UInt(b)) => op.apply(&a, &b),
            (Self::ULong(a), Value::ULong(b)) => op.apply(&a, &b),
            (Self::Fn(a), Value::Fn(b)) => match op {
                Comparison::Eq => a == b,
                Comparison::Ne => a != b,
                _ => false,
            },
            (Self::Mut(a), Value::Mut(b)) if a.kind() == b.kind() => op.apply(&a.addr(), &b.addr()),
            (Self::Const(a), Value::Const(b)) if a.kind() == b.kind() => {
                op.apply(&a.addr(), &b.addr())
            }
            _ => false,
        }
    }

    /// Lexicographic comparison of the character data behind two `char`
    /// addresses, each read up to its first NUL.
    #[must_use]
    pub fn compare_str(&self, other: Value<'_>, op: Comparison) -> bool {
        match (self.chars(), other.chars()) {
            (Some(a), Some(b)) => op.holds(a.bytes().cmp(b.bytes())),
            _ => false,
        }
    }

    /// Whether the character data of `needle` occurs inside `self`.
    ///
    /// An empty needle is always found.
    #[must_use]
    pub fn contains_str(&self, needle: Value<'_>) -> bool {
        match (self.chars(), needle.chars()) {
            (Some(hay), Some(needle)) => hay.contains(&needle),
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Comparison
// ═══════════════════════════════════════════════════════════════════════════════

/// A relational operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    /// Returns `true` for `<`, `<=`, `>` and `>=`.
    #[inline]
    #[must_use]
    pub fn is_ordering(self) -> bool {
        !matches!(self, Self::Eq | Self::Ne)
    }

    /// Apply the operator with native semantics (NaN compares unequal).
    #[inline]
    #[must_use]
    pub fn apply<T: PartialOrd + ?Sized>(self, a: &T, b: &T) -> bool {
        match self {
            Self::Eq => a == b,
            Self::Ne => a != b,
            Self::Lt => a < b,
            Self::Le => a <= b,
            Self::Gt => a > b,
            Self::Ge => a >= b,
        }
    }

    /// Whether an already computed ordering satisfies the operator.
    #[must_use]
    pub fn holds(self, ord: Ordering) -> bool {
        match self {
            Self::Eq => ord.is_eq(),
            Self::Ne => ord.is_ne(),
            Self::Lt => ord.is_lt(),
            Self::Le => ord.is_le(),
            Self::Gt => ord.is_gt(),
            Self::Ge => ord.is_ge(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Character views
// ═══════════════════════════════════════════════════════════════════════════════

/// Borrowed character data, read-only or writable, ending at the first NUL.
#[derive(Clone, Copy)]
pub(crate) enum CharSeq<'a> {
    Bytes(&'a [u8]),
    Cells(&'a [Cell<u8>]),
}

impl<'a> CharSeq<'a> {
    fn raw_len(&self) -> usize {
        match self {
            Self::Bytes(b) => b.len(),
            Self::Cells(c) => c.len(),
        }
    }

    fn at(&self, i: usize) -> u8 {
        match self {
            Self::Bytes(b) => b[i],
            Self::Cells(c) => c[i].get(),
        }
    }

    fn len(&self) -> usize {
        let raw = self.raw_len();
        (0..raw).find(|&i| self.at(i) == 0).unwrap_or(raw)
    }

    fn bytes(self) -> impl Iterator<Item = u8> + 'a {
        let len = self.len();
        (0..len).map(move |i| self.at(i))
    }

    fn contains(&self, needle: &CharSeq<'_>) -> bool {
        let (hay_len, needle_len) = (self.len(), needle.len());
        if needle_len > hay_len {
            return false;
        }
        (0..=hay_len - needle_len)
            .any(|start| (0..needle_len).all(|i| self.at(start + i) == needle.at(i)))
    }
}

/// Character data a string matcher can store.
///
/// `&str` and `&[u8]` become `const char *` values; `&[Cell<u8>]` becomes a
/// writable `char *`. A string matcher's tag follows its data, so it only
/// accepts parameters of the same family.
pub trait CharData<'a>: Into<Value<'a>> {}

impl<'a> CharData<'a> for &'a str {}
impl<'a> CharData<'a> for &'a [u8] {}
impl<'a> CharData<'a> for &'a [Cell<u8>] {}

// ═══════════════════════════════════════════════════════════════════════════════
// Conversions
// ═══════════════════════════════════════════════════════════════════════════════

/// Error returned by [`Value::get`] when the tags differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("value has type {actual}, not {expected}")]
pub struct ValueTypeError {
    /// Tag the caller asked for.
    pub expected: TypeTag,
    /// Tag the value carries.
    pub actual: TypeTag,
}

/// Types a [`Value`] can be read back as.
pub trait FromValue<'a>: Sized {
    /// The tag a value must carry to convert.
    const TAG: TypeTag;

    /// Convert, or `None` when the variant does not match.
    fn from_value(value: Value<'a>) -> Option<Self>;
}

macro_rules! direct_conversions {
    ($($ty:ty => $variant:ident, $tag:expr;)*) => {$(
        impl From<$ty> for Value<'_> {
            #[inline]
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        }

        impl FromValue<'_> for $ty {
            const TAG: TypeTag = $tag;

            #[inline]
            fn from_value(value: Value<'_>) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    )*};
}

direct_conversions! {
    i16 => Short, TypeTag::SHORT;
    i32 => Int, TypeTag::INT;
    i64 => Long, TypeTag::LONG;
    f32 => Float, TypeTag::FLOAT;
    f64 => Double, TypeTag::DOUBLE;
    i8 => SChar, TypeTag::SCHAR;
    u8 => UChar, TypeTag::UCHAR;
    u16 => UShort, TypeTag::USHORT;
    u32 => UInt, TypeTag::UINT;
    u64 => ULong, TypeTag::ULONG;
    FnAddr => Fn, TypeTag::FN;
}

macro_rules! address_conversions {
    ($($ty:ty => $variant:ident;)*) => {$(
        impl<'a> From<&'a Cell<$ty>> for Value<'a> {
            #[inline]
            fn from(cell: &'a Cell<$ty>) -> Self {
                Self::Mut(MutAddr::$variant(cell))
            }
        }

        impl<'a> From<&'a $ty> for Value<'a> {
            #[inline]
            fn from(r: &'a $ty) -> Self {
                Self::Const(ConstAddr::$variant(r))
            }
        }

        impl<'a> FromValue<'a> for &'a Cell<$ty> {
            const TAG: TypeTag = TypeTag::mut_of(Kind::$variant);

            fn from_value(value: Value<'a>) -> Option<Self> {
                match value {
                    Value::Mut(MutAddr::$variant(cell)) => Some(cell),
                    _ => None,
                }
            }
        }

        impl<'a> FromValue<'a> for &'a $ty {
            const TAG: TypeTag = TypeTag::const_of(Kind::$variant);

            fn from_value(value: Value<'a>) -> Option<Self> {
                match value {
                    Value::Const(ConstAddr::$variant(r)) => Some(r),
                    _ => None,
                }
            }
        }
    )*};
}

address_conversions! {
    i16 => Short;
    i32 => Int;
    i64 => Long;
    f32 => Float;
    f64 => Double;
    i8 => SChar;
    u8 => UChar;
    u16 => UShort;
    u32 => UInt;
    u64 => ULong;
    FnAddr => Fn;
}

impl From<()> for Value<'_> {
    fn from((): ()) -> Self {
        Self::Void
    }
}

impl FromValue<'_> for () {
    const TAG: TypeTag = TypeTag::VOID;

    fn from_value(value: Value<'_>) -> Option<Self> {
        value.is_void().then_some(())
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Self::Const(ConstAddr::Char(s.as_bytes()))
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Const(ConstAddr::Char(bytes))
    }
}

impl<'a> From<&'a [Cell<u8>]> for Value<'a> {
    fn from(buf: &'a [Cell<u8>]) -> Self {
        Self::Mut(MutAddr::Char(buf))
    }
}

impl From<*mut ()> for Value<'_> {
    fn from(p: *mut ()) -> Self {
        Self::Mut(MutAddr::Void(p))
    }
}

impl From<*const ()> for Value<'_> {
    fn from(p: *const ()) -> Self {
        Self::Const(ConstAddr::Void(p))
    }
}

impl<'a> FromValue<'a> for &'a [u8] {
    const TAG: TypeTag = TypeTag::STR;

    fn from_value(value: Value<'a>) -> Option<Self> {
        match value {
            Value::Const(ConstAddr::Char(bytes)) => Some(bytes),
            _ => None,
        }
    }
}

impl<'a> FromValue<'a> for &'a [Cell<u8>] {
    const TAG: TypeTag = TypeTag::mut_of(Kind::Char);

    fn from_value(value: Value<'a>) -> Option<Self> {
        match value {
            Value::Mut(MutAddr::Char(buf)) => Some(buf),
            _ => None,
        }
    }
}

impl FromValue<'_> for *mut () {
    const TAG: TypeTag = TypeTag::mut_of(Kind::Void);

    fn from_value(value: Value<'_>) -> Option<Self> {
        match value {
            Value::Mut(MutAddr::Void(p)) => Some(p),
            _ => None,
        }
    }
}

impl FromValue<'_> for *const () {
    const TAG: TypeTag = TypeTag::const_of(Kind::Void);

    fn from_value(value: Value<'_>) -> Option<Self> {
        match value {
            Value::Const(ConstAddr::Void(p)) => Some(p),
            _ => None,
        }
    }
}

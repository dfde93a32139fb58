//! Responders: the effects of a selected mapping.
//!
//! A responder group runs in order when its mapping is selected. Each
//! responder produces a value; the last one produced is the mock's result.

use crate::matcher::Call;
use crate::value::{MutAddr, Value};

/// Custom response computed from `(parameter, stored value)`.
pub type ParamResponse = for<'v> fn(Value<'v>, Value<'v>) -> Value<'v>;

/// Custom response computed from `(call, stored value)`.
pub type CallResponse = for<'c, 'v> fn(&Call<'c, 'v>, Value<'v>) -> Value<'v>;

/// What a responder does.
#[derive(Debug, Clone, Copy)]
pub enum RespondOp {
    /// Produce the stored value.
    Return,
    /// Add one through the stored mutable address, produce `void`.
    Count,
    Param(ParamResponse),
    Call(CallResponse),
}

// Function pointers compare by address.
impl PartialEq for RespondOp {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Return, Self::Return) | (Self::Count, Self::Count) => true,
            (Self::Param(a), Self::Param(b)) => *a as usize == *b as usize,
            (Self::Call(a), Self::Call(b)) => *a as usize == *b as usize,
            _ => false,
        }
    }
}

/// Which input a responder reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespondMode {
    /// Reads parameter `param` (1-based).
    Param { param: usize, checked: bool },
    /// Reads the whole call.
    WholeCall,
}

/// An operation, a stored value and a mode.
///
/// ```
/// use std::cell::Cell;
/// use mockarena::{Call, Responder, Value};
///
/// let calls = Cell::new(0_i32);
/// let count = Responder::count(&calls);
/// let params = [];
/// let call = Call::new("tick", &params);
///
/// assert!(count.respond(&call, Value::Void).is_void());
/// assert_eq!(calls.get(), 1);
/// assert_eq!(Responder::returns(7_i64).respond(&call, Value::Void), Value::from(7_i64));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Responder<'a> {
    pub op: RespondOp,
    pub value: Value<'a>,
    pub mode: RespondMode,
}

impl<'a> Responder<'a> {
    /// Produce `value` as the result.
    pub fn returns(value: impl Into<Value<'a>>) -> Self {
        Self {
            op: RespondOp::Return,
            value: value.into(),
            mode: RespondMode::WholeCall,
        }
    }

    /// Increment the datum behind a mutable numeric or `char` address.
    ///
    /// Any other value is left alone. The response itself is `void`.
    pub fn count(address: impl Into<Value<'a>>) -> Self {
        Self {
            op: RespondOp::Count,
            value: address.into(),
            mode: RespondMode::WholeCall,
        }
    }

    /// Custom response from parameter `param`, type checked against `value`.
    pub fn param(param: usize, f: ParamResponse, value: impl Into<Value<'a>>) -> Self {
        Self {
            op: RespondOp::Param(f),
            value: value.into(),
            mode: RespondMode::Param {
                param,
                checked: true,
            },
        }
    }

    /// Custom response from parameter `param`, unchecked.
    pub fn param_unchecked(param: usize, f: ParamResponse, value: impl Into<Value<'a>>) -> Self {
        Self {
            op: RespondOp::Param(f),
            value: value.into(),
            mode: RespondMode::Param {
                param,
                checked: false,
            },
        }
    }

    /// Custom response from the whole call.
    pub fn call(f: CallResponse, value: impl Into<Value<'a>>) -> Self {
        Self {
            op: RespondOp::Call(f),
            value: value.into(),
            mode: RespondMode::WholeCall,
        }
    }

    /// Run the operation. `param` is the parameter the mode names, or
    /// `void` for whole-call responders.
    pub fn respond<'v>(&self, call: &Call<'_, 'v>, param: Value<'v>) -> Value<'v>
    where
        'a: 'v,
    {
        let stored: Value<'v> = self.value;
        match self.op {
            RespondOp::Return => stored,
            RespondOp::Count => {
                if let Value::Mut(addr) = stored {
                    if !matches!(addr, MutAddr::Void(_) | MutAddr::Fn(_)) {
                        addr.increment();
                    }
                }
                Value::Void
            }
            RespondOp::Param(f) => f(param, stored),
            RespondOp::Call(f) => f(call, stored),
        }
    }
}

//! Dispatch: select a mapping for a call, run its head responder group,
//! rotate.
//!
//! # First match wins
//!
//! Mappings are tried in configuration order. Within a mapping, matchers run
//! at positions `1..=arity + extra`; the first `false` moves on to the next
//! mapping. Any *check* failure (placement, parameter number, tag, operator,
//! parameter type) aborts the whole dispatch instead.
//!
//! # Rotation
//!
//! After the head group runs, a mapping with more than one group moves that
//! group to the tail, so successive calls cycle through the groups.

use crate::arena::{Handle, MappingId};
use crate::error::MockError;
use crate::matcher::{Call, MatchMode, Matcher};
use crate::registry::Registry;
use crate::responder::{RespondMode, Responder};
use crate::value::Value;

impl<'a> Registry<'a> {
    /// Answer a call to `name` with `params`.
    ///
    /// The result's tag is not checked here; the caller compares it with
    /// the tag it expects.
    pub fn dispatch<'p>(&mut self, name: &str, params: &[Value<'p>]) -> Result<Value<'p>, MockError>
    where
        'a: 'p,
    {
        let arity = params.len();
        let call = Call::new(name, params);
        let function = self
            .find(name, arity)
            .ok_or_else(|| MockError::FunctionNotFound {
                function: name.to_string(),
                arity,
            })?;

        let mut selected = None;
        let entry = self.arena.functions.get(function);
        for span in entry.mappings.iter(&self.arena.nodes) {
            let id = MappingId::from_index(span.start);
            let matchers = self.arena.matchers.span(self.arena.mappings.get(id).matchers);
            if accepts(&call, matchers)? {
                selected = Some(id);
                break;
            }
        }
        let id = selected.ok_or_else(|| MockError::NoMappingMatched {
            function: name.to_string(),
            arity,
        })?;

        let mapping = self.arena.mappings.get(id);
        let Some(head) = mapping.groups.head() else {
            return Ok(Value::Void);
        };
        let group = self.arena.nodes.get(head).item;
        let responders = self.arena.responders.span(group);
        for (r, responder) in responders.iter().enumerate() {
            check_responder(&call, responder, 1 + r + mapping.matchers.len)?;
        }

        let mut result = Value::Void;
        for responder in responders {
            let param = match responder.mode {
                RespondMode::Param { param, .. } => call.param(param).unwrap_or_default(),
                RespondMode::WholeCall => Value::Void,
            };
            result = responder.respond(&call, param);
        }
        log::trace!(
            "{name}/{arity}: mapping {} answered with {}",
            id.index(),
            result.tag()
        );

        let mapping = self.arena.mappings.get_mut(id);
        if mapping.groups.has_many() {
            mapping.groups.rotate(&mut self.arena.nodes);
            log::trace!("{name}/{arity}: mapping {} rotated", id.index());
        }
        Ok(result)
    }
}

/// Run every matcher of one mapping. `Ok(false)` means "try the next one".
fn accepts<'v>(call: &Call<'_, 'v>, matchers: &[Matcher<'v>]) -> Result<bool, MockError> {
    for (i, matcher) in matchers.iter().enumerate() {
        let source = check_matcher(call, matcher, i + 1)?;
        if !matcher.test(call, source) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Validate a matcher at `position` and return the value it reads.
fn check_matcher<'v>(
    call: &Call<'_, 'v>,
    matcher: &Matcher<'_>,
    position: usize,
) -> Result<Value<'v>, MockError> {
    let function = || call.name.to_string();
    let arity = call.arity();

    let ordinary = matches!(matcher.mode, MatchMode::Ordinary { .. });
    if (position <= arity) != ordinary {
        return Err(MockError::InvalidMatcherPlacement {
            function: function(),
            position,
        });
    }
    if let MatchMode::Extra { param, .. } = matcher.mode {
        if param == 0 || param > arity {
            return Err(MockError::InvalidParameterNumber {
                function: function(),
                position,
            });
        }
    }
    if !matcher.tag.is_valid() {
        return Err(MockError::InvalidParameterType {
            function: function(),
            position,
            tag: matcher.tag,
        });
    }
    if matcher.tag.is_unordered() && matcher.op.is_ordering() {
        return Err(MockError::InvalidOperator {
            function: function(),
            position,
        });
    }

    let source = match matcher.mode {
        MatchMode::Ordinary { .. } => call.param(position),
        MatchMode::Extra { param, .. } => call.param(param),
        MatchMode::WholeCall => None,
    }
    .unwrap_or_default();
    if matcher.mode.is_checked() && matcher.tag != source.tag() {
        return Err(MockError::UnexpectedParameterType {
            function: function(),
            position,
            actual: source.tag(),
            expected: matcher.tag,
        });
    }
    Ok(source)
}

/// Validate a responder at `position` before any responder runs.
fn check_responder(
    call: &Call<'_, '_>,
    responder: &Responder<'_>,
    position: usize,
) -> Result<(), MockError> {
    let function = || call.name.to_string();
    let tag = responder.value.tag();

    let source = match responder.mode {
        RespondMode::Param { param, .. } => {
            Some(call.param(param).ok_or_else(|| MockError::InvalidParameterNumber {
                function: function(),
                position,
            })?)
        }
        RespondMode::WholeCall => None,
    };
    if !tag.is_valid() {
        return Err(MockError::InvalidParameterType {
            function: function(),
            position,
            tag,
        });
    }
    if let (RespondMode::Param { checked: true, .. }, Some(source)) = (responder.mode, source) {
        if tag != source.tag() {
            return Err(MockError::UnexpectedParameterType {
                function: function(),
                position,
                actual: source.tag(),
                expected: tag,
            });
        }
    }
    Ok(())
}

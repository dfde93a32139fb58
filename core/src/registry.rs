//! Registry: mocked functions and their mappings, stored in the arena.
//!
//! # Configuration
//!
//! `configure` finds the entry for `(name, arity)`, then either reuses a
//! mapping whose matchers are identical or appends a new one, and finally
//! appends the responder group to that mapping. All capacity checks and tag
//! validation happen before anything is written, so a failed call leaves
//! the registry exactly as it was.

use crate::arena::{
    Arena, FunctionEntry, FunctionId, Handle, List, Mapping, MappingId, Region, Span,
};
use crate::error::MockError;
use crate::matcher::Matcher;
use crate::responder::Responder;

/// Functions, mappings and responder groups for one context.
pub(crate) struct Registry<'a> {
    pub(crate) arena: Arena<'a>,
}

impl<'a> Registry<'a> {
    pub fn new(budget: usize) -> Self {
        Self {
            arena: Arena::new(budget),
        }
    }

    /// Entry for an exact `(name, arity)` pair.
    pub fn find(&self, name: &str, arity: usize) -> Option<FunctionId> {
        self.arena
            .functions
            .iter()
            .find(|(_, entry)| entry.arity == arity && entry.name == name)
            .map(|(id, _)| id)
    }

    /// Mapping of `function` whose matchers are identical to
    /// `ordinary` followed by `extra`.
    fn find_mapping(
        &self,
        function: FunctionId,
        ordinary: &[Matcher<'a>],
        extra: &[Matcher<'a>],
    ) -> Option<MappingId> {
        let entry = self.arena.functions.get(function);
        entry
            .mappings
            .iter(&self.arena.nodes)
            .map(|span| MappingId::from_index(span.start))
            .find(|&id| {
                let mapping = self.arena.mappings.get(id);
                let stored = self.arena.matchers.span(mapping.matchers);
                mapping.extra == extra.len()
                    && stored.len() == ordinary.len() + extra.len()
                    && stored[..ordinary.len()] == *ordinary
                    && stored[ordinary.len()..] == *extra
            })
    }

    /// Add a responder group for calls matching `ordinary` + `extra`.
    pub fn configure(
        &mut self,
        name: &'a str,
        ordinary: &[Matcher<'a>],
        extra: &[Matcher<'a>],
        responders: &[Responder<'a>],
    ) -> Result<(), MockError> {
        let arity = ordinary.len();
        let function = self.find(name, arity);
        let mapping = function.and_then(|f| self.find_mapping(f, ordinary, extra));
        let full = |region| MockError::CapacityExceeded {
            region,
            function: name.to_string(),
        };

        // Capacity, in reporting order.
        if function.is_none() && !self.arena.functions.has_room(1) {
            return Err(full(Region::Functions));
        }
        if mapping.is_none() && !self.arena.mappings.has_room(1) {
            return Err(full(Region::Mappings));
        }
        if mapping.is_none() && !self.arena.matchers.has_room(ordinary.len() + extra.len()) {
            return Err(full(Region::Matchers));
        }
        let nodes = if mapping.is_none() { 2 } else { 1 };
        if !self.arena.nodes.has_room(nodes) {
            return Err(full(Region::ListNodes));
        }
        if !self.arena.responders.has_room(responders.len()) {
            return Err(full(Region::Responders));
        }

        // Tags, numbered across ordinary, extra, then responders.
        let tags = ordinary
            .iter()
            .chain(extra)
            .map(|m| m.tag)
            .chain(responders.iter().map(|r| r.value.tag()));
        for (i, tag) in tags.enumerate() {
            if !tag.is_valid() {
                return Err(MockError::InvalidParameterType {
                    function: name.to_string(),
                    position: i + 1,
                    tag,
                });
            }
        }

        // Commit.
        let function = match function {
            Some(id) => id,
            None => {
                let id = self
                    .arena
                    .functions
                    .push(FunctionEntry {
                        name,
                        arity,
                        mappings: List::default(),
                    })
                    .ok_or_else(|| full(Region::Functions))?;
                log::debug!("mock {name}/{arity} registered");
                id
            }
        };
        let mapping = match mapping {
            Some(id) => id,
            None => {
                let matchers = self
                    .arena
                    .matchers
                    .extend(ordinary.iter().chain(extra).copied())
                    .ok_or_else(|| full(Region::Matchers))?;
                let id = self
                    .arena
                    .mappings
                    .push(Mapping {
                        matchers,
                        extra: extra.len(),
                        groups: List::default(),
                    })
                    .ok_or_else(|| full(Region::Mappings))?;
                self.arena
                    .functions
                    .get_mut(function)
                    .mappings
                    .append(
                        &mut self.arena.nodes,
                        Span {
                            start: id.index(),
                            len: 1,
                        },
                    )
                    .ok_or_else(|| full(Region::ListNodes))?;
                log::debug!(
                    "mock {name}/{arity}: new mapping with {} extra matcher(s)",
                    extra.len()
                );
                id
            }
        };
        let group = self
            .arena
            .responders
            .extend(responders.iter().copied())
            .ok_or_else(|| full(Region::Responders))?;
        self.arena
            .mappings
            .get_mut(mapping)
            .groups
            .append(&mut self.arena.nodes, group)
            .ok_or_else(|| full(Region::ListNodes))?;
        log::debug!(
            "mock {name}/{arity}: responder group of {} appended",
            responders.len()
        );
        Ok(())
    }
}

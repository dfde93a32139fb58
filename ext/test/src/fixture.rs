//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the mockarena engine. A fixture
//! is a mock configuration plus a sequence of calls; each call names its
//! expected result, its expected error kind, or both.
//!
//! ```yaml
//! name: rotation
//! description: two groups answer in turn
//! mocks:
//!   mappings:
//!     - function: next
//!       respond: [{ type: returns, value: { int: 1 } }]
//!     - function: next
//!       respond: [{ type: returns, value: { int: 2 } }]
//! calls:
//!   - { name: first, function: next, returns: int, expect: { int: 1 } }
//!   - { name: second, function: next, returns: int, expect: { int: 2 } }
//! ```

use std::cell::Cell;
use std::collections::BTreeMap;

use mockarena::config::{ConfigError, MocksConfig, ValueConfig};
use mockarena::prelude::*;
use serde::Deserialize;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    pub description: String,
    pub mocks: MocksConfig,
    /// Kind of error loading `mocks` must stop at. Mappings before the
    /// failing one stay configured and the calls still run.
    #[serde(default)]
    pub load_error: Option<ErrorKind>,
    #[serde(default)]
    pub calls: Vec<CallCase>,
    /// Counter values after all calls.
    #[serde(default)]
    pub counters: BTreeMap<String, i64>,
}

/// One dispatched call and its expectations
#[derive(Debug, Deserialize)]
pub struct CallCase {
    pub name: String,
    pub function: String,
    /// C-style name of the expected return type.
    #[serde(default = "void_type")]
    pub returns: String,
    #[serde(default)]
    pub params: Vec<ValueConfig>,
    /// Expected result. Strings compare by content.
    #[serde(default)]
    pub expect: Option<ValueConfig>,
    /// Expected error kind; absent means the call must succeed.
    #[serde(default)]
    pub error: Option<ErrorKind>,
    /// Expected diagnostic line, when `error` is set.
    #[serde(default)]
    pub message: Option<String>,
}

fn void_type() -> String {
    "void".into()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

impl CaseResult {
    fn new(case_name: &str, expected: String, actual: String) -> Self {
        Self {
            case_name: case_name.to_string(),
            passed: expected == actual,
            expected,
            actual,
        }
    }
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse a fixture from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Run all calls and return one result per expectation.
    ///
    /// Counters live in the fixture, so a fixture is meant to run once.
    /// Fails only when the fixture itself is malformed: an unknown type
    /// name, an unknown counter, or a load error it did not declare.
    pub fn run(&self) -> Result<Vec<CaseResult>, ConfigError> {
        let budget = self.mocks.budget.unwrap_or(DEFAULT_ARENA_BUDGET);
        let mut mocks = MockContext::new(budget);
        mocks.set_error_handler(handlers::record);
        let mut results = Vec::new();

        match (mocks.load(&self.mocks), self.load_error) {
            (Ok(()), None) => {}
            (Ok(()), Some(kind)) => {
                results.push(CaseResult::new("load", kind.to_string(), "loaded".into()));
            }
            (Err(ConfigError::Mock { source, .. }), Some(kind)) => {
                results.push(CaseResult::new(
                    "load",
                    kind.to_string(),
                    source.kind().to_string(),
                ));
            }
            (Err(e), _) => return Err(e),
        }

        for case in &self.calls {
            let expected_tag: TypeTag = case.returns.parse()?;
            let params = case
                .params
                .iter()
                .map(ValueConfig::to_value)
                .collect::<Result<Vec<_>, _>>()?;

            log::debug!("fixture {}: calling {}", self.name, case.function);
            mocks.clear_last_error();
            let actual = mocks.dispatch(&case.function, expected_tag, &params);
            let error = mocks.last_error();

            results.push(CaseResult::new(
                &case.name,
                describe_error(case.error),
                describe_error(error.map(ErrorRecord::kind)),
            ));
            if let Some(message) = &case.message {
                results.push(CaseResult::new(
                    &case.name,
                    message.clone(),
                    mocks.last_error_message().to_string(),
                ));
            }
            if let Some(expect) = &case.expect {
                let passed = value_matches(expect, actual)?;
                results.push(CaseResult {
                    case_name: case.name.clone(),
                    passed,
                    expected: format!("{expect:?}"),
                    actual: format!("{actual:?}"),
                });
            }
        }

        for (name, &expected) in &self.counters {
            let actual = self.mocks.counter(name);
            results.push(CaseResult::new(
                &format!("counter {name}"),
                expected.to_string(),
                actual.map_or_else(|| "undeclared".into(), |v| v.to_string()),
            ));
        }

        Ok(results)
    }

    /// Run all test cases and panic on first failure
    ///
    /// # Panics
    ///
    /// If the fixture is malformed or any expectation fails.
    pub fn run_and_assert(&self) {
        let results = self
            .run()
            .unwrap_or_else(|e| panic!("Fixture '{}' is malformed: {e}", self.name));
        for result in results {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {}, got {}",
                self.name, result.case_name, result.expected, result.actual
            );
        }
    }
}

fn describe_error(kind: Option<ErrorKind>) -> String {
    kind.map_or_else(|| "no error".into(), |k| k.to_string())
}

/// Compare a result to its expectation. `str` and `buf` expectations
/// compare by content, everything else by value equality.
fn value_matches(expected: &ValueConfig, actual: Value<'_>) -> Result<bool, ConfigError> {
    Ok(match expected {
        ValueConfig::Str(s) => actual.tag() == TypeTag::STR && actual.as_str() == Some(s.as_str()),
        ValueConfig::Buf(expected) => actual
            .get::<&[Cell<u8>]>()
            .is_ok_and(|buf| text(buf) == text(expected)),
        other => other.to_value()? == actual,
    })
}

/// Buffer bytes up to the first NUL.
fn text(buf: &[Cell<u8>]) -> Vec<u8> {
    buf.iter().map(Cell::get).take_while(|&b| b != 0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
name: smoke
description: a hit, a miss and a counter
mocks:
  counters: { hits: 0 }
  mappings:
    - function: f
      matchers: [{ type: eq, value: { int: 10 } }, { type: any }]
      respond:
        - { type: count, counter: hits }
        - { type: returns, value: { int: 99 } }
calls:
  - name: hit
    function: f
    returns: int
    params: [{ int: 10 }, { str: x }]
    expect: { int: 99 }
  - name: miss
    function: f
    returns: int
    params: [{ int: 11 }, { str: x }]
    error: no_mapping_matched
    message: "no mappings matched for call: f (2)"
    expect: void
counters: { hits: 1 }
"#;

    #[test]
    fn smoke_fixture_passes() {
        let fixture = Fixture::from_yaml(FIXTURE).unwrap();
        let results = fixture.run().unwrap();
        assert_eq!(results.len(), 6);
        assert!(results.iter().all(|r| r.passed), "{results:#?}");
    }

    #[test]
    fn failures_are_reported_not_panicked() {
        let yaml = FIXTURE.replace("expect: { int: 99 }", "expect: { int: 98 }");
        let fixture = Fixture::from_yaml(&yaml).unwrap();
        let failed: Vec<_> = fixture
            .run()
            .unwrap()
            .into_iter()
            .filter(|r| !r.passed)
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].case_name, "hit");
        assert_eq!(failed[0].actual, "Int(99)");
    }

    #[test]
    fn unknown_return_type_is_malformed() {
        let yaml = FIXTURE.replace("returns: int\n    params: [{ int: 10 }", "returns: integer\n    params: [{ int: 10 }");
        let fixture = Fixture::from_yaml(&yaml).unwrap();
        assert!(matches!(fixture.run(), Err(ConfigError::TypeName(_))));
    }

    #[test]
    fn buffer_results_compare_by_content() {
        let yaml = r#"
name: buffers
description: a responder returns a writable buffer
mocks:
  mappings:
    - function: name
      respond: [{ type: returns, value: { buf: "abc" } }]
calls:
  - { name: same text, function: name, returns: char *, expect: { buf: "abc" } }
"#;
        Fixture::from_yaml(yaml).unwrap().run_and_assert();

        let fixture = Fixture::from_yaml(&yaml.replace(r#"expect: { buf: "abc" }"#, r#"expect: { buf: "abd" }"#))
            .unwrap();
        assert!(fixture.run().unwrap().iter().any(|r| !r.passed));
    }

    #[test]
    fn multi_document_files() {
        let yaml = format!("{FIXTURE}---{FIXTURE}");
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap();
        assert_eq!(fixtures.len(), 2);
    }

    #[test]
    fn json_fixtures() {
        let json = r#"{
            "name": "json",
            "description": "unconfigured function",
            "mocks": {},
            "calls": [{ "name": "missing", "function": "g", "error": "function_not_found" }]
        }"#;
        Fixture::from_json(json).unwrap().run_and_assert();
    }
}

//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the s3rules resolver.

use crate::{params_builder, ParamValue};
use s3rules::{AuthScheme, Endpoint, EndpointResolver, ResolveError, RuleSet, RuleSetConfig};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    pub description: String,
    /// Rule-set document to run instead of the built-in S3 rules.
    #[serde(default)]
    pub rule_set: Option<RuleSetConfig>,
    /// Parameters shared by every case; a case's own params win.
    #[serde(default)]
    pub defaults: BTreeMap<String, ParamValue>,
    pub cases: Vec<TestCase>,
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
    pub expect: Expectation,
}

/// What a case must resolve to: exactly one of `endpoint` or `error`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    #[serde(default)]
    pub endpoint: Option<ExpectedEndpoint>,
    /// Exact client-facing message.
    #[serde(default)]
    pub error: Option<String>,
}

/// Expected endpoint. `backend` and `auth_schemes` are only compared when
/// the fixture lists them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedEndpoint {
    pub url: String,
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub auth_schemes: Option<Vec<AuthScheme>>,
}

impl Expectation {
    fn matches(&self, actual: &Result<Endpoint, ResolveError>) -> bool {
        match (&self.endpoint, &self.error, actual) {
            (Some(expected), None, Ok(endpoint)) => {
                expected.url == endpoint.url
                    && expected
                        .backend
                        .as_ref()
                        .map_or(true, |backend| endpoint.backend.as_ref() == Some(backend))
                    && expected
                        .auth_schemes
                        .as_ref()
                        .map_or(true, |schemes| *schemes == endpoint.auth_schemes)
            }
            (None, Some(expected), Err(ResolveError::Rule { message })) => expected == message,
            _ => false,
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.endpoint, &self.error) {
            (Some(endpoint), None) => write!(f, "endpoint {}", endpoint.url),
            (None, Some(message)) => write!(f, "error {message:?}"),
            _ => f.write_str("<expect needs exactly one of endpoint or error>"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: Expectation,
    pub actual: Result<Endpoint, ResolveError>,
}

/// A fixture that could not be turned into a runnable resolver.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("rule set: {0}")]
    RuleSet(#[from] s3rules::RuleSetError),
    #[error("case `{case}`: {source}")]
    Params {
        case: String,
        #[source]
        source: ResolveError,
    },
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    fn resolver(&self) -> Result<EndpointResolver, FixtureError> {
        let resolver = EndpointResolver::new();
        Ok(match &self.rule_set {
            Some(config) => resolver.with_rule_set(RuleSet::from_config(config.clone())?),
            None => resolver,
        })
    }

    /// Run all test cases and return results
    pub fn run(&self) -> Result<Vec<CaseResult>, FixtureError> {
        let resolver = self.resolver()?;
        self.cases
            .iter()
            .map(|case| {
                let merged = self.defaults.iter().chain(&case.params).map(|(k, v)| (k.as_str(), v));
                let params = params_builder(merged)
                    .and_then(s3rules::ParamsBuilder::build)
                    .map_err(|source| FixtureError::Params {
                        case: case.name.clone(),
                        source,
                    })?;
                let actual = resolver.resolve(&params);
                Ok(CaseResult {
                    case_name: case.name.clone(),
                    passed: case.expect.matches(&actual),
                    expected: case.expect.clone(),
                    actual,
                })
            })
            .collect()
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        let results = self
            .run()
            .unwrap_or_else(|e| panic!("Fixture '{}' could not run: {e}", self.name));
        for result in results {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {}, got {:?}",
                self.name, result.case_name, result.expected, result.actual
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_params_override_defaults() {
        let fixture = Fixture::from_yaml(
            r"
name: overrides
description: case params win over defaults
defaults: { Region: us-east-1, Bucket: my-bucket }
cases:
  - name: west
    params: { Region: us-west-2 }
    expect:
      endpoint: { url: 'https://my-bucket.s3.us-west-2.amazonaws.com' }
",
        )
        .unwrap();
        fixture.run_and_assert();
    }

    #[test]
    fn test_error_expectation() {
        let fixture = Fixture::from_yaml(
            r"
name: errors
description: rule errors compare verbatim
cases:
  - name: no region
    params: { UseFIPS: true, Accelerate: true }
    expect:
      error: Accelerate cannot be used with FIPS
",
        )
        .unwrap();
        let results = fixture.run().unwrap();
        assert!(results[0].passed);
    }

    #[test]
    fn test_mismatch_is_reported() {
        let fixture = Fixture::from_yaml(
            r"
name: wrong
description: deliberately wrong expectation
cases:
  - name: wrong url
    params: { Region: us-west-2 }
    expect:
      endpoint: { url: 'https://example.com' }
",
        )
        .unwrap();
        let results = fixture.run().unwrap();
        assert!(!results[0].passed);
        assert_eq!(results[0].actual.as_ref().unwrap().url, "https://s3.us-west-2.amazonaws.com");
    }

    #[test]
    fn test_auth_schemes_compared_when_listed() {
        let fixture = Fixture::from_yaml(
            r"
name: auth
description: auth schemes are checked when present
cases:
  - name: sigv4
    params: { Region: us-west-2, Bucket: my-bucket }
    expect:
      endpoint:
        url: https://my-bucket.s3.us-west-2.amazonaws.com
        authSchemes:
          - name: sigv4
            signingName: s3
            signingRegion: us-west-2
            disableDoubleEncoding: true
",
        )
        .unwrap();
        assert!(fixture.run().unwrap()[0].passed);
    }

    #[test]
    fn test_unknown_param_fails_fixture() {
        let fixture = Fixture::from_yaml(
            r"
name: typo
description: unknown parameter names are fixture errors
cases:
  - name: typo
    params: { Regoin: us-west-2 }
    expect:
      error: anything
",
        )
        .unwrap();
        assert!(matches!(fixture.run(), Err(FixtureError::Params { .. })));
    }
}

//! s3rules-test: conformance fixtures for the s3rules resolver
//!
//! Fixtures are YAML documents listing parameter sets and the endpoint or
//! error each must resolve to. A fixture may carry its own rule-set
//! document; otherwise it runs against the built-in S3 rules.
//!
//! # Example
//!
//! ```
//! use s3rules_test::fixture::Fixture;
//!
//! let fixture = Fixture::from_yaml(r#"
//! name: smoke
//! description: plain virtual-hosted bucket
//! cases:
//!   - name: us-west-2
//!     params: { Region: us-west-2, Bucket: my-bucket }
//!     expect:
//!       endpoint:
//!         url: https://my-bucket.s3.us-west-2.amazonaws.com
//! "#).unwrap();
//! fixture.run_and_assert();
//! ```

#[cfg(feature = "fixtures")]
pub mod fixture;

use s3rules::{ParamsBuilder, ResolveError};

/// A parameter value as written in a fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "fixtures", derive(serde::Deserialize))]
#[cfg_attr(feature = "fixtures", serde(untagged))]
pub enum ParamValue {
    Bool(bool),
    String(String),
}

/// Apply named parameters on top of [`ParamsBuilder::default_flags`].
///
/// # Errors
///
/// [`ResolveError::InvalidParameter`] for an unknown name or a value of
/// the wrong type.
pub fn params_builder<'a>(
    params: impl IntoIterator<Item = (&'a str, &'a ParamValue)>,
) -> Result<ParamsBuilder, ResolveError> {
    params
        .into_iter()
        .try_fold(s3rules::Params::builder(), |builder, (name, value)| match value {
            ParamValue::Bool(flag) => builder.set_bool(name, *flag),
            ParamValue::String(text) => builder.set_string(name, text.as_str()),
        })
        .map(ParamsBuilder::default_flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_builder_applies_names() {
        let region = ParamValue::String("us-west-2".into());
        let fips = ParamValue::Bool(true);
        let params = params_builder([("Region", &region), ("UseFIPS", &fips)])
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(params.region(), Some("us-west-2"));
        assert!(params.use_fips());
        assert!(!params.use_dual_stack());
    }

    #[test]
    fn test_params_builder_rejects_wrong_type() {
        let value = ParamValue::Bool(true);
        let err = params_builder([("Region", &value)]).unwrap_err();
        assert_eq!(
            err,
            ResolveError::InvalidParameter {
                name: "Region".into(),
                expected: "boolean",
            }
        );
    }

    #[test]
    fn test_params_builder_rejects_unknown_name() {
        let value = ParamValue::String("x".into());
        assert!(params_builder([("Color", &value)]).is_err());
    }
}

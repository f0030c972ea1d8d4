//! Result and endpoint model.
//!
//! [`RuleResult`] is what evaluation produces. [`Endpoint`] and
//! [`AuthScheme`] are the rendered values handed to callers;
//! [`EndpointSpec`] and [`AuthSchemeSpec`] are their unrendered forms held
//! by rules.

use crate::{ResolveError, Scope, Template};
use serde::{Deserialize, Serialize};

/// Auth scheme names in the order [`Endpoint::select_auth_scheme`] is
/// usually asked to prefer them.
pub const DEFAULT_AUTH_PRIORITY: &[&str] = &["sigv4-s3express", "sigv4a", "sigv4"];

/// Outcome of evaluating a rule or rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleResult {
    /// No decision; the caller tries its next alternative.
    CarryOn,
    /// Terminal: a resolved endpoint.
    Endpoint(Endpoint),
    /// Terminal: a client-facing error message.
    Error(String),
}

impl RuleResult {
    /// `true` for [`Endpoint`](Self::Endpoint) and [`Error`](Self::Error).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::CarryOn)
    }
}

/// A resolved endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub url: String,
    /// Backend tag, e.g. `S3Express` for directory buckets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    /// Candidate schemes in rule order. The caller picks one.
    #[serde(default)]
    pub auth_schemes: Vec<AuthScheme>,
}

impl Endpoint {
    /// First candidate whose name comes earliest in `priority`.
    ///
    /// ```
    /// use s3rules::{resolve_endpoint, Params, DEFAULT_AUTH_PRIORITY};
    ///
    /// let params = Params::builder()
    ///     .default_flags()
    ///     .region("us-west-2")
    ///     .bucket("arn:aws:s3::123456789012:accesspoint:mfzwi23gnjvgw.mrap")
    ///     .build()
    ///     .unwrap();
    /// let endpoint = resolve_endpoint(&params).unwrap();
    /// let scheme = endpoint.select_auth_scheme(DEFAULT_AUTH_PRIORITY).unwrap();
    /// assert_eq!(scheme.name, "sigv4a");
    /// ```
    ///
    /// # Errors
    ///
    /// [`ResolveError::UnknownAuthScheme`] if no candidate is in `priority`.
    pub fn select_auth_scheme(&self, priority: &[&str]) -> Result<&AuthScheme, ResolveError> {
        priority
            .iter()
            .find_map(|name| self.auth_schemes.iter().find(|s| s.name == *name))
            .ok_or_else(|| ResolveError::UnknownAuthScheme {
                candidates: self.auth_schemes.iter().map(|s| s.name.clone()).collect(),
            })
    }
}

/// One candidate auth scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthScheme {
    /// `sigv4`, `sigv4a` or `sigv4-s3express`.
    pub name: String,
    pub signing_name: String,
    #[serde(flatten)]
    pub signing_scope: SigningScope,
    pub disable_double_encoding: bool,
}

/// Where a signature is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SigningScope {
    /// A single region (sigv4 family).
    #[serde(rename = "signingRegion")]
    Region(String),
    /// A set of regions, `*` for all (sigv4a).
    #[serde(rename = "signingRegionSet")]
    RegionSet(Vec<String>),
}

impl SigningScope {
    /// The single region, if this is [`Region`](Self::Region).
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        match self {
            Self::Region(region) => Some(region),
            Self::RegionSet(_) => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Unrendered forms
// ═══════════════════════════════════════════════════════════════════════════════

/// Endpoint as written in a rule: a URL template plus auth schemes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSpec {
    pub url: Template,
    pub backend: Option<String>,
    pub auth_schemes: Vec<AuthSchemeSpec>,
}

impl EndpointSpec {
    /// Endpoint with no auth schemes.
    #[must_use]
    pub fn new(url: impl Into<Template>) -> Self {
        Self {
            url: url.into(),
            backend: None,
            auth_schemes: Vec::new(),
        }
    }

    /// Append an auth scheme.
    #[must_use]
    pub fn auth(mut self, scheme: AuthSchemeSpec) -> Self {
        self.auth_schemes.push(scheme);
        self
    }

    /// Set the backend tag.
    #[must_use]
    pub fn backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Render every template. `None` if any placeholder is unresolved.
    #[must_use]
    pub fn render(&self, scope: &Scope<'_>) -> Option<Endpoint> {
        Some(Endpoint {
            url: self.url.render(scope)?,
            backend: self.backend.clone(),
            auth_schemes: self
                .auth_schemes
                .iter()
                .map(|scheme| scheme.render(scope))
                .collect::<Option<_>>()?,
        })
    }

    pub(crate) fn templates(&self) -> impl Iterator<Item = &Template> {
        std::iter::once(&self.url).chain(self.auth_schemes.iter().filter_map(|s| match &s.scope {
            SigningScopeSpec::Region(region) => Some(region),
            SigningScopeSpec::RegionSet(_) => None,
        }))
    }
}

/// Auth scheme as written in a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSchemeSpec {
    pub name: String,
    pub signing_name: String,
    pub scope: SigningScopeSpec,
    pub disable_double_encoding: bool,
}

/// Unrendered [`SigningScope`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningScopeSpec {
    Region(Template),
    RegionSet(Vec<String>),
}

impl AuthSchemeSpec {
    /// `sigv4` signing for one region.
    #[must_use]
    pub fn sigv4(signing_name: &str, region: impl Into<Template>) -> Self {
        Self::regional("sigv4", signing_name, region)
    }

    /// `sigv4a` signing for a region set.
    #[must_use]
    pub fn sigv4a(signing_name: &str, region_set: &[&str]) -> Self {
        Self {
            name: "sigv4a".to_string(),
            signing_name: signing_name.to_string(),
            scope: SigningScopeSpec::RegionSet(region_set.iter().map(|r| (*r).to_string()).collect()),
            disable_double_encoding: true,
        }
    }

    /// Directory-bucket session signing.
    #[must_use]
    pub fn s3express(signing_name: &str, region: impl Into<Template>) -> Self {
        Self::regional("sigv4-s3express", signing_name, region)
    }

    /// Any single-region scheme.
    #[must_use]
    pub fn regional(name: &str, signing_name: &str, region: impl Into<Template>) -> Self {
        Self {
            name: name.to_string(),
            signing_name: signing_name.to_string(),
            scope: SigningScopeSpec::Region(region.into()),
            disable_double_encoding: true,
        }
    }

    /// Override `disableDoubleEncoding` (defaults to `true`).
    #[must_use]
    pub fn double_encoding(mut self, disable: bool) -> Self {
        self.disable_double_encoding = disable;
        self
    }

    fn render(&self, scope: &Scope<'_>) -> Option<AuthScheme> {
        let signing_scope = match &self.scope {
            SigningScopeSpec::Region(region) => SigningScope::Region(region.render(scope)?),
            SigningScopeSpec::RegionSet(set) => SigningScope::RegionSet(set.clone()),
        };
        Some(AuthScheme {
            name: self.name.clone(),
            signing_name: self.signing_name.clone(),
            signing_scope,
            disable_double_encoding: self.disable_double_encoding,
        })
    }
}

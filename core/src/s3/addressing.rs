//! FIPS × dual-stack × accelerate × custom-endpoint variants.
//!
//! The same host table serves virtual-hosted buckets, path-style buckets
//! and bucketless service requests; only the URL shape around the host
//! changes. Each table is emitted once per region flavor.

use super::sigv4_s3;
use crate::build::*;
use crate::{Condition, EndpointSpec, Rule};

/// Where the bucket goes in the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Style {
    /// `https://{Bucket}.{host}.{dnsSuffix}`
    VirtualHosted,
    /// `https://{host}.{dnsSuffix}/{uri_encoded_bucket}`
    PathStyle,
    /// `https://{host}.{dnsSuffix}`
    Service,
}

impl Style {
    fn url(self, host: &str) -> String {
        match self {
            Self::VirtualHosted => format!("https://{{Bucket}}.{host}.{{partitionResult#dnsSuffix}}"),
            Self::PathStyle => format!("https://{host}.{{partitionResult#dnsSuffix}}/{{uri_encoded_bucket}}"),
            Self::Service => format!("https://{host}.{{partitionResult#dnsSuffix}}"),
        }
    }

    fn has_accelerate(self) -> bool {
        self == Self::VirtualHosted
    }

    fn custom_rows(self, signing_region: &str) -> Vec<Rule> {
        let spec = |url: &str| EndpointSpec::new(url).auth(sigv4_s3(signing_region));
        let custom = || [is_set("Endpoint"), bind("url", parse_url(r("Endpoint")))];
        match self {
            Self::VirtualHosted => vec![
                when(custom().into_iter().chain([bool_eq(at("url#isIp"), true)]))
                    .endpoint(spec("{url#scheme}://{url#authority}{url#normalizedPath}{Bucket}")),
                when(custom()).endpoint(spec("{url#scheme}://{Bucket}.{url#authority}{url#path}")),
            ],
            Self::PathStyle => vec![when(custom())
                .endpoint(spec("{url#scheme}://{url#authority}{url#normalizedPath}{uri_encoded_bucket}"))],
            Self::Service => vec![when(custom()).endpoint(spec("{url#scheme}://{url#authority}{url#path}"))],
        }
    }
}

/// How the region shows up in hosts and signatures.
struct Flavor {
    guard: Vec<Condition>,
    /// Region text inside hosts.
    region: &'static str,
    signing_region: &'static str,
    /// Plain (no FIPS, no dual-stack) requests use `s3.{dnsSuffix}`.
    global_plain: bool,
}

fn flavors() -> [Flavor; 3] {
    [
        Flavor {
            guard: vec![eq(r("Region"), s("aws-global"))],
            region: "us-east-1",
            signing_region: "us-east-1",
            global_plain: true,
        },
        Flavor {
            guard: vec![is_true("UseGlobalEndpoint"), eq(r("Region"), s("us-east-1"))],
            region: "{Region}",
            signing_region: "{Region}",
            global_plain: true,
        },
        Flavor {
            guard: Vec::new(),
            region: "{Region}",
            signing_region: "{Region}",
            global_plain: false,
        },
    ]
}

/// Rules for one addressing style. Expects `partitionResult` bound, and
/// `uri_encoded_bucket` for [`Style::PathStyle`].
pub(super) fn matrix(style: Style) -> Vec<Rule> {
    let mut rules = Vec::new();
    if style.has_accelerate() {
        rules.push(
            when([is_true("Accelerate"), eq(at("partitionResult#name"), s("aws-cn"))])
                .error("S3 Accelerate cannot be used in this region"),
        );
    }
    for flavor in flavors() {
        let rows = rows(style, &flavor);
        if flavor.guard.is_empty() {
            rules.extend(rows);
        } else {
            rules.push(when(flavor.guard).tree(rows));
        }
    }
    rules
}

fn rows(style: Style, flavor: &Flavor) -> Vec<Rule> {
    let region = flavor.region;
    let mut rules = vec![
        row(style, flavor, true, true, false, &format!("s3-fips.dualstack.{region}")),
        row(style, flavor, false, true, false, &format!("s3-fips.{region}")),
    ];
    if style.has_accelerate() {
        rules.push(row(style, flavor, true, false, true, "s3-accelerate.dualstack"));
    }
    rules.push(row(style, flavor, true, false, false, &format!("s3.dualstack.{region}")));
    rules.extend(style.custom_rows(flavor.signing_region));
    if style.has_accelerate() {
        rules.push(row(style, flavor, false, false, true, "s3-accelerate"));
    }
    let plain = if flavor.global_plain {
        "s3".to_string()
    } else {
        format!("s3.{region}")
    };
    rules.push(row(style, flavor, false, false, false, &plain));
    rules
}

fn row(style: Style, flavor: &Flavor, dual_stack: bool, fips: bool, accelerate: bool, host: &str) -> Rule {
    let mut conditions = vec![bool_eq(r("UseDualStack"), dual_stack), bool_eq(r("UseFIPS"), fips)];
    if style.has_accelerate() {
        conditions.push(bool_eq(r("Accelerate"), accelerate));
    }
    conditions.push(not_set("Endpoint"));
    when(conditions).endpoint(EndpointSpec::new(style.url(host)).auth(sigv4_s3(flavor.signing_region)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleAction;

    fn endpoint_urls(rules: &[Rule]) -> Vec<String> {
        let mut urls = Vec::new();
        for rule in rules {
            match &rule.action {
                RuleAction::Endpoint(spec) => urls.push(spec.url.to_string()),
                RuleAction::Tree(children) => urls.extend(endpoint_urls(children)),
                RuleAction::Error(_) => {}
            }
        }
        urls
    }

    #[test]
    fn service_matrix_has_no_accelerate_rows() {
        let urls = endpoint_urls(&matrix(Style::Service));
        assert!(urls.iter().all(|url| !url.contains("accelerate")));
        assert!(urls.contains(&"https://s3.{partitionResult#dnsSuffix}".to_string()));
        assert!(urls.contains(&"https://s3-fips.us-east-1.{partitionResult#dnsSuffix}".to_string()));
    }

    #[test]
    fn virtual_hosted_matrix_starts_with_china_accelerate_error() {
        let rules = matrix(Style::VirtualHosted);
        assert!(matches!(rules[0].action, RuleAction::Error(_)));
        let urls = endpoint_urls(&rules);
        assert!(urls.contains(&"https://{Bucket}.s3-accelerate.dualstack.{partitionResult#dnsSuffix}".to_string()));
    }

    #[test]
    fn path_style_puts_bucket_in_path() {
        let urls = endpoint_urls(&matrix(Style::PathStyle));
        assert!(urls.contains(&"https://s3.{Region}.{partitionResult#dnsSuffix}/{uri_encoded_bucket}".to_string()));
    }

    #[test]
    fn each_flavor_emits_the_same_row_count() {
        let flavors = matrix(Style::PathStyle);
        let counts: Vec<usize> = flavors
            .iter()
            .map(|rule| match &rule.action {
                RuleAction::Tree(rows) => rows.len(),
                _ => 1,
            })
            .collect();
        // two guarded flavors, then the regional rows inline
        assert_eq!(counts[0], counts[1]);
        assert_eq!(flavors.len(), 2 + counts[0]);
    }
}

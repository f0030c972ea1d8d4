//! Access point ARNs: regional, Object Lambda and Multi-Region (MRAP).

use super::{arn_partition_check, arn_region_mismatch, sigv4_s3, INVALID_ACCESS_POINT_NAME, INVALID_ACCOUNT_ID};
use crate::build::*;
use crate::{AuthSchemeSpec, EndpointSpec, Rule};

const MISSING_NAME: &str =
    "Invalid ARN: Expected a resource of the format `accesspoint:<accesspoint name>` but no name was provided";
const SINGLE_COMPONENT: &str =
    "Invalid ARN: The ARN may only contain a single resource component after `accesspoint`.";
const ACCESS_POINTS_DISABLED: &str = "Access points are not supported for this operation";

fn access_points_disabled() -> Rule {
    when([is_set("DisableAccessPoints"), is_true("DisableAccessPoints")]).error(ACCESS_POINTS_DISABLED)
}

/// Binds `accessPointName` from the second resource component and requires
/// it to be non-empty.
fn with_name(rules: Vec<Rule>) -> Vec<Rule> {
    vec![
        when([
            bind("accessPointName", at("bucketArn#resourceId[1]")),
            ne(r("accessPointName"), s("")),
        ])
        .tree(rules),
        error(MISSING_NAME),
    ]
}

/// Account id, then access point name, must be host labels.
fn valid_labels(rules: Vec<Rule>) -> Rule {
    when([host_label(at("bucketArn#accountId"), false)]).tree(vec![
        when([host_label(r("accessPointName"), false)]).tree(rules),
        error(INVALID_ACCESS_POINT_NAME),
    ])
}

// ═══════════════════════════════════════════════════════════════════════════════
// Object Lambda
// ═══════════════════════════════════════════════════════════════════════════════

/// `arn:{partition}:s3-object-lambda:{region}:{account}:accesspoint/{name}`.
pub(super) fn object_lambda_rules() -> Vec<Rule> {
    vec![
        when([eq(r("arnType"), s("accesspoint"))]).tree(with_name(vec![
            when([is_true("UseDualStack")]).error("S3 Object Lambda does not support Dual-stack"),
            when([is_true("Accelerate")]).error("S3 Object Lambda does not support S3 Accelerate"),
            when([ne(at("bucketArn#region"), s(""))]).tree(vec![
                access_points_disabled(),
                when([absent(at("bucketArn#resourceId[2]"))]).tree(vec![
                    arn_region_mismatch(),
                    arn_partition_check(vec![
                        when([ne(at("bucketArn#accountId"), s(""))]).tree(vec![
                            valid_labels(object_lambda_endpoints()),
                            error(INVALID_ACCOUNT_ID),
                        ]),
                        error("Invalid ARN: Missing account id"),
                    ]),
                ]),
                error(SINGLE_COMPONENT),
            ]),
            error("Invalid ARN: bucket ARN is missing a region"),
        ])),
        error("Invalid ARN: Object Lambda ARNs only support `accesspoint` arn types, but found: `{arnType}`"),
    ]
}

fn object_lambda_endpoints() -> Vec<Rule> {
    let spec = |url: &str| EndpointSpec::new(url).auth(AuthSchemeSpec::sigv4("s3-object-lambda", "{bucketArn#region}"));
    vec![
        when([is_set("Endpoint"), bind("url", parse_url(r("Endpoint")))]).endpoint(spec(
            "{url#scheme}://{accessPointName}-{bucketArn#accountId}.{url#authority}{url#path}",
        )),
        when([is_true("UseFIPS")]).endpoint(spec(
            "https://{accessPointName}-{bucketArn#accountId}.s3-object-lambda-fips.{bucketArn#region}.{bucketPartition#dnsSuffix}",
        )),
        endpoint(spec(
            "https://{accessPointName}-{bucketArn#accountId}.s3-object-lambda.{bucketArn#region}.{bucketPartition#dnsSuffix}",
        )),
    ]
}

// ═══════════════════════════════════════════════════════════════════════════════
// S3 access points
// ═══════════════════════════════════════════════════════════════════════════════

/// `arn:{partition}:s3:{region}:{account}:accesspoint:{name}`. An empty
/// region makes it a Multi-Region Access Point.
pub(super) fn access_point_rules() -> Vec<Rule> {
    with_name(vec![
        when([ne(at("bucketArn#region"), s(""))]).tree(vec![
            access_points_disabled(),
            when([absent(at("bucketArn#resourceId[2]"))]).tree(vec![
                arn_region_mismatch(),
                arn_partition_check(vec![
                    when([eq(at("bucketArn#service"), s("s3"))]).tree(vec![
                        valid_labels(access_point_endpoints()),
                        error(INVALID_ACCOUNT_ID),
                    ]),
                    error("Invalid ARN: The ARN was not for the S3 service, found: {bucketArn#service}"),
                ]),
            ]),
            error(SINGLE_COMPONENT),
        ]),
    ]
    .into_iter()
    .chain(multi_region_rules())
    .collect())
}

fn access_point_endpoints() -> Vec<Rule> {
    let spec = |url: &str| EndpointSpec::new(url).auth(sigv4_s3("{bucketArn#region}"));
    let host = |variant: &str| {
        format!(
            "https://{{accessPointName}}-{{bucketArn#accountId}}.{variant}.{{bucketArn#region}}.{{bucketPartition#dnsSuffix}}"
        )
    };
    vec![
        when([is_true("Accelerate")]).error("Access Points do not support S3 Accelerate"),
        when([is_true("UseFIPS"), is_true("UseDualStack")]).endpoint(spec(&host("s3-accesspoint-fips.dualstack"))),
        when([is_true("UseFIPS")]).endpoint(spec(&host("s3-accesspoint-fips"))),
        when([is_true("UseDualStack")]).endpoint(spec(&host("s3-accesspoint.dualstack"))),
        when([is_set("Endpoint"), bind("url", parse_url(r("Endpoint")))]).endpoint(spec(
            "{url#scheme}://{accessPointName}-{bucketArn#accountId}.{url#authority}{url#path}",
        )),
        endpoint(spec(&host("s3-accesspoint"))),
    ]
}

/// A name that is not a dotted host label is rejected before the
/// missing-name fallback.
fn multi_region_rules() -> Vec<Rule> {
    vec![
        when([host_label(r("accessPointName"), true)]).tree(vec![
            when([is_true("UseDualStack")]).error("S3 MRAP does not support dual-stack"),
            when([is_true("UseFIPS")]).error("S3 MRAP does not support FIPS"),
            when([is_true("Accelerate")]).error("S3 MRAP does not support S3 Accelerate"),
            when([is_true("DisableMultiRegionAccessPoints")])
                .error("Invalid configuration: Multi-Region Access Point ARNs are disabled."),
            when([bind("mrapPartition", partition(r("Region")))]).tree(vec![
                when([eq(at("mrapPartition#name"), at("bucketArn#partition"))]).endpoint(
                    EndpointSpec::new("https://{accessPointName}.accesspoint.s3-global.{mrapPartition#dnsSuffix}")
                        .auth(AuthSchemeSpec::sigv4a("s3", &["*"])),
                ),
                error("Client was configured for partition `{mrapPartition#name}` but bucket referred to partition `{bucketArn#partition}`"),
            ]),
        ]),
        error("Invalid Access Point Name"),
    ]
}

//! The built-in S3 endpoint rules.
//!
//! Built once with the [`build`](crate::build) DSL and shared. Evaluation
//! order at the top level:
//!
//! 1. flag-only conflicts (reported even without a region)
//! 2. region required
//! 3. partition and custom-endpoint sanity
//! 4. directory buckets and the S3 Express control plane
//! 5. Outposts bucket aliases, then ordinary and ARN buckets
//! 6. the Object Lambda service endpoint, then service endpoints

mod access_point;
mod addressing;
mod express;
mod outposts;

use crate::build::*;
use crate::{AuthSchemeSpec, EndpointSpec, Rule, RuleSet};
use std::sync::{Arc, LazyLock};

use addressing::Style;

static RULE_SET: LazyLock<Arc<RuleSet>> = LazyLock::new(|| Arc::new(RuleSet::new(rules())));

const INVALID_REGION: &str = "Invalid region: region was not a valid DNS name.";
const INVALID_ACCOUNT_ID: &str =
    "Invalid ARN: The account id may only contain a-z, A-Z, 0-9 and `-`. Found: `{bucketArn#accountId}`";
const INVALID_ACCESS_POINT_NAME: &str =
    "Invalid ARN: The access point name may only contain a-z, A-Z, 0-9 and `-`. Found: `{accessPointName}`";

/// The shared S3 rule set.
///
/// ```
/// let rules = s3rules::s3::rule_set();
/// assert!(rules.validate().is_ok());
/// ```
#[must_use]
pub fn rule_set() -> Arc<RuleSet> {
    Arc::clone(&RULE_SET)
}

/// Build a fresh copy of the S3 rules.
#[must_use]
pub fn rules() -> Vec<Rule> {
    vec![
        when([is_true("Accelerate"), is_true("UseFIPS")]).error("Accelerate cannot be used with FIPS"),
        when([is_true("UseDualStack"), is_set("Endpoint")])
            .error("Cannot set dual-stack in combination with a custom endpoint."),
        when([is_set("Endpoint"), is_true("UseFIPS")]).error("A custom endpoint cannot be combined with FIPS"),
        when([is_set("Endpoint"), is_true("Accelerate")])
            .error("A custom endpoint cannot be combined with S3 Accelerate"),
        when([is_set("Region")]).tree(region_rules()),
        error("A region must be set when sending requests to S3."),
    ]
}

fn region_rules() -> Vec<Rule> {
    vec![
        when([
            is_true("UseFIPS"),
            bind("partitionResult", partition(r("Region"))),
            eq(at("partitionResult#name"), s("aws-cn")),
        ])
        .error("Partition does not support FIPS"),
        when([is_set("Endpoint"), absent(parse_url(r("Endpoint")))])
            .error("Custom endpoint `{Endpoint}` was not a valid URI"),
        express::bucket_rules(),
        express::control_rules(),
        outposts::alias_rules(),
        bucket_rules(),
        object_lambda_service_rules(),
        service_rules(),
    ]
}

fn bucket_rules() -> Rule {
    when([is_set("Bucket")]).tree(vec![
        when([is_false("ForcePathStyle"), virtual_hostable(r("Bucket"), false)]).tree(vec![when([bind(
            "partitionResult",
            partition(r("Region")),
        )])
        .tree(vec![
            when([host_label(r("Region"), false)]).tree(addressing::matrix(Style::VirtualHosted)),
            error(INVALID_REGION),
        ])]),
        when([
            bind("url", parse_url(r("Endpoint"))),
            eq(at("url#scheme"), s("http")),
            virtual_hostable(r("Bucket"), true),
            is_false("ForcePathStyle"),
            is_false("UseFIPS"),
            is_false("UseDualStack"),
            is_false("Accelerate"),
        ])
        .tree(vec![when([bind("partitionResult", partition(r("Region")))]).tree(vec![
            when([host_label(r("Region"), false)])
                .endpoint(EndpointSpec::new("{url#scheme}://{Bucket}.{url#authority}{url#path}").auth(sigv4_s3("{Region}"))),
            error(INVALID_REGION),
        ])]),
        when([is_false("ForcePathStyle"), bind("bucketArn", parse_arn(r("Bucket")))]).tree(arn_rules()),
        when([
            bind("arnPrefix", substring(r("Bucket"), 0, 4, false)),
            eq(r("arnPrefix"), s("arn:")),
            absent(parse_arn(r("Bucket"))),
        ])
        .error("Invalid ARN: `{Bucket}` was not a valid ARN"),
        when([is_true("ForcePathStyle"), present(parse_arn(r("Bucket")))])
            .error("Path-style addressing cannot be used with ARN buckets"),
        when([bind("uri_encoded_bucket", uri_encode(r("Bucket")))]).tree(vec![when([bind(
            "partitionResult",
            partition(r("Region")),
        )])
        .tree(vec![
            when([is_false("Accelerate")]).tree(vec![
                when([host_label(r("Region"), true)]).tree(addressing::matrix(Style::PathStyle)),
                error(INVALID_REGION),
            ]),
            error("Path-style addressing cannot be used with S3 Accelerate"),
        ])]),
    ])
}

fn arn_rules() -> Vec<Rule> {
    vec![
        when([bind("arnType", at("bucketArn#resourceId[0]")), ne(r("arnType"), s(""))]).tree(vec![
            when([eq(at("bucketArn#service"), s("s3-object-lambda"))]).tree(access_point::object_lambda_rules()),
            when([eq(r("arnType"), s("accesspoint"))]).tree(access_point::access_point_rules()),
            when([eq(at("bucketArn#service"), s("s3-outposts"))]).tree(outposts::arn_rules()),
            error("Invalid ARN: Unrecognized format: {Bucket} (type: {arnType})"),
        ]),
        error("Invalid ARN: No ARN type specified"),
    ]
}

fn object_lambda_service_rules() -> Rule {
    let auth = || AuthSchemeSpec::sigv4("s3-object-lambda", "{Region}");
    when([
        not_set("Bucket"),
        is_set("UseObjectLambdaEndpoint"),
        is_true("UseObjectLambdaEndpoint"),
    ])
    .tree(vec![when([bind("partitionResult", partition(r("Region")))]).tree(vec![
        when([host_label(r("Region"), true)]).tree(vec![
            when([is_true("UseDualStack")]).error("S3 Object Lambda does not support Dual-stack"),
            when([is_true("Accelerate")]).error("S3 Object Lambda does not support S3 Accelerate"),
            when([is_set("Endpoint"), bind("url", parse_url(r("Endpoint")))])
                .endpoint(EndpointSpec::new("{url#scheme}://{url#authority}{url#path}").auth(auth())),
            when([is_true("UseFIPS")]).endpoint(
                EndpointSpec::new("https://s3-object-lambda-fips.{Region}.{partitionResult#dnsSuffix}").auth(auth()),
            ),
            endpoint(EndpointSpec::new("https://s3-object-lambda.{Region}.{partitionResult#dnsSuffix}").auth(auth())),
        ]),
        error(INVALID_REGION),
    ])])
}

fn service_rules() -> Rule {
    when([not_set("Bucket"), bind("partitionResult", partition(r("Region")))]).tree(vec![
        when([host_label(r("Region"), true)]).tree(addressing::matrix(Style::Service)),
        error(INVALID_REGION),
    ])
}

// ═══════════════════════════════════════════════════════════════════════════════
// Shared ARN checks
// ═══════════════════════════════════════════════════════════════════════════════

fn sigv4_s3(region: &str) -> AuthSchemeSpec {
    AuthSchemeSpec::sigv4("s3", region)
}

/// Rejects an ARN for another region unless `UseArnRegion` allows it.
fn arn_region_mismatch() -> Rule {
    when([
        is_set("UseArnRegion"),
        is_false("UseArnRegion"),
        ne(at("bucketArn#region"), r("Region")),
    ])
    .error(
        "Invalid configuration: region from ARN `{bucketArn#region}` does not match client region `{Region}` and UseArnRegion is `false`",
    )
}

/// Binds `bucketPartition` and `partitionResult`, requires them to agree
/// and the ARN region to be a host label, then runs `rules`.
fn arn_partition_check(rules: Vec<Rule>) -> Rule {
    when([
        bind("bucketPartition", partition(at("bucketArn#region"))),
        bind("partitionResult", partition(r("Region"))),
    ])
    .tree(vec![
        when([eq(at("bucketPartition#name"), at("partitionResult#name"))]).tree(vec![
            when([host_label(at("bucketArn#region"), true)]).tree(rules),
            error("Invalid region in ARN: `{bucketArn#region}` (invalid DNS name)"),
        ]),
        error("Client was configured for partition `{partitionResult#name}` but ARN (`{Bucket}`) has `{bucketPartition#name}`"),
    ])
}

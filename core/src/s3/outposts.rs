//! S3 on Outposts: bucket aliases (`--op-s3`) and access point ARNs.

use super::{arn_partition_check, arn_region_mismatch, INVALID_ACCOUNT_ID};
use crate::build::*;
use crate::{AuthSchemeSpec, EndpointSpec, Rule};

const SIGNING_NAME: &str = "s3-outposts";

/// Outposts endpoints offer `sigv4a` for every region and `sigv4` for
/// `signing_region`.
fn outposts(url: &str, signing_region: &str) -> EndpointSpec {
    EndpointSpec::new(url)
        .auth(AuthSchemeSpec::sigv4a(SIGNING_NAME, &["*"]))
        .auth(AuthSchemeSpec::sigv4(SIGNING_NAME, signing_region))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Bucket aliases
// ═══════════════════════════════════════════════════════════════════════════════

/// An alias encodes, from the end: `--op-s3`, the region prefix, the outpost
/// id and the hardware type (`e` for EC2-hosted, `o` for racks).
pub(super) fn alias_rules() -> Rule {
    when([
        is_set("Bucket"),
        bind("hardwareType", substring(r("Bucket"), 49, 50, true)),
        bind("regionPrefix", substring(r("Bucket"), 8, 12, true)),
        bind("bucketAliasSuffix", substring(r("Bucket"), 0, 7, true)),
        bind("outpostId", substring(r("Bucket"), 32, 49, true)),
        bind("regionPartition", partition(r("Region"))),
        eq(r("bucketAliasSuffix"), s("--op-s3")),
    ])
    .tree(vec![
        when([host_label(r("outpostId"), false)]).tree(vec![
            when([eq(r("hardwareType"), s("e"))]).tree(hardware_rules("ec2")),
            when([eq(r("hardwareType"), s("o"))]).tree(hardware_rules("op-{outpostId}")),
            error("Unrecognized hardware type: \"Expected hardware type o or e but got {hardwareType}\""),
        ]),
        error("Invalid ARN: The outpost Id must only contain a-z, A-Z, 0-9 and `-`."),
    ])
}

fn hardware_rules(host: &str) -> Vec<Rule> {
    vec![
        when([eq(r("regionPrefix"), s("beta"))]).tree(vec![
            when([not_set("Endpoint")]).error("Expected a endpoint to be specified but no endpoint was found"),
            when([is_set("Endpoint"), bind("url", parse_url(r("Endpoint")))])
                .endpoint(outposts(&format!("https://{{Bucket}}.{host}.{{url#authority}}"), "{Region}")),
        ]),
        endpoint(outposts(
            &format!("https://{{Bucket}}.{host}.s3-outposts.{{Region}}.{{regionPartition#dnsSuffix}}"),
            "{Region}",
        )),
    ]
}

// ═══════════════════════════════════════════════════════════════════════════════
// Access point ARNs
// ═══════════════════════════════════════════════════════════════════════════════

/// `arn:{partition}:s3-outposts:{region}:{account}:outpost:{id}:accesspoint:{name}`.
/// Expects `bucketArn` bound.
pub(super) fn arn_rules() -> Vec<Rule> {
    vec![
        when([is_true("UseDualStack")]).error("S3 Outposts does not support Dual-stack"),
        when([is_true("UseFIPS")]).error("S3 Outposts does not support FIPS"),
        when([is_true("Accelerate")]).error("S3 Outposts does not support S3 Accelerate"),
        when([present(at("bucketArn#resourceId[4]"))])
            .error("Invalid Arn: Outpost Access Point ARN contains sub resources"),
        when([bind("outpostId", at("bucketArn#resourceId[1]"))]).tree(vec![
            when([host_label(r("outpostId"), false)]).tree(vec![
                arn_region_mismatch(),
                arn_partition_check(vec![
                    when([host_label(at("bucketArn#accountId"), false)]).tree(vec![
                        when([bind("outpostType", at("bucketArn#resourceId[2]"))]).tree(vec![
                            when([bind("accessPointName", at("bucketArn#resourceId[3]"))]).tree(vec![
                                when([eq(r("outpostType"), s("accesspoint"))]).tree(access_point_endpoints()),
                                error("Expected an outpost type `accesspoint`, found {outpostType}"),
                            ]),
                            error("Invalid ARN: expected an access point name"),
                        ]),
                        error("Invalid ARN: Expected a 4-component resource"),
                    ]),
                    error(INVALID_ACCOUNT_ID),
                ]),
            ]),
            error("Invalid ARN: The outpost Id may only contain a-z, A-Z, 0-9 and `-`. Found: `{outpostId}`"),
        ]),
        error("Invalid ARN: The Outpost Id was not set"),
    ]
}

fn access_point_endpoints() -> Vec<Rule> {
    vec![
        when([is_set("Endpoint"), bind("url", parse_url(r("Endpoint")))]).endpoint(outposts(
            "https://{accessPointName}-{bucketArn#accountId}.{outpostId}.{url#authority}",
            "{bucketArn#region}",
        )),
        endpoint(outposts(
            "https://{accessPointName}-{bucketArn#accountId}.{outpostId}.s3-outposts.{bucketArn#region}.{bucketPartition#dnsSuffix}",
            "{bucketArn#region}",
        )),
    ]
}

//! Directory buckets (`--x-s3`) and the S3 Express control plane.
//!
//! Zonal hosts embed the availability-zone id taken from the bucket name,
//! `{base}--{az-id}--x-s3`, under the region's partition DNS suffix.

use crate::build::*;
use crate::{AuthSchemeSpec, Condition, EndpointSpec, Rule};

const BACKEND: &str = "S3Express";
const SIGNING_NAME: &str = "s3express";
const INVALID_NAME: &str = "S3Express bucket name is not a valid virtual hostable name.";

/// Reverse offsets where the zone id ends (`--` follows), for zone ids of
/// 8, 9, 13, 14 and 20 characters.
const ZONE_ID_STOPS: [usize; 5] = [14, 15, 19, 20, 26];

#[derive(Debug, Clone, Copy)]
enum Auth {
    Session,
    Sigv4,
}

impl Auth {
    fn spec(self) -> AuthSchemeSpec {
        match self {
            Self::Session => AuthSchemeSpec::s3express(SIGNING_NAME, "{Region}"),
            Self::Sigv4 => AuthSchemeSpec::sigv4(SIGNING_NAME, "{Region}"),
        }
    }
}

fn session_auth_disabled() -> [Condition; 2] {
    [is_set("DisableS3ExpressSessionAuth"), is_true("DisableS3ExpressSessionAuth")]
}

fn express(url: &str, auth: Auth) -> EndpointSpec {
    EndpointSpec::new(url).backend(BACKEND).auth(auth.spec())
}

pub(super) fn bucket_rules() -> Rule {
    let mut zonal = vec![when(session_auth_disabled()).tree(zonal_rules(Auth::Sigv4))];
    zonal.extend(zonal_rules(Auth::Session));

    let mut custom = vec![when(session_auth_disabled()).tree(custom_endpoint_rules(Auth::Sigv4))];
    custom.extend(custom_endpoint_rules(Auth::Session));

    when([
        is_set("Bucket"),
        bind("bucketSuffix", substring(r("Bucket"), 0, 6, true)),
        eq(r("bucketSuffix"), s("--x-s3")),
        bind("partitionResult", partition(r("Region"))),
    ])
    .tree(vec![
        when([is_true("UseDualStack")]).error("S3Express does not support Dual-stack."),
        when([is_true("Accelerate")]).error("S3Express does not support S3 Accelerate."),
        when([is_set("Endpoint"), bind("url", parse_url(r("Endpoint")))]).tree(custom),
        when([
            is_set("UseS3ExpressControlEndpoint"),
            is_true("UseS3ExpressControlEndpoint"),
            bind("uri_encoded_bucket", uri_encode(r("Bucket"))),
            not_set("Endpoint"),
        ])
        .tree(vec![
            when([is_true("UseFIPS")]).endpoint(express(
                "https://s3express-control-fips.{Region}.{partitionResult#dnsSuffix}/{uri_encoded_bucket}",
                Auth::Sigv4,
            )),
            endpoint(express(
                "https://s3express-control.{Region}.{partitionResult#dnsSuffix}/{uri_encoded_bucket}",
                Auth::Sigv4,
            )),
        ]),
        when([virtual_hostable(r("Bucket"), false)]).tree(zonal),
        error(INVALID_NAME),
    ])
}

fn custom_endpoint_rules(auth: Auth) -> Vec<Rule> {
    vec![
        when([
            bool_eq(at("url#isIp"), true),
            bind("uri_encoded_bucket", uri_encode(r("Bucket"))),
        ])
        .endpoint(express("{url#scheme}://{url#authority}/{uri_encoded_bucket}{url#path}", auth)),
        when([virtual_hostable(r("Bucket"), false)])
            .endpoint(express("{url#scheme}://{Bucket}.{url#authority}{url#path}", auth)),
        error(INVALID_NAME),
    ]
}

fn zonal_rules(auth: Auth) -> Vec<Rule> {
    let mut rules: Vec<Rule> = ZONE_ID_STOPS
        .iter()
        .map(|&stop| {
            when([
                bind("s3expressAvailabilityZoneId", substring(r("Bucket"), 6, stop, true)),
                bind("s3expressAvailabilityZoneDelim", substring(r("Bucket"), stop, stop + 2, true)),
                eq(r("s3expressAvailabilityZoneDelim"), s("--")),
            ])
            .tree(vec![
                when([is_true("UseFIPS")]).endpoint(express(
                    "https://{Bucket}.s3express-fips-{s3expressAvailabilityZoneId}.{Region}.{partitionResult#dnsSuffix}",
                    auth,
                )),
                endpoint(express(
                    "https://{Bucket}.s3express-{s3expressAvailabilityZoneId}.{Region}.{partitionResult#dnsSuffix}",
                    auth,
                )),
            ])
        })
        .collect();
    rules.push(error("Unrecognized S3Express bucket name format."));
    rules
}

pub(super) fn control_rules() -> Rule {
    let control = |url: &str| express(url, Auth::Sigv4);
    when([
        not_set("Bucket"),
        is_set("UseS3ExpressControlEndpoint"),
        is_true("UseS3ExpressControlEndpoint"),
        bind("partitionResult", partition(r("Region"))),
    ])
    .tree(vec![
        when([is_set("Endpoint"), bind("url", parse_url(r("Endpoint")))])
            .endpoint(control("{url#scheme}://{url#authority}{url#path}")),
        when([is_true("UseFIPS")]).endpoint(control("https://s3express-control-fips.{Region}.{partitionResult#dnsSuffix}")),
        endpoint(control("https://s3express-control.{Region}.{partitionResult#dnsSuffix}")),
    ])
}

#[cfg(test)]
mod tests {
    use crate::{Endpoint, EndpointResolver, Params, ParamsBuilder, ResolveError};

    fn resolve(builder: ParamsBuilder) -> Result<Endpoint, ResolveError> {
        EndpointResolver::new().resolve(&builder.default_flags().region("us-west-2").build().unwrap())
    }

    #[test]
    fn zonal_endpoint_uses_session_auth() {
        let endpoint = resolve(Params::builder().bucket("mybucket--usw2-az1--x-s3")).unwrap();
        assert_eq!(
            endpoint.url,
            "https://mybucket--usw2-az1--x-s3.s3express-usw2-az1.us-west-2.amazonaws.com"
        );
        assert_eq!(endpoint.backend.as_deref(), Some("S3Express"));
        let scheme = &endpoint.auth_schemes[0];
        assert_eq!(scheme.name, "sigv4-s3express");
        assert_eq!(scheme.signing_name, "s3express");
        assert_eq!(scheme.signing_scope.region(), Some("us-west-2"));
    }

    #[test]
    fn zone_id_lengths() {
        for zone in ["usw2-az1", "apne1-az1", "usw2-lax1-az1", "usw2-lax1a-az1", "usw2-lax1-az1-extras"] {
            let bucket = format!("mybucket--{zone}--x-s3");
            let endpoint = resolve(Params::builder().bucket(bucket.as_str())).unwrap();
            assert_eq!(
                endpoint.url,
                format!("https://{bucket}.s3express-{zone}.us-west-2.amazonaws.com"),
                "zone {zone}"
            );
        }
    }

    #[test]
    fn fips_and_session_auth_disabled() {
        let endpoint = resolve(
            Params::builder()
                .bucket("mybucket--usw2-az1--x-s3")
                .use_fips(true)
                .disable_s3_express_session_auth(true),
        )
        .unwrap();
        assert_eq!(
            endpoint.url,
            "https://mybucket--usw2-az1--x-s3.s3express-fips-usw2-az1.us-west-2.amazonaws.com"
        );
        assert_eq!(endpoint.auth_schemes[0].name, "sigv4");
    }

    #[test]
    fn control_endpoint_with_bucket() {
        let endpoint = resolve(
            Params::builder()
                .bucket("mybucket--usw2-az1--x-s3")
                .use_s3_express_control_endpoint(true),
        )
        .unwrap();
        assert_eq!(
            endpoint.url,
            "https://s3express-control.us-west-2.amazonaws.com/mybucket--usw2-az1--x-s3"
        );
        assert_eq!(endpoint.auth_schemes[0].name, "sigv4");
    }

    #[test]
    fn control_endpoint_without_bucket() {
        let endpoint = resolve(Params::builder().use_s3_express_control_endpoint(true)).unwrap();
        assert_eq!(endpoint.url, "https://s3express-control.us-west-2.amazonaws.com");
        assert_eq!(endpoint.backend.as_deref(), Some("S3Express"));
    }

    #[test]
    fn hosts_follow_partition_dns_suffix() {
        let resolve_cn = |builder: ParamsBuilder| {
            EndpointResolver::new()
                .resolve(&builder.region("cn-north-1").default_flags().build().unwrap())
                .unwrap()
                .url
        };
        assert_eq!(
            resolve_cn(Params::builder().bucket("mybucket--cnn1-az1--x-s3")),
            "https://mybucket--cnn1-az1--x-s3.s3express-cnn1-az1.cn-north-1.amazonaws.com.cn"
        );
        assert_eq!(
            resolve_cn(Params::builder().use_s3_express_control_endpoint(true)),
            "https://s3express-control.cn-north-1.amazonaws.com.cn"
        );
    }

    #[test]
    fn custom_endpoint() {
        let url = |endpoint: &str| {
            resolve(Params::builder().bucket("mybucket--usw2-az1--x-s3").endpoint(endpoint))
                .unwrap()
                .url
        };
        assert_eq!(
            url("https://custom.com"),
            "https://mybucket--usw2-az1--x-s3.custom.com"
        );
        assert_eq!(
            url("http://10.0.0.1:8080/base"),
            "http://10.0.0.1:8080/mybucket--usw2-az1--x-s3/base"
        );
    }

    #[test]
    fn express_errors() {
        let message = |builder: ParamsBuilder| match resolve(builder) {
            Err(ResolveError::Rule { message }) => message,
            other => panic!("expected rule error, got {other:?}"),
        };
        assert_eq!(
            message(Params::builder().bucket("mybucket--usw2-az1--x-s3").use_dual_stack(true)),
            "S3Express does not support Dual-stack."
        );
        assert_eq!(
            message(Params::builder().bucket("mybucket--usw2-az1--x-s3").accelerate(true)),
            "S3Express does not support S3 Accelerate."
        );
        assert_eq!(
            message(Params::builder().bucket("my.bucket--usw2-az1--x-s3")),
            "S3Express bucket name is not a valid virtual hostable name."
        );
        assert_eq!(
            message(Params::builder().bucket("mybucket--x-s3")),
            "Unrecognized S3Express bucket name format."
        );
    }
}

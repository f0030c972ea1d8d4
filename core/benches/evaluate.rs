//! Evaluate benchmarks — the hot path.
//!
//! Measures: early-exit errors, virtual-hosted and path-style buckets,
//! ARN-heavy branches, directory buckets, and trace overhead.

use s3rules::prelude::*;

fn main() {
    divan::main();
}

fn params(region: Option<&str>, bucket: Option<&str>) -> Params {
    let mut builder = Params::builder().default_flags();
    if let Some(region) = region {
        builder = builder.region(region);
    }
    if let Some(bucket) = bucket {
        builder = builder.bucket(bucket);
    }
    builder.build().unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Scenarios
// ═══════════════════════════════════════════════════════════════════════════════

const BUCKETS: &[&str] = &[
    "my-bucket",
    "my.dotted.bucket",
    "mybucket--usw2-az1--x-s3",
    "arn:aws:s3:us-west-2:123456789012:accesspoint:myendpoint",
    "arn:aws:s3::123456789012:accesspoint:mfzwi23gnjvgw.mrap",
    "arn:aws:s3-outposts:us-west-2:123456789012:outpost:op-01234567890123456:accesspoint:reports",
];

#[divan::bench(args = BUCKETS)]
fn resolve_bucket(bencher: divan::Bencher, bucket: &str) {
    let resolver = EndpointResolver::new();
    let params = params(Some("us-west-2"), Some(bucket));

    bencher.bench_local(|| resolver.resolve(&params));
}

#[divan::bench]
fn resolve_service_endpoint(bencher: divan::Bencher) {
    let resolver = EndpointResolver::new();
    let params = params(Some("us-west-2"), None);

    bencher.bench_local(|| resolver.resolve(&params));
}

/// First top-level rule fires; no partition lookup.
#[divan::bench]
fn early_conflict_error(bencher: divan::Bencher) {
    let resolver = EndpointResolver::new();
    let params = Params::builder()
        .default_flags()
        .use_fips(true)
        .accelerate(true)
        .build()
        .unwrap();

    bencher.bench_local(|| resolver.resolve(&params));
}

#[divan::bench]
fn missing_region_error(bencher: divan::Bencher) {
    let resolver = EndpointResolver::new();
    let params = params(None, Some("my-bucket"));

    bencher.bench_local(|| resolver.resolve(&params));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Trace overhead
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn evaluate_plain(bencher: divan::Bencher) {
    let resolver = EndpointResolver::new();
    let params = params(Some("us-west-2"), Some("mybucket--usw2-az1--x-s3"));

    bencher.bench_local(|| resolver.evaluate(&params));
}

#[divan::bench]
fn evaluate_traced(bencher: divan::Bencher) {
    let resolver = EndpointResolver::new();
    let params = params(Some("us-west-2"), Some("mybucket--usw2-az1--x-s3"));

    bencher.bench_local(|| resolver.evaluate_with_trace(&params));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Construction
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn build_s3_rules() -> Vec<s3rules::Rule> {
    s3rules::s3::rules()
}

#[divan::bench]
fn validate_s3_rules(bencher: divan::Bencher) {
    let rules = RuleSet::new(s3rules::s3::rules());

    bencher.bench_local(|| rules.validate());
}

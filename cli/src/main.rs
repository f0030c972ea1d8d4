//! s3rules CLI — driving adapter for the s3rules endpoint resolver.
//!
//! Subcommands:
//! - `resolve [--region R] [--bucket B] [flags...]` — resolve an endpoint
//! - `check <rules.json>` — validate a rule-set document
//! - `partitions` — print the bundled partition table

use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use s3rules::prelude::*;
use tracing_subscriber::EnvFilter;

/// Resolve Amazon S3 endpoints from client parameters.
#[derive(Parser, Debug)]
#[command(name = "s3rules")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve parameters to an endpoint (JSON) or a rule error
    Resolve(ResolveArgs),
    /// Validate a rule-set document
    Check {
        /// Path to a JSON rule-set document
        rules: PathBuf,
    },
    /// Print the bundled partition table
    Partitions,
}

#[derive(Args, Debug)]
struct ResolveArgs {
    // === Parameters ===
    /// AWS region
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// Bucket name or ARN
    #[arg(long)]
    bucket: Option<String>,

    /// Custom endpoint URL
    #[arg(long, env = "AWS_ENDPOINT_URL_S3")]
    endpoint: Option<String>,

    /// Object key (accepted, not used by the built-in rules)
    #[arg(long)]
    key: Option<String>,

    /// Key prefix (accepted, not used by the built-in rules)
    #[arg(long)]
    prefix: Option<String>,

    /// Copy source (accepted, not used by the built-in rules)
    #[arg(long)]
    copy_source: Option<String>,

    #[arg(long)]
    use_fips: bool,

    #[arg(long)]
    use_dual_stack: bool,

    #[arg(long)]
    force_path_style: bool,

    #[arg(long)]
    accelerate: bool,

    #[arg(long)]
    use_global_endpoint: bool,

    #[arg(long)]
    disable_multi_region_access_points: bool,

    // === Optional flags (unset unless given) ===
    #[arg(long)]
    use_object_lambda_endpoint: Option<bool>,

    #[arg(long)]
    disable_access_points: Option<bool>,

    #[arg(long)]
    use_arn_region: Option<bool>,

    #[arg(long)]
    use_s3_express_control_endpoint: Option<bool>,

    #[arg(long)]
    disable_s3_express_session_auth: Option<bool>,

    // === Engine ===
    /// Evaluate a rule-set document instead of the built-in S3 rules
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Use a partition dataset instead of the bundled one
    #[arg(long)]
    partitions: Option<PathBuf>,

    /// Print every rule tried before the result
    #[arg(long)]
    trace: bool,
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Resolve(args) => cmd_resolve(&args),
        Command::Check { rules } => cmd_check(&rules),
        Command::Partitions => cmd_partitions(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

/// Logs go to stderr, filtered by `S3RULES_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_env("S3RULES_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_resolve(args: &ResolveArgs) -> Result<(), String> {
    let resolver = build_resolver(args)?;
    let params = build_params(args).map_err(|e| e.to_string())?;

    if args.trace {
        println!("{}", resolver.evaluate_with_trace(&params));
    }

    let endpoint = resolver.resolve(&params).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&endpoint).map_err(|e| format!("JSON encode failed: {e}"))?;
    println!("{json}");
    Ok(())
}

fn cmd_check(path: &Path) -> Result<(), String> {
    let rules = load_rule_set(path)?;
    println!(
        "Rule set valid: {} top-level rules, depth {}, {} parameters",
        rules.len(),
        rules.depth(),
        rules.parameters().len()
    );
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Uniform return type for all commands
fn cmd_partitions() -> Result<(), String> {
    for partition in PartitionTable::bundled().partitions() {
        let outputs = partition.outputs();
        println!("{}  {}  {}", partition.id(), outputs.dns_suffix, partition.region_regex());
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Assembly (composition root)
// ═══════════════════════════════════════════════════════════════════════════════

fn build_resolver(args: &ResolveArgs) -> Result<EndpointResolver, String> {
    let mut resolver = EndpointResolver::new();
    if let Some(path) = &args.rules {
        resolver = resolver.with_rule_set(load_rule_set(path)?);
    }
    if let Some(path) = &args.partitions {
        let table = PartitionTable::from_json(&read(path)?)
            .map_err(|e| format!("partition dataset invalid: {e}"))?;
        resolver = resolver.with_partitions(table);
    }
    Ok(resolver)
}

fn build_params(args: &ResolveArgs) -> Result<Params, ResolveError> {
    let mut builder = Params::builder()
        .use_fips(args.use_fips)
        .use_dual_stack(args.use_dual_stack)
        .force_path_style(args.force_path_style)
        .accelerate(args.accelerate)
        .use_global_endpoint(args.use_global_endpoint)
        .disable_multi_region_access_points(args.disable_multi_region_access_points)
        .use_object_lambda_endpoint(args.use_object_lambda_endpoint)
        .disable_access_points(args.disable_access_points)
        .use_arn_region(args.use_arn_region)
        .use_s3_express_control_endpoint(args.use_s3_express_control_endpoint)
        .disable_s3_express_session_auth(args.disable_s3_express_session_auth);

    for (name, value) in [
        ("Region", &args.region),
        ("Bucket", &args.bucket),
        ("Endpoint", &args.endpoint),
        ("Key", &args.key),
        ("Prefix", &args.prefix),
        ("CopySource", &args.copy_source),
    ] {
        if let Some(value) = value {
            builder = builder.set_string(name, value.as_str())?;
        }
    }
    builder.build()
}

fn load_rule_set(path: &Path) -> Result<RuleSet, String> {
    tracing::debug!(path = %path.display(), "loading rule set document");
    RuleSet::from_json(&read(path)?).map_err(|e| format!("rule set invalid: {e}"))
}

fn read(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{}\": {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ResolveArgs {
        let cli = Cli::try_parse_from(std::iter::once("s3rules").chain(args.iter().copied())).unwrap();
        match cli.command {
            Command::Resolve(args) => args,
            other => panic!("expected resolve, got {other:?}"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn resolve_flags_become_params() {
        let args = parse(&["resolve", "--region", "us-west-2", "--bucket", "my-bucket", "--use-fips"]);
        let params = build_params(&args).unwrap();
        assert_eq!(params.region(), Some("us-west-2"));
        assert_eq!(params.bucket(), Some("my-bucket"));
        assert!(params.use_fips());
        assert!(!params.accelerate());
    }

    #[test]
    fn optional_flags_stay_unset() {
        let args = parse(&["resolve", "--region", "us-west-2", "--use-arn-region", "false"]);
        let params = build_params(&args).unwrap();
        assert_eq!(params.get("UseArnRegion"), Some(s3rules::Value::Bool(false)));
        assert_eq!(params.get("DisableAccessPoints"), None);
    }

    #[test]
    fn resolves_with_built_in_rules() {
        let args = parse(&["resolve", "--region", "us-west-2", "--bucket", "my-bucket"]);
        let resolver = build_resolver(&args).unwrap();
        let endpoint = resolver.resolve(&build_params(&args).unwrap()).unwrap();
        assert_eq!(endpoint.url, "https://my-bucket.s3.us-west-2.amazonaws.com");
    }

    #[test]
    fn missing_rules_file_is_an_error() {
        let err = load_rule_set(Path::new("/nonexistent/rules.json")).unwrap_err();
        assert!(err.starts_with("failed to read"));
    }
}

//! Partition table (`aws.partition`).
//!
//! A partition groups regions that share a DNS suffix and capability
//! policy. Lookup tries an exact region name, then each partition's region
//! pattern in dataset order, then falls back to `aws`; it never fails.
//!
//! The bundled dataset is parsed once per process behind a `LazyLock` and
//! shared read-only. Alternate tables (tests, new regions) are loaded with
//! [`PartitionTable::from_json`] and handed to
//! [`EndpointResolver::with_partitions`](crate::EndpointResolver::with_partitions).

use crate::{PartitionError, Value};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, LazyLock};

const FALLBACK_PARTITION: &str = "aws";

static BUNDLED: LazyLock<Arc<PartitionTable>> = LazyLock::new(|| {
    let table = PartitionTable::from_json(include_str!("../data/partitions.json"))
        .expect("bundled partitions.json is valid");
    Arc::new(table)
});

/// What `aws.partition` returns: the attributes rules read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionOutputs {
    pub name: String,
    pub dns_suffix: String,
    pub dual_stack_dns_suffix: String,
    #[serde(rename = "supportsFIPS")]
    pub supports_fips: bool,
    pub supports_dual_stack: bool,
    pub implicit_global_region: String,
}

impl PartitionOutputs {
    pub(crate) fn attr(&self, name: &str) -> Option<Value> {
        let value = match name {
            "name" => Value::from(self.name.as_str()),
            "dnsSuffix" => Value::from(self.dns_suffix.as_str()),
            "dualStackDnsSuffix" => Value::from(self.dual_stack_dns_suffix.as_str()),
            "supportsFIPS" => Value::Bool(self.supports_fips),
            "supportsDualStack" => Value::Bool(self.supports_dual_stack),
            "implicitGlobalRegion" => Value::from(self.implicit_global_region.as_str()),
            _ => return None,
        };
        Some(value)
    }
}

/// Per-region overrides of a partition's outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegionOverride {
    #[serde(default)]
    dns_suffix: Option<String>,
    #[serde(default)]
    dual_stack_dns_suffix: Option<String>,
    #[serde(default, rename = "supportsFIPS")]
    supports_fips: Option<bool>,
    #[serde(default)]
    supports_dual_stack: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartitionConfig {
    id: String,
    region_regex: String,
    #[serde(default)]
    regions: BTreeMap<String, RegionOverride>,
    outputs: PartitionOutputs,
}

#[derive(Debug, Deserialize)]
struct PartitionsDocument {
    partitions: Vec<PartitionConfig>,
}

/// One partition record.
#[derive(Debug, Clone)]
pub struct Partition {
    id: String,
    region_regex: Regex,
    regions: Vec<String>,
    outputs: Arc<PartitionOutputs>,
}

impl Partition {
    /// Partition id, e.g. `aws-cn`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Pattern matched against region names with no explicit entry.
    #[must_use]
    pub fn region_regex(&self) -> &str {
        self.region_regex.as_str()
    }

    /// Explicitly listed regions, sorted.
    #[must_use]
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Outputs for regions without overrides.
    #[must_use]
    pub fn outputs(&self) -> &PartitionOutputs {
        &self.outputs
    }
}

/// Region → partition lookup table.
#[derive(Debug, Clone)]
pub struct PartitionTable {
    partitions: Vec<Partition>,
    // Explicit regions, with overrides already merged into the outputs.
    regions: HashMap<String, Arc<PartitionOutputs>>,
    fallback: usize,
}

impl PartitionTable {
    /// The dataset compiled into the crate.
    #[must_use]
    pub fn bundled() -> Arc<Self> {
        Arc::clone(&BUNDLED)
    }

    /// Load a table from a `{"partitions": [...]}` document.
    ///
    /// # Errors
    ///
    /// Returns [`PartitionError`] if the document does not deserialize, a
    /// region pattern does not compile, or there is no `aws` partition.
    pub fn from_json(json: &str) -> Result<Self, PartitionError> {
        let document: PartitionsDocument = serde_json::from_str(json)?;

        let mut partitions = Vec::with_capacity(document.partitions.len());
        let mut regions = HashMap::new();
        for config in document.partitions {
            let region_regex =
                Regex::new(&config.region_regex).map_err(|source| PartitionError::InvalidRegex {
                    partition: config.id.clone(),
                    source,
                })?;
            let outputs = Arc::new(config.outputs);
            for (region, overrides) in &config.regions {
                regions
                    .entry(region.clone())
                    .or_insert_with(|| merge(&outputs, overrides));
            }
            partitions.push(Partition {
                id: config.id,
                region_regex,
                regions: config.regions.into_keys().collect(),
                outputs,
            });
        }

        let fallback = partitions
            .iter()
            .position(|p| p.id == FALLBACK_PARTITION)
            .ok_or(PartitionError::MissingFallback(FALLBACK_PARTITION))?;

        tracing::debug!(
            partitions = partitions.len(),
            regions = regions.len(),
            "loaded partition table"
        );

        Ok(Self {
            partitions,
            regions,
            fallback,
        })
    }

    /// Look up the partition for `region`. Never fails.
    ///
    /// ```
    /// use s3rules::PartitionTable;
    ///
    /// let table = PartitionTable::bundled();
    /// assert_eq!(table.lookup("cn-north-1").name, "aws-cn");
    /// assert_eq!(table.lookup("not-a-region").name, "aws");
    /// ```
    #[must_use]
    pub fn lookup(&self, region: &str) -> Arc<PartitionOutputs> {
        if let Some(outputs) = self.regions.get(region) {
            return Arc::clone(outputs);
        }
        let partition = self
            .partitions
            .iter()
            .find(|p| p.region_regex.is_match(region))
            .unwrap_or(&self.partitions[self.fallback]);
        Arc::clone(&partition.outputs)
    }

    /// Partitions in dataset order.
    #[must_use]
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }
}

fn merge(base: &Arc<PartitionOutputs>, overrides: &RegionOverride) -> Arc<PartitionOutputs> {
    if *overrides == RegionOverride::default() {
        return Arc::clone(base);
    }
    let mut outputs = PartitionOutputs::clone(base);
    if let Some(dns_suffix) = &overrides.dns_suffix {
        outputs.dns_suffix.clone_from(dns_suffix);
    }
    if let Some(dual_stack_dns_suffix) = &overrides.dual_stack_dns_suffix {
        outputs.dual_stack_dns_suffix.clone_from(dual_stack_dns_suffix);
    }
    if let Some(supports_fips) = overrides.supports_fips {
        outputs.supports_fips = supports_fips;
    }
    if let Some(supports_dual_stack) = overrides.supports_dual_stack {
        outputs.supports_dual_stack = supports_dual_stack;
    }
    Arc::new(outputs)
}

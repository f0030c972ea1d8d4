//! ARN parsing (`aws.parseArn`).

use crate::Value;
use serde::Serialize;
use std::fmt;

/// A parsed Amazon Resource Name.
///
/// `arn:partition:service:region:account-id:resource`, where the resource
/// is further split on `:` and `/` into [`resource_id`](Self::resource_id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account_id: String,
    pub resource_id: Vec<String>,
}

impl Arn {
    /// Parse an ARN. Returns `None` rather than an error: a bucket that
    /// is not an ARN is an ordinary case for the rules.
    ///
    /// ```
    /// use s3rules::Arn;
    ///
    /// let arn = Arn::parse("arn:aws:s3:::mybucket").unwrap();
    /// assert_eq!(arn.partition, "aws");
    /// assert_eq!(arn.region, "");
    /// assert_eq!(arn.resource_id, vec!["mybucket"]);
    /// assert!(Arn::parse("not-an-arn").is_none());
    /// ```
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let mut fields = input.splitn(6, ':');
        let (Some(prefix), Some(partition), Some(service), Some(region), Some(account_id), Some(resource)) = (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) else {
            return None;
        };

        if prefix != "arn" || partition.is_empty() || service.is_empty() || resource.is_empty() {
            return None;
        }

        Some(Self {
            partition: partition.to_string(),
            service: service.to_string(),
            region: region.to_string(),
            account_id: account_id.to_string(),
            resource_id: resource.split([':', '/']).map(str::to_string).collect(),
        })
    }

    pub(crate) fn attr(&self, name: &str) -> Option<Value> {
        let value = match name {
            "partition" => Value::from(self.partition.as_str()),
            "service" => Value::from(self.service.as_str()),
            "region" => Value::from(self.region.as_str()),
            "accountId" => Value::from(self.account_id.as_str()),
            "resourceId" => Value::Array(
                self.resource_id
                    .iter()
                    .map(|r| Value::from(r.as_str()))
                    .collect(),
            ),
            _ => return None,
        };
        Some(value)
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition,
            self.service,
            self.region,
            self.account_id,
            self.resource_id.join(":")
        )
    }
}

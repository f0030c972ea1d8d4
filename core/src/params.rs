//! Client parameters and their builder.
//!
//! Six flags are required: the rules assume they are plain booleans. The
//! remaining flags are optional and "absent" is distinct from `false`; the
//! rules only trust them after testing that they are set.

use crate::{ResolveError, Value};

/// Inputs to one endpoint resolution. Immutable once built.
///
/// ```
/// use s3rules::{Params, ResolveError};
///
/// let err = Params::builder().region("us-east-1").build().unwrap_err();
/// assert_eq!(err, ResolveError::MissingParameter { name: "UseFIPS" });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    region: Option<String>,
    bucket: Option<String>,
    endpoint: Option<String>,
    key: Option<String>,
    prefix: Option<String>,
    copy_source: Option<String>,
    use_fips: bool,
    use_dual_stack: bool,
    force_path_style: bool,
    accelerate: bool,
    use_global_endpoint: bool,
    disable_multi_region_access_points: bool,
    use_object_lambda_endpoint: Option<bool>,
    disable_access_points: Option<bool>,
    use_arn_region: Option<bool>,
    use_s3_express_control_endpoint: Option<bool>,
    disable_s3_express_session_auth: Option<bool>,
}

impl Params {
    /// Parameter names as rules refer to them.
    pub const NAMES: &'static [&'static str] = &[
        "Bucket",
        "Region",
        "UseFIPS",
        "UseDualStack",
        "Endpoint",
        "ForcePathStyle",
        "Accelerate",
        "UseGlobalEndpoint",
        "UseObjectLambdaEndpoint",
        "Key",
        "Prefix",
        "CopySource",
        "DisableAccessPoints",
        "DisableMultiRegionAccessPoints",
        "UseArnRegion",
        "UseS3ExpressControlEndpoint",
        "DisableS3ExpressSessionAuth",
    ];

    /// Names of the flags [`ParamsBuilder::build`] insists on.
    pub const REQUIRED: &'static [&'static str] = &[
        "UseFIPS",
        "UseDualStack",
        "ForcePathStyle",
        "Accelerate",
        "UseGlobalEndpoint",
        "DisableMultiRegionAccessPoints",
    ];

    /// Start building.
    #[must_use]
    pub fn builder() -> ParamsBuilder {
        ParamsBuilder::default()
    }

    /// Look a parameter up by its rule name. `None` if unset or unknown.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        let string = |s: &Option<String>| s.as_deref().map(Value::from);
        match name {
            "Bucket" => string(&self.bucket),
            "Region" => string(&self.region),
            "Endpoint" => string(&self.endpoint),
            "Key" => string(&self.key),
            "Prefix" => string(&self.prefix),
            "CopySource" => string(&self.copy_source),
            "UseFIPS" => Some(Value::Bool(self.use_fips)),
            "UseDualStack" => Some(Value::Bool(self.use_dual_stack)),
            "ForcePathStyle" => Some(Value::Bool(self.force_path_style)),
            "Accelerate" => Some(Value::Bool(self.accelerate)),
            "UseGlobalEndpoint" => Some(Value::Bool(self.use_global_endpoint)),
            "DisableMultiRegionAccessPoints" => {
                Some(Value::Bool(self.disable_multi_region_access_points))
            }
            "UseObjectLambdaEndpoint" => self.use_object_lambda_endpoint.map(Value::Bool),
            "DisableAccessPoints" => self.disable_access_points.map(Value::Bool),
            "UseArnRegion" => self.use_arn_region.map(Value::Bool),
            "UseS3ExpressControlEndpoint" => self.use_s3_express_control_endpoint.map(Value::Bool),
            "DisableS3ExpressSessionAuth" => self.disable_s3_express_session_auth.map(Value::Bool),
            _ => None,
        }
    }

    /// Set parameters as `(name, value)` pairs.
    pub(crate) fn values(&self) -> impl Iterator<Item = (&'static str, Value)> + '_ {
        Self::NAMES
            .iter()
            .filter_map(|name| self.get(name).map(|value| (*name, value)))
    }

    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    #[must_use]
    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    #[must_use]
    pub fn use_fips(&self) -> bool {
        self.use_fips
    }

    #[must_use]
    pub fn use_dual_stack(&self) -> bool {
        self.use_dual_stack
    }

    #[must_use]
    pub fn force_path_style(&self) -> bool {
        self.force_path_style
    }

    #[must_use]
    pub fn accelerate(&self) -> bool {
        self.accelerate
    }
}

/// Builder for [`Params`].
///
/// Optional flags have `Option<bool>` setters so callers can forward an
/// absent value without collapsing it to `false`.
#[derive(Debug, Clone, Default)]
pub struct ParamsBuilder {
    region: Option<String>,
    bucket: Option<String>,
    endpoint: Option<String>,
    key: Option<String>,
    prefix: Option<String>,
    copy_source: Option<String>,
    use_fips: Option<bool>,
    use_dual_stack: Option<bool>,
    force_path_style: Option<bool>,
    accelerate: Option<bool>,
    use_global_endpoint: Option<bool>,
    disable_multi_region_access_points: Option<bool>,
    use_object_lambda_endpoint: Option<bool>,
    disable_access_points: Option<bool>,
    use_arn_region: Option<bool>,
    use_s3_express_control_endpoint: Option<bool>,
    disable_s3_express_session_auth: Option<bool>,
}

macro_rules! string_setters {
    ($($field:ident),* $(,)?) => {
        $(
            #[must_use]
            pub fn $field(mut self, value: impl Into<String>) -> Self {
                self.$field = Some(value.into());
                self
            }
        )*
    };
}

macro_rules! flag_setters {
    ($($field:ident),* $(,)?) => {
        $(
            #[must_use]
            pub fn $field(mut self, value: impl Into<Option<bool>>) -> Self {
                self.$field = value.into();
                self
            }
        )*
    };
}

impl ParamsBuilder {
    string_setters!(region, bucket, endpoint, key, prefix, copy_source);

    flag_setters!(
        use_fips,
        use_dual_stack,
        force_path_style,
        accelerate,
        use_global_endpoint,
        disable_multi_region_access_points,
        use_object_lambda_endpoint,
        disable_access_points,
        use_arn_region,
        use_s3_express_control_endpoint,
        disable_s3_express_session_auth,
    );

    /// Set every required flag that is still unset to `false`.
    #[must_use]
    pub fn default_flags(mut self) -> Self {
        for flag in [
            &mut self.use_fips,
            &mut self.use_dual_stack,
            &mut self.force_path_style,
            &mut self.accelerate,
            &mut self.use_global_endpoint,
            &mut self.disable_multi_region_access_points,
        ] {
            flag.get_or_insert(false);
        }
        self
    }

    /// Set a string parameter by its rule name.
    ///
    /// # Errors
    ///
    /// [`ResolveError::InvalidParameter`] if `name` is not a string parameter.
    pub fn set_string(mut self, name: &str, value: impl Into<String>) -> Result<Self, ResolveError> {
        let slot = match name {
            "Region" => &mut self.region,
            "Bucket" => &mut self.bucket,
            "Endpoint" => &mut self.endpoint,
            "Key" => &mut self.key,
            "Prefix" => &mut self.prefix,
            "CopySource" => &mut self.copy_source,
            _ => {
                return Err(ResolveError::InvalidParameter {
                    name: name.to_string(),
                    expected: "string",
                })
            }
        };
        *slot = Some(value.into());
        Ok(self)
    }

    /// Set a boolean parameter by its rule name.
    ///
    /// # Errors
    ///
    /// [`ResolveError::InvalidParameter`] if `name` is not a boolean parameter.
    pub fn set_bool(mut self, name: &str, value: bool) -> Result<Self, ResolveError> {
        let slot = match name {
            "UseFIPS" => &mut self.use_fips,
            "UseDualStack" => &mut self.use_dual_stack,
            "ForcePathStyle" => &mut self.force_path_style,
            "Accelerate" => &mut self.accelerate,
            "UseGlobalEndpoint" => &mut self.use_global_endpoint,
            "DisableMultiRegionAccessPoints" => &mut self.disable_multi_region_access_points,
            "UseObjectLambdaEndpoint" => &mut self.use_object_lambda_endpoint,
            "DisableAccessPoints" => &mut self.disable_access_points,
            "UseArnRegion" => &mut self.use_arn_region,
            "UseS3ExpressControlEndpoint" => &mut self.use_s3_express_control_endpoint,
            "DisableS3ExpressSessionAuth" => &mut self.disable_s3_express_session_auth,
            _ => {
                return Err(ResolveError::InvalidParameter {
                    name: name.to_string(),
                    expected: "boolean",
                })
            }
        };
        *slot = Some(value);
        Ok(self)
    }

    /// Validate required flags and freeze.
    ///
    /// # Errors
    ///
    /// [`ResolveError::MissingParameter`] naming the first required flag
    /// that was never set.
    pub fn build(self) -> Result<Params, ResolveError> {
        let required = |value: Option<bool>, name: &'static str| {
            value.ok_or(ResolveError::MissingParameter { name })
        };
        Ok(Params {
            use_fips: required(self.use_fips, "UseFIPS")?,
            use_dual_stack: required(self.use_dual_stack, "UseDualStack")?,
            force_path_style: required(self.force_path_style, "ForcePathStyle")?,
            accelerate: required(self.accelerate, "Accelerate")?,
            use_global_endpoint: required(self.use_global_endpoint, "UseGlobalEndpoint")?,
            disable_multi_region_access_points: required(
                self.disable_multi_region_access_points,
                "DisableMultiRegionAccessPoints",
            )?,
            region: self.region,
            bucket: self.bucket,
            endpoint: self.endpoint,
            key: self.key,
            prefix: self.prefix,
            copy_source: self.copy_source,
            use_object_lambda_endpoint: self.use_object_lambda_endpoint,
            disable_access_points: self.disable_access_points,
            use_arn_region: self.use_arn_region,
            use_s3_express_control_endpoint: self.use_s3_express_control_endpoint,
            disable_s3_express_session_auth: self.disable_s3_express_session_auth,
        })
    }
}

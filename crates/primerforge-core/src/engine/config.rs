use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PRIMER_SIZE_MIN: u32 = 20;
pub const DEFAULT_PRIMER_SIZE_OPT: u32 = 25;
pub const DEFAULT_PRIMER_SIZE_MAX: u32 = 30;
pub const DEFAULT_PRIMER_TM_MIN: f64 = 64.0;
pub const DEFAULT_PRIMER_TM_OPT: f64 = 65.0;
pub const DEFAULT_PRIMER_TM_MAX: f64 = 66.0;
pub const DEFAULT_GC_CLAMP: u32 = 2;
pub const DEFAULT_NUM_RETURN: u32 = 5;

pub const DEFAULT_PRODUCT_SIZE_MIN: usize = 100;
pub const DEFAULT_PRODUCT_SIZE_MAX_CAP: usize = 1000;
pub const DEFAULT_PRIMER_MIN_GC: f64 = 20.0;
pub const DEFAULT_PRIMER_MAX_GC: f64 = 80.0;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid {name} bounds: expected min <= opt <= max, got {min} / {opt} / {max}")]
    BoundOrder {
        name: &'static str,
        min: f64,
        opt: f64,
        max: f64,
    },

    #[error("Parameter '{0}' must be a positive number")]
    NonPositive(&'static str),

    #[error(
        "Target region (start {start}, length {length}) lies outside the {sequence_length} bp sequence"
    )]
    TargetOutOfBounds {
        start: usize,
        length: usize,
        sequence_length: usize,
    },

    #[error("Invalid product size range: {min}-{max}")]
    ProductRange { min: usize, max: usize },

    #[error("Invalid primer GC content range: {min}-{max} %")]
    GcContentRange { min: f64, max: f64 },
}

/// The complete, validated constraint bundle handed to the design engine.
///
/// Instances only come out of [`DesignParametersBuilder::build`], so every bound
/// triple satisfies `min <= opt <= max`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignParameters {
    pub primer_size_min: u32,
    pub primer_size_opt: u32,
    pub primer_size_max: u32,
    pub primer_tm_min: f64,
    pub primer_tm_opt: f64,
    pub primer_tm_max: f64,
    pub gc_clamp: u32,
    pub target_start: usize,
    pub target_length: usize,
    pub num_return: u32,
}

impl Default for DesignParameters {
    fn default() -> Self {
        Self {
            primer_size_min: DEFAULT_PRIMER_SIZE_MIN,
            primer_size_opt: DEFAULT_PRIMER_SIZE_OPT,
            primer_size_max: DEFAULT_PRIMER_SIZE_MAX,
            primer_tm_min: DEFAULT_PRIMER_TM_MIN,
            primer_tm_opt: DEFAULT_PRIMER_TM_OPT,
            primer_tm_max: DEFAULT_PRIMER_TM_MAX,
            gc_clamp: DEFAULT_GC_CLAMP,
            target_start: 0,
            target_length: 0,
            num_return: DEFAULT_NUM_RETURN,
        }
    }
}

/// Named overrides, one per [`DesignParameters`] field. Unset fields keep the
/// value of whatever bundle the builder started from.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DesignOverrides {
    pub primer_size_min: Option<u32>,
    pub primer_size_opt: Option<u32>,
    pub primer_size_max: Option<u32>,
    pub primer_tm_min: Option<f64>,
    pub primer_tm_opt: Option<f64>,
    pub primer_tm_max: Option<f64>,
    pub gc_clamp: Option<u32>,
    pub target_start: Option<usize>,
    pub target_length: Option<usize>,
    pub num_return: Option<u32>,
}

impl DesignOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layers `other` on top of `self`; fields set in `other` win.
    pub fn merged_with(self, other: &DesignOverrides) -> Self {
        Self {
            primer_size_min: other.primer_size_min.or(self.primer_size_min),
            primer_size_opt: other.primer_size_opt.or(self.primer_size_opt),
            primer_size_max: other.primer_size_max.or(self.primer_size_max),
            primer_tm_min: other.primer_tm_min.or(self.primer_tm_min),
            primer_tm_opt: other.primer_tm_opt.or(self.primer_tm_opt),
            primer_tm_max: other.primer_tm_max.or(self.primer_tm_max),
            gc_clamp: other.gc_clamp.or(self.gc_clamp),
            target_start: other.target_start.or(self.target_start),
            target_length: other.target_length.or(self.target_length),
            num_return: other.num_return.or(self.num_return),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DesignParametersBuilder {
    base: DesignParameters,
    overrides: DesignOverrides,
    sequence_length: Option<usize>,
}

impl DesignParametersBuilder {
    /// Starts from the documented defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing bundle, e.g. the previous troubleshooting step.
    pub fn from_base(base: &DesignParameters) -> Self {
        Self {
            base: base.clone(),
            ..Self::default()
        }
    }

    pub fn primer_size_min(mut self, value: u32) -> Self {
        self.overrides.primer_size_min = Some(value);
        self
    }
    pub fn primer_size_opt(mut self, value: u32) -> Self {
        self.overrides.primer_size_opt = Some(value);
        self
    }
    pub fn primer_size_max(mut self, value: u32) -> Self {
        self.overrides.primer_size_max = Some(value);
        self
    }
    pub fn primer_tm_min(mut self, value: f64) -> Self {
        self.overrides.primer_tm_min = Some(value);
        self
    }
    pub fn primer_tm_opt(mut self, value: f64) -> Self {
        self.overrides.primer_tm_opt = Some(value);
        self
    }
    pub fn primer_tm_max(mut self, value: f64) -> Self {
        self.overrides.primer_tm_max = Some(value);
        self
    }
    pub fn gc_clamp(mut self, value: u32) -> Self {
        self.overrides.gc_clamp = Some(value);
        self
    }
    pub fn target(mut self, start: usize, length: usize) -> Self {
        self.overrides.target_start = Some(start);
        self.overrides.target_length = Some(length);
        self
    }
    pub fn num_return(mut self, value: u32) -> Self {
        self.overrides.num_return = Some(value);
        self
    }

    /// Applies every field set in `overrides`, replacing earlier setter calls.
    pub fn overrides(mut self, overrides: &DesignOverrides) -> Self {
        self.overrides = self.overrides.merged_with(overrides);
        self
    }

    /// Length of the template the target must fit inside. Without it the target
    /// region is not bounds-checked.
    pub fn sequence_length(mut self, length: usize) -> Self {
        self.sequence_length = Some(length);
        self
    }

    pub fn build(self) -> Result<DesignParameters, ConfigError> {
        let o = self.overrides;
        let b = self.base;
        let params = DesignParameters {
            primer_size_min: o.primer_size_min.unwrap_or(b.primer_size_min),
            primer_size_opt: o.primer_size_opt.unwrap_or(b.primer_size_opt),
            primer_size_max: o.primer_size_max.unwrap_or(b.primer_size_max),
            primer_tm_min: o.primer_tm_min.unwrap_or(b.primer_tm_min),
            primer_tm_opt: o.primer_tm_opt.unwrap_or(b.primer_tm_opt),
            primer_tm_max: o.primer_tm_max.unwrap_or(b.primer_tm_max),
            gc_clamp: o.gc_clamp.unwrap_or(b.gc_clamp),
            target_start: o.target_start.unwrap_or(b.target_start),
            target_length: o.target_length.unwrap_or(b.target_length),
            num_return: o.num_return.unwrap_or(b.num_return),
        };
        validate(&params, self.sequence_length)?;
        Ok(params)
    }
}

fn validate(params: &DesignParameters, sequence_length: Option<usize>) -> Result<(), ConfigError> {
    if params.primer_size_min == 0 {
        return Err(ConfigError::NonPositive("primer_size_min"));
    }
    if params.num_return == 0 {
        return Err(ConfigError::NonPositive("num_return"));
    }
    check_order(
        "primer size",
        params.primer_size_min as f64,
        params.primer_size_opt as f64,
        params.primer_size_max as f64,
    )?;
    check_order(
        "primer Tm",
        params.primer_tm_min,
        params.primer_tm_opt,
        params.primer_tm_max,
    )?;
    if let Some(sequence_length) = sequence_length {
        let end = params.target_start.checked_add(params.target_length);
        if end.is_none_or(|end| end > sequence_length) {
            return Err(ConfigError::TargetOutOfBounds {
                start: params.target_start,
                length: params.target_length,
                sequence_length,
            });
        }
    }
    Ok(())
}

fn check_order(name: &'static str, min: f64, opt: f64, max: f64) -> Result<(), ConfigError> {
    // NaN compares false everywhere, so it is rejected here as well.
    if min <= opt && opt <= max {
        Ok(())
    } else {
        Err(ConfigError::BoundOrder { name, min, opt, max })
    }
}

/// Engine-level knobs that are not part of the caller's design constraints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSettings {
    pub product_size_min: usize,
    /// The product range upper bound is the template length, capped at this value.
    pub product_size_max_cap: usize,
    pub primer_min_gc: f64,
    pub primer_max_gc: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            product_size_min: DEFAULT_PRODUCT_SIZE_MIN,
            product_size_max_cap: DEFAULT_PRODUCT_SIZE_MAX_CAP,
            primer_min_gc: DEFAULT_PRIMER_MIN_GC,
            primer_max_gc: DEFAULT_PRIMER_MAX_GC,
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.product_size_min == 0 || self.product_size_min > self.product_size_max_cap {
            return Err(ConfigError::ProductRange {
                min: self.product_size_min,
                max: self.product_size_max_cap,
            });
        }
        if !(0.0..=100.0).contains(&self.primer_min_gc)
            || !(0.0..=100.0).contains(&self.primer_max_gc)
            || self.primer_min_gc > self.primer_max_gc
        {
            return Err(ConfigError::GcContentRange {
                min: self.primer_min_gc,
                max: self.primer_max_gc,
            });
        }
        Ok(())
    }

    /// Product size range for a template of `sequence_length` bases.
    pub fn product_size_range(&self, sequence_length: usize) -> (usize, usize) {
        (
            self.product_size_min,
            sequence_length.min(self.product_size_max_cap),
        )
    }
}

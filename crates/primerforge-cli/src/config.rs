use crate::cli::{DesignArgs, ServeArgs};
use crate::error::{CliError, Result};
use primerforge::DesignError;
use primerforge::engine::config::{DesignOverrides, EngineSettings};
use primerforge::engine::primer3::Primer3Engine;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialDesignConfig {
    primer_size_min: Option<u32>,
    primer_size_opt: Option<u32>,
    primer_size_max: Option<u32>,
    primer_tm_min: Option<f64>,
    primer_tm_opt: Option<f64>,
    primer_tm_max: Option<f64>,
    gc_clamp: Option<u32>,
    target_start: Option<usize>,
    target_length: Option<usize>,
    num_return: Option<u32>,
}

impl From<PartialDesignConfig> for DesignOverrides {
    fn from(p: PartialDesignConfig) -> Self {
        Self {
            primer_size_min: p.primer_size_min,
            primer_size_opt: p.primer_size_opt,
            primer_size_max: p.primer_size_max,
            primer_tm_min: p.primer_tm_min,
            primer_tm_opt: p.primer_tm_opt,
            primer_tm_max: p.primer_tm_max,
            gc_clamp: p.gc_clamp,
            target_start: p.target_start,
            target_length: p.target_length,
            num_return: p.num_return,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialEngineConfig {
    primer3_path: Option<PathBuf>,
    product_size_min: Option<usize>,
    product_size_max_cap: Option<usize>,
    primer_min_gc: Option<f64>,
    primer_max_gc: Option<f64>,
}

/// Everything a command needs once file, `--set`, and flag values are layered.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub overrides: DesignOverrides,
    pub settings: EngineSettings,
    pub primer3: Option<PathBuf>,
}

impl RunConfig {
    /// Explicit path if one was configured, otherwise the environment / `PATH` lookup.
    pub fn engine(&self) -> Primer3Engine {
        let engine = match &self.primer3 {
            Some(path) => Primer3Engine::with_executable(path),
            None => Primer3Engine::new(),
        };
        engine.with_settings(self.settings.clone())
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    design: Option<PartialDesignConfig>,
    engine: Option<PartialEngineConfig>,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads `path` when given; otherwise starts from built-in defaults only.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_with_cli(mut self, args: &DesignArgs) -> Result<RunConfig> {
        self.apply_set_values(&args.set_values)?;
        let flags = DesignOverrides {
            primer_size_min: args.primer_size_min,
            primer_size_opt: args.primer_size_opt,
            primer_size_max: args.primer_size_max,
            primer_tm_min: args.primer_tm_min,
            primer_tm_opt: args.primer_tm_opt,
            primer_tm_max: args.primer_tm_max,
            gc_clamp: args.gc_clamp,
            target_start: args.target_start,
            target_length: args.target_length,
            num_return: args.num_return,
        };
        self.finish(&flags, args.primer3.as_ref())
    }

    pub fn merge_with_serve(mut self, args: &ServeArgs) -> Result<RunConfig> {
        self.apply_set_values(&args.set_values)?;
        self.finish(&DesignOverrides::new(), args.primer3.as_ref())
    }

    fn finish(self, flags: &DesignOverrides, primer3_flag: Option<&PathBuf>) -> Result<RunConfig> {
        let file_overrides: DesignOverrides = self.design.unwrap_or_default().into();
        let engine = self.engine.unwrap_or_default();

        let defaults = EngineSettings::default();
        let settings = EngineSettings {
            product_size_min: engine.product_size_min.unwrap_or(defaults.product_size_min),
            product_size_max_cap: engine
                .product_size_max_cap
                .unwrap_or(defaults.product_size_max_cap),
            primer_min_gc: engine.primer_min_gc.unwrap_or(defaults.primer_min_gc),
            primer_max_gc: engine.primer_max_gc.unwrap_or(defaults.primer_max_gc),
        };
        settings.validate().map_err(DesignError::from)?;

        Ok(RunConfig {
            overrides: file_overrides.merged_with(flags),
            settings,
            primer3: primer3_flag.cloned().or(engine.primer3_path),
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "design.primer-size-min" => {
                    self.design.get_or_insert_with(Default::default).primer_size_min =
                        Some(parse_value(key, value_str)?)
                }
                "design.primer-size-opt" => {
                    self.design.get_or_insert_with(Default::default).primer_size_opt =
                        Some(parse_value(key, value_str)?)
                }
                "design.primer-size-max" => {
                    self.design.get_or_insert_with(Default::default).primer_size_max =
                        Some(parse_value(key, value_str)?)
                }
                "design.primer-tm-min" => {
                    self.design.get_or_insert_with(Default::default).primer_tm_min =
                        Some(parse_value(key, value_str)?)
                }
                "design.primer-tm-opt" => {
                    self.design.get_or_insert_with(Default::default).primer_tm_opt =
                        Some(parse_value(key, value_str)?)
                }
                "design.primer-tm-max" => {
                    self.design.get_or_insert_with(Default::default).primer_tm_max =
                        Some(parse_value(key, value_str)?)
                }
                "design.gc-clamp" => {
                    self.design.get_or_insert_with(Default::default).gc_clamp =
                        Some(parse_value(key, value_str)?)
                }
                "design.target-start" => {
                    self.design.get_or_insert_with(Default::default).target_start =
                        Some(parse_value(key, value_str)?)
                }
                "design.target-length" => {
                    self.design.get_or_insert_with(Default::default).target_length =
                        Some(parse_value(key, value_str)?)
                }
                "design.num-return" => {
                    self.design.get_or_insert_with(Default::default).num_return =
                        Some(parse_value(key, value_str)?)
                }
                "engine.primer3-path" => {
                    self.engine.get_or_insert_with(Default::default).primer3_path =
                        Some(PathBuf::from(value_str))
                }
                "engine.product-size-min" => {
                    self.engine
                        .get_or_insert_with(Default::default)
                        .product_size_min = Some(parse_value(key, value_str)?)
                }
                "engine.product-size-max-cap" => {
                    self.engine
                        .get_or_insert_with(Default::default)
                        .product_size_max_cap = Some(parse_value(key, value_str)?)
                }
                "engine.primer-min-gc" => {
                    self.engine.get_or_insert_with(Default::default).primer_min_gc =
                        Some(parse_value(key, value_str)?)
                }
                "engine.primer-max-gc" => {
                    self.engine.get_or_insert_with(Default::default).primer_max_gc =
                        Some(parse_value(key, value_str)?)
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value))
    })
}

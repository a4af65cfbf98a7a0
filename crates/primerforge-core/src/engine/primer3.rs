//! Adapter for the `primer3_core` command-line engine.
//!
//! One design attempt is one subprocess: a single Boulder-IO record goes in on stdin
//! and a single record comes back on stdout. The adapter normalizes that record into
//! the [`EngineOutcome`] / [`EngineError`] split the workflows rely on.

use super::backend::{DesignEngine, EngineOutcome, EngineRequest};
use super::config::{ConfigError, EngineSettings};
use super::error::EngineError;
use crate::core::io::boulder::{BoulderRecord, parse_records};
use crate::core::models::primer::{PrimerFeatures, PrimerPair};
use std::ffi::OsString;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use tracing::{debug, trace};

pub const DEFAULT_PRIMER3_BIN: &str = "primer3_core";
pub const PRIMER3_ENV_BIN: &str = "PRIMERFORGE_PRIMER3_BIN";

const SEQUENCE_ID: &str = "input_sequence";

#[derive(Debug, Clone)]
pub struct Primer3Engine {
    executable: PathBuf,
    args: Vec<OsString>,
    settings: EngineSettings,
}

impl Default for Primer3Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Primer3Engine {
    /// Uses `$PRIMERFORGE_PRIMER3_BIN` when set, otherwise `primer3_core` from `PATH`.
    pub fn new() -> Self {
        Self::with_executable(default_executable())
    }

    pub fn with_executable(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
            settings: EngineSettings::default(),
        }
    }

    /// Extra arguments placed before any input is written, e.g. `-strict_tags`.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn run(&self, input: String) -> Result<String, EngineError> {
        let mut child = Command::new(&self.executable)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    EngineError::ToolNotFound {
                        executable: self.executable.display().to_string(),
                        env_var: PRIMER3_ENV_BIN,
                    }
                } else {
                    EngineError::Io(e)
                }
            })?;

        let stdin = child.stdin.take();
        // Fed from a separate thread so a chatty child cannot block on a full stdout pipe.
        let writer = std::thread::spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(input.as_bytes())?;
            }
            Ok(())
        });

        let output = child.wait_with_output()?;
        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {
                trace!("primer3 closed stdin before reading the full record");
            }
            Ok(Err(e)) => return Err(EngineError::Io(e)),
            Err(_) => {
                return Err(EngineError::Io(std::io::Error::other(
                    "primer3 stdin writer panicked",
                )));
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            // A reported PRIMER_ERROR is more useful than a bare exit status.
            if let Some(message) = reported_error(&stdout) {
                return Err(EngineError::Reported(message));
            }
            return Err(EngineError::ToolFailed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(stdout)
    }
}

impl DesignEngine for Primer3Engine {
    fn check_template(&self, sequence_length: usize) -> Result<(), ConfigError> {
        let (min, max) = self.settings().product_size_range(sequence_length);
        if min > max {
            return Err(ConfigError::ProductRange { min, max });
        }
        Ok(())
    }

    fn design(&self, request: &EngineRequest<'_>) -> Result<EngineOutcome, EngineError> {
        let input = build_input(request, &self.settings);
        debug!(
            executable = %self.executable.display(),
            tags = input.len(),
            "Invoking primer3."
        );
        let stdout = self.run(input.to_string())?;
        let record = parse_records(&stdout)?
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::MalformedOutput("primer3 produced no output record".into()))?;
        parse_output(&record)
    }
}

fn default_executable() -> PathBuf {
    std::env::var(PRIMER3_ENV_BIN)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_PRIMER3_BIN.to_string())
        .into()
}

fn reported_error(stdout: &str) -> Option<String> {
    parse_records(stdout)
        .ok()?
        .first()?
        .get("PRIMER_ERROR")
        .map(str::to_string)
}

/// Encodes one design attempt as a primer3 input record.
pub fn build_input(request: &EngineRequest<'_>, settings: &EngineSettings) -> BoulderRecord {
    let p = request.parameters;
    let (product_min, product_max) = settings.product_size_range(request.sequence.len());

    let mut record = BoulderRecord::new();
    record.push("SEQUENCE_ID", SEQUENCE_ID);
    record.push("SEQUENCE_TEMPLATE", request.sequence);
    if request.target_length() > 0 {
        record.push(
            "SEQUENCE_TARGET",
            format!("{},{}", request.target_start(), request.target_length()),
        );
    }
    record.push("PRIMER_OPT_SIZE", p.primer_size_opt);
    record.push("PRIMER_MIN_SIZE", p.primer_size_min);
    record.push("PRIMER_MAX_SIZE", p.primer_size_max);
    record.push("PRIMER_OPT_TM", p.primer_tm_opt);
    record.push("PRIMER_MIN_TM", p.primer_tm_min);
    record.push("PRIMER_MAX_TM", p.primer_tm_max);
    record.push("PRIMER_MIN_GC", settings.primer_min_gc);
    record.push("PRIMER_MAX_GC", settings.primer_max_gc);
    record.push("PRIMER_GC_CLAMP", p.gc_clamp);
    record.push("PRIMER_NUM_RETURN", p.num_return);
    record.push(
        "PRIMER_PRODUCT_SIZE_RANGE",
        format!("{product_min}-{product_max}"),
    );
    record
}

/// Decodes a primer3 output record into pairs, "no pairs", or a reported fault.
pub fn parse_output(record: &BoulderRecord) -> Result<EngineOutcome, EngineError> {
    if let Some(message) = record.get("PRIMER_ERROR") {
        return Err(EngineError::Reported(message.to_string()));
    }

    let count = match record.get("PRIMER_PAIR_NUM_RETURNED") {
        Some(_) => required::<usize>(record, "PRIMER_PAIR_NUM_RETURNED")?,
        None => 0,
    };

    let pairs = (0..count)
        .map(|i| {
            Ok(PrimerPair {
                rank: i,
                left: parse_strand(record, "LEFT", i)?,
                right: parse_strand(record, "RIGHT", i)?,
                product_size: required(record, &format!("PRIMER_PAIR_{i}_PRODUCT_SIZE"))?,
                penalty: required(record, &format!("PRIMER_PAIR_{i}_PENALTY"))?,
            })
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    Ok(EngineOutcome::from_pairs(pairs))
}

fn parse_strand(record: &BoulderRecord, side: &str, i: usize) -> Result<PrimerFeatures, EngineError> {
    let prefix = format!("PRIMER_{side}_{i}");
    let position = record.get(&prefix).ok_or_else(|| missing(&prefix))?;
    let (start, length) = position
        .split_once(',')
        .and_then(|(s, l)| {
            Some((
                s.trim().parse::<usize>().ok()?,
                l.trim().parse::<usize>().ok()?,
            ))
        })
        .ok_or_else(|| EngineError::MalformedOutput(format!("{prefix} has value '{position}'")))?;

    Ok(PrimerFeatures {
        start,
        length,
        tm: required(record, &format!("{prefix}_TM"))?,
        gc_percent: required(record, &format!("{prefix}_GC_PERCENT"))?,
        self_any: required(record, &format!("{prefix}_SELF_ANY_TH"))?,
        self_end: required(record, &format!("{prefix}_SELF_END_TH"))?,
        mispriming: record
            .get(&format!("{prefix}_LIBRARY_MISPRIMING"))
            .and_then(leading_number)
            .unwrap_or(0.0),
        sequence: record
            .get(&format!("{prefix}_SEQUENCE"))
            .ok_or_else(|| missing(&format!("{prefix}_SEQUENCE")))?
            .to_string(),
    })
}

fn required<T: FromStr>(record: &BoulderRecord, tag: &str) -> Result<T, EngineError> {
    let value = record.get(tag).ok_or_else(|| missing(tag))?;
    value
        .trim()
        .parse()
        .map_err(|_| EngineError::MalformedOutput(format!("{tag} has value '{value}'")))
}

fn missing(tag: &str) -> EngineError {
    EngineError::MalformedOutput(format!("missing tag {tag}"))
}

/// `PRIMER_*_LIBRARY_MISPRIMING` reads like `"12.00, seq_name"`.
fn leading_number(value: &str) -> Option<f64> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .find(|s| !s.is_empty())?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::DesignParametersBuilder;

    const TWO_PAIRS: &str = "\
SEQUENCE_ID=input_sequence
PRIMER_PAIR_NUM_RETURNED=2
PRIMER_PAIR_0_PENALTY=0.213
PRIMER_LEFT_0=12,25
PRIMER_LEFT_0_TM=65.1
PRIMER_LEFT_0_GC_PERCENT=56.0
PRIMER_LEFT_0_SELF_ANY_TH=12.5
PRIMER_LEFT_0_SELF_END_TH=3.1
PRIMER_LEFT_0_SEQUENCE=GGGTCAGGATCTGGACTAGTCAGGA
PRIMER_LEFT_0_LIBRARY_MISPRIMING=11.00, alu_repeat
PRIMER_RIGHT_0=210,24
PRIMER_RIGHT_0_TM=64.8
PRIMER_RIGHT_0_GC_PERCENT=54.2
PRIMER_RIGHT_0_SELF_ANY_TH=0.0
PRIMER_RIGHT_0_SELF_END_TH=0.0
PRIMER_RIGHT_0_SEQUENCE=CCTCAGTCTTGACCAGTGGATCAG
PRIMER_PAIR_0_PRODUCT_SIZE=199
PRIMER_PAIR_1_PENALTY=0.540
PRIMER_LEFT_1=13,25
PRIMER_LEFT_1_TM=65.4
PRIMER_LEFT_1_GC_PERCENT=52.0
PRIMER_LEFT_1_SELF_ANY_TH=0.0
PRIMER_LEFT_1_SELF_END_TH=0.0
PRIMER_LEFT_1_SEQUENCE=GGTCAGGATCTGGACTAGTCAGGAC
PRIMER_RIGHT_1=210,24
PRIMER_RIGHT_1_TM=64.8
PRIMER_RIGHT_1_GC_PERCENT=54.2
PRIMER_RIGHT_1_SELF_ANY_TH=0.0
PRIMER_RIGHT_1_SELF_END_TH=0.0
PRIMER_RIGHT_1_SEQUENCE=CCTCAGTCTTGACCAGTGGATCAG
PRIMER_PAIR_1_PRODUCT_SIZE=198
=
";

    fn record(text: &str) -> BoulderRecord {
        parse_records(text).unwrap().remove(0)
    }

    #[test]
    fn build_input_encodes_parameters_and_settings() {
        let params = DesignParametersBuilder::new()
            .target(40, 1)
            .gc_clamp(1)
            .build()
            .unwrap();
        let sequence = "A".repeat(400);
        let request = EngineRequest {
            sequence: &sequence,
            parameters: &params,
        };
        let input = build_input(&request, &EngineSettings::default());
        assert_eq!(input.get("SEQUENCE_TARGET"), Some("40,1"));
        assert_eq!(input.get("PRIMER_GC_CLAMP"), Some("1"));
        assert_eq!(input.get("PRIMER_MIN_SIZE"), Some("20"));
        assert_eq!(input.get("PRIMER_MAX_TM"), Some("66"));
        assert_eq!(input.get("PRIMER_NUM_RETURN"), Some("5"));
        assert_eq!(input.get("PRIMER_PRODUCT_SIZE_RANGE"), Some("100-400"));
        assert!(input.to_string().ends_with("\n=\n"));
    }

    #[test]
    fn build_input_omits_empty_target() {
        let params = DesignParametersBuilder::new().build().unwrap();
        let request = EngineRequest {
            sequence: "ACGT",
            parameters: &params,
        };
        assert_eq!(build_input(&request, &EngineSettings::default()).get("SEQUENCE_TARGET"), None);
    }

    #[test]
    fn parse_output_reads_ranked_pairs() {
        let outcome = parse_output(&record(TWO_PAIRS)).unwrap();
        let pairs = outcome.into_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].rank, 0);
        assert_eq!(pairs[0].left.start, 12);
        assert_eq!(pairs[0].left.length, 25);
        assert_eq!(pairs[0].left.mispriming, 11.0);
        assert_eq!(pairs[0].right.sequence, "CCTCAGTCTTGACCAGTGGATCAG");
        assert_eq!(pairs[0].product_size, 199);
        assert_eq!(pairs[1].penalty, 0.54);
        assert_eq!(pairs[1].left.mispriming, 0.0);
    }

    #[test]
    fn parse_output_maps_zero_pairs_to_no_pairs() {
        let outcome = parse_output(&record("PRIMER_PAIR_NUM_RETURNED=0\n=\n")).unwrap();
        assert_eq!(outcome, EngineOutcome::NoPairs);
        let outcome = parse_output(&record("PRIMER_LEFT_EXPLAIN=considered 0\n=\n")).unwrap();
        assert_eq!(outcome, EngineOutcome::NoPairs);
    }

    #[test]
    fn parse_output_maps_primer_error_to_fault() {
        let err = parse_output(&record("PRIMER_ERROR=Illegal SEQUENCE_TARGET\n=\n")).unwrap_err();
        assert!(matches!(err, EngineError::Reported(msg) if msg == "Illegal SEQUENCE_TARGET"));
    }

    #[test]
    fn parse_output_reports_missing_tags() {
        let err = parse_output(&record("PRIMER_PAIR_NUM_RETURNED=1\n=\n")).unwrap_err();
        assert!(matches!(err, EngineError::MalformedOutput(msg) if msg.contains("PRIMER_LEFT_0")));
    }

    #[test]
    fn leading_number_handles_annotated_values() {
        assert_eq!(leading_number("12.00, seq"), Some(12.0));
        assert_eq!(leading_number("7"), Some(7.0));
        assert_eq!(leading_number("none"), None);
    }

    #[test]
    fn template_shorter_than_minimum_product_is_rejected() {
        let engine = Primer3Engine::with_executable("/nonexistent/primer3_core");
        assert_eq!(engine.settings().product_size_min, 100);
        assert_eq!(
            engine.check_template(60),
            Err(ConfigError::ProductRange { min: 100, max: 60 })
        );
        assert!(engine.check_template(100).is_ok());
        assert!(engine.check_template(5000).is_ok());
    }

    #[cfg(unix)]
    mod subprocess {
        use super::*;
        use crate::engine::config::DesignParameters;
        use std::fs;
        use tempfile::TempDir;

        fn scripted_engine(script: &str) -> (TempDir, Primer3Engine) {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("fake_primer3.sh");
            fs::write(&path, script).unwrap();
            let engine = Primer3Engine::with_executable("/bin/sh").with_args([path]);
            (dir, engine)
        }

        fn design(engine: &Primer3Engine) -> Result<EngineOutcome, EngineError> {
            let params = DesignParameters::default();
            engine.design(&EngineRequest {
                sequence: "ACGTACGTACGT",
                parameters: &params,
            })
        }

        #[test]
        fn successful_run_is_parsed() {
            let script = format!("cat > /dev/null\ncat <<'EOF'\n{TWO_PAIRS}EOF\n");
            let (_dir, engine) = scripted_engine(&script);
            assert_eq!(design(&engine).unwrap().pair_count(), 2);
        }

        #[test]
        fn input_record_reaches_the_engine() {
            let script = "grep -q '^PRIMER_GC_CLAMP=2$' && printf 'PRIMER_PAIR_NUM_RETURNED=0\\n=\\n'";
            let (_dir, engine) = scripted_engine(script);
            assert_eq!(design(&engine).unwrap(), EngineOutcome::NoPairs);
        }

        #[test]
        fn non_zero_exit_is_a_tool_failure() {
            let (_dir, engine) = scripted_engine("cat > /dev/null\necho boom >&2\nexit 3\n");
            let err = design(&engine).unwrap_err();
            assert!(matches!(
                err,
                EngineError::ToolFailed { status: Some(3), ref stderr } if stderr == "boom"
            ));
        }

        #[test]
        fn reported_error_wins_over_exit_status() {
            let (_dir, engine) = scripted_engine(
                "cat > /dev/null\nprintf 'PRIMER_ERROR=bad input\\n=\\n'\nexit 255\n",
            );
            assert!(matches!(design(&engine), Err(EngineError::Reported(_))));
        }

        #[test]
        fn missing_executable_is_reported_as_not_found() {
            let engine = Primer3Engine::with_executable("/nonexistent/primer3_core");
            assert!(matches!(
                design(&engine),
                Err(EngineError::ToolNotFound { .. })
            ));
        }

        #[test]
        fn empty_output_is_malformed() {
            let (_dir, engine) = scripted_engine("cat > /dev/null\n");
            assert!(matches!(
                design(&engine),
                Err(EngineError::MalformedOutput(_))
            ));
        }
    }
}

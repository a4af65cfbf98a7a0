use crate::cli::DesignArgs;
use crate::config::PartialConfig;
use crate::error::Result;
use crate::utils::input::resolve_sequence;
use crate::utils::output;
use crate::utils::progress::CliProgressHandler;
use primerforge::PrimerDesigner;
use primerforge::engine::progress::ProgressReporter;
use std::fs::File;
use std::io::{self, BufWriter};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Design,
    Troubleshoot,
}

pub fn run(args: DesignArgs, mode: Mode) -> Result<()> {
    let partial_config = PartialConfig::load(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;

    let sequence = resolve_sequence(args.sequence.as_deref(), args.input.as_deref())?;
    let engine = config.engine();
    info!("Using primer3 executable {:?}", engine.executable());
    let designer = PrimerDesigner::new(engine);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let result = match mode {
        Mode::Design => designer.design_with_progress(&sequence, &config.overrides, &reporter)?,
        Mode::Troubleshoot => {
            designer.troubleshoot_with_progress(&sequence, &config.overrides, &reporter)?
        }
    };

    info!(
        "Workflow finished, received {} primer pair(s).",
        result.num_returned()
    );
    if result.is_empty() {
        warn!("Design completed but found no primer pairs.");
    }

    match &args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            output::render(&result, args.format, &mut writer)?;
            eprintln!(
                "Wrote {} primer pair(s) to {}",
                result.num_returned(),
                path.display()
            );
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            output::render(&result, args.format, &mut writer)?;
        }
    }

    Ok(())
}

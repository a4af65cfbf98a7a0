use crate::cli::ServeArgs;
use crate::config::PartialConfig;
use crate::error::Result;
use crate::mcp::{McpServer, run_stdio_server};
use primerforge::PrimerDesigner;
use tracing::info;

pub fn run(args: ServeArgs) -> Result<()> {
    let config = PartialConfig::load(args.config.as_deref())?.merge_with_serve(&args)?;
    let engine = config.engine();
    info!(
        "Serving MCP tools over stdio with primer3 executable {:?}",
        engine.executable()
    );

    let server = McpServer::new(PrimerDesigner::new(engine), config.overrides);
    run_stdio_server(&server)
}

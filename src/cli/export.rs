//! The `export` subcommand.

use crate::cli::ExportArgs;
use crate::config::Config;
use crate::document::SvgDocument;
use crate::export::{ExportOptions, ExportOutcome, InkscapeRenderer, THUMBS_LABEL, run_export};
use crate::logger::set_verbose;
use crate::{debug, log};
use anyhow::{Context, Result};

pub fn run(args: &ExportArgs, config: &Config) -> Result<()> {
    set_verbose(args.verbose);

    let output_dir = args
        .output_directory
        .clone()
        .or_else(|| config.export.output_dir.clone())
        .context("no output directory: pass --output-directory or set export.output_dir in thumbex.toml")?;

    let command = args
        .renderer
        .clone()
        .unwrap_or_else(|| config.export.command.clone());
    let renderer = InkscapeRenderer::new(command);
    renderer.ensure_available()?;
    debug!("export"; "renderer: {}", renderer.command());
    if let Some(path) = &config.config_path {
        debug!("export"; "config: {}", path.display());
    }

    let doc = SvgDocument::load(&args.input)?;
    debug!("export"; "loaded {} ({} bytes)", args.input.display(), doc.data().len());

    let opts = ExportOptions::new(output_dir).keep_going(args.keep_going);

    match run_export(&doc, &renderer, &opts)? {
        // Reported, not raised: a document without the layer is a quiet no-op
        ExportOutcome::ContainerNotFound => {
            log!(
                "export";
                "layer `{}` not found in {}; nothing to export",
                THUMBS_LABEL,
                args.input.display()
            );
            Ok(())
        }
        ExportOutcome::Complete { artifacts } => {
            log!(
                "export";
                "{} thumbnail{} written to {}",
                artifacts.len(),
                if artifacts.len() == 1 { "" } else { "s" },
                opts.output_dir.display()
            );
            Ok(())
        }
    }
}

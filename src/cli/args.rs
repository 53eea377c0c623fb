//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Thumbex: export Inkscape thumbnail groups, serve the results locally
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: thumbex.toml)
    #[arg(short = 'C', long, default_value = "thumbex.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Export every group in the document's `_thumbs` layer to its own SVG file
    #[command(visible_alias = "e")]
    Export {
        #[command(flatten)]
        args: ExportArgs,
    },

    /// Serve a directory over HTTP with permissive CORS headers
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        args: ServeArgs,
    },
}

/// Export command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct ExportArgs {
    /// Input SVG document
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Directory to save exported SVGs (required here or in thumbex.toml)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output_directory: Option<PathBuf>,

    /// Renderer executable to invoke (overrides export.command)
    #[arg(short, long)]
    pub renderer: Option<String>,

    /// Attempt the remaining groups when one export fails
    #[arg(short, long)]
    pub keep_going: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

/// Serve command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Directory to serve (default: serve.root from config, or the current directory)
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<IpAddr>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[allow(unused)]
impl Cli {
    pub const fn is_export(&self) -> bool {
        matches!(self.command, Commands::Export { .. })
    }
    pub const fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve { .. })
    }
}

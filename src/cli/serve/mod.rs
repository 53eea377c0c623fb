//! Static file server with permissive cross-origin headers.
//!
//! Serves one directory for local development; browsers on any origin
//! may GET the files. Nothing here is specific to thumbnails - it is a
//! plain directory server with a fixed header set.

mod path;
mod response;

use crate::cli::ServeArgs;
use crate::config::Config;
use crate::logger::set_verbose;
use crate::{debug, log};
use anyhow::{Context, Result, bail};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tiny_http::{Method, Request, Server};

/// Ports tried in sequence when the requested one is taken.
const PORT_RANGE: u16 = 10;

/// Request handler threads.
const HANDLER_THREADS: usize = 4;

pub fn run(args: &ServeArgs, config: &Config) -> Result<()> {
    set_verbose(args.verbose);

    let root = args
        .root
        .clone()
        .or_else(|| config.serve.root.clone())
        .map_or_else(std::env::current_dir, Ok)
        .context("cannot determine directory to serve")?;
    if !root.is_dir() {
        bail!("directory not found at `{}`", root.display());
    }
    let root = root
        .canonicalize()
        .with_context(|| format!("cannot resolve `{}`", root.display()))?;

    let interface = args.interface.unwrap_or(config.serve.interface);
    let port = args.port.unwrap_or(config.serve.port);

    let (server, addr) = bind_listener(interface, port)?;
    let server = Arc::new(server);
    crate::core::register_server(Arc::clone(&server));

    log!("serve"; "serving {} at http://{}", root.display(), addr);
    log!("serve"; "cross-origin requests allowed from any origin");

    run_request_loop(&server, &root);
    Ok(())
}

/// Bind the listener, walking up the port range when ports are busy.
fn bind_listener(interface: std::net::IpAddr, requested: u16) -> Result<(Server, SocketAddr)> {
    let last = requested.saturating_add(PORT_RANGE - 1);
    let mut error = None;

    for port in requested..=last {
        let addr = SocketAddr::new(interface, port);
        match Server::http(addr) {
            Ok(server) => {
                if port != requested {
                    log!("serve"; "port {requested} is busy, bound {port} instead");
                }
                return Ok((server, addr));
            }
            Err(e) => error = Some(e),
        }
    }

    bail!(
        "no free port between {requested} and {last}: {}",
        error.map_or_else(String::new, |e| e.to_string())
    )
}

/// Accept loop. Returns when Ctrl+C unblocks the server.
fn run_request_loop(server: &Server, root: &Path) {
    // Handle requests on a small pool so one slow read never stalls the rest
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(HANDLER_THREADS)
        .build()
        .expect("failed to create thread pool");

    for request in server.incoming_requests() {
        if crate::core::is_shutdown() {
            break;
        }
        let root = root.to_path_buf();
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &root) {
                log!("serve"; "request error: {e}");
            }
        });
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, root: &Path) -> Result<()> {
    debug!("serve"; "{} {}", request.method(), request.url());

    match request.method() {
        Method::Options => response::respond_preflight(request),
        Method::Get | Method::Head => match path::resolve(request.url(), root) {
            Some(file) => response::respond_file(request, &file),
            None => response::respond_not_found(request),
        },
        _ => response::respond_method_not_allowed(request),
    }
}

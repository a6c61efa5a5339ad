//! Development HTTP server.
//!
//! Serves the build output over `tiny_http` with the resolution rules a
//! generated blog relies on: `index.html` for directories, a `.html`
//! fallback for extensionless pretty URLs, a generated listing for bare
//! directories, and `If-Modified-Since` conditional GETs at seconds
//! precision.
//!
//! Requests are handled one at a time on the main thread; the file
//! watcher rebuilds on its own thread. I/O errors while serving a file
//! become `404` responses, never a crash.

use crate::{config::SiteConfig, log, watch::watch_for_changes_blocking};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::{
    borrow::Cow,
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::SystemTime,
};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

/// Directory listing shell; `{path}` and `{entries}` are substituted.
const LISTING_TEMPLATE: &str = "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Index of /{path}</title></head>\n<body>\n<h1>Index of /{path}</h1>\n<ul>\n{entries}\n</ul>\n</body>\n</html>\n";

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the development server with optional file watching.
///
/// Binds the configured interface (retrying on port conflicts), installs a
/// Ctrl+C handler, spawns the watcher thread when enabled, and blocks on
/// the request loop until interrupted. On shutdown the watcher is signaled
/// and joined before returning.
pub fn serve_site(config: &'static SiteConfig) -> Result<()> {
    let interface: std::net::IpAddr = config.serve.interface.parse()?;

    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);
    let shutdown = Arc::new(AtomicBool::new(false));

    let server_for_signal = Arc::clone(&server);
    let shutdown_for_signal = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        shutdown_for_signal.store(true, Ordering::SeqCst);
        server_for_signal.unblock();
    })
    .context("failed to set Ctrl+C handler")?;

    log!("serve"; "http://{addr}");

    let watcher = if config.serve.watch {
        let flag = Arc::clone(&shutdown);
        Some(std::thread::spawn(move || {
            if let Err(err) = watch_for_changes_blocking(config, flag) {
                log!("watch"; "{err:#}");
            }
        }))
    } else {
        None
    };

    // Blocks until the Ctrl+C handler unblocks the server
    for request in server.incoming_requests() {
        if let Err(err) = handle_request(request, &config.build.output) {
            log!("serve"; "request error: {err}");
        }
    }

    shutdown.store(true, Ordering::SeqCst);
    if let Some(handle) = watcher {
        handle.join().ok();
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: std::net::IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < max_retries => continue,
            Err(err) => {
                return Err(anyhow::anyhow!(
                    "failed to bind after {} attempts (ports {}-{}): {}",
                    max_retries,
                    base_port,
                    port,
                    err
                ));
            }
        }
    }
    unreachable!()
}

// ============================================================================
// Request Resolution
// ============================================================================

/// Outcome of mapping a request path onto the output tree.
#[derive(Debug, PartialEq)]
enum Resolution {
    /// Directory requested without a trailing slash.
    Redirect(String),
    File(PathBuf),
    /// Directory with no index file; generate a listing.
    Listing(PathBuf, String),
    NotFound,
}

/// Map a request URL onto the output tree.
///
/// The URL is percent-decoded, stripped of any query string, and reduced
/// to plain path components (no `..` escape hatch) before the lookup.
/// Directories demand a trailing slash (redirect otherwise) and resolve to
/// their index file when one exists; extensionless paths get `.html`
/// appended before lookup; a trailing slash on a non-directory is a miss.
fn resolve(serve_root: &Path, url: &str) -> Resolution {
    let decoded = urlencoding::decode(url)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| url.to_owned());
    let url_path = decoded.split('?').next().unwrap_or_default();
    let local = serve_root.join(sanitize(url_path));

    if local.is_dir() {
        if !url_path.ends_with('/') {
            return Resolution::Redirect(format!("{url_path}/"));
        }
        for index in ["index.html", "index.htm"] {
            let candidate = local.join(index);
            if candidate.is_file() {
                return Resolution::File(candidate);
            }
        }
        return Resolution::Listing(local, url_path.trim_matches('/').to_owned());
    }

    if url_path.ends_with('/') {
        return Resolution::NotFound;
    }

    let local = if local.extension().is_none() {
        local.with_extension("html")
    } else {
        local
    };
    if local.is_file() {
        Resolution::File(local)
    } else {
        Resolution::NotFound
    }
}

/// Reduce a decoded URL path to plain components.
///
/// Root, `.` and `..` segments are discarded so the joined path can never
/// leave the serve root, whatever the request encodes.
fn sanitize(url_path: &str) -> PathBuf {
    use std::path::Component;

    Path::new(url_path)
        .components()
        .filter(|component| matches!(component, Component::Normal(_)))
        .collect()
}

/// Handle a single HTTP request against the output tree.
///
/// `tiny_http` suppresses response bodies for `HEAD` itself, so both
/// methods share one path here.
fn handle_request(request: Request, serve_root: &Path) -> Result<()> {
    if !matches!(request.method(), Method::Get | Method::Head) {
        let response = Response::empty(StatusCode(405));
        request.respond(response)?;
        return Ok(());
    }

    match resolve(serve_root, request.url()) {
        Resolution::Redirect(location) => {
            let response = Response::empty(StatusCode(301))
                .with_header(Header::from_bytes("Location", location).unwrap());
            request.respond(response)?;
            Ok(())
        }
        Resolution::File(path) => serve_file(request, &path),
        Resolution::Listing(dir, rel) => match directory_listing(&dir, &rel) {
            Ok(listing) => serve_html(request, listing),
            Err(_) => serve_not_found(request),
        },
        Resolution::NotFound => serve_not_found(request),
    }
}

// ============================================================================
// Response Helpers
// ============================================================================

/// Serve a file, honoring `If-Modified-Since` at seconds precision.
fn serve_file(request: Request, path: &Path) -> Result<()> {
    let Ok(content) = fs::read(path) else {
        return serve_not_found(request);
    };
    let mtime = fs::metadata(path).and_then(|meta| meta.modified()).ok();

    // If-None-Match takes precedence per RFC 7232; we emit no ETags, so a
    // request carrying one falls through to a full response.
    if let (Some(mtime), Some(since)) = (mtime, if_modified_since(&request))
        && not_modified(mtime, since)
    {
        request.respond(Response::empty(StatusCode(304)))?;
        return Ok(());
    }

    let mut response = Response::from_data(content)
        .with_header(Header::from_bytes("Content-Type", guess_content_type(path)).unwrap());
    if let Some(mtime) = mtime {
        response = response.with_header(
            Header::from_bytes("Last-Modified", http_date(mtime)).unwrap(),
        );
    }
    request.respond(response)?;
    Ok(())
}

fn serve_html(request: Request, content: String) -> Result<()> {
    let response = Response::from_string(content)
        .with_header(Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap());
    request.respond(response)?;
    Ok(())
}

fn serve_not_found(request: Request) -> Result<()> {
    let response = Response::from_string("404 Not Found")
        .with_status_code(StatusCode(404))
        .with_header(Header::from_bytes("Content-Type", "text/plain").unwrap());
    request.respond(response)?;
    Ok(())
}

// ============================================================================
// Conditional GET
// ============================================================================

/// Extract a usable `If-Modified-Since` value from the request.
fn if_modified_since(request: &Request) -> Option<&str> {
    // HeaderField::equiv wants a 'static name
    let find = |name: &'static str| {
        request
            .headers()
            .iter()
            .find(|header| header.field.equiv(name))
    };
    if find("If-None-Match").is_some() {
        return None;
    }
    find("If-Modified-Since").map(|header| header.value.as_str())
}

/// True when the file has not changed since the client's cached copy.
///
/// HTTP dates carry no sub-second part, so the comparison truncates the
/// mtime to whole seconds. Malformed dates are ignored.
fn not_modified(mtime: SystemTime, if_modified_since: &str) -> bool {
    let Ok(since) = DateTime::parse_from_rfc2822(if_modified_since) else {
        return false;
    };
    DateTime::<Utc>::from(mtime).timestamp() <= since.timestamp()
}

/// Format a timestamp as an IMF-fixdate (RFC 7231 HTTP date).
fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        // Web content
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        // Documents
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",

        _ => "application/octet-stream",
    }
}

// ============================================================================
// Directory Listing
// ============================================================================

/// Generate an HTML listing for a directory with no index file.
///
/// Hidden entries are skipped; directory links carry a trailing slash so
/// they resolve without a redirect.
fn directory_listing(dir: &Path, request_path: &str) -> std::io::Result<String> {
    let mut entries: Vec<String> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let suffix = if entry.file_type()?.is_dir() { "/" } else { "" };
        let href = if request_path.is_empty() {
            format!("/{name}{suffix}")
        } else {
            format!("/{request_path}/{name}{suffix}")
        };
        entries.push(format!(r#"<li><a href="{href}">{name}{suffix}</a></li>"#));
    }
    entries.sort();

    Ok(LISTING_TEMPLATE
        .replace("{path}", request_path)
        .replace("{entries}", &entries.join("\n")))
}

// ============================================================================
// Tests
// ============================================================================

//! # Renderer Bridge
//!
//! Pipes DOT text into Graphviz and opens the produced file.
//!
//! The graph itself never touches processes; a failed render leaves it
//! exactly as it was.

use dotgraph_core::{DotGraphError, Graph};
use std::ffi::OsString;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Environment variable overriding the Graphviz program.
pub const DOT_PROGRAM_ENV: &str = "DOTGRAPH_DOT";

/// Default Graphviz program.
pub const DEFAULT_DOT_PROGRAM: &str = "dot";

/// Default output format.
pub const DEFAULT_FORMAT: &str = "svg";

// =============================================================================
// OPTIONS
// =============================================================================

/// How and where to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Output path without extension.
    pub output: PathBuf,
    /// Graphviz output format, also used as the file extension.
    pub format: String,
    /// Open the result in the platform viewer.
    pub show: bool,
    /// Graphviz program to run.
    pub program: String,
}

impl RenderOptions {
    /// Options for `output` with the default format, no viewer, and the
    /// program from `DOTGRAPH_DOT` (falling back to `dot`).
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            format: DEFAULT_FORMAT.to_string(),
            show: false,
            program: std::env::var(DOT_PROGRAM_ENV)
                .unwrap_or_else(|_| DEFAULT_DOT_PROGRAM.to_string()),
        }
    }

    /// `<output>.<format>`
    pub fn out_file(&self) -> PathBuf {
        let mut name = OsString::from(self.output.as_os_str());
        name.push(".");
        name.push(&self.format);
        PathBuf::from(name)
    }
}

// =============================================================================
// RENDERING
// =============================================================================

/// Serialize `graph` and render it. Returns the written file.
pub fn render(graph: &Graph, options: &RenderOptions) -> Result<PathBuf, DotGraphError> {
    render_dot(&graph.serialize(), options)
}

/// Run the Graphviz program on `dot`, blocking until it exits.
pub fn render_dot(dot: &str, options: &RenderOptions) -> Result<PathBuf, DotGraphError> {
    let out_file = options.out_file();
    tracing::info!(
        program = %options.program,
        format = %options.format,
        output = %out_file.display(),
        "rendering graph"
    );

    let failed = |reason: String| {
        DotGraphError::RenderFailed(format!("{}: {}", options.program, reason))
    };

    let mut child = Command::new(&options.program)
        .arg(format!("-T{}", options.format))
        .arg(format!("-o{}", out_file.display()))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| failed(e.to_string()))?;

    if let Some(mut stdin) = child.stdin.take() {
        match stdin.write_all(dot.as_bytes()) {
            Ok(()) => {}
            // The renderer quit before reading everything; its exit status
            // and stderr below say why.
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                tracing::debug!(error = %e, "renderer closed its input early");
            }
            Err(e) => return Err(failed(e.to_string())),
        }
        // stdin drops here so the child sees EOF
    }

    let output = child.wait_with_output().map_err(|e| failed(e.to_string()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(failed(format!(
            "exit code {}: {}",
            output.status.code().unwrap_or(-1),
            stderr.trim()
        )));
    }

    if options.show {
        show(&out_file);
    }
    Ok(out_file)
}

/// Open `path` in the platform viewer. Fire-and-forget: failures are
/// logged, not propagated.
pub fn show(path: &Path) {
    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]).arg(path);
        c
    } else if cfg!(target_os = "macos") {
        let mut c = Command::new("open");
        c.arg(path);
        c
    } else {
        let mut c = Command::new("xdg-open");
        c.arg(path);
        c
    };
    command.stdout(Stdio::null()).stderr(Stdio::null());
    match command.spawn() {
        Ok(_) => tracing::debug!(path = %path.display(), "opened viewer"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "viewer failed to start"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_file_appends_format() {
        let mut options = RenderOptions::new("out/graph");
        assert_eq!(options.out_file(), PathBuf::from("out/graph.svg"));
        options.format = "png".to_string();
        assert_eq!(options.out_file(), PathBuf::from("out/graph.png"));
    }

    #[test]
    fn missing_program_is_render_failure() {
        let mut options = RenderOptions::new("unused");
        options.program = "dotgraph-no-such-renderer".to_string();
        let result = render(&Graph::new(), &options);
        assert!(matches!(result, Err(DotGraphError::RenderFailed(_))));
    }

    #[cfg(unix)]
    #[test]
    fn early_exit_reports_status_not_closed_pipe() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut options = RenderOptions::new(dir.path().join("graph"));
        options.program = "false".to_string();
        // Larger than any pipe buffer, so the write outlives the renderer.
        let dot = "x".repeat(8 * 1024 * 1024);

        let result = render_dot(&dot, &options);
        assert!(
            matches!(&result, Err(DotGraphError::RenderFailed(reason)) if reason.contains("exit code 1")),
            "{:?}",
            result
        );
    }
}

//! Running the external converters.

use crate::config::ExternalTools;
use crate::error::{Error, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Outcome of a finished external command.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Run `command`, killing it once `timeout` has passed.
pub fn run_with_timeout(mut command: Command, timeout: Duration) -> Result<CommandOutput> {
    let program = command.get_program().to_string_lossy().into_owned();
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::External(format!("failed to start {}: {}", program, e)))?;

    // stderr must be drained while the child runs
    let stderr_reader = child.stderr.take().map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = String::new();
            let _ = pipe.read_to_string(&mut buf);
            buf
        })
    });

    let start = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if start.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::External(format!(
                "{} timed out after {}s",
                program,
                timeout.as_secs()
            )));
        }
        std::thread::sleep(POLL_INTERVAL);
    };

    let stderr = stderr_reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    debug!(program = %program, status = %status, "external command finished");
    Ok(CommandOutput { status, stderr })
}

/// Convert a document with `soffice --headless --convert-to <filter>` into
/// `out_dir`.
pub fn soffice_convert(
    soffice: &Path,
    input: &Path,
    filter: &str,
    out_dir: &Path,
    timeout: Duration,
) -> Result<CommandOutput> {
    let mut command = Command::new(soffice);
    command
        .arg("--headless")
        .arg("--convert-to")
        .arg(filter)
        .arg("--outdir")
        .arg(out_dir)
        .arg(input);
    run_with_timeout(command, timeout)
}

/// Render every slide of `pptx` to `slide-*.png` files in `out_dir`, in
/// slide order.
pub fn render_slides(
    tools: &ExternalTools,
    pptx: &Path,
    out_dir: &Path,
    dpi: u32,
    convert_timeout: Duration,
    raster_timeout: Duration,
) -> Result<Vec<PathBuf>> {
    let soffice = tools
        .soffice
        .as_deref()
        .ok_or_else(|| Error::Render("soffice (LibreOffice) was not found".to_string()))?;

    let pdf_dir = tempfile::tempdir()?;
    let output = soffice_convert(soffice, pptx, "pdf", pdf_dir.path(), convert_timeout)?;
    if !output.success() {
        return Err(Error::Render(format!(
            "Failed to convert to PDF: {}",
            output.stderr.trim()
        )));
    }
    let stem = pptx
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let pdf = pdf_dir.path().join(format!("{}.pdf", stem));
    if !pdf.is_file() {
        return Err(Error::Render(
            "PDF conversion failed - output file not created".to_string(),
        ));
    }

    std::fs::create_dir_all(out_dir)?;
    if let Some(pdftoppm) = tools.pdftoppm.as_deref() {
        let mut command = Command::new(pdftoppm);
        command
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg(&pdf)
            .arg(out_dir.join("slide"));
        match run_with_timeout(command, raster_timeout) {
            Ok(out) if out.success() => {
                let images = slide_images(out_dir)?;
                if !images.is_empty() {
                    return Ok(images);
                }
            }
            Ok(out) => warn!(stderr = %out.stderr.trim(), "pdftoppm failed"),
            Err(e) => warn!(error = %e, "pdftoppm failed"),
        }
    }

    if let Some(convert) = tools.convert.as_deref() {
        let mut command = Command::new(convert);
        command
            .arg("-density")
            .arg(dpi.to_string())
            .arg(&pdf)
            .arg(out_dir.join("slide-%02d.png"));
        match run_with_timeout(command, raster_timeout) {
            Ok(out) if out.success() => {
                let images = slide_images(out_dir)?;
                if !images.is_empty() {
                    return Ok(images);
                }
            }
            Ok(out) => warn!(stderr = %out.stderr.trim(), "convert failed"),
            Err(e) => warn!(error = %e, "convert failed"),
        }
    }

    Err(Error::Render(
        "Could not render slides to images. Please install pdftoppm (poppler-utils) or ImageMagick."
            .to_string(),
    ))
}

/// `slide-*.png` files in `dir`, ordered by page number.
pub fn slide_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images: Vec<(u32, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?;
            let number = name.strip_prefix("slide-")?.strip_suffix(".png")?;
            Some((number.parse().ok()?, path))
        })
        .collect();
    images.sort_by_key(|(n, _)| *n);
    Ok(images.into_iter().map(|(_, p)| p).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_images_numeric_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["slide-10.png", "slide-2.png", "slide-01.png", "other.png", "slide-x.png"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let names: Vec<String> = slide_images(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["slide-01.png", "slide-2.png", "slide-10.png"]);
    }

    #[test]
    fn test_missing_soffice() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_slides(
            &ExternalTools::default(),
            &dir.path().join("deck.pptx"),
            dir.path(),
            150,
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_with_timeout_kills() {
        let mut command = Command::new("sleep");
        command.arg("5");
        let err = run_with_timeout(command, Duration::from_millis(200)).unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_run_missing_program() {
        let command = Command::new("definitely-not-a-real-program-xyz");
        assert!(matches!(
            run_with_timeout(command, Duration::from_secs(1)),
            Err(Error::External(_))
        ));
    }
}

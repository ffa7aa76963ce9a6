//! Thumbnail grids of a presentation's slides.
//!
//! Slides are rendered through LibreOffice (to PDF) and then rasterized with
//! `pdftoppm`, falling back to ImageMagick. Up to 60 thumbnails go into each
//! grid image.

pub mod grid;
pub mod render;

use crate::config::{ExternalTools, ThumbnailOptions};
use crate::error::{Error, Result};
use crate::presentation::text;
use crate::presentation::{Presentation, Rect};
use grid::{GridLayout, Outlines};
use image::ImageFormat;
use std::path::{Path, PathBuf};
use tracing::info;

/// Render `pptx_path` and write one or more grid images.
pub fn create_thumbnail_grids(
    pptx_path: impl AsRef<Path>,
    options: &ThumbnailOptions,
    tools: &ExternalTools,
) -> Result<Vec<PathBuf>> {
    let pptx_path = pptx_path.as_ref();
    if !pptx_path.is_file() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("PowerPoint file not found: {}", pptx_path.display()),
        )));
    }

    let pres = Presentation::open(pptx_path)?;
    let (slide_width, slide_height) = pres.slide_size();
    let (thumb_width, thumb_height) = options.thumb_size(slide_width, slide_height);
    let layout = GridLayout {
        cols: options.columns(),
        thumb_width,
        thumb_height,
    };

    let scratch = tempfile::tempdir()?;
    let images = render::render_slides(
        tools,
        pptx_path,
        scratch.path(),
        options.dpi,
        options.convert_timeout,
        options.raster_timeout,
    )?;
    if images.is_empty() {
        return Err(Error::Render("No slide images were rendered".to_string()));
    }

    let bounds = if options.outline_placeholders {
        text_shape_bounds(&pres)?
    } else {
        Vec::new()
    };
    let outlines = options.outline_placeholders.then_some(Outlines {
        bounds: &bounds,
        slide_width,
        slide_height,
    });

    write_grids(&images, &layout, &options.output_prefix, options.max_per_grid, outlines)
}

/// Compose `images` into grids of at most `per_grid` thumbnails each.
pub fn write_grids(
    images: &[PathBuf],
    layout: &GridLayout,
    prefix: &str,
    per_grid: usize,
    outlines: Option<Outlines<'_>>,
) -> Result<Vec<PathBuf>> {
    let chunks: Vec<&[PathBuf]> = images.chunks(per_grid.max(1)).collect();
    let mut written = Vec::with_capacity(chunks.len());
    for (k, chunk) in chunks.iter().enumerate() {
        let output = grid_path(prefix, k, chunks.len());
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let first_slide = k * per_grid.max(1);
        let image = grid::compose_grid(chunk, layout, first_slide, outlines);
        image.save_with_format(&output, ImageFormat::Png)?;
        info!(path = %output.display(), thumbnails = chunk.len(), "grid written");
        written.push(output);
    }
    Ok(written)
}

/// `<prefix>.png` for a single grid, `<prefix>-<k>.png` (1-based) otherwise.
pub fn grid_path(prefix: &str, index: usize, total: usize) -> PathBuf {
    if total > 1 {
        PathBuf::from(format!("{}-{}.png", prefix, index + 1))
    } else {
        PathBuf::from(format!("{}.png", prefix))
    }
}

/// Bounds of top-level shapes with visible text, per slide.
pub fn text_shape_bounds(pres: &Presentation) -> Result<Vec<Vec<Rect>>> {
    let mut all = Vec::new();
    for slide in pres.slides()? {
        let ctx = pres.context(&slide);
        let mut shapes = slide.shapes();
        ctx.resolve(&mut shapes);
        let bounds = shapes
            .iter()
            .filter(|s| s.is_top_level() && s.has_text_frame)
            .filter(|s| {
                slide
                    .shape_element(s)
                    .and_then(|e| e.child("txBody"))
                    .is_some_and(|body| !text::frame_text(body).trim().is_empty())
            })
            .map(|s| s.bounds)
            .collect();
        all.push(bounds);
    }
    Ok(all)
}

/// The summary line for written grids.
pub fn summary(paths: &[PathBuf]) -> String {
    let lines: Vec<String> = paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect();
    format!("Created {} grid(s):\n{}", paths.len(), lines.join("\n"))
}

#![cfg(feature = "web")]
//! Bar chart rendering
//!
//! Charts are drawn with plotters' bitmap backend straight into an in-memory RGB
//! buffer, so rendering never needs a display surface, a window or a scratch
//! file. The buffer is PNG-encoded with `image` and handed to the page as base64.

use crate::config::ChartConfig;
use crate::error::{DashboardError, Result};
use crate::transform::Aggregation;
use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageOutputFormat, RgbImage};
use plotters::prelude::*;
use plotters::style::{FontStyle, FontTransform, register_font};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Family name chart text is registered and drawn under
const FONT_FAMILY: &str = "sans-serif";

/// A rendered chart, base64 encoded
#[derive(Clone, Debug, PartialEq)]
pub struct ChartImage {
    pub png_base64: String,
}

impl ChartImage {
    pub fn from_png(png: &[u8]) -> Self {
        ChartImage {
            png_base64: general_purpose::STANDARD.encode(png),
        }
    }

    /// `data:` URI for an `<img src=...>` attribute
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.png_base64)
    }

    pub fn is_empty(&self) -> bool {
        self.png_base64.is_empty()
    }
}

fn chart_err<E: std::fmt::Display>(err: E) -> DashboardError {
    DashboardError::Chart(err.to_string())
}

/// Y-axis range covering every bar plus some headroom, always including zero
fn value_bounds(values: &[f64]) -> (f64, f64) {
    let max = values.iter().cloned().fold(0.0_f64, f64::max);
    let min = values.iter().cloned().fold(0.0_f64, f64::min);
    if max == 0.0 && min == 0.0 {
        return (0.0, 1.0);
    }
    (min * 1.1, max * 1.1)
}

/// Room below the plot for the rotated category labels
fn label_area_size(labels: &[String]) -> u32 {
    let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
    (longest * 8 + 16).clamp(40, 180)
}

/// Fonts tried, in order, when no font was named at startup
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONT: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Register the TrueType font used for chart text
///
/// Runs once per process; later calls return the first result. With no usable
/// font, charts are still drawn but without title or labels.
///
/// # Arguments
/// * `preferred` - Font file to try before the built-in candidate list
///
/// # Returns
/// * `Option<&Path>` - The registered font file, if any
pub fn install_font(preferred: Option<&Path>) -> Option<&'static Path> {
    FONT.get_or_init(|| {
        let candidates = preferred
            .map(Path::to_path_buf)
            .into_iter()
            .chain(FONT_CANDIDATES.iter().map(PathBuf::from));

        for path in candidates {
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            // plotters keeps registered fonts for the life of the process
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
                Ok(()) => {
                    log::info!("chart font: {}", path.display());
                    return Some(path);
                }
                // ab_glyph's InvalidFont carries no message
                Err(_) => log::warn!("unusable font {}", path.display()),
            }
        }
        log::warn!("no chart font found, charts will be drawn without text");
        None
    })
    .as_deref()
}

/// Draw one vertical bar per category and return the PNG bytes
///
/// When text cannot be drawn (no font registered) the chart is redrawn with
/// bars only rather than failing the request.
///
/// # Arguments
/// * `labels` - Category names, one per bar, drawn rotated under the x axis
/// * `values` - Bar heights, same length as `labels`
/// * `options` - Title, y-axis label and pixel size
///
/// # Returns
/// * `Result<Vec<u8>>` - PNG image data, or `DashboardError::Chart`
pub fn render_bar_chart(labels: &[String], values: &[f64], options: &ChartConfig) -> Result<Vec<u8>> {
    if values.is_empty() || labels.len() != values.len() {
        return Err(DashboardError::Chart(format!(
            "expected one label per bar, got {} labels for {} values",
            labels.len(),
            values.len()
        )));
    }

    let pixels = match draw_bars(labels, values, options, true) {
        Ok(pixels) => pixels,
        Err(e) => {
            log::warn!("chart text failed ({}), drawing bars only", e);
            draw_bars(labels, values, options, false)?
        }
    };

    encode_png(pixels, options.width, options.height)
}

/// PNG-encode a packed RGB buffer
fn encode_png(pixels: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>> {
    let image = RgbImage::from_raw(width, height, pixels)
        .ok_or_else(|| DashboardError::Chart("pixel buffer size mismatch".to_string()))?;
    let mut png = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut png, ImageOutputFormat::Png)
        .map_err(chart_err)?;

    Ok(png.into_inner())
}

/// Rasterize the chart into a fresh RGB buffer
fn draw_bars(
    labels: &[String],
    values: &[f64],
    options: &ChartConfig,
    with_text: bool,
) -> Result<Vec<u8>> {
    let (width, height) = (options.width, options.height);
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let (y_min, y_max) = value_bounds(values);
        let bars = values.len() as u32;

        let mut builder = ChartBuilder::on(&root);
        builder.margin(15);
        if with_text {
            builder
                .caption(&options.title, (FONT_FAMILY, 28).into_font())
                .x_label_area_size(label_area_size(labels))
                .y_label_area_size(80);
        }
        let mut chart = builder
            .build_cartesian_2d((0u32..bars).into_segmented(), y_min..y_max)
            .map_err(chart_err)?;

        if with_text {
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(values.len())
                .x_label_style(
                    (FONT_FAMILY, 14)
                        .into_font()
                        .transform(FontTransform::Rotate90),
                )
                .x_label_formatter(&|segment| match segment {
                    SegmentValue::CenterOf(i) => {
                        labels.get(*i as usize).cloned().unwrap_or_default()
                    }
                    _ => String::new(),
                })
                .label_style((FONT_FAMILY, 14).into_font())
                .y_desc(&options.y_label)
                .draw()
                .map_err(chart_err)?;
        }

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(BLUE.filled())
                    .margin(12)
                    .data(values.iter().enumerate().map(|(i, v)| (i as u32, *v))),
            )
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }
    Ok(pixels)
}

/// Chart the configured column of an aggregation
pub fn chart_aggregation(
    aggregation: &Aggregation,
    column: &str,
    options: &ChartConfig,
) -> Result<ChartImage> {
    let values = aggregation
        .series(column)
        .ok_or_else(|| DashboardError::Chart(format!("'{}' was not aggregated", column)))?;
    let labels: Vec<String> = aggregation.keys().map(str::to_string).collect();

    let png = render_bar_chart(&labels, &values, options)?;
    log::debug!("rendered chart '{}': {} bytes of PNG", options.title, png.len());
    Ok(ChartImage::from_png(&png))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_always_include_zero() {
        assert_eq!(value_bounds(&[0.0, 0.0]), (0.0, 1.0));
        let (lo, hi) = value_bounds(&[100.0, 50.0]);
        assert_eq!(lo, 0.0);
        assert!(hi > 100.0);
        let (lo, hi) = value_bounds(&[-20.0, 10.0]);
        assert!(lo < -20.0);
        assert!(hi > 10.0);
    }

    #[test]
    fn mismatched_series_is_rejected() {
        let err = render_bar_chart(&["a".to_string()], &[1.0, 2.0], &ChartConfig::default());
        assert!(matches!(err, Err(DashboardError::Chart(_))));
    }

    #[test]
    fn renders_png_in_memory() {
        let labels = vec!["Contractor".to_string(), "Employee".to_string()];
        let png = render_bar_chart(&labels, &[850.0, 1600.0], &ChartConfig::default()).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn bars_only_chart_needs_no_font() {
        let options = ChartConfig::default();
        let labels = vec!["Sales".to_string(), "Ops".to_string(), "R&D".to_string()];
        let pixels = draw_bars(&labels, &[2000.25, 800.0, 1200.5], &options, false).unwrap();
        assert_eq!(pixels.len(), (options.width * options.height * 3) as usize);
        // Bars were drawn over the white background
        assert!(pixels.chunks(3).any(|px| px != [255u8, 255, 255]));

        let png = encode_png(pixels, options.width, options.height).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn short_pixel_buffer_is_a_chart_error() {
        let err = encode_png(vec![0u8; 12], 10, 10);
        assert!(matches!(err, Err(DashboardError::Chart(_))));
    }

    #[test]
    fn data_uri_prefix() {
        let image = ChartImage::from_png(&[0x89, b'P', b'N', b'G']);
        assert!(image.data_uri().starts_with("data:image/png;base64,"));
        assert_eq!(image.png_base64, "iVBORw==");
    }
}

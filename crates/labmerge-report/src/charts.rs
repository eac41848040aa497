//! PNG bar charts of the dataset summary.
//!
//! Bars are drawn with `imageproc`. Titles, category names, bar counts, the
//! y-axis maximum and the series legend are laid out as an SVG layer that
//! `resvg` rasterizes over the bars. Bar order follows the order of the
//! summary tables printed by the CLI. Each image is rendered and saved before
//! the next one is started, so only one canvas is alive at a time.

use std::path::{Path, PathBuf};

use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use resvg::tiny_skia::{self, Pixmap};
use resvg::usvg::{Options, Tree};
use tracing::{debug, info_span};

use crate::error::{ReportError, Result};
use crate::persist::ensure_dir;
use crate::summary::DatasetSummary;

const WIDTH: u32 = 960;
const HEIGHT: u32 = 540;
const MARGIN: i32 = 48;

const BACKGROUND: &str = "#ffffff";
const AXIS: &str = "#4a4a4a";
const PALETTE: [&str; 6] = [
    "#3b82f6", "#ef4444", "#f59e0b", "#14b8a6", "#8b5cf6", "#64748b",
];
const FONT_FAMILY: &str = "DejaVu Sans, Arial, Helvetica, sans-serif";

pub const GENDER_CHART: &str = "gender_distribution.png";
pub const DISEASE_CHART: &str = "disease_tests.png";
pub const AGE_CHART: &str = "age_distribution.png";

/// One group of bars sharing an x position.
#[derive(Debug, Clone, PartialEq)]
struct BarGroup {
    label: String,
    values: Vec<usize>,
}

/// Everything one image shows.
#[derive(Debug, Clone, PartialEq)]
struct Chart {
    title: &'static str,
    /// Series names, shown as a legend when there is more than one.
    series: &'static [&'static str],
    groups: Vec<BarGroup>,
}

/// Pixel geometry of one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bar {
    series: usize,
    value: usize,
    left: i32,
    width: i32,
    height: i32,
}

fn hex_to_rgba(hex: &str) -> Rgba<u8> {
    let hex = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
            .unwrap_or(0)
    };
    Rgba([channel(0..2), channel(2..4), channel(4..6), 255])
}

fn plot_bottom() -> i32 {
    HEIGHT as i32 - MARGIN
}

fn plot_width() -> i32 {
    WIDTH as i32 - 2 * MARGIN
}

fn plot_height() -> i32 {
    HEIGHT as i32 - 2 * MARGIN
}

fn max_value(groups: &[BarGroup]) -> usize {
    groups
        .iter()
        .flat_map(|group| group.values.iter().copied())
        .max()
        .unwrap_or(0)
}

/// Width of the x slot each group occupies.
fn slot_width(groups: usize) -> i32 {
    plot_width() / groups.max(1) as i32
}

/// Lays out every bar of every group, scaled to the largest value.
///
/// Returns one entry per group; a chart whose values are all zero has no
/// bars to scale against and yields empty groups.
fn layout_bars(groups: &[BarGroup]) -> Vec<Vec<Bar>> {
    let max = max_value(groups);
    if max == 0 {
        return vec![Vec::new(); groups.len()];
    }
    let slot = slot_width(groups.len());
    let gap = (slot / 5).max(1);
    groups
        .iter()
        .enumerate()
        .map(|(idx, group)| {
            let series = group.values.len().max(1) as i32;
            let width = ((slot - gap) / series).max(1);
            let slot_left = MARGIN + idx as i32 * slot + gap / 2;
            group
                .values
                .iter()
                .enumerate()
                .map(|(pos, value)| Bar {
                    series: pos,
                    value: *value,
                    left: slot_left + pos as i32 * width,
                    width,
                    height: (*value as f64 / max as f64 * plot_height() as f64).round() as i32,
                })
                .collect()
        })
        .collect()
}

fn summary_charts(summary: &DatasetSummary) -> [(&'static str, Chart); 3] {
    let genders = Chart {
        title: "Rows by gender",
        series: &["rows"],
        groups: summary
            .genders
            .iter()
            .map(|(gender, count)| BarGroup {
                label: gender.clone(),
                values: vec![*count],
            })
            .collect(),
    };
    let diseases = Chart {
        title: "Tests by disease",
        series: &["tested", "positive"],
        groups: summary
            .diseases
            .iter()
            .map(|disease| BarGroup {
                label: disease.disease.clone(),
                values: vec![disease.tested, disease.positive],
            })
            .collect(),
    };
    let ages = Chart {
        title: "Rows by age range",
        series: &["rows"],
        groups: summary
            .age_histogram
            .iter()
            .map(|bin| BarGroup {
                label: format!("{}-{}", bin.lower, bin.upper - 1),
                values: vec![bin.count],
            })
            .collect(),
    };
    [(GENDER_CHART, genders), (DISEASE_CHART, diseases), (AGE_CHART, ages)]
}

/// Renders every chart into `dir` and returns the written paths.
pub fn render_charts(summary: &DatasetSummary, dir: &Path) -> Result<Vec<PathBuf>> {
    let span = info_span!("charts", dir = %dir.display());
    let _guard = span.enter();

    ensure_dir(dir)?;

    let mut options = Options::default();
    options.fontdb_mut().load_system_fonts();
    debug!(faces = options.fontdb.len(), "fonts loaded");

    let mut written = Vec::with_capacity(3);
    for (file, chart) in summary_charts(summary) {
        let path = dir.join(file);
        let mut image = draw_bar_chart(&chart.groups);
        overlay_svg(&mut image, &labels_svg(&chart), &options)?;
        image.save(&path).map_err(|source| ReportError::Image {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), groups = chart.groups.len(), "chart written");
        written.push(path);
    }
    Ok(written)
}

/// Draws the axes and grouped bars. Series colours cycle through the palette
/// by position within a group.
fn draw_bar_chart(groups: &[BarGroup]) -> RgbaImage {
    let mut img: RgbaImage = ImageBuffer::from_pixel(WIDTH, HEIGHT, hex_to_rgba(BACKGROUND));
    let axis = hex_to_rgba(AXIS);
    let left = MARGIN;
    let bottom = plot_bottom();

    draw_line_segment_mut(
        &mut img,
        (left as f32, bottom as f32),
        ((left + plot_width()) as f32, bottom as f32),
        axis,
    );
    draw_line_segment_mut(
        &mut img,
        (left as f32, bottom as f32),
        (left as f32, (bottom - plot_height()) as f32),
        axis,
    );

    for bar in layout_bars(groups).iter().flatten() {
        if bar.height == 0 {
            continue;
        }
        draw_filled_rect_mut(
            &mut img,
            Rect::at(bar.left, bottom - bar.height).of_size(bar.width as u32, bar.height as u32),
            hex_to_rgba(PALETTE[bar.series % PALETTE.len()]),
        );
    }
    img
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn svg_text(x: i32, y: i32, size: u32, anchor: &str, fill: &str, text: &str) -> String {
    format!(
        "<text x=\"{x}\" y=\"{y}\" font-size=\"{size}\" text-anchor=\"{anchor}\" fill=\"{fill}\">{}</text>\n",
        escape_xml(text)
    )
}

/// Text layer of a chart, on a transparent canvas the size of the image.
fn labels_svg(chart: &Chart) -> String {
    let bottom = plot_bottom();
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" \
         viewBox=\"0 0 {WIDTH} {HEIGHT}\" font-family=\"{FONT_FAMILY}\">\n"
    );
    svg.push_str(&svg_text(MARGIN, 30, 20, "start", AXIS, chart.title));

    if chart.series.len() > 1 {
        let mut right = WIDTH as i32 - MARGIN;
        for (pos, name) in chart.series.iter().enumerate().rev() {
            let color = PALETTE[pos % PALETTE.len()];
            svg.push_str(&svg_text(right, 30, 14, "end", AXIS, name));
            right -= 8 * name.len() as i32 + 6;
            svg.push_str(&format!(
                "<rect x=\"{}\" y=\"19\" width=\"12\" height=\"12\" fill=\"{color}\"/>\n",
                right - 12
            ));
            right -= 24;
        }
    }

    let max = max_value(&chart.groups);
    svg.push_str(&svg_text(MARGIN - 6, MARGIN + 5, 12, "end", AXIS, &max.to_string()));
    svg.push_str(&svg_text(MARGIN - 6, bottom + 4, 12, "end", AXIS, "0"));

    let slot = slot_width(chart.groups.len());
    for (idx, (group, bars)) in chart
        .groups
        .iter()
        .zip(layout_bars(&chart.groups))
        .enumerate()
    {
        let center = MARGIN + idx as i32 * slot + slot / 2;
        svg.push_str(&svg_text(center, bottom + 20, 13, "middle", AXIS, &group.label));
        for bar in bars {
            let x = bar.left + bar.width / 2;
            let y = bottom - bar.height - 6;
            svg.push_str(&svg_text(x, y, 12, "middle", AXIS, &bar.value.to_string()));
        }
    }

    svg.push_str("</svg>\n");
    svg
}

/// Rasterizes `svg` and blends it over `img`.
///
/// Text without a matching system font is skipped by the rasterizer; the bars
/// are unaffected.
fn overlay_svg(img: &mut RgbaImage, svg: &str, options: &Options<'_>) -> Result<()> {
    let tree = Tree::from_str(svg, options).map_err(|err| ReportError::Svg {
        message: err.to_string(),
    })?;
    let mut pixmap = Pixmap::new(img.width(), img.height()).ok_or_else(|| ReportError::Svg {
        message: format!("cannot allocate a {}x{} canvas", img.width(), img.height()),
    })?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    // The pixmap holds premultiplied RGBA.
    for (pixel, src) in img.pixels_mut().zip(pixmap.data().chunks_exact(4)) {
        let alpha = u16::from(src[3]);
        if alpha == 0 {
            continue;
        }
        for channel in 0..3 {
            let dest = u16::from(pixel[channel]);
            pixel[channel] = (u16::from(src[channel]) + dest * (255 - alpha) / 255).min(255) as u8;
        }
    }
    Ok(())
}

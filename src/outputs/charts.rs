//! SVG chart rendering.
//!
//! Each chart plots one [`Metric`] against another for every author and is
//! written to `{chart_dir}/{slug-of-title}.svg`. Marks are drawn in the
//! author's colour from [`ColorAssignment`] and listed in a legend.
//!
//! Charts are drawn with the plotters SVG backend and its built-in font
//! metrics, so rendering needs no system fonts and works on headless hosts.

use crate::aggregate::Metric;
use crate::error::ReportError;
use crate::models::AuthorStats;
use crate::outputs::colors::{ColorAssignment, NamedColor};
use crate::utils::slugify_title;
use plotters::coord::ranged1d::{KeyPointHint, NoDefaultFormatting, Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use std::error::Error;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Pixel size of every chart.
pub const CHART_SIZE: (u32, u32) = (800, 600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// One bar per author, authors along the x axis.
    Bar,
    /// One point per author.
    Scatter,
}

/// What to plot and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    pub title: &'static str,
    pub kind: ChartKind,
    pub x: Metric,
    pub y: Metric,
    /// Write the author name next to each point.
    pub annotate: bool,
}

impl ChartSpec {
    pub fn bar(title: &'static str, y: Metric) -> Self {
        Self {
            title,
            kind: ChartKind::Bar,
            x: Metric::AuthorIndex,
            y,
            annotate: false,
        }
    }

    /// Scatter plot. Points are annotated unless authors already label the x axis.
    pub fn scatter(title: &'static str, x: Metric, y: Metric) -> Self {
        Self {
            title,
            kind: ChartKind::Scatter,
            x,
            y,
            annotate: x != Metric::AuthorIndex,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.svg", slugify_title(self.title))
    }
}

/// The chart set produced by a normal run.
pub fn default_charts() -> Vec<ChartSpec> {
    vec![
        ChartSpec::scatter("Average words per user", Metric::AuthorIndex, Metric::AvgWords),
        ChartSpec::scatter("Total images per user", Metric::AuthorIndex, Metric::TotalImages),
        ChartSpec::scatter(
            "Average words vs total images",
            Metric::TotalImages,
            Metric::AvgWords,
        ),
        ChartSpec::bar("Total words per user", Metric::TotalWords),
        ChartSpec::bar("Average images per user", Metric::AvgImages),
    ]
}

/// Render every chart in `specs` into `dir`.
///
/// # Returns
///
/// The paths of the written files, in `specs` order.
pub fn render_all(
    dir: &Path,
    specs: &[ChartSpec],
    stats: &[AuthorStats],
    colors: &ColorAssignment,
) -> Result<Vec<PathBuf>, ReportError> {
    specs
        .iter()
        .map(|spec| render_chart(dir, spec, stats, colors))
        .collect()
}

/// Render one chart into `dir`.
#[instrument(level = "info", skip_all, fields(chart = spec.title))]
pub fn render_chart(
    dir: &Path,
    spec: &ChartSpec,
    stats: &[AuthorStats],
    colors: &ColorAssignment,
) -> Result<PathBuf, ReportError> {
    let path = dir.join(spec.file_name());
    draw(&path, spec, stats, colors).map_err(|e| ReportError::Chart {
        chart: spec.title.to_string(),
        reason: e.to_string(),
    })?;
    info!(path = %path.display(), authors = stats.len(), "Wrote chart");
    Ok(path)
}

fn draw(
    path: &Path,
    spec: &ChartSpec,
    stats: &[AuthorStats],
    colors: &ColorAssignment,
) -> Result<(), Box<dyn Error>> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let xs = spec.x.values(stats);
    let ys = spec.y.values(stats);
    let by_author = spec.x == Metric::AuthorIndex;
    let x_range = if by_author {
        -0.5..(stats.len().max(1) as f64 - 0.5)
    } else {
        axis_range(&xs)
    };
    let x_ticks = if by_author {
        author_ticks(stats.len())
    } else {
        value_ticks(&x_range)
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(TickedAxis::new(x_range, x_ticks), axis_range(&ys))?;

    let x_label = |v: &f64| {
        if by_author {
            author_at(stats, *v).unwrap_or_default()
        } else {
            format_tick(*v)
        }
    };
    let mut mesh = chart.configure_mesh();
    mesh.x_desc(spec.x.label())
        .y_desc(spec.y.label())
        .x_label_formatter(&x_label);
    if by_author {
        mesh.disable_x_mesh();
    }
    mesh.draw()?;

    for (i, author) in stats.iter().enumerate() {
        let color = rgb(colors.color_of(&author.author));
        let (x, y) = (xs[i], ys[i]);
        let series = match spec.kind {
            ChartKind::Bar => chart.draw_series(std::iter::once(Rectangle::new(
                [(x - 0.35, 0.0), (x + 0.35, y)],
                color.filled(),
            )))?,
            ChartKind::Scatter => chart.draw_series(std::iter::once(
                EmptyElement::at((x, y))
                    + Circle::new((0, 0), 6, color.filled())
                    + Circle::new((0, 0), 6, BLACK.stroke_width(1)),
            ))?,
        };
        series
            .label(author.author.as_str())
            .legend(move |(lx, ly)| Circle::new((lx, ly), 5, color.filled()));

        if spec.annotate {
            chart.draw_series(std::iter::once(
                EmptyElement::at((x, y))
                    + Text::new(author.author.clone(), (8, -14), ("sans-serif", 12).into_font()),
            ))?;
        }
    }

    if !stats.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

/// Continuous f64 axis whose ticks are fixed up front, so plotters never
/// thins them out when there are many authors.
struct TickedAxis {
    inner: RangedCoordf64,
    ticks: Vec<f64>,
}

impl TickedAxis {
    fn new(range: Range<f64>, ticks: Vec<f64>) -> Self {
        Self {
            inner: range.into(),
            ticks,
        }
    }
}

impl Ranged for TickedAxis {
    type FormatOption = NoDefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.inner.map(value, limit)
    }

    // Light grid lines get no extra points.
    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        if hint.weight().allow_light_points() {
            Vec::new()
        } else {
            self.ticks.clone()
        }
    }

    fn range(&self) -> Range<f64> {
        self.inner.range()
    }
}

impl ValueFormatter<f64> for TickedAxis {
    fn format(value: &f64) -> String {
        format_tick(*value)
    }
}

/// `0..max` with some headroom; at least `0..1` so empty or all-zero data
/// still yields a drawable axis.
fn axis_range(values: &[f64]) -> Range<f64> {
    let max = values.iter().copied().fold(0.0, f64::max);
    if max > 0.0 { 0.0..max * 1.1 } else { 0.0..1.0 }
}

/// One tick on every author position.
fn author_ticks(authors: usize) -> Vec<f64> {
    (0..authors).map(|i| i as f64).collect()
}

/// Evenly spaced ticks on a 1/2/5 step covering `range`.
fn value_ticks(range: &Range<f64>) -> Vec<f64> {
    let rough = (range.end - range.start) / 5.0;
    let magnitude = 10f64.powf(rough.log10().floor());
    let step = [1.0, 2.0, 5.0]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|step| *step >= rough)
        .unwrap_or(10.0 * magnitude);
    (0..)
        .map(|i| range.start + f64::from(i) * step)
        .take_while(|v| *v <= range.end + 1e-9)
        .collect()
}

/// Tick label with at most two decimals and no trailing zeros.
fn format_tick(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Author name for an x axis tick, if the tick sits on an author's position.
fn author_at(stats: &[AuthorStats], tick: f64) -> Option<String> {
    let index = tick.round();
    if (tick - index).abs() > 1e-6 || index < 0.0 {
        return None;
    }
    stats.get(index as usize).map(|s| s.author.clone())
}

fn rgb(color: NamedColor) -> RGBColor {
    let (r, g, b) = color.rgb;
    RGBColor(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::author_stats;
    use crate::models::{ArticleRecord, RecordTable};
    use plotters::coord::ranged1d::{BoldPoints, LightPoints};
    use std::fs;

    fn stats() -> Vec<AuthorStats> {
        let table: RecordTable = [("alice", 120, 2), ("bob", 40, 0), ("alice", 80, 1)]
            .into_iter()
            .enumerate()
            .map(|(i, (author, nw, noi))| ArticleRecord {
                author: author.to_string(),
                title: format!("post {i}"),
                word_count: nw,
                image_count: noi,
            })
            .collect();
        author_stats(&table)
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bitpost_stats_charts_{}_{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_default_charts() {
        let charts = default_charts();
        assert_eq!(charts.len(), 5);
        assert_eq!(charts[0].file_name(), "average-words-per-user.svg");
        assert!(!charts[0].annotate);
        assert!(charts[2].annotate);
        assert_eq!(charts[3].kind, ChartKind::Bar);
        assert_eq!(charts[3].x, Metric::AuthorIndex);
    }

    #[test]
    fn test_render_all_writes_svg_files() {
        let dir = temp_dir("all");
        let stats = stats();
        let colors = ColorAssignment::from_users(&["alice", "bob"]);

        let paths = render_all(&dir, &default_charts(), &stats, &colors).unwrap();
        assert_eq!(paths.len(), 5);
        for path in &paths {
            let svg = fs::read_to_string(path).unwrap();
            assert!(svg.contains("<svg"), "{} is not an SVG", path.display());
        }

        let scatter = fs::read_to_string(dir.join("average-words-vs-total-images.svg")).unwrap();
        assert!(scatter.contains("alice"));
        assert!(scatter.contains("bob"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_render_with_no_authors() {
        let dir = temp_dir("empty");
        let path = render_chart(
            &dir,
            &ChartSpec::bar("Nothing here", Metric::TotalWords),
            &[],
            &ColorAssignment::default(),
        )
        .unwrap();
        assert!(fs::read_to_string(path).unwrap().contains("<svg"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_render_into_missing_dir_is_chart_error() {
        let dir = std::env::temp_dir()
            .join(format!("bitpost_stats_charts_{}_missing", std::process::id()))
            .join("does/not/exist");
        let err = render_chart(&dir, &default_charts()[0], &stats(), &ColorAssignment::default())
            .unwrap_err();
        assert!(matches!(err, ReportError::Chart { ref chart, .. } if chart == "Average words per user"));
    }

    #[test]
    fn test_axis_range() {
        assert_eq!(axis_range(&[]), 0.0..1.0);
        assert_eq!(axis_range(&[0.0, 0.0]), 0.0..1.0);
        let range = axis_range(&[2.0, 10.0]);
        assert_eq!(range.start, 0.0);
        assert!((range.end - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_every_author_gets_an_axis_label() {
        let table: RecordTable = (0..30)
            .map(|i| ArticleRecord {
                author: format!("author{i:02}"),
                title: "t".to_string(),
                word_count: 10,
                image_count: 1,
            })
            .collect();
        let stats = author_stats(&table);

        let labels: Vec<String> = author_ticks(stats.len())
            .into_iter()
            .filter_map(|tick| author_at(&stats, tick))
            .collect();
        let authors: Vec<String> = stats.iter().map(|s| s.author.clone()).collect();
        assert_eq!(labels, authors);
    }

    fn assert_ticks(actual: Vec<f64>, expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{actual:?}");
        }
    }

    #[test]
    fn test_value_ticks() {
        assert_ticks(value_ticks(&(0.0..1.0)), &[0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_ticks(value_ticks(&(0.0..11.0)), &[0.0, 5.0, 10.0]);
        assert_ticks(value_ticks(&(0.0..330.0)), &[0.0, 100.0, 200.0, 300.0]);
    }

    #[test]
    fn test_ticked_axis_keeps_every_author_tick() {
        let axis = TickedAxis::new(-0.5..29.5, author_ticks(30));
        let ticks = axis.key_points(BoldPoints(3));
        assert_eq!(ticks.len(), 30);
        assert!(axis.key_points(LightPoints::new(3, 10)).is_empty());
        assert_eq!(ticks[29], 29.0);
        assert_eq!(axis.range(), -0.5..29.5);
    }

    #[test]
    fn test_every_author_is_labelled_in_svg() {
        let dir = temp_dir("labels");
        let table: RecordTable = (0..30)
            .map(|i| ArticleRecord {
                author: format!("writer{i:02}"),
                title: "t".to_string(),
                word_count: 10 + i,
                image_count: 1,
            })
            .collect();
        let stats = author_stats(&table);
        let path = render_chart(
            &dir,
            &ChartSpec::bar("Many authors", Metric::TotalWords),
            &stats,
            &ColorAssignment::default(),
        )
        .unwrap();
        let svg = fs::read_to_string(path).unwrap();
        for s in &stats {
            // axis label plus legend entry
            assert!(svg.matches(s.author.as_str()).count() >= 2, "{} missing", s.author);
        }
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(100.0), "100");
        assert_eq!(format_tick(0.2), "0.2");
        assert_eq!(format_tick(1.25), "1.25");
    }

    #[test]
    fn test_author_at_only_labels_whole_ticks() {
        let stats = stats();
        assert_eq!(author_at(&stats, 0.0).as_deref(), Some("alice"));
        assert_eq!(author_at(&stats, 1.0).as_deref(), Some("bob"));
        assert_eq!(author_at(&stats, 0.5), None);
        assert_eq!(author_at(&stats, 2.0), None);
        assert_eq!(author_at(&stats, -1.0), None);
    }
}

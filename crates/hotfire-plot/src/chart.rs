//! Generic time-series chart drawn with plotters.

use anyhow::Result;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

/// Bitmap size in pixels.
pub const SIZE: (u32, u32) = (1600, 1200);

// matplotlib tab10
pub const TAB10: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];
pub const ORANGE: RGBColor = RGBColor(255, 165, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Line,
    Dots,
}

#[derive(Debug, Clone)]
pub struct Trace<'a> {
    pub label: &'static str,
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub color: RGBColor,
    pub mark: Mark,
}

impl<'a> Trace<'a> {
    pub fn line(label: &'static str, x: &'a [f64], y: &'a [f64], color: RGBColor) -> Self {
        Self {
            label,
            x,
            y,
            color,
            mark: Mark::Line,
        }
    }

    pub fn dots(label: &'static str, x: &'a [f64], y: &'a [f64], color: RGBColor) -> Self {
        Self {
            mark: Mark::Dots,
            ..Self::line(label, x, y, color)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Axis {
    pub label: &'static str,
    /// Fixed limits; fitted to the data when `None`.
    pub range: Option<Range<f64>>,
}

impl Axis {
    pub fn auto(label: &'static str) -> Self {
        Self { label, range: None }
    }

    pub fn fixed(label: &'static str, range: Range<f64>) -> Self {
        Self {
            label,
            range: Some(range),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChartSpec<'a> {
    pub title: String,
    pub x: Axis,
    pub y: Axis,
    pub traces: Vec<Trace<'a>>,
    pub secondary: Option<(Axis, Vec<Trace<'a>>)>,
}

/// Padded `[min, max]` of the finite values; `0..1` when there are none.
pub fn fit_range<'v>(values: impl IntoIterator<Item = &'v f64>) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return 0.0..1.0;
    }
    if lo == hi {
        return lo - 1.0..hi + 1.0;
    }
    let pad = 0.05 * (hi - lo);
    lo - pad..hi + pad
}

/// Drawable points grouped into unbroken runs. Non-finite samples and samples
/// outside the window end a run.
pub fn runs(x: &[f64], y: &[f64], xr: &Range<f64>, yr: &Range<f64>) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (&xi, &yi) in x.iter().zip(y) {
        let visible = xi.is_finite()
            && yi.is_finite()
            && xi >= xr.start
            && xi <= xr.end
            && yi >= yr.start
            && yi <= yr.end;
        if visible {
            current.push((xi, yi));
        } else if !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn y_range(axis: &Axis, traces: &[Trace], xr: &Range<f64>) -> Range<f64> {
    axis.range.clone().unwrap_or_else(|| {
        fit_range(traces.iter().flat_map(|t| {
            t.x.iter()
                .zip(t.y)
                .filter(move |(x, _)| **x >= xr.start && **x <= xr.end)
                .map(|(_, y)| y)
        }))
    })
}

impl ChartSpec<'_> {
    pub fn x_range(&self) -> Range<f64> {
        self.x.range.clone().unwrap_or_else(|| {
            let secondary = self.secondary.iter().flat_map(|(_, t)| t.iter());
            fit_range(self.traces.iter().chain(secondary).flat_map(|t| t.x.iter()))
        })
    }

    pub fn y_range(&self) -> Range<f64> {
        y_range(&self.y, &self.traces, &self.x_range())
    }

    pub fn secondary_range(&self) -> Option<Range<f64>> {
        self.secondary
            .as_ref()
            .map(|(axis, traces)| y_range(axis, traces, &self.x_range()))
    }

    /// Render to a PNG at `path`.
    pub fn draw(&self, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let xr = self.x_range();
        let yr = self.y_range();
        // Charts without a right axis still carry a unit secondary coord
        let yr2 = self.secondary_range().unwrap_or(0.0..1.0);

        let mut builder = ChartBuilder::on(&root);
        builder
            .caption(&self.title, ("sans-serif", 36))
            .margin(24)
            .x_label_area_size(70)
            .y_label_area_size(100);
        if self.secondary.is_some() {
            builder.right_y_label_area_size(100);
        }
        let mut chart = builder
            .build_cartesian_2d(xr.clone(), yr.clone())?
            .set_secondary_coord(xr.clone(), yr2.clone());

        chart
            .configure_mesh()
            .x_desc(self.x.label)
            .y_desc(self.y.label)
            .label_style(("sans-serif", 22))
            .axis_desc_style(("sans-serif", 26))
            .draw()?;

        for trace in &self.traces {
            let color = trace.color;
            let anno = match trace.mark {
                Mark::Line => {
                    let style = color.stroke_width(2);
                    chart.draw_series(
                        runs(trace.x, trace.y, &xr, &yr)
                            .into_iter()
                            .map(move |run| PathElement::new(run, style)),
                    )?
                }
                Mark::Dots => chart.draw_series(
                    runs(trace.x, trace.y, &xr, &yr)
                        .into_iter()
                        .flatten()
                        .map(move |p| Circle::new(p, 2, color.filled())),
                )?,
            };
            anno.label(trace.label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(3)));
        }

        if let Some((axis, traces)) = &self.secondary {
            chart
                .configure_secondary_axes()
                .y_desc(axis.label)
                .label_style(("sans-serif", 22))
                .axis_desc_style(("sans-serif", 26))
                .draw()?;

            for trace in traces {
                let color = trace.color;
                let anno = match trace.mark {
                    Mark::Line => {
                        let style = color.stroke_width(2);
                        chart.draw_secondary_series(
                            runs(trace.x, trace.y, &xr, &yr2)
                                .into_iter()
                                .map(move |run| PathElement::new(run, style)),
                        )?
                    }
                    Mark::Dots => chart.draw_secondary_series(
                        runs(trace.x, trace.y, &xr, &yr2)
                            .into_iter()
                            .flatten()
                            .map(move |p| Circle::new(p, 2, color.filled())),
                    )?,
                };
                anno.label(trace.label)
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(3)));
            }
        }

        chart
            .configure_series_labels()
            .label_font(("sans-serif", 22))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_range() {
        let r = fit_range(&[1.0, f64::NAN, 3.0, f64::INFINITY]);
        assert!((r.start - 0.9).abs() < 1e-12);
        assert!((r.end - 3.1).abs() < 1e-12);
        assert_eq!(fit_range(&[2.0, 2.0]), 1.0..3.0);
        assert_eq!(fit_range(&[f64::NAN]), 0.0..1.0);
    }

    #[test]
    fn test_runs_split_on_gaps() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [0.5, 0.6, f64::NAN, 0.7, 5.0, 0.8, 0.9];
        let r = runs(&x, &y, &(0.0..10.0), &(0.0..1.0));
        assert_eq!(
            r,
            vec![
                vec![(0.0, 0.5), (1.0, 0.6)],
                vec![(3.0, 0.7)],
                vec![(5.0, 0.8), (6.0, 0.9)],
            ]
        );
        assert!(runs(&x, &y, &(20.0..30.0), &(0.0..1.0)).is_empty());
    }

    #[test]
    fn test_auto_ranges_follow_window() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [100.0, 1.0, 2.0, 100.0];
        let spec = ChartSpec {
            title: "t".into(),
            x: Axis::fixed("x", 0.5..2.5),
            y: Axis::auto("y"),
            traces: vec![Trace::line("a", &x, &y, TAB10[0])],
            secondary: Some((Axis::fixed("y2", 0.0..3.0), vec![Trace::dots("b", &x, &y, ORANGE)])),
        };
        let yr = spec.y_range();
        assert!(yr.start < 1.0 && yr.end > 2.0 && yr.end < 3.0);
        assert_eq!(spec.secondary_range(), Some(0.0..3.0));
    }
}

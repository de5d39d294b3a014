use std::f64::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;

/// Square chart edge, in pixels.
const CHART_SIZE: u32 = 600;
/// Grid rings drawn behind the score polygon, as fractions of full radius.
const GRID_LEVELS: [f64; 4] = [0.25, 0.5, 0.75, 1.0];

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChartError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("chart rendering failed: {0}")]
    Render(String),
}

/// Renders one student's closed radar polygon as a PNG artifact.
///
/// The radii are the raw scores, scaled only against this student's own
/// maximum. Scores are not normalized against each subject's total, so
/// comparing shapes across students with different totals is misleading;
/// that mirrors the established chart contract and stays until a product
/// decision says otherwise.
pub struct RadarChartRenderer {
    out_dir: PathBuf,
    size: u32,
}

impl RadarChartRenderer {
    #[must_use]
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            size: CHART_SIZE,
        }
    }

    #[must_use]
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Path the artifact for `name` is written to, one file per student.
    #[must_use]
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.out_dir.join(format!("{name}_radar_chart.png"))
    }

    /// Draw the chart for one student and return the artifact path.
    ///
    /// Recomputation overwrites the existing file for the same name.
    ///
    /// # Errors
    ///
    /// Returns `ChartError` if the output directory cannot be created or
    /// drawing fails.
    pub fn render(&self, name: &str, axes: &[(&str, f64)]) -> Result<PathBuf, ChartError> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.artifact_path(name);

        let root = BitMapBackend::new(&path, (self.size, self.size)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| ChartError::Render(e.to_string()))?;

        let center = (self.size as i32 / 2, self.size as i32 / 2);
        let radius = f64::from(self.size) / 2.0 * 0.65;
        let label_radius = f64::from(self.size) / 2.0 * 0.85;

        for level in GRID_LEVELS {
            root.draw(&Circle::new(
                center,
                (radius * level).round() as i32,
                BLACK.mix(0.15),
            ))
            .map_err(|e| ChartError::Render(e.to_string()))?;
        }
        for i in 0..axes.len() {
            root.draw(&PathElement::new(
                vec![center, vertex(center, axis_angle(i, axes.len()), radius)],
                BLACK.mix(0.25),
            ))
            .map_err(|e| ChartError::Render(e.to_string()))?;
        }

        let values: Vec<f64> = axes.iter().map(|(_, v)| *v).collect();
        let polygon = radar_vertices(&values, center, radius);
        root.draw(&Polygon::new(polygon.clone(), BLUE.mix(0.25).filled()))
            .map_err(|e| ChartError::Render(e.to_string()))?;
        root.draw(&PathElement::new(polygon, BLUE.stroke_width(2)))
            .map_err(|e| ChartError::Render(e.to_string()))?;

        let label_style = TextStyle::from(("sans-serif", 18).into_font())
            .pos(Pos::new(HPos::Center, VPos::Center));
        for (i, (label, _)) in axes.iter().enumerate() {
            let at = vertex(center, axis_angle(i, axes.len()), label_radius);
            root.draw(&Text::new((*label).to_string(), at, label_style.clone()))
                .map_err(|e| ChartError::Render(e.to_string()))?;
        }

        let title_style = TextStyle::from(("sans-serif", 24).into_font())
            .pos(Pos::new(HPos::Center, VPos::Top));
        root.draw(&Text::new(
            format!("Performance of {name}"),
            (center.0, 10),
            title_style,
        ))
        .map_err(|e| ChartError::Render(e.to_string()))?;

        root.present()
            .map_err(|e| ChartError::Render(e.to_string()))?;
        Ok(path)
    }
}

/// Angle of axis `i` of `n`, with the first axis pointing straight up.
fn axis_angle(i: usize, n: usize) -> f64 {
    2.0 * PI * i as f64 / n as f64 - PI / 2.0
}

fn vertex(center: (i32, i32), angle: f64, r: f64) -> (i32, i32) {
    (
        center.0 + (r * angle.cos()).round() as i32,
        center.1 + (r * angle.sin()).round() as i32,
    )
}

/// Pixel vertices of the score polygon, closed by repeating the first
/// point, with radii scaled against the largest score (at least 1).
fn radar_vertices(values: &[f64], center: (i32, i32), radius: f64) -> Vec<(i32, i32)> {
    let max = values.iter().fold(0.0_f64, |m, v| m.max(*v)).max(1.0);
    let mut points: Vec<(i32, i32)> = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            vertex(
                center,
                axis_angle(i, values.len()),
                radius * value / max,
            )
        })
        .collect();
    if let Some(first) = points.first().copied() {
        points.push(first);
    }
    points
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_closes_on_its_first_vertex() {
        let points = radar_vertices(&[3.0, 4.0, 5.0], (300, 300), 100.0);
        assert_eq!(points.len(), 4);
        assert_eq!(points.first(), points.last());
    }

    #[test]
    fn first_axis_points_straight_up() {
        let points = radar_vertices(&[5.0, 5.0, 5.0], (300, 300), 100.0);
        assert_eq!(points[0], (300, 200));
    }

    #[test]
    fn radii_scale_against_the_largest_score() {
        let points = radar_vertices(&[2.0, 4.0, 0.0], (0, 0), 100.0);
        // First vertex sits halfway up, the zero score at the center.
        assert_eq!(points[0], (0, -50));
        assert_eq!(points[2], (0, 0));
    }

    #[test]
    fn all_zero_scores_collapse_to_the_center() {
        let points = radar_vertices(&[0.0, 0.0, 0.0], (10, 10), 100.0);
        assert!(points.iter().all(|p| *p == (10, 10)));
    }

    #[test]
    fn artifact_path_follows_the_naming_convention() {
        let renderer = RadarChartRenderer::new("static");
        assert_eq!(
            renderer.artifact_path("Ada"),
            PathBuf::from("static/Ada_radar_chart.png")
        );
    }
}

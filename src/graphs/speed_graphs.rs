use crate::collectors::formatting::format_mbps;
use crate::graphs::{GraphConfig, GraphRenderer, RenderError, time_label, time_range, y_upper_bound};
use crate::models::sample::{Sample, mean};
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::path::Path;

/// Download and upload speed over time, with a reference line and a value
/// label at each series' mean
pub struct SpeedGraph<'a> {
    pub config: GraphConfig,
    pub samples: &'a [Sample],
}

impl<'a> SpeedGraph<'a> {
    pub fn new(region: &str, samples: &'a [Sample]) -> Self {
        Self {
            config: GraphConfig::titled(
                format!("{region} Download and Upload Speeds"),
                "Speed (Mbps)",
            ),
            samples,
        }
    }

    fn draw(&self, output_path: &Path) -> Result<()> {
        let range = time_range(self.samples).context("no samples to plot")?;
        let avg_download = mean(self.samples.iter().map(|s| s.download_speed_mbps))
            .context("no download speeds")?;
        let avg_upload =
            mean(self.samples.iter().map(|s| s.upload_speed_mbps)).context("no upload speeds")?;
        let mid = self.samples[self.samples.len() / 2].timestamp;

        let max_speed = self
            .samples
            .iter()
            .map(|s| s.download_speed_mbps.max(s.upload_speed_mbps))
            .fold(0.0, f64::max);

        let root = BitMapBackend::new(output_path, (self.config.width, self.config.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.config.title, ("sans-serif", 30).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(range.clone(), 0f64..y_upper_bound(max_speed))?;

        chart
            .configure_mesh()
            .x_desc(&self.config.x_label)
            .y_desc(&self.config.y_label)
            .x_label_formatter(&time_label)
            .draw()?;

        for (name, color, values) in [
            (
                "Download Speed (Mbps)",
                BLUE,
                self.samples
                    .iter()
                    .map(|s| (s.timestamp, s.download_speed_mbps))
                    .collect::<Vec<_>>(),
            ),
            (
                "Upload Speed (Mbps)",
                GREEN,
                self.samples
                    .iter()
                    .map(|s| (s.timestamp, s.upload_speed_mbps))
                    .collect::<Vec<_>>(),
            ),
        ] {
            chart
                .draw_series(LineSeries::new(values.iter().copied(), &color))?
                .label(name)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], color));
            chart.draw_series(
                values
                    .iter()
                    .map(|point| Circle::new(*point, 3, color.filled())),
            )?;
        }

        for (name, color, average) in [
            ("Avg Download Speed (Mbps)", BLUE, avg_download),
            ("Avg Upload Speed (Mbps)", GREEN, avg_upload),
        ] {
            let line_style = color.mix(0.5).stroke_width(1);
            chart
                .draw_series(LineSeries::new(
                    [(range.start, average), (range.end, average)],
                    line_style,
                ))?
                .label(name)
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 10, y)], color.mix(0.5))
                });
            chart.draw_series(std::iter::once(Text::new(
                format_mbps(average),
                (mid, average),
                ("sans-serif", 15).into_font().color(&color),
            )))?;
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        root.present()?;

        Ok(())
    }
}

impl GraphRenderer for SpeedGraph<'_> {
    fn render(&self, output_path: &Path) -> Result<(), RenderError> {
        if self.samples.is_empty() {
            return Err(RenderError::NoSamples);
        }
        self.draw(output_path)
            .map_err(|e| RenderError::draw("speed", e))
    }
}

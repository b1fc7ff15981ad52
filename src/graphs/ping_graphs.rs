use crate::graphs::{GraphConfig, GraphRenderer, RenderError, time_label, time_range, y_upper_bound};
use crate::models::Sample;
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::path::Path;

pub struct PingGraph<'a> {
    pub config: GraphConfig,
    pub samples: &'a [Sample],
}

impl<'a> PingGraph<'a> {
    pub fn new(region: &str, samples: &'a [Sample]) -> Self {
        Self {
            config: GraphConfig::titled(format!("{region} Ping"), "Ping (ms)"),
            samples,
        }
    }

    fn draw(&self, output_path: &Path) -> Result<()> {
        let range = time_range(self.samples).context("no samples to plot")?;
        let max_ping = self.samples.iter().map(|s| s.ping_ms).fold(0.0, f64::max);

        let root = BitMapBackend::new(output_path, (self.config.width, self.config.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.config.title, ("sans-serif", 30).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(range, 0f64..y_upper_bound(max_ping))?;

        chart
            .configure_mesh()
            .x_desc(&self.config.x_label)
            .y_desc(&self.config.y_label)
            .x_label_formatter(&time_label)
            .draw()?;

        chart
            .draw_series(LineSeries::new(
                self.samples.iter().map(|s| (s.timestamp, s.ping_ms)),
                &RED,
            ))?
            .label("Ping (ms)")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], RED));

        chart.draw_series(
            self.samples
                .iter()
                .map(|s| Circle::new((s.timestamp, s.ping_ms), 3, RED.filled())),
        )?;

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        root.present()?;

        Ok(())
    }
}

impl GraphRenderer for PingGraph<'_> {
    fn render(&self, output_path: &Path) -> Result<(), RenderError> {
        if self.samples.is_empty() {
            return Err(RenderError::NoSamples);
        }
        self.draw(output_path).map_err(|e| RenderError::draw("ping", e))
    }
}

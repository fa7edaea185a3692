use finstock_core::{ChartHandle, HistogramChartData, PriceChartData, ReturnDistribution};

/// Render-ready price line: plotted points and axis bounds are computed once
/// per load, not per frame.
#[derive(Debug)]
pub struct PricePanel {
    pub data: PriceChartData,
    pub points: Vec<(f64, f64)>,
    pub y_bounds: [f64; 2],
}

impl PricePanel {
    pub fn new(data: PriceChartData) -> Self {
        let points = data.points();
        let y_bounds = data.y_bounds().unwrap_or([0.0, 1.0]);
        Self { data, points, y_bounds }
    }

    pub fn x_max(&self) -> f64 {
        self.points.len().saturating_sub(1).max(1) as f64
    }

    /// First, middle and last date for the x axis.
    pub fn x_labels(&self) -> Vec<String> {
        let labels = &self.data.labels;
        match labels.len() {
            0 => Vec::new(),
            1 => vec![labels[0].clone()],
            n => vec![labels[0].clone(), labels[n / 2].clone(), labels[n - 1].clone()],
        }
    }
}

impl ChartHandle for PricePanel {
    fn dispose(&mut self) {
        self.points.clear();
        self.data.labels.clear();
        self.data.closes.clear();
    }
}

#[derive(Debug)]
pub struct ReturnsPanel {
    pub distribution: ReturnDistribution,
}

impl ReturnsPanel {
    pub fn new(distribution: ReturnDistribution) -> Self {
        Self { distribution }
    }

    pub fn data(&self) -> Option<&HistogramChartData> {
        match &self.distribution {
            ReturnDistribution::Ready(d) => Some(d),
            ReturnDistribution::NoData => None,
        }
    }

    pub fn bin_count(&self) -> usize {
        self.data().map_or(0, |d| d.counts.len())
    }
}

impl ChartHandle for ReturnsPanel {
    fn dispose(&mut self) {
        self.distribution = ReturnDistribution::NoData;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finstock_core::{HistogramConfig, PricePoint, ReturnSeries};

    fn points(n: usize) -> Vec<PricePoint> {
        (0..n)
            .map(|i| PricePoint { date: format!("2024-02-{:02}", i + 1), close: 100.0 + i as f64 })
            .collect()
    }

    #[test]
    fn x_labels_pick_ends_and_middle() {
        let p = PricePanel::new(PriceChartData::from_points(&points(5)));
        assert_eq!(p.x_labels(), vec!["2024-02-01", "2024-02-03", "2024-02-05"]);
        assert_eq!(p.x_max(), 4.0);
    }

    #[test]
    fn dispose_releases_buffers() {
        let mut p = PricePanel::new(PriceChartData::from_points(&points(3)));
        p.dispose();
        assert!(p.points.is_empty());
        assert!(p.data.is_empty());
    }

    #[test]
    fn returns_panel_no_data() {
        let series = ReturnSeries::default();
        let panel = ReturnsPanel::new(
            ReturnDistribution::from_series(&series, &HistogramConfig::default()).unwrap(),
        );
        assert!(panel.data().is_none());
        assert_eq!(panel.bin_count(), 0);
    }
}

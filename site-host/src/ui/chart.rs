//! # 柱状图组件
//!
//! 以最大值为基准缩放的横向柱状图。负值按 0 绘制，数值标签保留原值。

/// 单根柱子
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

/// 横向柱状图
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    bars: Vec<Bar>,
    /// 最长柱子的字符宽度
    width: usize,
}

impl BarChart {
    pub fn new(series: impl IntoIterator<Item = (String, f64)>, width: usize) -> Self {
        Self {
            bars: series
                .into_iter()
                .map(|(label, value)| Bar { label, value })
                .collect(),
            width,
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// 柱子相对最大值的比例，范围 `[0, 1]`
    pub fn ratio(&self, index: usize) -> f64 {
        let Some(bar) = self.bars.get(index) else {
            return 0.0;
        };

        let max = self
            .bars
            .iter()
            .map(|b| b.value)
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max);

        if max <= 0.0 || !bar.value.is_finite() {
            return 0.0;
        }
        (bar.value / max).clamp(0.0, 1.0)
    }

    /// 渲染为文本行
    pub fn render(&self) -> Vec<String> {
        let label_width = self
            .bars
            .iter()
            .map(|b| b.label.chars().count())
            .max()
            .unwrap_or(0);

        self.bars
            .iter()
            .enumerate()
            .map(|(index, bar)| {
                let filled = (self.ratio(index) * self.width as f64).round() as usize;
                let padding = label_width - bar.label.chars().count();
                format!(
                    "{}{} │{}{} {:.0}",
                    bar.label,
                    " ".repeat(padding),
                    "█".repeat(filled),
                    " ".repeat(self.width - filled),
                    bar.value
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<(String, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("b{i}"), *v))
            .collect()
    }

    #[test]
    fn test_ratio() {
        let chart = BarChart::new(series(&[50.0, 100.0, -20.0]), 10);
        assert_eq!(chart.ratio(0), 0.5);
        assert_eq!(chart.ratio(1), 1.0);
        assert_eq!(chart.ratio(2), 0.0);
        assert_eq!(chart.ratio(9), 0.0);
    }

    #[test]
    fn test_all_non_positive() {
        let chart = BarChart::new(series(&[0.0, -5.0]), 10);
        assert_eq!(chart.ratio(0), 0.0);
        assert_eq!(chart.ratio(1), 0.0);
    }

    #[test]
    fn test_render() {
        let chart = BarChart::new(
            vec![("收入".to_string(), 100.0), ("利润".to_string(), 25.0)],
            8,
        );
        let lines = chart.render();
        insta::assert_snapshot!(lines[0], @"收入 │████████ 100");
        insta::assert_snapshot!(lines[1], @"利润 │██       25");
    }

    #[test]
    fn test_empty() {
        let chart = BarChart::new(Vec::new(), 8);
        assert!(chart.render().is_empty());
    }
}

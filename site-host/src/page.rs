//! # Page 模块
//!
//! 落地页：把断点检测器、ROI 计算器、展示区、数据栏、评价轮播和
//! 行动号召按钮组合在一起，并按当前断点渲染文本帧。
//!
//! ## 布局
//!
//! - desktop / tablet：数据栏单行，按钮并排
//! - mobile：所有区块纵向堆叠，按钮各占一行

use std::time::Duration;

use site_runtime::{
    Breakpoint, BreakpointDetector, BreakpointState, Calculator, FieldInputs, FormState,
    SiteResult, Timeline,
};
use tracing::{debug, info};

use crate::calculators::{RoiInputs, RoiResult, RoiValidator, calculate_roi};
use crate::config::AppConfig;
use crate::ui::{
    BarChart, ButtonStyle, CtaButton, Showcase, Stat, Testimonial, TestimonialCarousel, TrustBar,
    divider,
};

/// ROI 表单的字段标签，按渲染顺序
const FIELD_LABELS: [(&str, &str); 4] = [
    ("monthly_visitors", "月访问量"),
    ("conversion_rate", "转化率(%)"),
    ("average_order_value", "客单价"),
    ("monthly_cost", "月投入"),
];

fn default_features() -> Vec<String> {
    ["实时转化看板", "自动周报", "A/B 测试", "团队协作"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_stats() -> Vec<Stat> {
    vec![
        Stat::new("企业客户", 1200.0, "+"),
        Stat::new("客户满意度", 98.0, "%"),
        Stat::new("平均上线天数", 7.0, ""),
    ]
}

fn default_testimonials() -> Vec<Testimonial> {
    vec![
        Testimonial::new("上线一周转化率翻倍", "王经理"),
        Testimonial::new("报表终于不用手工做了", "李总监"),
        Testimonial::new("投入产出一目了然", "陈创始人"),
    ]
}

/// 落地页
#[derive(Debug)]
pub struct LandingPage {
    title: String,
    chart_width: usize,
    timeline: Timeline,
    detector: BreakpointDetector,
    calculator: Calculator<RoiInputs, RoiResult>,
    showcase: Showcase,
    trust: TrustBar,
    carousel: TestimonialCarousel,
    buttons: Vec<CtaButton>,
}

impl LandingPage {
    /// 创建页面，所有动画从 `timeline` 的当前时刻开始
    pub fn new(timeline: &Timeline, config: &AppConfig) -> SiteResult<Self> {
        let runtime = &config.runtime;
        let page = &config.page;

        let detector = BreakpointDetector::new(config.viewport.initial_width, runtime.breakpoints);
        let calculator = Calculator::new(
            timeline,
            RoiInputs::default(),
            calculate_roi,
            RoiValidator::default(),
            runtime.debounce,
        );
        let showcase = Showcase::new(
            timeline,
            "功能亮点",
            default_features(),
            Duration::from_millis(page.reveal_interval_ms),
        )?;
        let trust = TrustBar::new(
            timeline,
            default_stats(),
            Duration::from_millis(page.counter_duration_ms),
            runtime.counter,
        )?;
        let carousel = TestimonialCarousel::new(
            timeline,
            default_testimonials(),
            Duration::from_millis(page.carousel_interval_ms),
        )?;

        let buttons = vec![
            CtaButton::new("signup", "免费试用", "/signup"),
            CtaButton::new("demo", "预约演示", "/demo").with_style(ButtonStyle::Secondary),
            CtaButton::new("pricing", "查看价格", "/pricing").with_style(ButtonStyle::Ghost),
        ];

        info!(
            width = config.viewport.initial_width,
            breakpoint = %detector.breakpoint(),
            "落地页已创建"
        );

        Ok(Self {
            title: page.title.clone(),
            chart_width: page.chart_width,
            timeline: timeline.clone(),
            detector,
            calculator,
            showcase,
            trust,
            carousel,
            buttons,
        })
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn calculator(&self) -> &Calculator<RoiInputs, RoiResult> {
        &self.calculator
    }

    pub fn showcase(&self) -> &Showcase {
        &self.showcase
    }

    pub fn trust(&self) -> &TrustBar {
        &self.trust
    }

    pub fn carousel(&self) -> &TestimonialCarousel {
        &self.carousel
    }

    pub fn viewport(&self) -> BreakpointState {
        self.detector.state()
    }

    pub fn breakpoint(&self) -> Breakpoint {
        self.detector.breakpoint()
    }

    /// 视口宽度变化
    pub fn resize(&self, width: u32) -> bool {
        self.detector.resize(width)
    }

    /// 修改 ROI 表单的一个字段
    ///
    /// 字段不存在时返回 `false`。
    pub fn set_field(&self, name: &str, value: f64) -> bool {
        self.calculator.set_field(name, value)
    }

    /// 推进页面时间
    pub fn advance(&self, dt: Duration) -> usize {
        self.timeline.advance(dt)
    }

    /// 点击按钮
    ///
    /// # 返回
    /// - `Some(true)`: 点击生效
    /// - `Some(false)`: 按钮不可用
    /// - `None`: 没有这个按钮
    pub fn click(&mut self, id: &str) -> Option<bool> {
        let button = self.buttons.iter_mut().find(|b| b.id == id)?;
        let clicked = button.click();
        if clicked {
            debug!(button = id, href = %button.href, "按钮被点击");
        }
        Some(clicked)
    }

    pub fn button(&self, id: &str) -> Option<&CtaButton> {
        self.buttons.iter().find(|b| b.id == id)
    }

    /// 渲染当前帧
    pub fn render(&self) -> String {
        let viewport = self.viewport();
        let mobile = viewport.is_mobile();
        let width = if mobile { 24 } else { 48 };

        let mut lines = vec![
            format!("# {}  [{} {}px]", self.title, viewport.breakpoint, viewport.width),
            divider(width),
        ];

        lines.extend(self.render_calculator(mobile));
        lines.push(divider(width));
        lines.extend(self.showcase.render());
        lines.push(divider(width));

        lines.push("## 数据".to_string());
        if mobile {
            lines.extend(self.trust.render_stacked());
        } else {
            lines.push(self.trust.render_inline());
        }

        if let Some(quote) = self.carousel.render() {
            lines.push(divider(width));
            lines.push(quote);
        }

        lines.push(divider(width));
        let buttons: Vec<String> = self.buttons.iter().map(CtaButton::render).collect();
        if mobile {
            lines.extend(buttons);
        } else {
            lines.push(buttons.join("    "));
        }

        lines.join("\n")
    }

    fn render_calculator(&self, mobile: bool) -> Vec<String> {
        let state: FormState<RoiInputs, RoiResult> = self.calculator.snapshot();
        let mut lines = vec!["## ROI 计算器".to_string()];

        let fields = FIELD_LABELS.iter().map(|(name, label)| {
            let value = state.inputs.field(name).unwrap_or_default();
            match state.errors.get(*name) {
                Some(error) => format!("{label}: {value} ✗ {error}"),
                None => format!("{label}: {value}"),
            }
        });
        if mobile {
            lines.extend(fields);
        } else {
            lines.push(fields.collect::<Vec<_>>().join("  "));
        }

        lines.extend(state.warnings.iter().map(|w| format!("⚠ {w}")));

        if let Some(result) = &state.results {
            let payback = result
                .payback_months
                .map(|m| format!("{m:.1} 个月回本"))
                .unwrap_or_else(|| "无法回本".to_string());
            lines.push(format!(
                "月收入 {:.0} · 月利润 {:.0} · ROI {:.1}% · {payback}",
                result.monthly_revenue, result.monthly_profit, result.roi_percent
            ));

            if state.chart_ready {
                let chart = BarChart::new(result.chart_series(&state.inputs), self.chart_width);
                lines.extend(chart.render());
            }
        }

        if state.loading {
            lines.push("计算中…".to_string());
        }

        lines
    }
}

//! # ROI 计算器
//!
//! 营销投入回报估算：访问量 × 转化率 × 客单价 得到月收入，
//! 再与月投入比较。

use serde::{Deserialize, Serialize};
use site_runtime::{
    FieldErrors, FieldInputs, FieldRule, ValidationRules, Validator, get_validation_errors,
    get_warnings,
};

/// ROI 表单输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiInputs {
    /// 月访问量
    pub monthly_visitors: f64,
    /// 转化率（百分比）
    pub conversion_rate: f64,
    /// 客单价
    pub average_order_value: f64,
    /// 月投入
    pub monthly_cost: f64,
}

impl Default for RoiInputs {
    fn default() -> Self {
        Self {
            monthly_visitors: 10_000.0,
            conversion_rate: 2.0,
            average_order_value: 80.0,
            monthly_cost: 5_000.0,
        }
    }
}

impl RoiInputs {
    /// 所有字段名，按表单顺序
    pub const FIELDS: [&'static str; 4] = [
        "monthly_visitors",
        "conversion_rate",
        "average_order_value",
        "monthly_cost",
    ];
}

impl FieldInputs for RoiInputs {
    fn field(&self, name: &str) -> Option<f64> {
        match name {
            "monthly_visitors" => Some(self.monthly_visitors),
            "conversion_rate" => Some(self.conversion_rate),
            "average_order_value" => Some(self.average_order_value),
            "monthly_cost" => Some(self.monthly_cost),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: f64) -> bool {
        match name {
            "monthly_visitors" => self.monthly_visitors = value,
            "conversion_rate" => self.conversion_rate = value,
            "average_order_value" => self.average_order_value = value,
            "monthly_cost" => self.monthly_cost = value,
            _ => return false,
        }
        true
    }
}

/// ROI 计算结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoiResult {
    /// 月收入
    pub monthly_revenue: f64,
    /// 月利润（收入 - 投入）
    pub monthly_profit: f64,
    /// 投入回报率（百分比），投入为零时为 0
    pub roi_percent: f64,
    /// 用月利润收回一个月投入所需的月数；利润不为正时为 `None`
    pub payback_months: Option<f64>,
}

impl RoiResult {
    /// 图表数据：(标签, 数值)
    pub fn chart_series(&self, inputs: &RoiInputs) -> Vec<(String, f64)> {
        vec![
            ("收入".to_string(), self.monthly_revenue),
            ("投入".to_string(), inputs.monthly_cost),
            ("利润".to_string(), self.monthly_profit),
        ]
    }
}

/// 计算 ROI
pub fn calculate_roi(inputs: &RoiInputs) -> RoiResult {
    let monthly_revenue =
        inputs.monthly_visitors * inputs.conversion_rate / 100.0 * inputs.average_order_value;
    let monthly_profit = monthly_revenue - inputs.monthly_cost;

    let roi_percent = if inputs.monthly_cost > 0.0 {
        monthly_profit / inputs.monthly_cost * 100.0
    } else {
        0.0
    };

    let payback_months = (monthly_profit > 0.0).then(|| inputs.monthly_cost / monthly_profit);

    RoiResult {
        monthly_revenue,
        monthly_profit,
        roi_percent,
        payback_months,
    }
}

/// 默认字段规则
pub fn default_rules() -> ValidationRules {
    ValidationRules::new()
        .with(
            FieldRule::new("monthly_visitors", "月访问量")
                .required()
                .range(0.0, 100_000_000.0),
        )
        .with(
            FieldRule::new("conversion_rate", "转化率")
                .required()
                .range(0.0, 100.0)
                .warn_outside(0.5, 10.0, "转化率超出常见区间（0.5% - 10%），请确认"),
        )
        .with(FieldRule::new("average_order_value", "客单价").required().min(0.0))
        .with(FieldRule::new("monthly_cost", "月投入").required().min(0.0))
}

/// ROI 表单校验器
///
/// 在字段规则之外，追加"投入高于收入"的跨字段警告。
#[derive(Debug, Clone)]
pub struct RoiValidator {
    rules: ValidationRules,
}

impl Default for RoiValidator {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl RoiValidator {
    pub fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }
}

impl Validator<RoiInputs> for RoiValidator {
    fn errors(&self, inputs: &RoiInputs) -> FieldErrors {
        get_validation_errors(inputs, &self.rules)
    }

    fn warnings(&self, inputs: &RoiInputs) -> Vec<String> {
        let mut warnings = get_warnings(inputs, &self.rules);

        // 有字段错误时跨字段警告没有意义
        if self.errors(inputs).is_empty() {
            let result = calculate_roi(inputs);
            if result.monthly_profit < 0.0 {
                warnings.push("月投入高于月收入，当前配置无法回本".to_string());
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_defaults() {
        let result = calculate_roi(&RoiInputs::default());
        // 10000 * 2% * 80 = 16000
        assert_eq!(result.monthly_revenue, 16_000.0);
        assert_eq!(result.monthly_profit, 11_000.0);
        assert!((result.roi_percent - 220.0).abs() < 1e-9);
        let payback = result.payback_months.unwrap();
        assert!((payback - 5_000.0 / 11_000.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_cost() {
        let inputs = RoiInputs {
            monthly_cost: 0.0,
            ..RoiInputs::default()
        };
        let result = calculate_roi(&inputs);
        assert_eq!(result.roi_percent, 0.0);
        assert_eq!(result.payback_months, Some(0.0));
    }

    #[test]
    fn test_loss_has_no_payback() {
        let inputs = RoiInputs {
            monthly_visitors: 100.0,
            ..RoiInputs::default()
        };
        let result = calculate_roi(&inputs);
        assert!(result.monthly_profit < 0.0);
        assert_eq!(result.payback_months, None);
    }

    #[test]
    fn test_field_access() {
        let mut inputs = RoiInputs::default();
        for name in RoiInputs::FIELDS {
            assert!(inputs.field(name).is_some(), "{name}");
        }
        assert!(inputs.set_field("monthly_cost", 1.0));
        assert_eq!(inputs.monthly_cost, 1.0);
        assert!(!inputs.set_field("discount", 1.0));
        assert_eq!(inputs.field("discount"), None);
    }

    #[test]
    fn test_validator_errors() {
        let validator = RoiValidator::default();
        let inputs = RoiInputs {
            conversion_rate: 120.0,
            monthly_cost: -1.0,
            ..RoiInputs::default()
        };
        let errors = validator.errors(&inputs);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["conversion_rate"], "转化率不能大于 100");
        assert_eq!(errors["monthly_cost"], "月投入不能小于 0");
        // 有错误时不给跨字段警告
        assert!(validator.warnings(&inputs).is_empty());
    }

    #[test]
    fn test_validator_warnings() {
        let validator = RoiValidator::default();
        assert!(validator.warnings(&RoiInputs::default()).is_empty());

        let inputs = RoiInputs {
            conversion_rate: 0.1,
            ..RoiInputs::default()
        };
        assert_eq!(
            validator.warnings(&inputs),
            vec![
                "转化率超出常见区间（0.5% - 10%），请确认".to_string(),
                "月投入高于月收入，当前配置无法回本".to_string(),
            ]
        );
    }

    #[test]
    fn test_chart_series() {
        let inputs = RoiInputs::default();
        let series = calculate_roi(&inputs).chart_series(&inputs);
        let labels: Vec<&str> = series.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, ["收入", "投入", "利润"]);
        assert_eq!(series[1].1, 5_000.0);
    }
}

//! # Validation 模块
//!
//! 计算器表单的校验规则。
//!
//! 计算管线只把校验当作黑盒：`(inputs, rules) -> 字段到错误信息的映射`，
//! 以及 `inputs -> 有序的警告列表`。两者都必须是纯函数。
//!
//! [`ValidationRules`] 是基于字段数值范围的通用实现，
//! 需要跨字段判断的表单可以自行实现 [`Validator`]。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 字段名 -> 错误信息，只包含无效字段
pub type FieldErrors = BTreeMap<String, String>;

/// 校验器
pub trait Validator<I> {
    /// 计算字段错误
    fn errors(&self, inputs: &I) -> FieldErrors;

    /// 计算警告（有序）
    fn warnings(&self, inputs: &I) -> Vec<String>;
}

/// 不做任何校验
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidation;

impl<I> Validator<I> for NoValidation {
    fn errors(&self, _inputs: &I) -> FieldErrors {
        FieldErrors::new()
    }

    fn warnings(&self, _inputs: &I) -> Vec<String> {
        Vec::new()
    }
}

/// 按字段名读写数值的表单输入
pub trait FieldInputs {
    /// 读取字段值，`None` 表示字段为空
    fn field(&self, name: &str) -> Option<f64>;

    /// 写入字段值
    ///
    /// # 返回
    /// - `true`: 写入成功
    /// - `false`: 字段不存在
    fn set_field(&mut self, name: &str, value: f64) -> bool;
}

/// 单个字段的规则
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    /// 字段名
    pub field: String,
    /// 展示给用户的名称
    pub label: String,
    /// 是否必填
    #[serde(default)]
    pub required: bool,
    /// 最小值（含）
    #[serde(default)]
    pub min: Option<f64>,
    /// 最大值（含）
    #[serde(default)]
    pub max: Option<f64>,
    /// 低于此值给出警告
    #[serde(default)]
    pub warn_below: Option<f64>,
    /// 高于此值给出警告
    #[serde(default)]
    pub warn_above: Option<f64>,
    /// 自定义警告文本
    #[serde(default)]
    pub warning: Option<String>,
}

impl FieldRule {
    pub fn new(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            label: label.into(),
            required: false,
            min: None,
            max: None,
            warn_below: None,
            warn_above: None,
            warning: None,
        }
    }

    /// 设置为必填
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// 设置取值范围
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// 设置最小值
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// 设置警告区间，超出 `[low, high]` 时警告
    pub fn warn_outside(mut self, low: f64, high: f64, warning: impl Into<String>) -> Self {
        self.warn_below = Some(low);
        self.warn_above = Some(high);
        self.warning = Some(warning.into());
        self
    }

    /// 校验单个值
    fn check(&self, value: Option<f64>) -> Option<String> {
        let Some(value) = value else {
            return self.required.then(|| format!("{}为必填项", self.label));
        };

        if !value.is_finite() {
            return Some(format!("{}必须是有效数字", self.label));
        }
        if let Some(min) = self.min
            && value < min
        {
            return Some(format!("{}不能小于 {}", self.label, min));
        }
        if let Some(max) = self.max
            && value > max
        {
            return Some(format!("{}不能大于 {}", self.label, max));
        }
        None
    }

    /// 计算单个值的警告，值无效时不警告
    fn warn(&self, value: Option<f64>) -> Option<String> {
        let value = value?;
        if self.check(Some(value)).is_some() {
            return None;
        }

        let below = self.warn_below.is_some_and(|low| value < low);
        let above = self.warn_above.is_some_and(|high| value > high);
        if !(below || above) {
            return None;
        }

        Some(
            self.warning
                .clone()
                .unwrap_or_else(|| format!("{}的取值 {} 不太常见，请确认", self.label, value)),
        )
    }
}

/// 字段规则集合（有序）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    #[serde(default)]
    pub fields: Vec<FieldRule>,
}

impl ValidationRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条规则
    pub fn with(mut self, rule: FieldRule) -> Self {
        self.fields.push(rule);
        self
    }

    /// 查找字段规则
    pub fn rule(&self, field: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|r| r.field == field)
    }
}

/// 计算字段错误，每个字段只报告第一条错误
pub fn get_validation_errors<I: FieldInputs>(inputs: &I, rules: &ValidationRules) -> FieldErrors {
    rules
        .fields
        .iter()
        .filter_map(|rule| {
            rule.check(inputs.field(&rule.field))
                .map(|message| (rule.field.clone(), message))
        })
        .collect()
}

/// 计算警告，顺序与规则顺序一致
pub fn get_warnings<I: FieldInputs>(inputs: &I, rules: &ValidationRules) -> Vec<String> {
    rules
        .fields
        .iter()
        .filter_map(|rule| rule.warn(inputs.field(&rule.field)))
        .collect()
}

impl<I: FieldInputs> Validator<I> for ValidationRules {
    fn errors(&self, inputs: &I) -> FieldErrors {
        get_validation_errors(inputs, self)
    }

    fn warnings(&self, inputs: &I) -> Vec<String> {
        get_warnings(inputs, self)
    }
}

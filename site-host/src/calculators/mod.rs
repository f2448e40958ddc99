//! # Calculators 模块
//!
//! 页面上的计算器：输入类型、纯计算函数与校验器。

pub mod roi;

pub use roi::{RoiInputs, RoiResult, RoiValidator, calculate_roi, default_rules};

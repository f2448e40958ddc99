//! # site-host
//!
//! 在终端里回放落地页交互。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p site-host
//! cargo run -p site-host -- --scenario assets/scenarios/demo.json
//! cargo run -p site-host -- --width 375 --verbose
//! cargo run -p site-host -- --json > report.json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use site_host::logging::init_logging;
use site_host::{AppConfig, Scenario, ScenarioReport, ScenarioRunner};
use tracing::info;

#[derive(Parser)]
#[command(name = "site-host")]
#[command(about = "落地页交互回放 - 以文本帧渲染场景脚本")]
#[command(version)]
struct Cli {
    /// 配置文件（默认：config.json）
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// 场景脚本；未指定时使用配置中的路径或内置演示
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// 初始视口宽度
    #[arg(short, long)]
    width: Option<u32>,

    /// 以 JSON 输出执行报告
    #[arg(long)]
    json: bool,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("site-host error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = AppConfig::load(&cli.config);
    config.apply_overrides(cli.width, cli.scenario);
    config.validate().context("配置无效")?;

    let scenario = match &config.scenario_path {
        Some(path) => Scenario::load(path)
            .with_context(|| format!("加载场景失败: {}", path.display()))?,
        None => {
            info!("未指定场景，使用内置演示");
            Scenario::demo()
        }
    };

    let report = ScenarioRunner::new(config)
        .run(&scenario)
        .with_context(|| format!("场景执行失败: {}", scenario.name))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &ScenarioReport) {
    for frame in &report.frames {
        println!("==> {} @ {}ms", report.name, frame.at_ms);
        println!("{}\n", frame.text);
    }

    println!(
        "场景 '{}' 完成：{} 步，{} 帧，耗时 {}ms",
        report.name,
        report.steps,
        report.frames.len(),
        report.elapsed_ms
    );
    if !report.clicks.is_empty() {
        println!("点击：{}", report.clicks.join(", "));
    }
}

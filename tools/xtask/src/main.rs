//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 site-runtime 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `scenario-check`: 回放场景脚本，检查解析与断言

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use site_host::{AppConfig, Scenario, ScenarioRunner};
use walkdir::WalkDir;
use xshell::{Shell, cmd};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "开发辅助工具")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行 fmt、clippy、test 门禁检查
    CheckAll,

    /// 运行 site-runtime 覆盖率报告
    CovRuntime,

    /// 运行 workspace 覆盖率报告
    CovWorkspace,

    /// 回放场景脚本
    ///
    /// 不带参数时检查 assets/scenarios/ 下所有 .json 文件。
    ScenarioCheck {
        /// 文件或目录
        path: Option<PathBuf>,

        /// 配置文件（默认：config.json）
        #[arg(long, default_value = "config.json")]
        config: PathBuf,

        /// 以 JSON 输出汇总
        #[arg(long)]
        json: bool,
    },
}

fn ensure_cargo_llvm_cov_available(sh: &Shell) -> anyhow::Result<()> {
    if cmd!(sh, "cargo llvm-cov --version").quiet().run().is_err() {
        anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    match cli.command {
        Commands::CheckAll => {
            cmd!(sh, "cargo fmt --all -- --check").run()?;
            cmd!(sh, "cargo clippy --workspace --all-targets").run()?;
            cmd!(sh, "cargo test --workspace").run()?;
        }
        Commands::CovRuntime => {
            ensure_cargo_llvm_cov_available(&sh)?;
            cmd!(sh, "cargo llvm-cov -p site-runtime --all-features --html").run()?;
            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        Commands::CovWorkspace => {
            ensure_cargo_llvm_cov_available(&sh)?;
            // 排除 xtask，避免工具代码稀释覆盖率信号
            cmd!(
                sh,
                "cargo llvm-cov --workspace --exclude xtask --all-features --html"
            )
            .run()?;
            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        Commands::ScenarioCheck { path, config, json } => {
            scenario_check(path.as_deref(), &config, json)?;
        }
    }

    Ok(())
}

//=============================================================================
// scenario-check 命令实现
//=============================================================================

/// 默认场景目录（相对于 workspace root）
const SCENARIOS_DIR: &str = "assets/scenarios";

/// 单个场景的检查结果
struct Outcome {
    file: PathBuf,
    error: Option<String>,
    frames: usize,
}

fn scenario_check(path: Option<&Path>, config: &Path, json: bool) -> anyhow::Result<()> {
    let files = match path {
        Some(p) if p.is_file() => vec![p.to_path_buf()],
        Some(p) if p.is_dir() => collect_scenario_files(p),
        Some(p) => anyhow::bail!("路径不存在: {}", p.display()),
        None => {
            let dir = Path::new(SCENARIOS_DIR);
            if !dir.exists() {
                anyhow::bail!(
                    "默认场景目录不存在: {}\n请在 workspace 根目录运行，或指定场景路径",
                    dir.display()
                );
            }
            collect_scenario_files(dir)
        }
    };

    if files.is_empty() {
        eprintln!("未找到场景文件（.json）");
        return Ok(());
    }

    eprintln!("==> 回放 {} 个场景...\n", files.len());

    let runner = ScenarioRunner::new(AppConfig::load(config));
    let outcomes: Vec<Outcome> = files
        .into_iter()
        .map(|file| {
            let result = Scenario::load(&file).and_then(|scenario| runner.run(&scenario));
            match result {
                Ok(report) => Outcome {
                    file,
                    error: None,
                    frames: report.frames.len(),
                },
                Err(e) => Outcome {
                    file,
                    error: Some(e.to_string()),
                    frames: 0,
                },
            }
        })
        .collect();

    let failed = outcomes.iter().filter(|o| o.error.is_some()).count();

    if json {
        let summary: Vec<serde_json::Value> = outcomes
            .iter()
            .map(|o| {
                serde_json::json!({
                    "file": o.file.display().to_string(),
                    "ok": o.error.is_none(),
                    "frames": o.frames,
                    "error": o.error,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_outcomes(&outcomes, failed);
    }

    if failed > 0 {
        anyhow::bail!("{failed} 个场景失败");
    }
    Ok(())
}

/// 收集目录下的所有场景文件
fn collect_scenario_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

fn print_outcomes(outcomes: &[Outcome], failed: usize) {
    for outcome in outcomes {
        match &outcome.error {
            Some(error) => eprintln!("[ERROR] {}: {}", outcome.file.display(), error),
            None => eprintln!(
                "[OK] {} ({} 帧)",
                outcome.file.display(),
                outcome.frames
            ),
        }
    }

    eprintln!("─────────────────────────────────────────────────────");
    if failed > 0 {
        eprintln!("❌ {} / {} 个场景失败", failed, outcomes.len());
    } else {
        eprintln!("✅ {} 个场景全部通过", outcomes.len());
    }
}

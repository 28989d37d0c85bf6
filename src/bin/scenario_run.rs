use clap::Parser;
use rtd_search_shim::config::scenario::{ReportConfig, ScenarioConfig};
use rtd_search_shim::utils::{logger, validation::Validate};
use rtd_search_shim::{EventRecord, EventReporter, LocalReportSink, ScenarioRunner};

#[derive(Parser)]
#[command(name = "scenario-run")]
#[command(about = "Run a scripted page scenario from a TOML file")]
struct Args {
    /// Path to TOML scenario file
    #[arg(short, long, default_value = "scenario.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override report output path from config
    #[arg(long)]
    report: Option<String>,

    /// Dry run - show what would be simulated without executing
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting scenario runner");
    tracing::info!("📁 Loading scenario from: {}", args.config);

    // 載入 TOML 劇本
    let mut config = match ScenarioConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load scenario file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(report_path) = &args.report {
        tracing::info!("🔧 Report path overridden to: {}", report_path);
        match &mut config.report {
            Some(report) => report.output_path = report_path.clone(),
            None => {
                config.report = Some(ReportConfig {
                    output_path: report_path.clone(),
                    output_formats: vec!["csv".to_string()],
                })
            }
        }
    }

    // 驗證劇本
    if let Err(e) = config.validate() {
        tracing::error!("❌ Scenario validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Scenario loaded and validated successfully");

    // 顯示劇本摘要
    display_scenario_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No simulation will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    match run_scenario(&config) {
        Ok(events) => {
            tracing::info!("✅ Scenario completed successfully!");
            println!("✅ Scenario completed successfully!");
            println!("📊 Events recorded: {}", events.len());
            for record in &events {
                println!("  {} {} -> {}", record.timestamp, record.event, record.target);
            }

            if let Some(report) = &config.report {
                println!("📁 Report saved to: {}", report.output_path);
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Scenario failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                rtd_search_shim::utils::error::ErrorSeverity::Low => 0, // 警告，但成功
                rtd_search_shim::utils::error::ErrorSeverity::Medium => 2, // 內容缺漏
                rtd_search_shim::utils::error::ErrorSeverity::High => 1, // 處理錯誤
                rtd_search_shim::utils::error::ErrorSeverity::Critical => 3, // 系統錯誤
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn run_scenario(config: &ScenarioConfig) -> rtd_search_shim::Result<Vec<EventRecord>> {
    let runner = ScenarioRunner::new(config.clone());
    let events = runner.run()?;

    // 寫報告
    if let Some(report) = &runner.config().report {
        let sink = LocalReportSink::new(report.output_path.clone());
        let reporter = EventReporter::new(report.output_formats.clone());
        reporter.write(&sink, &events)?;
    }

    Ok(events)
}

fn display_scenario_summary(config: &ScenarioConfig, args: &Args) {
    println!("📋 Scenario Summary:");
    println!(
        "  Scenario: {} v{}",
        config.scenario.name, config.scenario.version
    );

    match (&config.page.snapshot_path, &config.page.inline) {
        (Some(path), _) => println!("  Page: {}", path),
        (None, Some(body)) => println!("  Page: inline <{}> tree", body.tag),
        (None, None) => println!("  Page: built-in sample docs page"),
    }

    println!("  Steps: {}", config.steps.len());

    match &config.report {
        Some(report) => println!(
            "  Report: {} ({})",
            report.output_path,
            report.output_formats.join(", ")
        ),
        None => println!("  Report: disabled"),
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &ScenarioConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    // 頁面來源分析
    println!("📄 Page Source:");
    match (&config.page.snapshot_path, &config.page.inline) {
        (Some(path), _) => println!("  Snapshot: {}", path),
        (None, Some(body)) => println!("  Snapshot: inline <{}> tree", body.tag),
        (None, None) => println!("  Snapshot: built-in sample docs page"),
    }
    if let Some(url) = &config.page.url {
        println!("  URL override: {}", url);
    }
    if let Some(title) = &config.page.title {
        println!("  Title override: {}", title);
    }

    // 步驟分析
    println!();
    println!("⚙️ Steps:");
    for (index, step) in config.steps.iter().enumerate() {
        let mut line = format!("  {}. {} {}", index + 1, step.action, step.selector);
        if let Some(event) = &step.event {
            line.push_str(&format!(" ({})", event));
        }
        if step.repeat_count() > 1 {
            line.push_str(&format!(" x{}", step.repeat_count()));
        }
        println!("{}", line);
    }
    if config.steps.is_empty() {
        println!("  (no steps, only content-loaded hooks will run)");
    }

    // 報告分析
    println!();
    println!("💾 Report Configuration:");
    match &config.report {
        Some(report) => {
            println!("  Path: {}", report.output_path);
            println!("  Formats: {}", report.output_formats.join(", "));
        }
        None => println!("  Disabled"),
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}

use clap::Parser;
use rtd_search_shim::utils::{logger, validation::Validate};
use rtd_search_shim::{
    CliConfig, EventRecord, EventReporter, LocalReportSink, PageRuntime, PageSnapshot,
    SearchRedirect, SEARCH_SHOW_EVENT,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting rtd-search-shim CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(&config) {
        Ok(events) => {
            let shows = events
                .iter()
                .filter(|record| record.event == SEARCH_SHOW_EVENT)
                .count();

            tracing::info!("✅ Page simulation completed successfully!");
            println!("✅ Page simulation completed successfully!");
            println!(
                "📊 Events recorded: {} ({}: {})",
                events.len(),
                SEARCH_SHOW_EVENT,
                shows
            );
            for record in &events {
                println!("  {} {} -> {}", record.timestamp, record.event, record.target);
            }

            if let Some(report_path) = &config.report_path {
                println!("📁 Report saved to: {}", report_path);
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Page simulation failed: {} (Category: {:?}, Severity: {:?})",
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

fn run(config: &CliConfig) -> rtd_search_shim::Result<Vec<EventRecord>> {
    // 載入頁面快照
    let snapshot = match &config.page {
        Some(path) => {
            tracing::info!("📁 Loading page snapshot from: {}", path);
            PageSnapshot::from_file(path)?
        }
        None => {
            tracing::info!("📄 Using the built-in sample docs page");
            PageSnapshot::sample_docs_page()
        }
    };

    let mut runtime = PageRuntime::new(&snapshot)?;
    runtime.register_hook(Box::new(SearchRedirect::new()));
    runtime.content_loaded()?;

    tracing::info!("🔍 Focusing: {}", config.focus_selector);
    runtime.focus_selector(&config.focus_selector)?;

    if let Some(report_path) = &config.report_path {
        let sink = LocalReportSink::new(report_path.clone());
        let reporter = EventReporter::new(config.report_formats.clone());
        reporter.write(&sink, runtime.document().event_log())?;
    }

    Ok(runtime.document().event_log().to_vec())
}

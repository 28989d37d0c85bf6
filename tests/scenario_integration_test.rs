use anyhow::Result;
use rtd_search_shim::config::scenario::ScenarioConfig;
use rtd_search_shim::utils::validation::Validate;
use rtd_search_shim::{
    EventRecord, EventReporter, LocalReportSink, ScenarioRunner, SEARCH_SHOW_EVENT,
};
use std::fs;
use tempfile::TempDir;

const PAGE_JSON: &str = r#"{
  "url": "https://docs.example.io/en/latest/",
  "title": "Example docs",
  "body": {
    "tag": "body",
    "children": [
      {
        "tag": "nav",
        "attrs": { "class": "wy-nav-side" },
        "children": [
          {
            "tag": "div",
            "attrs": { "class": "sidebar-search" },
            "children": [
              { "tag": "input", "attrs": { "type": "search" } }
            ]
          }
        ]
      },
      {
        "tag": "section",
        "attrs": { "class": "wy-nav-content" },
        "children": [
          { "tag": "article", "attrs": { "role": "main" } }
        ]
      }
    ]
  }
}"#;

#[test]
fn test_end_to_end_scenario_with_report() -> Result<()> {
    // 為頁面快照與報告準備暫存目錄
    let temp_dir = TempDir::new()?;
    let page_path = temp_dir.path().join("page.json");
    let report_path = temp_dir.path().join("report");

    fs::write(&page_path, PAGE_JSON)?;

    let scenario_toml = format!(
        r#"
[scenario]
name = "end-to-end"
description = "Full pass over a snapshot page"
version = "1.0"

[page]
snapshot_path = "{page}"

[[steps]]
action = "focus"
selector = ".sidebar-search input[type='search']"
repeat = 2

[report]
output_path = "{report}"
output_formats = ["csv", "json"]
"#,
        page = page_path.display(),
        report = report_path.display()
    );

    let config = ScenarioConfig::from_toml_str(&scenario_toml)?;
    config.validate()?;

    let events = ScenarioRunner::new(config.clone()).run()?;

    // 兩輪聚焦，各發出一次通知
    let shows = events
        .iter()
        .filter(|record| record.event == SEARCH_SHOW_EVENT)
        .count();
    assert_eq!(shows, 2);

    // 報告寫法與 scenario-run 執行檔相同
    let report = config.report.as_ref().unwrap();
    let sink = LocalReportSink::new(report.output_path.clone());
    EventReporter::new(report.output_formats.clone()).write(&sink, &events)?;

    // 驗證 CSV 內容結構
    let csv_content = fs::read_to_string(report_path.join("events.csv"))?;
    let lines: Vec<&str> = csv_content.lines().collect();
    assert_eq!(lines.len(), events.len() + 1);
    assert!(lines[0].contains("timestamp,event,target,bubbled,payload"));
    assert!(csv_content.contains("readthedocs-search-show"));

    // 驗證 JSON 報告能解析回同樣的紀錄
    let json_content = fs::read(report_path.join("events.json"))?;
    let parsed: Vec<EventRecord> = serde_json::from_slice(&json_content)?;
    assert_eq!(parsed.len(), events.len());
    assert_eq!(parsed[0].event, events[0].event);

    println!("✅ End-to-end scenario completed successfully!");
    println!("📊 Events recorded: {}", events.len());

    Ok(())
}

#[test]
fn test_blur_and_dispatch_steps_on_the_sample_page() -> Result<()> {
    let scenario_toml = r#"
[scenario]
name = "mixed-steps"
description = "Blur and dispatch against the built-in page"
version = "1.0"

[page]

[[steps]]
action = "focus"
selector = "article"

[[steps]]
action = "dispatch"
selector = "section.wy-nav-content"
event = "docs-nav"
payload = { to = "/api" }

[[steps]]
action = "blur"
selector = "article"
"#;

    let config = ScenarioConfig::from_toml_str(scenario_toml)?;
    config.validate()?;

    let events = ScenarioRunner::new(config).run()?;

    let names: Vec<&str> = events.iter().map(|record| record.event.as_str()).collect();
    assert_eq!(names, vec!["content-loaded", "focus", "docs-nav", "blur"]);

    let nav = &events[2];
    assert!(nav.bubbled);
    assert_eq!(nav.payload.as_deref(), Some("{\"to\":\"/api\"}"));
    assert!(nav.target.starts_with("section"));

    Ok(())
}

#[test]
fn test_scenario_with_invalid_report_format_fails_validation() -> Result<()> {
    let scenario_toml = r#"
[scenario]
name = "bad-report"
description = "test"
version = "1.0"

[page]

[report]
output_path = "./report"
output_formats = ["xml"]
"#;

    let config = ScenarioConfig::from_toml_str(scenario_toml)?;
    assert!(config.validate().is_err());

    Ok(())
}

use crate::domain::model::EventRecord;
use crate::domain::ports::ReportSink;
use crate::utils::error::{Result, ShimError};
use tracing::info;

pub const CSV_REPORT_FILENAME: &str = "events.csv";
pub const JSON_REPORT_FILENAME: &str = "events.json";

/// 事件報告器：把一次模擬的事件紀錄輸出成一種或多種格式
pub struct EventReporter {
    formats: Vec<String>,
}

impl EventReporter {
    pub fn new(formats: Vec<String>) -> Self {
        Self { formats }
    }

    pub fn csv_only() -> Self {
        Self {
            formats: vec!["csv".to_string()],
        }
    }

    /// 依設定格式逐一寫出，回傳寫出的檔名
    pub fn write(&self, sink: &dyn ReportSink, records: &[EventRecord]) -> Result<Vec<String>> {
        let mut written = Vec::new();

        for format in &self.formats {
            let (filename, data) = match format.as_str() {
                "csv" => (CSV_REPORT_FILENAME, render_csv(records)?),
                "json" => (JSON_REPORT_FILENAME, render_json(records)?),
                other => {
                    return Err(ShimError::InvalidConfigValueError {
                        field: "report.output_formats".to_string(),
                        value: other.to_string(),
                        reason: "Supported formats: csv, json".to_string(),
                    })
                }
            };

            sink.write_file(filename, &data)?;
            info!("📁 report written: {} ({} events)", filename, records.len());
            written.push(filename.to_string());
        }

        Ok(written)
    }
}

fn render_csv(records: &[EventRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| ShimError::IoError(e.into_error()))
}

fn render_json(records: &[EventRecord]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemorySink {
        files: RefCell<HashMap<String, Vec<u8>>>,
    }

    impl ReportSink for MemorySink {
        fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files.borrow_mut().insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn sample_records() -> Vec<EventRecord> {
        vec![
            EventRecord {
                timestamp: Utc::now(),
                event: "focus".to_string(),
                target: "input.sidebar".to_string(),
                bubbled: false,
                payload: None,
            },
            EventRecord {
                timestamp: Utc::now(),
                event: "readthedocs-search-show".to_string(),
                target: "#document".to_string(),
                bubbled: true,
                payload: Some("{\"page\":1}".to_string()),
            },
        ]
    }

    #[test]
    fn test_csv_report_has_header_and_rows() {
        let sink = MemorySink::default();
        let written = EventReporter::csv_only().write(&sink, &sample_records()).unwrap();
        assert_eq!(written, vec![CSV_REPORT_FILENAME.to_string()]);

        let files = sink.files.borrow();
        let content = String::from_utf8(files[CSV_REPORT_FILENAME].clone()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("timestamp"));
        assert!(lines[0].contains("event"));
        assert!(lines[2].contains("readthedocs-search-show"));
    }

    #[test]
    fn test_json_report_round_trips() {
        let sink = MemorySink::default();
        let records = sample_records();
        EventReporter::new(vec!["json".to_string()])
            .write(&sink, &records)
            .unwrap();

        let files = sink.files.borrow();
        let parsed: Vec<EventRecord> =
            serde_json::from_slice(&files[JSON_REPORT_FILENAME]).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].event, records[1].event);
        assert_eq!(parsed[1].payload, records[1].payload);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let sink = MemorySink::default();
        let err = EventReporter::new(vec!["xml".to_string()])
            .write(&sink, &sample_records())
            .unwrap_err();

        match err {
            ShimError::InvalidConfigValueError { value, .. } => assert_eq!(value, "xml"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

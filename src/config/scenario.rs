use crate::domain::model::{ElementSnapshot, PageSnapshot};
use crate::utils::error::{Result, ShimError};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub scenario: ScenarioInfo,
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub steps: Vec<StepConfig>,
    pub report: Option<ReportConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInfo {
    pub name: String,
    pub description: String,
    pub version: String,
}

/// 頁面來源：快照檔或內嵌元素樹，至多擇一；都不給就用內建範例頁
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageConfig {
    pub snapshot_path: Option<String>,
    pub inline: Option<ElementSnapshot>,
    pub url: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    pub action: String,
    pub selector: String,
    pub event: Option<String>,
    pub payload: Option<serde_json::Value>,
    pub repeat: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
}

const VALID_ACTIONS: [&str; 3] = ["focus", "blur", "dispatch"];
const VALID_REPORT_FORMATS: [&str; 2] = ["csv", "json"];

impl ScenarioConfig {
    /// 從 TOML 檔案載入劇本
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ShimError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析劇本
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ShimError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DOCS_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        // 使用正規表達式匹配 ${VAR_NAME} 格式
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證劇本的合理性
    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_non_empty_string(
            "scenario.name",
            &self.scenario.name,
        )?;

        if self.page.snapshot_path.is_some() && self.page.inline.is_some() {
            return Err(ShimError::ConfigValidationError {
                field: "page".to_string(),
                message: "snapshot_path and inline are mutually exclusive".to_string(),
            });
        }

        if let Some(snapshot_path) = &self.page.snapshot_path {
            crate::utils::validation::validate_path("page.snapshot_path", snapshot_path)?;
            crate::utils::validation::validate_file_extensions(
                "page.snapshot_path",
                &[snapshot_path.clone()],
                &["json"],
            )?;
        }

        if let Some(inline) = &self.page.inline {
            crate::utils::validation::validate_non_empty_string("page.inline.tag", &inline.tag)?;
        }

        if let Some(url) = &self.page.url {
            crate::utils::validation::validate_url("page.url", url)?;
        }

        for (index, step) in self.steps.iter().enumerate() {
            if !VALID_ACTIONS.contains(&step.action.as_str()) {
                return Err(ShimError::InvalidConfigValueError {
                    field: format!("steps[{}].action", index),
                    value: step.action.clone(),
                    reason: format!("Supported actions: {}", VALID_ACTIONS.join(", ")),
                });
            }

            crate::utils::validation::validate_selector(
                &format!("steps[{}].selector", index),
                &step.selector,
            )?;

            if step.action == "dispatch" {
                let event = crate::utils::validation::validate_required_field(
                    &format!("steps[{}].event", index),
                    &step.event,
                )?;
                crate::utils::validation::validate_non_empty_string(
                    &format!("steps[{}].event", index),
                    event,
                )?;
            }

            if let Some(repeat) = step.repeat {
                crate::utils::validation::validate_positive_number(
                    &format!("steps[{}].repeat", index),
                    repeat,
                    1,
                )?;
            }
        }

        if let Some(report) = &self.report {
            crate::utils::validation::validate_path("report.output_path", &report.output_path)?;

            for format in &report.output_formats {
                if !VALID_REPORT_FORMATS.contains(&format.as_str()) {
                    return Err(ShimError::InvalidConfigValueError {
                        field: "report.output_formats".to_string(),
                        value: format.clone(),
                        reason: format!(
                            "Unsupported format. Valid formats: {}",
                            VALID_REPORT_FORMATS.join(", ")
                        ),
                    });
                }
            }
        }

        Ok(())
    }

    /// 取得頁面快照；來源是快照檔或內嵌元素樹，都未指定時用內建範例頁
    pub fn load_page(&self) -> Result<PageSnapshot> {
        let mut snapshot = match (&self.page.snapshot_path, &self.page.inline) {
            (Some(_), Some(_)) => {
                return Err(ShimError::ConfigValidationError {
                    field: "page".to_string(),
                    message: "snapshot_path and inline are mutually exclusive".to_string(),
                })
            }
            (Some(path), None) => PageSnapshot::from_file(path)?,
            (None, Some(body)) => PageSnapshot::new(body.clone()),
            (None, None) => PageSnapshot::sample_docs_page(),
        };

        if let Some(url) = &self.page.url {
            snapshot.url = Some(url.clone());
        }
        if let Some(title) = &self.page.title {
            snapshot.title = Some(title.clone());
        }

        Ok(snapshot)
    }

    /// 取得劇本名稱
    pub fn scenario_name(&self) -> &str {
        &self.scenario.name
    }

    /// 是否要寫報告
    pub fn report_enabled(&self) -> bool {
        self.report.is_some()
    }
}

impl StepConfig {
    /// 取得重複次數，預設 1
    pub fn repeat_count(&self) -> usize {
        self.repeat.unwrap_or(1)
    }
}

impl Validate for ScenarioConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

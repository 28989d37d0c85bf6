#[cfg(feature = "cli")]
pub mod cli;
pub mod scenario;

#[cfg(feature = "cli")]
use crate::core::search_redirect::SIDEBAR_SEARCH_SELECTOR;
#[cfg(feature = "cli")]
use crate::utils::error::{Result, ShimError};
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "rtd-search-shim")]
#[command(about = "Headless docs-page harness for the sidebar search redirect")]
pub struct CliConfig {
    /// Page snapshot JSON; the built-in sample docs page is used when omitted
    #[arg(long)]
    pub page: Option<String>,

    /// Element to focus after content-loaded
    #[arg(long, default_value = SIDEBAR_SEARCH_SELECTOR)]
    pub focus_selector: String,

    /// Directory to write event reports into; no report when omitted
    #[arg(long)]
    pub report_path: Option<String>,

    #[arg(long, value_delimiter = ',', default_value = "csv")]
    pub report_formats: Vec<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON for CI collectors")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(page) = &self.page {
            validation::validate_path("page", page)?;
            validation::validate_file_extensions("page", &[page.clone()], &["json"])?;
        }

        validation::validate_selector("focus_selector", &self.focus_selector)?;

        if let Some(report_path) = &self.report_path {
            validation::validate_path("report_path", report_path)?;
        }

        let valid_formats = ["csv", "json"];
        for format in &self.report_formats {
            if !valid_formats.contains(&format.as_str()) {
                return Err(ShimError::InvalidConfigValueError {
                    field: "report_formats".to_string(),
                    value: format.clone(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        valid_formats.join(", ")
                    ),
                });
            }
        }

        Ok(())
    }
}

pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalReportSink, CliConfig};

pub use config::scenario::ScenarioConfig;
pub use core::document::Document;
pub use core::report::EventReporter;
pub use core::runtime::PageRuntime;
pub use core::scenario::ScenarioRunner;
pub use core::search_redirect::{SearchRedirect, SEARCH_SHOW_EVENT, SIDEBAR_SEARCH_SELECTOR};
pub use domain::model::{ElementSnapshot, EventRecord, PageSnapshot};
pub use domain::ports::{PageHook, ReportSink};
pub use utils::error::{Result, ShimError};

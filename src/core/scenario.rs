use crate::config::scenario::ScenarioConfig;
use crate::core::runtime::PageRuntime;
use crate::core::search_redirect::SearchRedirect;
use crate::domain::model::EventRecord;
use crate::utils::error::{Result, ShimError};
use crate::utils::validation;
use tracing::info;

/// 劇本執行器：載入頁面、掛上搜尋轉接掛鉤、依序執行步驟。
/// 報告輸出由呼叫端負責
pub struct ScenarioRunner {
    config: ScenarioConfig,
}

impl ScenarioRunner {
    pub fn new(config: ScenarioConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// 執行整個劇本，回傳完整事件紀錄
    pub fn run(&self) -> Result<Vec<EventRecord>> {
        let snapshot = self.config.load_page()?;

        let mut runtime = PageRuntime::new(&snapshot)?;
        runtime.register_hook(Box::new(SearchRedirect::new()));
        runtime.content_loaded()?;

        for (index, step) in self.config.steps.iter().enumerate() {
            for _ in 0..step.repeat_count() {
                info!("▶️ Step {}: {} {}", index + 1, step.action, step.selector);
                match step.action.as_str() {
                    "focus" => {
                        runtime.focus_selector(&step.selector)?;
                    }
                    "blur" => {
                        runtime.blur_selector(&step.selector)?;
                    }
                    "dispatch" => {
                        let event = validation::validate_required_field(
                            &format!("steps[{}].event", index),
                            &step.event,
                        )?;
                        runtime.dispatch_on_selector(&step.selector, event, step.payload.clone())?;
                    }
                    other => {
                        return Err(ShimError::InvalidConfigValueError {
                            field: format!("steps[{}].action", index),
                            value: other.to_string(),
                            reason: "Supported actions: focus, blur, dispatch".to_string(),
                        })
                    }
                }
            }
        }

        Ok(runtime.document().event_log().to_vec())
    }
}

use crate::core::document::Document;
use crate::domain::model::{NodeId, PageSnapshot};
use crate::domain::ports::PageHook;
use crate::utils::error::{Result, ShimError};
use tracing::{debug, info};

/// content-loaded 時記錄在事件紀錄裡的事件名
pub const CONTENT_LOADED_EVENT: &str = "content-loaded";

/// 頁面生命週期：持有文件與掛鉤。content-loaded 只會觸發一次，
/// 之後的呼叫是無動作
pub struct PageRuntime {
    document: Document,
    hooks: Vec<Box<dyn PageHook>>,
    content_loaded_fired: bool,
}

impl PageRuntime {
    pub fn new(snapshot: &PageSnapshot) -> Result<Self> {
        Ok(Self {
            document: Document::from_snapshot(snapshot)?,
            hooks: Vec::new(),
            content_loaded_fired: false,
        })
    }

    pub fn register_hook(&mut self, hook: Box<dyn PageHook>) {
        debug!(hook = hook.name(), "page hook registered");
        self.hooks.push(hook);
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// 宣告頁面載入完成：記錄事件後依註冊順序執行掛鉤。
    /// 任一掛鉤失敗即中止，後續掛鉤不執行
    pub fn content_loaded(&mut self) -> Result<()> {
        if self.content_loaded_fired {
            debug!("content-loaded already fired, ignoring");
            return Ok(());
        }
        self.content_loaded_fired = true;

        let root = self.document.root();
        self.document.dispatch_custom_on(root, CONTENT_LOADED_EVENT, None)?;

        info!("📄 content loaded, running {} page hooks", self.hooks.len());
        for hook in &self.hooks {
            debug!(hook = hook.name(), "running page hook");
            hook.on_content_loaded(&mut self.document)?;
        }

        Ok(())
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// 聚焦第一個符合選擇器的元素；找不到是錯誤（與掛鉤的靜默略過不同）
    pub fn focus_selector(&mut self, selector: &str) -> Result<NodeId> {
        let id = self.require_selector(selector)?;
        self.document.focus(id)?;
        Ok(id)
    }

    pub fn blur_selector(&mut self, selector: &str) -> Result<NodeId> {
        let id = self.require_selector(selector)?;
        self.document.blur(id)?;
        Ok(id)
    }

    pub fn dispatch_on_selector(
        &mut self,
        selector: &str,
        event: &str,
        payload: Option<serde_json::Value>,
    ) -> Result<NodeId> {
        let id = self.require_selector(selector)?;
        self.document.dispatch_custom_on(id, event, payload)?;
        Ok(id)
    }

    fn require_selector(&self, selector: &str) -> Result<NodeId> {
        self.document
            .query_selector(selector)?
            .ok_or_else(|| ShimError::ElementNotFoundError {
                selector: selector.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct CountingHook {
        label: &'static str,
        calls: Rc<RefCell<Vec<&'static str>>>,
    }

    impl PageHook for CountingHook {
        fn name(&self) -> &str {
            self.label
        }

        fn on_content_loaded(&self, _document: &mut Document) -> Result<()> {
            self.calls.borrow_mut().push(self.label);
            Ok(())
        }
    }

    struct FailingHook;

    impl PageHook for FailingHook {
        fn name(&self) -> &str {
            "failing"
        }

        fn on_content_loaded(&self, _document: &mut Document) -> Result<()> {
            Err(ShimError::ConfigError {
                message: "hook failed".to_string(),
            })
        }
    }

    fn runtime() -> PageRuntime {
        PageRuntime::new(&PageSnapshot::sample_docs_page()).unwrap()
    }

    #[test]
    fn test_content_loaded_runs_hooks_in_registration_order_once() {
        let mut runtime = runtime();
        let calls = Rc::new(RefCell::new(Vec::new()));

        for label in ["first", "second"] {
            runtime.register_hook(Box::new(CountingHook {
                label,
                calls: calls.clone(),
            }));
        }
        assert_eq!(runtime.hook_count(), 2);

        runtime.content_loaded().unwrap();
        runtime.content_loaded().unwrap();

        assert_eq!(*calls.borrow(), vec!["first", "second"]);
        assert_eq!(runtime.document().count_events(CONTENT_LOADED_EVENT), 1);
    }

    #[test]
    fn test_failing_hook_stops_later_hooks() {
        let mut runtime = runtime();
        let calls = Rc::new(RefCell::new(Vec::new()));

        runtime.register_hook(Box::new(FailingHook));
        runtime.register_hook(Box::new(CountingHook {
            label: "after",
            calls: calls.clone(),
        }));

        assert!(runtime.content_loaded().is_err());
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_focus_selector_drives_the_document() {
        let mut runtime = runtime();

        let input = runtime
            .focus_selector(".sidebar-search input[type='search']")
            .unwrap();
        assert_eq!(runtime.document().active_element(), Some(input));

        runtime.blur_selector(".sidebar-search input[type='search']").unwrap();
        assert_eq!(runtime.document().active_element(), None);
    }

    #[test]
    fn test_focus_selector_misses_are_errors() {
        let mut runtime = runtime();

        let err = runtime.focus_selector("#no-such-element").unwrap_err();
        match err {
            ShimError::ElementNotFoundError { selector } => {
                assert_eq!(selector, "#no-such-element");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_on_selector_records_the_event() {
        let mut runtime = runtime();

        runtime
            .dispatch_on_selector("article", "docs-nav", Some(serde_json::json!({"to": "/api"})))
            .unwrap();

        assert_eq!(runtime.document().count_events("docs-nav"), 1);
    }
}

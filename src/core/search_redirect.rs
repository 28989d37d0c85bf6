use crate::core::document::Document;
use crate::domain::ports::PageHook;
use crate::utils::error::Result;
use std::rc::Rc;
use tracing::debug;

/// 側欄搜尋框的固定選擇器
pub const SIDEBAR_SEARCH_SELECTOR: &str = ".sidebar-search input[type='search']";

/// 通知站台層搜尋介面現身的自訂事件名
pub const SEARCH_SHOW_EVENT: &str = "readthedocs-search-show";

/// 把側欄搜尋框的 focus 轉成 readthedocs-search-show 廣播。
/// 廣播後立刻把焦點移開，輸入本身不留在搜尋框裡；
/// 頁面上沒有搜尋框時整個掛鉤靜默退場
#[derive(Debug, Default)]
pub struct SearchRedirect;

impl SearchRedirect {
    pub fn new() -> Self {
        Self
    }
}

impl PageHook for SearchRedirect {
    fn name(&self) -> &str {
        "search-redirect"
    }

    fn on_content_loaded(&self, document: &mut Document) -> Result<()> {
        let Some(input) = document.query_selector(SIDEBAR_SEARCH_SELECTOR)? else {
            debug!(
                selector = SIDEBAR_SEARCH_SELECTOR,
                "no sidebar search input on this page"
            );
            return Ok(());
        };

        document.add_event_listener(
            input,
            "focus",
            Rc::new(|doc: &mut Document, event| {
                doc.dispatch_custom(SEARCH_SHOW_EVENT)?;
                doc.blur(event.target())
            }),
        )?;

        debug!(node = %document.node_label(input), "sidebar search redirect armed");
        Ok(())
    }
}

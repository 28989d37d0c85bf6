use crate::core::document::Document;
use crate::utils::error::Result;

/// 頁面掛鉤：content-loaded 時由 PageRuntime 呼叫一次。
/// 實作者在文件上查詢節點並註冊監聽器；找不到目標時應靜默返回。
pub trait PageHook {
    fn name(&self) -> &str;
    fn on_content_loaded(&self, document: &mut Document) -> Result<()>;
}

/// 報告輸出端：把產生好的報告位元組寫到某個地方
pub trait ReportSink {
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Arena 索引，指向文件樹中的一個節點
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: NodeKind,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Document,
    Element(ElementData),
}

/// 元素節點資料；建樹後只讀
#[derive(Debug, Clone)]
pub struct ElementData {
    pub(crate) tag: String,
    pub(crate) attrs: HashMap<String, String>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: HashMap::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attrs
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attrs
            .get("class")
            .map(|classes| classes.split_whitespace().any(|token| token == class))
            .unwrap_or(false)
    }

    pub fn is_disabled(&self) -> bool {
        self.attrs.contains_key("disabled")
    }

    /// 除錯/報表用的簡短描述，如 `input#q.wy-form`
    pub fn describe(&self) -> String {
        let mut out = self.tag.to_ascii_lowercase();
        if let Some(id) = self.attrs.get("id") {
            out.push('#');
            out.push_str(id);
        }
        if let Some(classes) = self.attrs.get("class") {
            for class in classes.split_whitespace() {
                out.push('.');
                out.push_str(class);
            }
        }
        out
    }
}

/// 一次派發的事件；監聽器以唯讀方式取得
#[derive(Debug, Clone)]
pub struct Event {
    name: String,
    target: NodeId,
    bubbles: bool,
    payload: Option<serde_json::Value>,
    timestamp: DateTime<Utc>,
}

impl Event {
    pub(crate) fn new(
        name: &str,
        target: NodeId,
        bubbles: bool,
        payload: Option<serde_json::Value>,
    ) -> Self {
        Self {
            name: name.to_string(),
            target,
            bubbles,
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn payload(&self) -> Option<&serde_json::Value> {
        self.payload.as_ref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// 事件日誌的一列；扁平結構方便寫成 CSV 報表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp: DateTime<Utc>,
    pub event: String,
    pub target: String,
    pub bubbled: bool,
    pub payload: Option<String>,
}

impl EventRecord {
    pub(crate) fn from_event(event: &Event, target_label: String) -> Self {
        Self {
            timestamp: event.timestamp(),
            event: event.name().to_string(),
            target: target_label,
            bubbled: event.bubbles(),
            payload: event.payload().map(|value| value.to_string()),
        }
    }
}

/// 頁面快照：以 JSON 描述的一棵元素樹，為測試與 CLI 的輸入格式
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: Option<String>,
    pub title: Option<String>,
    pub body: ElementSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub tag: String,
    #[serde(default)]
    pub attrs: HashMap<String, String>,
    #[serde(default)]
    pub children: Vec<ElementSnapshot>,
}

impl ElementSnapshot {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn child(mut self, child: ElementSnapshot) -> Self {
        self.children.push(child);
        self
    }
}

impl PageSnapshot {
    pub fn new(body: ElementSnapshot) -> Self {
        Self {
            url: None,
            title: None,
            body,
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// 從 JSON 檔案載入頁面快照
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> crate::utils::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 從 JSON 字串解析頁面快照
    pub fn from_json_str(content: &str) -> crate::utils::error::Result<Self> {
        let snapshot = serde_json::from_str(content)?;
        Ok(snapshot)
    }

    /// 內建示範頁：文件站常見的側欄加上搜尋框
    pub fn sample_docs_page() -> Self {
        PageSnapshot::new(
            ElementSnapshot::new("body")
                .child(
                    ElementSnapshot::new("nav")
                        .attr("class", "wy-nav-side")
                        .child(
                            ElementSnapshot::new("div")
                                .attr("class", "sidebar-search")
                                .child(
                                    ElementSnapshot::new("input")
                                        .attr("type", "search")
                                        .attr("placeholder", "Search docs"),
                                ),
                        )
                        .child(
                            ElementSnapshot::new("ul")
                                .attr("class", "toctree")
                                .child(ElementSnapshot::new("li").attr("class", "toctree-l1")),
                        ),
                )
                .child(
                    ElementSnapshot::new("section")
                        .attr("class", "wy-nav-content")
                        .child(ElementSnapshot::new("article").attr("role", "main")),
                ),
        )
        .with_url("https://docs.example.io/en/latest/")
        .with_title("Example docs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_class_and_attr_lookup() {
        let mut element = ElementData::new("input");
        element.set_attr("Type", "search");
        element.set_attr("class", "wy-form sidebar-input");

        assert_eq!(element.attr("type"), Some("search"));
        assert_eq!(element.attr("TYPE"), Some("search"));
        assert!(element.has_class("sidebar-input"));
        assert!(!element.has_class("sidebar"));
        assert!(!element.is_disabled());
    }

    #[test]
    fn test_element_describe_format() {
        let mut element = ElementData::new("INPUT");
        element.set_attr("id", "q");
        element.set_attr("class", "wy-form grow");

        assert_eq!(element.describe(), "input#q.wy-form.grow");
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let snapshot = PageSnapshot::sample_docs_page();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed = PageSnapshot::from_json_str(&json).unwrap();

        assert_eq!(parsed.url.as_deref(), Some("https://docs.example.io/en/latest/"));
        assert_eq!(parsed.body.tag, "body");
        assert_eq!(parsed.body.children.len(), 2);
    }

    #[test]
    fn test_snapshot_defaults_for_missing_fields() {
        let json = r#"{"body": {"tag": "body"}}"#;
        let parsed = PageSnapshot::from_json_str(json).unwrap();

        assert!(parsed.url.is_none());
        assert!(parsed.body.attrs.is_empty());
        assert!(parsed.body.children.is_empty());
    }
}

use crate::core::events::{ListenerFn, ListenerId, ListenerStore};
use crate::core::selector::{self, Combinator, SelectorChain};
use crate::domain::model::{
    ElementData, ElementSnapshot, Event, EventRecord, Node, NodeId, NodeKind, PageSnapshot,
};
use crate::utils::error::{Result, ShimError};
use crate::utils::validation;
use std::rc::Rc;
use tracing::{debug, trace};

/// 頁面文件：由快照建成的節點樹，含監聽器表、焦點狀態與事件紀錄
pub struct Document {
    nodes: Vec<Node>,
    url: Option<String>,
    title: Option<String>,
    listeners: ListenerStore,
    active: Option<NodeId>,
    event_log: Vec<EventRecord>,
}

impl Document {
    /// 從快照建樹。節點依文件順序編號，0 號固定為文件根
    pub fn from_snapshot(snapshot: &PageSnapshot) -> Result<Self> {
        if let Some(url) = &snapshot.url {
            validation::validate_url("page.url", url)?;
        }

        let mut document = Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            url: snapshot.url.clone(),
            title: snapshot.title.clone(),
            listeners: ListenerStore::default(),
            active: None,
            event_log: Vec::new(),
        };

        let root = document.root();
        document.append_element(root, &snapshot.body);

        trace!(nodes = document.nodes.len(), "page document built");
        Ok(document)
    }

    fn append_element(&mut self, parent: NodeId, snapshot: &ElementSnapshot) -> NodeId {
        let mut element = ElementData::new(&snapshot.tag);
        for (name, value) in &snapshot.attrs {
            element.set_attr(name, value);
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            kind: NodeKind::Element(element),
        });
        self.nodes[parent.index()].children.push(id);

        for child in &snapshot.children {
            self.append_element(id, child);
        }

        id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.index())
            .ok_or(ShimError::UnknownNodeError { id: id.index() })
    }

    pub(crate) fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index()).and_then(|node| node.parent)
    }

    pub(crate) fn element_data(&self, id: NodeId) -> Option<&ElementData> {
        match self.nodes.get(id.index()).map(|node| &node.kind) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    /// 取元素資料；文件根不是元素，同樣回報為未知節點
    pub fn element(&self, id: NodeId) -> Result<&ElementData> {
        self.element_data(id)
            .ok_or(ShimError::UnknownNodeError { id: id.index() })
    }

    pub(crate) fn node_label(&self, id: NodeId) -> String {
        match self.element_data(id) {
            Some(element) => element.describe(),
            None => "#document".to_string(),
        }
    }

    /// 文件順序下第一個符合選擇器的元素
    pub fn query_selector(&self, selector_str: &str) -> Result<Option<NodeId>> {
        let list = selector::parse(selector_str)?;

        for index in 1..self.nodes.len() {
            let id = NodeId(index);
            if list.chains.iter().any(|chain| self.chain_matches(chain, id)) {
                trace!(selector = selector_str, node = %self.node_label(id), "selector matched");
                return Ok(Some(id));
            }
        }

        Ok(None)
    }

    pub fn query_selector_all(&self, selector_str: &str) -> Result<Vec<NodeId>> {
        let list = selector::parse(selector_str)?;
        let mut matches = Vec::new();

        for index in 1..self.nodes.len() {
            let id = NodeId(index);
            if list.chains.iter().any(|chain| self.chain_matches(chain, id)) {
                matches.push(id);
            }
        }

        Ok(matches)
    }

    fn chain_matches(&self, chain: &SelectorChain, id: NodeId) -> bool {
        self.matches_up_to(chain, chain.parts.len() - 1, id)
    }

    /// 由鏈尾向左比對；combinator 描述目前步驟與左側步驟的關係
    fn matches_up_to(&self, chain: &SelectorChain, part_idx: usize, id: NodeId) -> bool {
        let Some(element) = self.element_data(id) else {
            return false;
        };
        let part = &chain.parts[part_idx];
        if !part.step.matches(element) {
            return false;
        }
        if part_idx == 0 {
            return true;
        }

        match part.combinator {
            Some(Combinator::Child) => match self.parent_of(id) {
                Some(parent) => self.matches_up_to(chain, part_idx - 1, parent),
                None => false,
            },
            Some(Combinator::Descendant) => {
                let mut current = self.parent_of(id);
                while let Some(ancestor) = current {
                    if self.matches_up_to(chain, part_idx - 1, ancestor) {
                        return true;
                    }
                    current = self.parent_of(ancestor);
                }
                false
            }
            // 解析器保證非鏈首步驟一定帶 combinator
            None => false,
        }
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    /// 聚焦元素。停用元素與已聚焦元素都是無動作;
    /// 先對前一個焦點送出 blur，再設定焦點、送出 focus
    pub fn focus(&mut self, id: NodeId) -> Result<()> {
        let element = self.element(id)?;

        if element.is_disabled() {
            debug!(node = %self.node_label(id), "focus ignored on disabled element");
            return Ok(());
        }
        if self.active == Some(id) {
            trace!(node = %self.node_label(id), "element already focused");
            return Ok(());
        }

        if let Some(previous) = self.active.take() {
            self.dispatch(Event::new("blur", previous, false, None))?;
        }

        self.active = Some(id);
        self.dispatch(Event::new("focus", id, false, None))
    }

    /// 解除焦點。僅在該元素正持有焦點時送出 blur
    pub fn blur(&mut self, id: NodeId) -> Result<()> {
        self.element(id)?;

        if self.active != Some(id) {
            trace!(node = %self.node_label(id), "blur ignored, element not focused");
            return Ok(());
        }

        self.active = None;
        self.dispatch(Event::new("blur", id, false, None))
    }

    pub fn add_event_listener(
        &mut self,
        id: NodeId,
        event: &str,
        listener: Rc<ListenerFn>,
    ) -> Result<ListenerId> {
        self.node(id)?;
        debug!(node = %self.node_label(id), event, "listener registered");
        Ok(self.listeners.add(id, event, listener))
    }

    pub fn remove_event_listener(&mut self, id: NodeId, event: &str, listener: ListenerId) -> bool {
        self.listeners.remove(id, event, listener)
    }

    pub fn listener_count(&self, id: NodeId, event: &str) -> usize {
        self.listeners.count(id, event)
    }

    pub fn total_listeners(&self) -> usize {
        self.listeners.total()
    }

    /// 派發事件：先記錄，再沿目標與其祖先（bubbles 時）依註冊順序呼叫監聽器。
    /// 監聽器在呼叫前快照，途中增減不影響本次派發
    pub fn dispatch(&mut self, event: Event) -> Result<()> {
        self.node(event.target())?;

        let target_label = self.node_label(event.target());
        debug!(event = event.name(), target = %target_label, bubbles = event.bubbles(), "📡 dispatching event");
        self.event_log
            .push(EventRecord::from_event(&event, target_label));

        let mut path = vec![event.target()];
        if event.bubbles() {
            let mut current = self.parent_of(event.target());
            while let Some(ancestor) = current {
                path.push(ancestor);
                current = self.parent_of(ancestor);
            }
        }

        for node in path {
            for listener in self.listeners.snapshot(node, event.name()) {
                listener(self, &event).map_err(|e| ShimError::DispatchError {
                    event: event.name().to_string(),
                    message: e.to_string(),
                })?;
            }
        }

        Ok(())
    }

    /// 在文件根上派發自訂事件（冒泡、無酬載）
    pub fn dispatch_custom(&mut self, name: &str) -> Result<()> {
        let root = self.root();
        self.dispatch_custom_on(root, name, None)
    }

    /// 在指定節點上派發自訂事件，可附 JSON 酬載
    pub fn dispatch_custom_on(
        &mut self,
        target: NodeId,
        name: &str,
        payload: Option<serde_json::Value>,
    ) -> Result<()> {
        self.dispatch(Event::new(name, target, true, payload))
    }

    pub fn event_log(&self) -> &[EventRecord] {
        &self.event_log
    }

    pub fn count_events(&self, name: &str) -> usize {
        self.event_log
            .iter()
            .filter(|record| record.event == name)
            .count()
    }
}

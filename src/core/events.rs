use crate::core::document::Document;
use crate::domain::model::{Event, NodeId};
use crate::utils::error::Result;
use std::collections::HashMap;
use std::rc::Rc;

/// 監聽器本體。單執行緒模型下以 Rc 共享；
/// 需要可變狀態的監聽器自行捕捉 Rc<RefCell<…>>。
pub type ListenerFn = dyn Fn(&mut Document, &Event) -> Result<()>;

/// 註冊時發出的代號，用於移除
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct RegisteredListener {
    id: ListenerId,
    callback: Rc<ListenerFn>,
}

/// 依 (節點, 事件名) 存放監聽器，同一鍵內保持註冊順序
#[derive(Default)]
pub(crate) struct ListenerStore {
    next_id: u64,
    map: HashMap<NodeId, HashMap<String, Vec<RegisteredListener>>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, node: NodeId, event: &str, callback: Rc<ListenerFn>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;

        self.map
            .entry(node)
            .or_default()
            .entry(event.to_string())
            .or_default()
            .push(RegisteredListener { id, callback });

        id
    }

    pub(crate) fn remove(&mut self, node: NodeId, event: &str, id: ListenerId) -> bool {
        let Some(events) = self.map.get_mut(&node) else {
            return false;
        };
        let Some(listeners) = events.get_mut(event) else {
            return false;
        };

        if let Some(pos) = listeners.iter().position(|listener| listener.id == id) {
            listeners.remove(pos);
            if listeners.is_empty() {
                events.remove(event);
            }
            if events.is_empty() {
                self.map.remove(&node);
            }
            return true;
        }

        false
    }

    pub(crate) fn count(&self, node: NodeId, event: &str) -> usize {
        self.map
            .get(&node)
            .and_then(|events| events.get(event))
            .map(|listeners| listeners.len())
            .unwrap_or(0)
    }

    pub(crate) fn total(&self) -> usize {
        self.map
            .values()
            .flat_map(|events| events.values())
            .map(|listeners| listeners.len())
            .sum()
    }

    /// 派發前取得快照；派發途中增減監聽器不影響本次呼叫
    pub(crate) fn snapshot(&self, node: NodeId, event: &str) -> Vec<Rc<ListenerFn>> {
        self.map
            .get(&node)
            .and_then(|events| events.get(event))
            .map(|listeners| {
                listeners
                    .iter()
                    .map(|listener| listener.callback.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Rc<ListenerFn> {
        Rc::new(|_doc, _event| Ok(()))
    }

    #[test]
    fn test_add_and_count_listeners() {
        let mut store = ListenerStore::default();
        let node = NodeId(3);

        store.add(node, "focus", noop());
        store.add(node, "focus", noop());
        store.add(node, "blur", noop());

        assert_eq!(store.count(node, "focus"), 2);
        assert_eq!(store.count(node, "blur"), 1);
        assert_eq!(store.count(node, "input"), 0);
        assert_eq!(store.total(), 3);
    }

    #[test]
    fn test_remove_listener_by_id() {
        let mut store = ListenerStore::default();
        let node = NodeId(0);

        let first = store.add(node, "focus", noop());
        let second = store.add(node, "focus", noop());

        assert!(store.remove(node, "focus", first));
        assert_eq!(store.count(node, "focus"), 1);

        // 同一代號不能移除兩次
        assert!(!store.remove(node, "focus", first));
        assert!(store.remove(node, "focus", second));
        assert_eq!(store.total(), 0);
    }

    #[test]
    fn test_remove_with_wrong_event_name() {
        let mut store = ListenerStore::default();
        let node = NodeId(1);
        let id = store.add(node, "focus", noop());

        assert!(!store.remove(node, "blur", id));
        assert_eq!(store.count(node, "focus"), 1);
    }

    #[test]
    fn test_snapshot_preserves_registration_order() {
        let mut store = ListenerStore::default();
        let node = NodeId(7);

        let first = noop();
        let second = noop();
        store.add(node, "focus", first.clone());
        store.add(node, "focus", second.clone());

        let snapshot = store.snapshot(node, "focus");
        assert_eq!(snapshot.len(), 2);
        assert!(Rc::ptr_eq(&snapshot[0], &first));
        assert!(Rc::ptr_eq(&snapshot[1], &second));
    }
}

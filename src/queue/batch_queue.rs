//! 批量队列
//!
//! 按插入顺序保存所有条目，任何查询都不会改变顺序

use crate::models::{ImagePayload, ItemId, ItemStatus, QueueItem};

/// 各状态的条目数量
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub error: usize,
}

/// 批量队列
#[derive(Debug, Default)]
pub struct BatchQueue {
    items: Vec<QueueItem>,
}

impl BatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个待处理条目，返回新生成的 ID
    pub fn enqueue(&mut self, file_name: impl Into<String>, source: ImagePayload) -> ItemId {
        let item = QueueItem::new(file_name, source);
        let id = item.id();
        self.items.push(item);
        id
    }

    /// 删除指定条目，不存在时什么也不做
    pub fn remove(&mut self, id: ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.items.len() != before
    }

    /// 删除所有处于指定状态的条目，返回删除数量
    pub fn clear_by_status(&mut self, status: ItemStatus) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.status() != status);
        before - self.items.len()
    }

    /// 清空队列
    ///
    /// 处理进行中不能调用，对外通过 `AppState::clear_all` 检查
    pub(crate) fn clear_all(&mut self) {
        self.items.clear();
    }

    /// 按状态筛选，保持插入顺序
    ///
    /// 返回的迭代器可以 `clone()` 后重新遍历
    pub fn items_with_status(
        &self,
        status: ItemStatus,
    ) -> impl Iterator<Item = &QueueItem> + Clone + '_ {
        self.items.iter().filter(move |item| item.status() == status)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QueueItem> {
        self.items.iter()
    }

    pub fn get(&self, id: ItemId) -> Option<&QueueItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    fn get_mut(&mut self, id: ItemId) -> Option<&mut QueueItem> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for item in &self.items {
            match item.status() {
                ItemStatus::Pending => counts.pending += 1,
                ItemStatus::Processing => counts.processing += 1,
                ItemStatus::Completed => counts.completed += 1,
                ItemStatus::Error => counts.error += 1,
            }
        }
        counts
    }

    // ========== 状态迁移（仅供处理流程使用） ==========

    pub(crate) fn mark_processing(&mut self, id: ItemId) -> bool {
        self.get_mut(id).is_some_and(|item| item.mark_processing())
    }

    pub(crate) fn mark_completed(&mut self, id: ItemId, result: ImagePayload) -> bool {
        self.get_mut(id)
            .is_some_and(|item| item.mark_completed(result))
    }

    pub(crate) fn mark_failed(&mut self, id: ItemId, message: impl Into<String>) -> bool {
        self.get_mut(id).is_some_and(|item| item.mark_failed(message))
    }
}

impl<'a> IntoIterator for &'a BatchQueue {
    type Item = &'a QueueItem;
    type IntoIter = std::slice::Iter<'a, QueueItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

//! 带索引的最大堆
//!
//! 基于数组的二叉堆，外加 key -> 堆位置 的映射，支持 O(1) 成员查询
//! 和 O(log n) 的 increase / extract_max。只支持单调增大优先级。

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
struct Entry<K, P> {
    key: K,
    priority: P,
}

/// 固定容量的索引最大堆
#[derive(Debug, Clone)]
pub struct IndexedMaxHeap<K, P> {
    /// 堆数组（0 起始）
    entries: Vec<Entry<K, P>>,
    /// key 在 entries 中的位置
    positions: HashMap<K, usize>,
    /// 最大元素数
    capacity: usize,
}

impl<K, P> IndexedMaxHeap<K, P>
where
    K: Copy + Eq + Hash,
    P: PartialOrd,
{
    /// 创建最多容纳 capacity 个元素的堆
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, key: &K) -> bool {
        self.positions.contains_key(key)
    }

    /// 当前优先级
    pub fn priority(&self, key: &K) -> Option<&P> {
        self.positions.get(key).map(|&i| &self.entries[i].priority)
    }

    /// 插入元素
    ///
    /// 堆已满或 key 已存在时不做任何事（先插入者生效，之后需走 `increase`）。
    pub fn insert(&mut self, key: K, priority: P) {
        if self.entries.len() == self.capacity || self.contains(&key) {
            return;
        }

        let i = self.entries.len();
        self.entries.push(Entry { key, priority });
        self.positions.insert(key, i);
        self.sift_up(i);
    }

    /// 提高 key 的优先级
    ///
    /// key 不存在或新优先级不大于当前值时忽略。
    pub fn increase(&mut self, key: K, priority: P) {
        let Some(&i) = self.positions.get(&key) else {
            return;
        };
        if !(priority > self.entries[i].priority) {
            return;
        }

        self.entries[i].priority = priority;
        self.sift_up(i);
    }

    /// 取出优先级最大的 key，堆为空时返回 None
    ///
    /// 相同优先级之间的顺序由堆结构决定，调用方不应依赖。
    pub fn extract_max(&mut self) -> Option<K> {
        if self.entries.is_empty() {
            return None;
        }

        let last = self.entries.len() - 1;
        self.swap(0, last);
        let max = self.entries.pop()?;
        self.positions.remove(&max.key);

        if !self.entries.is_empty() {
            self.sift_down(0);
        }

        Some(max.key)
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !(self.entries[i].priority > self.entries[parent].priority) {
                break;
            }
            self.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * i + 1;
            if left >= len {
                break;
            }

            let right = left + 1;
            let mut child = left;
            if right < len && self.entries[right].priority > self.entries[left].priority {
                child = right;
            }

            if !(self.entries[child].priority > self.entries[i].priority) {
                break;
            }
            self.swap(i, child);
            i = child;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.entries.swap(a, b);
        self.positions.insert(self.entries[a].key, a);
        self.positions.insert(self.entries[b].key, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Reverse;

    #[test]
    fn test_extract_in_priority_order() {
        let mut heap = IndexedMaxHeap::with_capacity(8);
        for (key, priority) in [(1usize, 5u64), (2, 9), (3, 1), (4, 7), (5, 3)] {
            heap.insert(key, priority);
        }

        let order: Vec<usize> = std::iter::from_fn(|| heap.extract_max()).collect();
        assert_eq!(order, vec![2, 4, 1, 5, 3]);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_extract_from_empty() {
        let mut heap: IndexedMaxHeap<usize, u64> = IndexedMaxHeap::with_capacity(4);
        assert_eq!(heap.extract_max(), None);
    }

    #[test]
    fn test_insert_existing_key_is_noop() {
        let mut heap = IndexedMaxHeap::with_capacity(4);
        heap.insert(1usize, 5u64);
        heap.insert(1, 50);
        assert_eq!(heap.len(), 1);
        assert_eq!(heap.priority(&1), Some(&5));
    }

    #[test]
    fn test_insert_when_full_is_noop() {
        let mut heap = IndexedMaxHeap::with_capacity(2);
        heap.insert(1usize, 1u64);
        heap.insert(2, 2);
        heap.insert(3, 3);
        assert_eq!(heap.len(), 2);
        assert!(!heap.contains(&3));
    }

    #[test]
    fn test_increase_is_monotonic() {
        let mut heap = IndexedMaxHeap::with_capacity(4);
        heap.insert(1usize, 5u64);
        heap.insert(2, 6);

        // 降低优先级被忽略
        heap.increase(2, 1);
        assert_eq!(heap.priority(&2), Some(&6));

        // 不存在的 key 被忽略
        heap.increase(9, 100);
        assert!(!heap.contains(&9));

        heap.increase(1, 10);
        assert_eq!(heap.extract_max(), Some(1));
        assert_eq!(heap.extract_max(), Some(2));
    }

    #[test]
    fn test_insert_then_increase_pattern() {
        let mut heap = IndexedMaxHeap::with_capacity(4);
        heap.insert(1usize, 3u64);
        heap.increase(1, 3);

        heap.insert(1, 8);
        heap.increase(1, 8);
        assert_eq!(heap.priority(&1), Some(&8));
    }

    #[test]
    fn test_tuple_priorities() {
        let mut heap = IndexedMaxHeap::with_capacity(4);
        heap.insert(1usize, (5u64, Reverse(3u64)));
        heap.insert(2, (5, Reverse(1)));
        heap.insert(3, (4, Reverse(0)));

        assert_eq!(heap.extract_max(), Some(2));
        assert_eq!(heap.extract_max(), Some(1));
        assert_eq!(heap.extract_max(), Some(3));
    }

    #[test]
    fn test_positions_stay_consistent() {
        let mut heap = IndexedMaxHeap::with_capacity(64);
        for key in 0..64usize {
            heap.insert(key, (key * 7 % 13) as u64);
        }
        for key in (0..64usize).step_by(3) {
            heap.increase(key, 100 + key as u64);
        }

        let mut last = u64::MAX;
        while let Some(key) = heap.extract_max() {
            let expected = if key % 3 == 0 {
                100 + key as u64
            } else {
                (key * 7 % 13) as u64
            };
            assert!(expected <= last);
            last = expected;
        }
    }
}

//! 边定义
//!
//! 交通网络中的一段线路：容量、当前流量与行程时长

use crate::types::{Capacity, NodeId, Time};

/// 边
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// 起点
    origin: NodeId,
    /// 终点
    destination: NodeId,
    /// 容量上限
    capacity: Capacity,
    /// 当前分配的流量，始终满足 0 <= flow <= capacity
    flow: Capacity,
    /// 行程时长（仅用于调度）
    duration: Time,
}

impl Edge {
    /// 创建新边（初始流量为 0）
    pub fn new(origin: NodeId, destination: NodeId, capacity: Capacity, duration: Time) -> Self {
        Self {
            origin,
            destination,
            capacity,
            flow: 0,
            duration,
        }
    }

    pub fn origin(&self) -> NodeId {
        self.origin
    }

    pub fn destination(&self) -> NodeId {
        self.destination
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn flow(&self) -> Capacity {
        self.flow
    }

    pub fn duration(&self) -> Time {
        self.duration
    }

    /// 正向剩余容量
    pub fn residual(&self) -> Capacity {
        self.capacity - self.flow
    }

    /// 是否承载正流量（调度使用的前驱关系）
    pub fn is_active(&self) -> bool {
        self.flow > 0
    }

    /// 是否已饱和
    pub fn is_saturated(&self) -> bool {
        self.flow == self.capacity
    }

    /// 正向推送流量
    pub(crate) fn push(&mut self, amount: Capacity) {
        debug_assert!(amount <= self.residual(), "push exceeds residual capacity");
        self.flow += amount;
    }

    /// 撤销已有流量
    pub(crate) fn cancel(&mut self, amount: Capacity) {
        debug_assert!(amount <= self.flow, "cancel exceeds current flow");
        self.flow -= amount;
    }

    pub(crate) fn clear_flow(&mut self) {
        self.flow = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_new() {
        let e = Edge::new(1, 2, 10, 3);
        assert_eq!(e.origin(), 1);
        assert_eq!(e.destination(), 2);
        assert_eq!(e.capacity(), 10);
        assert_eq!(e.duration(), 3);
        assert_eq!(e.flow(), 0);
        assert!(!e.is_active());
    }

    #[test]
    fn test_edge_push_and_cancel() {
        let mut e = Edge::new(1, 2, 10, 3);
        e.push(7);
        assert_eq!(e.flow(), 7);
        assert_eq!(e.residual(), 3);
        assert!(e.is_active());

        e.cancel(2);
        assert_eq!(e.flow(), 5);

        e.push(5);
        assert!(e.is_saturated());

        e.clear_flow();
        assert_eq!(e.flow(), 0);
        assert_eq!(e.residual(), 10);
    }
}

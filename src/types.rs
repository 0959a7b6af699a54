//! 通用类型定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 节点 ID（1 起始，0 为保留的无效值）
pub type NodeId = usize;

/// 边 ID（边数组下标，终身稳定）
pub type EdgeId = usize;

/// 容量 / 流量
pub type Capacity = u64;

/// 时间（行程时长、最早出发时刻）
pub type Time = u64;

/// 无界容量，代替"无穷大"字面量
pub const UNBOUNDED: Capacity = Capacity::MAX;

/// 遍历中节点的前驱
///
/// 路径搜索记录前驱节点，残量图搜索记录前驱边。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Predecessor {
    /// 尚未到达
    #[default]
    None,
    /// 遍历起点
    Source,
    /// 经由该节点到达
    Node(NodeId),
    /// 经由该边到达
    Edge(EdgeId),
}

/// 一条承载流量的边
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlowEdge {
    pub origin: NodeId,
    pub destination: NodeId,
    pub flow: Capacity,
}

impl FlowEdge {
    pub fn new(origin: NodeId, destination: NodeId, flow: Capacity) -> Self {
        Self {
            origin,
            destination,
            flow,
        }
    }
}

impl fmt::Display for FlowEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} / {}", self.origin, self.destination, self.flow)
    }
}

/// 某节点上的等待时长
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitPeriod {
    pub node: NodeId,
    pub wait: Time,
}

/// 组内所有流量中离开起点的总量
pub fn group_dimension(flows: &[FlowEdge], start: NodeId) -> Capacity {
    flows
        .iter()
        .filter(|f| f.origin == start)
        .fold(0, |acc: Capacity, f| acc.saturating_add(f.flow))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_dimension() {
        let flows = vec![
            FlowEdge::new(1, 2, 3),
            FlowEdge::new(1, 3, 2),
            FlowEdge::new(2, 4, 3),
        ];
        assert_eq!(group_dimension(&flows, 1), 5);
        assert_eq!(group_dimension(&flows, 2), 3);
        assert_eq!(group_dimension(&flows, 4), 0);
    }

    #[test]
    fn test_group_dimension_saturates() {
        let flows = vec![FlowEdge::new(1, 2, UNBOUNDED), FlowEdge::new(1, 3, 7)];
        assert_eq!(group_dimension(&flows, 1), UNBOUNDED);
    }

    #[test]
    fn test_flow_edge_display() {
        assert_eq!(FlowEdge::new(1, 4, 9).to_string(), "1 -> 4 / 9");
    }
}

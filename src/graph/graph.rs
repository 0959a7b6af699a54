//! 图数据结构
//!
//! 节点与边分别存放在两个按下标寻址的数组中，互相只通过下标引用。
//! 边只追加、不删除，因此边 ID 在图的整个生命周期内稳定。

use super::edge::Edge;
use super::node::Node;
use crate::error::{Error, Result};
use crate::types::{Capacity, EdgeId, FlowEdge, NodeId, Time};
use tracing::debug;

/// 节点数上限，超过时拒绝构建
pub const MAX_NODES: usize = 1 << 24;

/// 交通网络图
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// 节点数（构造后固定）
    n: usize,
    /// 节点数组，长度 n + 1，下标 0 不使用
    nodes: Vec<Node>,
    /// 边数组
    edges: Vec<Edge>,
}

impl Graph {
    /// 创建含 n 个节点、无边的图
    ///
    /// 调用方保证 `n <= MAX_NODES`；外部输入应走 [`Graph::from_edges`]。
    pub fn new(n: usize) -> Self {
        Self {
            n,
            nodes: vec![Node::new(); n + 1],
            edges: Vec::new(),
        }
    }

    /// 从 (origin, destination, capacity, duration) 序列构建图
    ///
    /// 节点数超过 [`MAX_NODES`] 时返回 `InvalidArgument`，不做分配。
    pub fn from_edges<I>(n: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NodeId, NodeId, Capacity, Time)>,
    {
        if n > MAX_NODES {
            return Err(Error::InvalidArgument(format!(
                "节点数 {} 超过上限 {}",
                n, MAX_NODES
            )));
        }

        let mut graph = Self::new(n);
        for (origin, destination, capacity, duration) in edges {
            graph.add_edge(origin, destination, capacity, duration)?;
        }
        debug!(nodes = n, edges = graph.edge_count(), "graph built");
        Ok(graph)
    }

    // ==================== 构建 ====================

    /// 添加边
    ///
    /// 端点为 0（保留值）或超过节点数时返回 `InvalidEdge`。
    /// 不做重边检测，同一对节点间的平行边相互独立。
    pub fn add_edge(
        &mut self,
        origin: NodeId,
        destination: NodeId,
        capacity: Capacity,
        duration: Time,
    ) -> Result<EdgeId> {
        if !self.contains(origin) || !self.contains(destination) {
            return Err(Error::InvalidEdge {
                origin,
                destination,
                node_count: self.n,
            });
        }

        let id = self.edges.len();
        self.edges
            .push(Edge::new(origin, destination, capacity, duration));

        self.nodes[origin].add_outgoing(id);
        self.nodes[destination].add_incoming(id);

        Ok(id)
    }

    // ==================== 查询 ====================

    /// 节点数
    pub fn size(&self) -> usize {
        self.n
    }

    /// 边数
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// 节点 ID 是否有效
    pub fn contains(&self, node: NodeId) -> bool {
        node >= 1 && node <= self.n
    }

    /// 获取节点（越界时 panic）
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// 获取边（越界时 panic）
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    pub(crate) fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id]
    }

    /// 按插入顺序的全部边
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// 有效节点 ID 迭代器 (1..=n)
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        1..=self.n
    }

    /// 节点的出边
    pub fn outgoing_edges(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.nodes[node]
            .outgoing()
            .iter()
            .map(move |&e| (e, &self.edges[e]))
    }

    /// 节点的入边
    pub fn incoming_edges(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.nodes[node]
            .incoming()
            .iter()
            .map(move |&e| (e, &self.edges[e]))
    }

    // ==================== 流量 ====================

    /// 清空所有边的流量
    pub fn reset_flows(&mut self) {
        for edge in &mut self.edges {
            edge.clear_flow();
        }
    }

    /// 当前流量分配：所有正流量边，按插入顺序
    pub fn flow_assignment(&self) -> Vec<FlowEdge> {
        self.edges
            .iter()
            .filter(|e| e.is_active())
            .map(|e| FlowEdge::new(e.origin(), e.destination(), e.flow()))
            .collect()
    }

    /// 是否存在任何正流量
    pub fn has_flow(&self) -> bool {
        self.edges.iter().any(Edge::is_active)
    }

    /// 节点流出总量
    pub fn outflow(&self, node: NodeId) -> Capacity {
        self.outgoing_edges(node)
            .fold(0, |acc: Capacity, (_, e)| acc.saturating_add(e.flow()))
    }

    /// 节点流入总量
    pub fn inflow(&self, node: NodeId) -> Capacity {
        self.incoming_edges(node)
            .fold(0, |acc: Capacity, (_, e)| acc.saturating_add(e.flow()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_basic() {
        let mut graph = Graph::new(3);
        let e0 = graph.add_edge(1, 2, 10, 1).unwrap();
        let e1 = graph.add_edge(2, 3, 5, 2).unwrap();

        assert_eq!(graph.size(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!((e0, e1), (0, 1));

        assert_eq!(graph.node(1).outgoing(), &[0]);
        assert_eq!(graph.node(2).incoming(), &[0]);
        assert_eq!(graph.node(2).outgoing(), &[1]);
        assert_eq!(graph.node(3).incoming(), &[1]);
    }

    #[test]
    fn test_add_edge_rejects_reserved_node() {
        let mut graph = Graph::new(3);
        assert!(matches!(
            graph.add_edge(0, 2, 1, 1),
            Err(Error::InvalidEdge { origin: 0, .. })
        ));
        assert!(matches!(
            graph.add_edge(1, 0, 1, 1),
            Err(Error::InvalidEdge { destination: 0, .. })
        ));
        assert!(matches!(
            graph.add_edge(1, 4, 1, 1),
            Err(Error::InvalidEdge { node_count: 3, .. })
        ));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_parallel_edges_are_independent() {
        let graph = Graph::from_edges(2, vec![(1, 2, 3, 1), (1, 2, 4, 1)]).unwrap();
        assert_eq!(graph.node(1).out_degree(), 2);
        assert_eq!(graph.node(2).in_degree(), 2);
        assert_eq!(graph.edge(0).capacity(), 3);
        assert_eq!(graph.edge(1).capacity(), 4);
    }

    #[test]
    fn test_flow_bookkeeping() {
        let mut graph = Graph::from_edges(3, vec![(1, 2, 5, 1), (2, 3, 5, 1), (1, 3, 2, 1)]).unwrap();
        assert!(!graph.has_flow());

        graph.edge_mut(0).push(4);
        graph.edge_mut(1).push(4);

        assert!(graph.has_flow());
        assert_eq!(graph.outflow(1), 4);
        assert_eq!(graph.inflow(3), 4);
        assert_eq!(
            graph.flow_assignment(),
            vec![FlowEdge::new(1, 2, 4), FlowEdge::new(2, 3, 4)]
        );

        graph.reset_flows();
        assert!(graph.flow_assignment().is_empty());
    }

    #[test]
    fn test_from_edges_rejects_oversized_network() {
        assert!(matches!(
            Graph::from_edges(usize::MAX, Vec::new()),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            Graph::from_edges(MAX_NODES + 1, Vec::new()),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut graph = Graph::from_edges(2, vec![(1, 2, 5, 1)]).unwrap();
        let copy = graph.clone();
        graph.edge_mut(0).push(5);
        assert_eq!(copy.edge(0).flow(), 0);
        assert_eq!(graph.edge(0).flow(), 5);
    }
}

//! 最大流算法
//!
//! 实现 Edmonds-Karp 算法（基于 BFS 的 Ford-Fulkerson），
//! 流量直接写在图的边上，可以在已有分配的基础上继续增广。

use crate::graph::Graph;
use crate::types::{Capacity, EdgeId, NodeId, Predecessor, UNBOUNDED};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// 增广路径上一条边的方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// 沿边方向推送流量
    Forward,
    /// 逆边方向，撤销已有流量
    Backward,
}

/// 残量图上一次 BFS 的结果
#[derive(Debug, Clone)]
pub struct ResidualSearch {
    source: NodeId,
    visited: Vec<bool>,
    flow_increase: Vec<Capacity>,
    parent: Vec<Predecessor>,
}

impl ResidualSearch {
    /// 从 start 出发在残量图上做 BFS
    ///
    /// 起点的可增广量为 `limit`。每个节点在第一次被发现时即确定，
    /// 同长度的多条增广路径中取 FIFO 顺序最先发现的那条。
    pub fn run(graph: &Graph, start: NodeId, limit: Capacity) -> Self {
        let n = graph.size();
        let mut search = Self {
            source: start,
            visited: vec![false; n + 1],
            flow_increase: vec![0; n + 1],
            parent: vec![Predecessor::None; n + 1],
        };

        search.visited[start] = true;
        search.flow_increase[start] = limit;
        search.parent[start] = Predecessor::Source;

        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(u) = queue.pop_front() {
            let available = search.flow_increase[u];

            // 正向剩余容量
            for (e, edge) in graph.outgoing_edges(u) {
                let v = edge.destination();
                if search.visited[v] {
                    continue;
                }

                let increase = available.min(edge.residual());
                if increase > 0 {
                    search.discover(v, increase, e);
                    queue.push_back(v);
                }
            }

            // 反向：撤销流入 u 的已有流量
            for (e, edge) in graph.incoming_edges(u) {
                let v = edge.origin();
                if search.visited[v] {
                    continue;
                }

                let increase = available.min(edge.flow());
                if increase > 0 {
                    search.discover(v, increase, e);
                    queue.push_back(v);
                }
            }
        }

        search
    }

    fn discover(&mut self, node: NodeId, increase: Capacity, via: EdgeId) {
        self.visited[node] = true;
        self.flow_increase[node] = increase;
        self.parent[node] = Predecessor::Edge(via);
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn is_reached(&self, node: NodeId) -> bool {
        self.visited[node]
    }

    /// 到达节点的路径瓶颈（可增广量）
    pub fn flow_increase(&self, node: NodeId) -> Capacity {
        self.flow_increase[node]
    }

    pub fn parent(&self, node: NodeId) -> Predecessor {
        self.parent[node]
    }

    /// 重构 source 到 end 的增广路径（按 source -> end 顺序）
    pub fn augmenting_path(&self, graph: &Graph, end: NodeId) -> Option<Vec<(EdgeId, Direction)>> {
        if !self.visited[end] {
            return None;
        }

        let mut path = Vec::new();
        let mut current = end;
        while current != self.source {
            let Predecessor::Edge(e) = self.parent[current] else {
                return None;
            };

            let edge = graph.edge(e);
            if edge.destination() == current {
                path.push((e, Direction::Forward));
                current = edge.origin();
            } else {
                path.push((e, Direction::Backward));
                current = edge.destination();
            }
        }
        path.reverse();

        Some(path)
    }
}

/// 增广统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Augmentation {
    /// 请求的增量
    pub requested: Capacity,
    /// 实际增加的流量
    pub delivered: Capacity,
    /// 增广路径条数
    pub rounds: usize,
}

impl Augmentation {
    /// 网络在满足请求前已饱和
    pub fn is_partial(&self) -> bool {
        self.delivered < self.requested
    }
}

/// Edmonds-Karp 增广器
pub struct EdmondsKarp<'a> {
    graph: &'a mut Graph,
}

impl<'a> EdmondsKarp<'a> {
    /// 创建算法实例
    pub fn new(graph: &'a mut Graph) -> Self {
        Self { graph }
    }

    /// 在当前流量的基础上从 start 向 end 增加 amount 的流量
    ///
    /// 每轮在残量图上找最短增广路径并沿路径增广，直到请求满足或 end
    /// 不再可达。每轮 BFS 以剩余请求量作为起点的可增广量，所以不会
    /// 超出请求。
    pub fn augment(&mut self, start: NodeId, end: NodeId, amount: Capacity) -> Augmentation {
        let mut outcome = Augmentation {
            requested: amount,
            ..Default::default()
        };
        if start == end {
            return outcome;
        }

        let mut remaining = amount;
        while remaining > 0 {
            let search = ResidualSearch::run(self.graph, start, remaining);
            let Some(path) = search.augmenting_path(self.graph, end) else {
                break;
            };

            let increment = search.flow_increase(end);
            for (e, direction) in path {
                let edge = self.graph.edge_mut(e);
                match direction {
                    Direction::Forward => edge.push(increment),
                    Direction::Backward => edge.cancel(increment),
                }
            }

            remaining -= remaining.min(increment);
            outcome.delivered = outcome.delivered.saturating_add(increment);
            outcome.rounds += 1;
            debug!(start, end, increment, remaining, "augmenting path applied");
        }

        if outcome.is_partial() && amount != UNBOUNDED {
            warn!(
                start,
                end,
                requested = amount,
                delivered = outcome.delivered,
                "network saturated before the request was satisfied"
            );
        }
        info!(
            start,
            end,
            delivered = outcome.delivered,
            rounds = outcome.rounds,
            "augmentation finished"
        );

        outcome
    }

    /// 清空流量后计算 start 到 end 的最大流
    pub fn max_flow(&mut self, start: NodeId, end: NodeId) -> Capacity {
        self.graph.reset_flows();
        self.augment(start, end, UNBOUNDED).delivered
    }
}

/// 当前流量下 start 与 end 之间的最小割边
///
/// 取残量图上从 start 可达集合指向不可达集合的边。end 仍然可达时
/// 当前流量还不是最大流，返回空。
pub fn min_cut(graph: &Graph, start: NodeId, end: NodeId) -> Vec<EdgeId> {
    let search = ResidualSearch::run(graph, start, UNBOUNDED);
    if search.is_reached(end) {
        debug!(start, end, "destination still reachable, no cut");
        return Vec::new();
    }

    graph
        .edges()
        .iter()
        .enumerate()
        .filter(|(_, e)| search.is_reached(e.origin()) && !search.is_reached(e.destination()))
        .map(|(id, _)| id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_flow_graph() -> Graph {
        // 经典最大流测试图
        //     10       10
        // S -----> A -----> T
        // |        ^        ^
        // |5       |5       |
        // v        |        |
        // B -----> C ------>|
        //     10       10
        //
        // S=1, A=2, B=3, C=4, T=5
        Graph::from_edges(
            5,
            vec![
                (1, 2, 10, 1),
                (1, 3, 5, 1),
                (2, 5, 10, 1),
                (3, 4, 10, 1),
                (4, 2, 5, 1),
                (4, 5, 10, 1),
            ],
        )
        .unwrap()
    }

    fn assert_conservation(graph: &Graph, start: NodeId, end: NodeId) {
        for node in graph.node_ids() {
            if node != start && node != end {
                assert_eq!(graph.inflow(node), graph.outflow(node), "node {}", node);
            }
        }
        for edge in graph.edges() {
            assert!(edge.flow() <= edge.capacity());
        }
    }

    #[test]
    fn test_max_flow_basic() {
        let mut graph = create_flow_graph();
        let value = EdmondsKarp::new(&mut graph).max_flow(1, 5);

        // 最大流应该是 15 (10 through A + 5 through B-C)
        assert_eq!(value, 15);
        assert_eq!(graph.outflow(1), 15);
        assert_eq!(graph.inflow(5), 15);
        assert_conservation(&graph, 1, 5);
    }

    #[test]
    fn test_simple_flow() {
        // v1 -> v2 (10), v2 -> v3 (5)
        let mut graph = Graph::from_edges(3, vec![(1, 2, 10, 1), (2, 3, 5, 1)]).unwrap();
        let value = EdmondsKarp::new(&mut graph).max_flow(1, 3);

        // 瓶颈在 v2 -> v3，最大流是 5
        assert_eq!(value, 5);
    }

    #[test]
    fn test_parallel_paths() {
        // S -> A -> T (5)
        // S -> B -> T (10)
        let mut graph = Graph::from_edges(
            4,
            vec![(1, 2, 5, 1), (2, 4, 5, 1), (1, 3, 10, 1), (3, 4, 10, 1)],
        )
        .unwrap();
        let value = EdmondsKarp::new(&mut graph).max_flow(1, 4);
        assert_eq!(value, 15);
    }

    #[test]
    fn test_augment_respects_request() {
        let mut graph = Graph::from_edges(2, vec![(1, 2, 5, 1)]).unwrap();
        let outcome = EdmondsKarp::new(&mut graph).augment(1, 2, 2);

        assert_eq!(outcome.delivered, 2);
        assert_eq!(outcome.rounds, 1);
        assert!(!outcome.is_partial());
        assert_eq!(graph.edge(0).flow(), 2);
    }

    #[test]
    fn test_augment_partial_when_saturated() {
        let mut graph = Graph::from_edges(3, vec![(1, 2, 4, 1), (2, 3, 3, 1)]).unwrap();
        let outcome = EdmondsKarp::new(&mut graph).augment(1, 3, 10);

        assert_eq!(outcome.delivered, 3);
        assert!(outcome.is_partial());

        // 再次请求：已无增广路径
        let again = EdmondsKarp::new(&mut graph).augment(1, 3, 1);
        assert_eq!(again.delivered, 0);
        assert_eq!(again.rounds, 0);
    }

    #[test]
    fn test_augment_cancels_existing_flow() {
        // 已有流量沿 1 -> 2 -> 3 -> 4，需要撤销 2 -> 3 才能再送一单位
        let mut graph = Graph::from_edges(
            4,
            vec![(1, 2, 1, 1), (2, 3, 1, 1), (3, 4, 1, 1), (1, 3, 1, 1), (2, 4, 1, 1)],
        )
        .unwrap();
        for e in 0..3 {
            graph.edge_mut(e).push(1);
        }

        let outcome = EdmondsKarp::new(&mut graph).augment(1, 4, 1);
        assert_eq!(outcome.delivered, 1);

        let flows: Vec<Capacity> = graph.edges().iter().map(|e| e.flow()).collect();
        assert_eq!(flows, vec![1, 0, 1, 1, 1]);
        assert_eq!(graph.outflow(1), 2);
        assert_conservation(&graph, 1, 4);
    }

    #[test]
    fn test_augment_same_endpoints_is_noop() {
        let mut graph = create_flow_graph();
        let outcome = EdmondsKarp::new(&mut graph).augment(2, 2, 10);
        assert_eq!(outcome.delivered, 0);
        assert!(!graph.has_flow());
    }

    #[test]
    fn test_residual_search_bottleneck() {
        let graph = Graph::from_edges(3, vec![(1, 2, 7, 1), (2, 3, 4, 1)]).unwrap();
        let search = ResidualSearch::run(&graph, 1, UNBOUNDED);

        assert!(search.is_reached(3));
        assert_eq!(search.flow_increase(2), 7);
        assert_eq!(search.flow_increase(3), 4);
        assert_eq!(search.parent(3), Predecessor::Edge(1));
        assert_eq!(
            search.augmenting_path(&graph, 3),
            Some(vec![(0, Direction::Forward), (1, Direction::Forward)])
        );
        assert!(search.is_reached(1) && search.is_reached(2));
    }

    #[test]
    fn test_residual_search_limit_caps_increase() {
        let graph = Graph::from_edges(2, vec![(1, 2, 7, 1)]).unwrap();
        let search = ResidualSearch::run(&graph, 1, 3);
        assert_eq!(search.flow_increase(2), 3);
    }

    #[test]
    fn test_min_cut_after_max_flow() {
        let mut graph = create_flow_graph();
        assert!(min_cut(&graph, 1, 5).is_empty());

        EdmondsKarp::new(&mut graph).max_flow(1, 5);
        let cut = min_cut(&graph, 1, 5);

        // S -> A (10) 与 S -> B (5) 饱和
        assert_eq!(cut, vec![0, 1]);
        let capacity: Capacity = cut.iter().map(|&e| graph.edge(e).capacity()).sum();
        assert_eq!(capacity, 15);
    }
}

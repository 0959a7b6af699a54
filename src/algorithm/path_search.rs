//! 路径搜索算法
//!
//! 两种 Dijkstra 式的优先搜索：
//! - 最宽路径：最大化路径上的最小边容量（瓶颈）
//! - 帕累托最优路径：按 (容量, 跳数) 的字典序取单个最优解

use crate::graph::Graph;
use crate::heap::IndexedMaxHeap;
use crate::types::{Capacity, NodeId, Predecessor, UNBOUNDED};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::debug;

/// 未到达节点的跳数
const UNREACHED_DISTANCE: u64 = u64::MAX;

/// 帕累托搜索的目标优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    /// 先比较容量，容量相同时跳数少者优先
    CapacityFirst,
    /// 先比较跳数，跳数相同时容量大者优先
    HopsFirst,
}

impl Objective {
    pub fn from_preference(prefer_capacity: bool) -> Self {
        if prefer_capacity {
            Objective::CapacityFirst
        } else {
            Objective::HopsFirst
        }
    }
}

/// 路径结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResult {
    /// 起点到终点的节点序列，未到达时为空
    pub path: Vec<NodeId>,
    /// 路径瓶颈容量
    pub capacity: Capacity,
    /// 路径跳数
    pub distance: u64,
}

impl PathResult {
    /// 终点未到达
    pub fn unreached() -> Self {
        Self {
            path: Vec::new(),
            capacity: 0,
            distance: 0,
        }
    }

    pub fn is_reached(&self) -> bool {
        !self.path.is_empty()
    }
}

/// 一次路径搜索的结果（各节点的最优值与前驱）
#[derive(Debug, Clone)]
pub struct SearchTree {
    source: NodeId,
    visited: Vec<bool>,
    capacity: Vec<Capacity>,
    distance: Vec<u64>,
    parent: Vec<Predecessor>,
}

impl SearchTree {
    fn new(n: usize, source: NodeId) -> Self {
        let mut tree = Self {
            source,
            visited: vec![false; n + 1],
            capacity: vec![0; n + 1],
            distance: vec![UNREACHED_DISTANCE; n + 1],
            parent: vec![Predecessor::None; n + 1],
        };
        tree.capacity[source] = UNBOUNDED;
        tree.distance[source] = 0;
        tree.parent[source] = Predecessor::Source;
        tree
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    /// 节点是否被搜索确定
    pub fn is_reached(&self, node: NodeId) -> bool {
        self.visited[node]
    }

    /// 到达节点的最优瓶颈容量（未到达为 0，起点为 `UNBOUNDED`）
    pub fn capacity(&self, node: NodeId) -> Capacity {
        self.capacity[node]
    }

    /// 到达节点的跳数
    pub fn distance(&self, node: NodeId) -> Option<u64> {
        self.visited[node].then(|| self.distance[node])
    }

    pub fn parent(&self, node: NodeId) -> Predecessor {
        self.parent[node]
    }

    /// 被确定的节点数（含起点）
    pub fn reached_count(&self) -> usize {
        self.visited.iter().filter(|&&v| v).count()
    }

    /// 重构起点到 end 的路径
    pub fn path_to(&self, end: NodeId) -> PathResult {
        if !self.visited[end] {
            return PathResult::unreached();
        }

        let mut path = vec![end];
        let mut current = end;
        while let Predecessor::Node(prev) = self.parent[current] {
            path.push(prev);
            current = prev;
        }
        path.reverse();

        PathResult {
            path,
            capacity: self.capacity[end],
            distance: self.distance[end],
        }
    }
}

/// 路径查找器
pub struct PathFinder<'a> {
    graph: &'a Graph,
}

impl<'a> PathFinder<'a> {
    /// 创建路径查找器
    pub fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }

    /// 最宽路径搜索：各节点的最大瓶颈容量
    pub fn widest_paths(&self, start: NodeId) -> SearchTree {
        let tree = self.best_first(start, |capacity, _| capacity);
        debug!(start, reached = tree.reached_count(), "widest path search finished");
        tree
    }

    /// 帕累托最优搜索：按目标的字典序
    pub fn pareto_paths(&self, start: NodeId, objective: Objective) -> SearchTree {
        let tree = match objective {
            Objective::CapacityFirst => {
                self.best_first(start, |capacity, distance| (capacity, Reverse(distance)))
            }
            Objective::HopsFirst => {
                self.best_first(start, |capacity, distance| (Reverse(distance), capacity))
            }
        };
        debug!(
            start,
            ?objective,
            reached = tree.reached_count(),
            "pareto path search finished"
        );
        tree
    }

    /// 起点到终点的最宽路径
    pub fn max_capacity_path(&self, start: NodeId, end: NodeId) -> PathResult {
        self.widest_paths(start).path_to(end)
    }

    /// 起点到终点的帕累托最优路径
    pub fn pareto_optimal_path(&self, start: NodeId, end: NodeId, objective: Objective) -> PathResult {
        self.pareto_paths(start, objective).path_to(end)
    }

    /// 通用的优先搜索
    ///
    /// `key` 把 (瓶颈容量, 跳数) 映射为堆优先级；候选优先级严格大于
    /// 邻居当前优先级时才松弛。
    fn best_first<P, F>(&self, start: NodeId, key: F) -> SearchTree
    where
        P: PartialOrd,
        F: Fn(Capacity, u64) -> P,
    {
        let n = self.graph.size();
        let mut tree = SearchTree::new(n, start);

        let mut heap = IndexedMaxHeap::with_capacity(n);
        heap.insert(start, key(tree.capacity[start], tree.distance[start]));

        while let Some(node) = heap.extract_max() {
            tree.visited[node] = true;

            for (_, edge) in self.graph.outgoing_edges(node) {
                let dest = edge.destination();
                if tree.visited[dest] {
                    continue;
                }

                let capacity = tree.capacity[node].min(edge.capacity());
                let distance = tree.distance[node].saturating_add(1);
                let candidate = key(capacity, distance);

                if candidate > key(tree.capacity[dest], tree.distance[dest]) {
                    tree.capacity[dest] = capacity;
                    tree.distance[dest] = distance;
                    tree.parent[dest] = Predecessor::Node(node);

                    heap.insert(dest, key(capacity, distance));
                    heap.increase(dest, candidate);
                }
            }
        }

        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1 -(5)-> 2 -(3)-> 4
    // 1 -(2)-> 3 -(2)-> 4
    fn create_diamond() -> Graph {
        Graph::from_edges(
            5,
            vec![(1, 2, 5, 1), (1, 3, 2, 1), (2, 4, 3, 1), (3, 4, 2, 1)],
        )
        .unwrap()
    }

    #[test]
    fn test_widest_path_diamond() {
        let graph = create_diamond();
        let finder = PathFinder::new(&graph);

        let result = finder.max_capacity_path(1, 4);
        assert_eq!(result.path, vec![1, 2, 4]);
        assert_eq!(result.capacity, 3);
        assert_eq!(result.distance, 2);
    }

    #[test]
    fn test_widest_path_unreachable() {
        let graph = create_diamond();
        let finder = PathFinder::new(&graph);

        let result = finder.max_capacity_path(1, 5);
        assert_eq!(result, PathResult::unreached());
        assert!(!result.is_reached());
    }

    #[test]
    fn test_widest_path_to_source() {
        let graph = create_diamond();
        let result = PathFinder::new(&graph).max_capacity_path(1, 1);
        assert_eq!(result.path, vec![1]);
        assert_eq!(result.capacity, UNBOUNDED);
        assert_eq!(result.distance, 0);
    }

    #[test]
    fn test_widest_path_prefers_longer_wider_route() {
        // 直达边容量 1，绕行三跳容量 4
        let graph = Graph::from_edges(
            4,
            vec![(1, 4, 1, 1), (1, 2, 4, 1), (2, 3, 4, 1), (3, 4, 4, 1)],
        )
        .unwrap();
        let result = PathFinder::new(&graph).max_capacity_path(1, 4);
        assert_eq!(result.path, vec![1, 2, 3, 4]);
        assert_eq!(result.capacity, 4);
        assert_eq!(result.distance, 3);
    }

    #[test]
    fn test_widest_skips_zero_capacity_edges() {
        let graph = Graph::from_edges(2, vec![(1, 2, 0, 1)]).unwrap();
        let tree = PathFinder::new(&graph).widest_paths(1);
        assert!(!tree.is_reached(2));
        assert_eq!(tree.distance(2), None);
    }

    #[test]
    fn test_pareto_objectives_disagree() {
        let graph = Graph::from_edges(
            4,
            vec![(1, 4, 1, 1), (1, 2, 4, 1), (2, 3, 4, 1), (3, 4, 4, 1)],
        )
        .unwrap();
        let finder = PathFinder::new(&graph);

        let by_capacity = finder.pareto_optimal_path(1, 4, Objective::CapacityFirst);
        assert_eq!(by_capacity.path, vec![1, 2, 3, 4]);
        assert_eq!((by_capacity.capacity, by_capacity.distance), (4, 3));

        let by_hops = finder.pareto_optimal_path(1, 4, Objective::HopsFirst);
        assert_eq!(by_hops.path, vec![1, 4]);
        assert_eq!((by_hops.capacity, by_hops.distance), (1, 1));
    }

    #[test]
    fn test_pareto_secondary_objective_breaks_ties() {
        // 两条容量都为 3 的路径，跳数不同
        let graph = Graph::from_edges(
            5,
            vec![(1, 2, 3, 1), (2, 3, 3, 1), (3, 5, 3, 1), (1, 4, 3, 1), (4, 5, 3, 1)],
        )
        .unwrap();
        let finder = PathFinder::new(&graph);
        let result = finder.pareto_optimal_path(1, 5, Objective::CapacityFirst);
        assert_eq!(result.path, vec![1, 4, 5]);
        assert_eq!(result.capacity, 3);

        // 两条两跳路径，容量不同
        let graph = Graph::from_edges(
            4,
            vec![(1, 2, 2, 1), (2, 4, 2, 1), (1, 3, 6, 1), (3, 4, 5, 1)],
        )
        .unwrap();
        let result = PathFinder::new(&graph).pareto_optimal_path(1, 4, Objective::HopsFirst);
        assert_eq!(result.path, vec![1, 3, 4]);
        assert_eq!((result.capacity, result.distance), (5, 2));
    }

    #[test]
    fn test_pareto_relaxes_zero_capacity_edges() {
        let graph = Graph::from_edges(2, vec![(1, 2, 0, 1)]).unwrap();
        let result =
            PathFinder::new(&graph).pareto_optimal_path(1, 2, Objective::CapacityFirst);
        assert_eq!(result.path, vec![1, 2]);
        assert_eq!((result.capacity, result.distance), (0, 1));
    }

    #[test]
    fn test_objective_from_preference() {
        assert_eq!(Objective::from_preference(true), Objective::CapacityFirst);
        assert_eq!(Objective::from_preference(false), Objective::HopsFirst);
    }
}

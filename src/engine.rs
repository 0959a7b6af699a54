//! 路由引擎
//!
//! 对外暴露的查询入口：最宽路径、帕累托路径、团体分流、汇合时刻与等待时长。
//! 图上的边流量是查询之间唯一保留的状态，每次调用都计入 [`Metrics`]。
//!
//! 参数由调用方保证合法（节点 ID 在 `[1, n]` 内、数量为正），越界下标直接 panic。

use crate::algorithm::{min_cut, EdmondsKarp, Objective, PathFinder, PathResult, Scheduler};
use crate::error::Result;
use crate::graph::Graph;
use crate::metrics::{Metrics, QueryKind};
use crate::types::{Capacity, EdgeId, FlowEdge, NodeId, Time, WaitPeriod, UNBOUNDED};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 限制团体规模的饱和边
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutEdge {
    pub id: EdgeId,
    pub origin: NodeId,
    pub destination: NodeId,
    pub capacity: Capacity,
}

/// 路由引擎
#[derive(Debug, Default)]
pub struct RouteEngine {
    graph: Graph,
    metrics: Metrics,
}

impl RouteEngine {
    /// 以给定网络创建引擎
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            metrics: Metrics::new(),
        }
    }

    /// 从边序列创建引擎
    pub fn from_edges<I>(n: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NodeId, NodeId, Capacity, Time)>,
    {
        Ok(Self::new(Graph::from_edges(n, edges)?))
    }

    pub fn network(&self) -> &Graph {
        &self.graph
    }

    /// 换入新网络，返回旧网络；指标保留
    pub fn replace_network(&mut self, graph: Graph) -> Graph {
        std::mem::replace(&mut self.graph, graph)
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// 清空所有边的流量
    pub fn reset_flows(&mut self) {
        self.graph.reset_flows();
    }

    // ==================== 路径查询 ====================

    /// 瓶颈容量最大的路径
    pub fn get_max_capacity_path(&self, start: NodeId, end: NodeId) -> PathResult {
        let timer = self.metrics.record_query_start(QueryKind::WidestPath);
        let result = PathFinder::new(&self.graph).max_capacity_path(start, end);
        self.metrics.record_query_complete(timer);
        result
    }

    /// 帕累托最优路径
    ///
    /// `prefer_capacity` 为 true 时先比容量再比跳数，否则相反。
    pub fn get_pareto_optimal_path(
        &self,
        start: NodeId,
        end: NodeId,
        prefer_capacity: bool,
    ) -> PathResult {
        let timer = self.metrics.record_query_start(QueryKind::ParetoPath);
        let objective = Objective::from_preference(prefer_capacity);
        let result = PathFinder::new(&self.graph).pareto_optimal_path(start, end, objective);
        self.metrics.record_query_complete(timer);
        result
    }

    // ==================== 团体分流 ====================

    /// 清空流量后为 size 人的团体分配路线
    ///
    /// 网络容量不足时分配最大流，不报错。
    pub fn get_path_for_group_of_size(
        &mut self,
        start: NodeId,
        end: NodeId,
        size: Capacity,
    ) -> Vec<FlowEdge> {
        let timer = self.metrics.record_query_start(QueryKind::GroupOfSize);
        self.graph.reset_flows();
        self.augment(start, end, size);
        self.metrics.record_query_complete(timer);
        self.graph.flow_assignment()
    }

    /// 在已有分配上再增加 increment 人
    pub fn get_path_with_increment(
        &mut self,
        start: NodeId,
        end: NodeId,
        increment: Capacity,
    ) -> Vec<FlowEdge> {
        let timer = self.metrics.record_query_start(QueryKind::Increment);
        self.augment(start, end, increment);
        self.metrics.record_query_complete(timer);
        self.graph.flow_assignment()
    }

    /// 清空流量后分配最大可能的团体
    pub fn get_path_for_group_of_max_size(&mut self, start: NodeId, end: NodeId) -> Vec<FlowEdge> {
        let timer = self.metrics.record_query_start(QueryKind::MaxGroup);
        self.graph.reset_flows();
        self.augment(start, end, UNBOUNDED);
        self.metrics.record_query_complete(timer);
        self.graph.flow_assignment()
    }

    fn augment(&mut self, start: NodeId, end: NodeId, amount: Capacity) {
        let outcome = EdmondsKarp::new(&mut self.graph).augment(start, end, amount);
        self.metrics
            .record_augmentation(outcome.rounds, outcome.delivered);
    }

    /// 当前的流量分配（正流量边，按插入顺序）
    pub fn get_flow_path(&self) -> Vec<FlowEdge> {
        self.graph.flow_assignment()
    }

    /// 当前团体规模：离开起点的总流量
    pub fn group_size(&self, start: NodeId) -> Capacity {
        self.graph.outflow(start)
    }

    /// 限制当前团体继续扩大的饱和边
    ///
    /// 只有 end 在残量图上已不可达（当前分配即最大流）时才有意义，
    /// 否则返回空。
    pub fn get_bottleneck_edges(&self, start: NodeId, end: NodeId) -> Vec<CutEdge> {
        let timer = self.metrics.record_query_start(QueryKind::Bottleneck);
        let cut = min_cut(&self.graph, start, end)
            .into_iter()
            .map(|id| {
                let edge = self.graph.edge(id);
                CutEdge {
                    id,
                    origin: edge.origin(),
                    destination: edge.destination(),
                    capacity: edge.capacity(),
                }
            })
            .collect();
        self.metrics.record_query_complete(timer);
        cut
    }

    // ==================== 调度 ====================

    /// 当前分配下所有成员在 end 汇合的最早时刻
    ///
    /// end 不在正流量子图上时为 0。
    pub fn get_earliest_meetup(&self, start: NodeId, end: NodeId) -> Time {
        let timer = self.metrics.record_query_start(QueryKind::Meetup);
        let meetup = Scheduler::new(&self.graph).schedule(start).earliest_meetup(end);
        self.metrics.record_query_complete(timer);
        meetup
    }

    /// 决定汇合时刻的关键路径（最晚到达的一条正流量路线）
    ///
    /// end 不在正流量子图上时为空。
    pub fn get_critical_path(&self, start: NodeId, end: NodeId) -> Vec<NodeId> {
        let timer = self.metrics.record_query_start(QueryKind::CriticalPath);
        let path = Scheduler::new(&self.graph).schedule(start).critical_path(end);
        self.metrics.record_query_complete(timer);
        path
    }

    /// 当前分配下各节点的等待时长
    pub fn get_waiting_periods(&self, start: NodeId, end: NodeId) -> Vec<WaitPeriod> {
        let timer = self.metrics.record_query_start(QueryKind::WaitingPeriods);
        let waits = Scheduler::new(&self.graph).schedule(start).waiting_periods();
        debug!(start, end, nodes = waits.len(), "waiting periods computed");
        self.metrics.record_query_complete(timer);
        waits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::group_dimension;

    fn create_scenario() -> RouteEngine {
        RouteEngine::from_edges(
            5,
            vec![(1, 2, 5, 1), (1, 3, 2, 1), (2, 4, 3, 1), (3, 4, 2, 1)],
        )
        .unwrap()
    }

    #[test]
    fn test_widest_path_scenario() {
        let engine = create_scenario();
        let result = engine.get_max_capacity_path(1, 4);
        assert_eq!(result.path, vec![1, 2, 4]);
        assert_eq!(result.capacity, 3);
        assert_eq!(result.distance, 2);

        // 节点 5 没有入边
        let result = engine.get_max_capacity_path(1, 5);
        assert!(result.path.is_empty());
        assert_eq!((result.capacity, result.distance), (0, 0));
    }

    #[test]
    fn test_pareto_path_scenario() {
        let engine = create_scenario();
        let by_capacity = engine.get_pareto_optimal_path(1, 4, true);
        let by_hops = engine.get_pareto_optimal_path(1, 4, false);
        assert_eq!(by_capacity.path, vec![1, 2, 4]);
        assert_eq!(by_hops.path, vec![1, 2, 4]);
        assert_eq!(engine.metrics().query_count(QueryKind::ParetoPath), 2);
    }

    #[test]
    fn test_max_group_scenario() {
        let mut engine = create_scenario();
        let flows = engine.get_path_for_group_of_max_size(1, 4);

        assert_eq!(
            flows,
            vec![
                FlowEdge::new(1, 2, 3),
                FlowEdge::new(1, 3, 2),
                FlowEdge::new(2, 4, 3),
                FlowEdge::new(3, 4, 2),
            ]
        );
        assert_eq!(group_dimension(&flows, 1), 5);
        assert_eq!(engine.group_size(1), 5);
        assert_eq!(engine.get_earliest_meetup(1, 4), 2);
    }

    #[test]
    fn test_group_of_size_is_capped_by_max_flow() {
        let mut engine = create_scenario();

        let flows = engine.get_path_for_group_of_size(1, 4, 4);
        assert_eq!(group_dimension(&flows, 1), 4);

        let flows = engine.get_path_for_group_of_size(1, 4, 100);
        assert_eq!(group_dimension(&flows, 1), 5);
    }

    #[test]
    fn test_group_of_size_resets_previous_flow() {
        let mut engine = create_scenario();

        let first = engine.get_path_for_group_of_size(1, 4, 3);
        engine.get_path_for_group_of_max_size(1, 4);
        let second = engine.get_path_for_group_of_size(1, 4, 3);

        assert_eq!(first, second);
        assert_eq!(engine.group_size(1), 3);
    }

    #[test]
    fn test_increment_keeps_existing_assignment() {
        let mut engine = create_scenario();

        engine.get_path_for_group_of_size(1, 4, 2);
        let flows = engine.get_path_with_increment(1, 4, 2);
        assert_eq!(group_dimension(&flows, 1), 4);

        // 超出剩余容量只增加到最大流
        let flows = engine.get_path_with_increment(1, 4, 10);
        assert_eq!(group_dimension(&flows, 1), 5);
        assert_eq!(engine.get_flow_path(), flows);
    }

    #[test]
    fn test_bottleneck_edges() {
        let mut engine = create_scenario();

        // 没有流量时终点仍可达
        assert!(engine.get_bottleneck_edges(1, 4).is_empty());

        engine.get_path_for_group_of_max_size(1, 4);
        let cut = engine.get_bottleneck_edges(1, 4);
        let ids: Vec<EdgeId> = cut.iter().map(|e| e.id).collect();

        // 源侧为 {1, 2}：1 -> 3 与 2 -> 4 饱和
        assert_eq!(ids, vec![1, 2]);
        let total: Capacity = cut.iter().map(|e| e.capacity).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn test_waiting_periods() {
        let mut engine = RouteEngine::from_edges(
            4,
            vec![(1, 2, 5, 1), (1, 3, 2, 1), (2, 4, 3, 1), (3, 4, 2, 4)],
        )
        .unwrap();
        engine.get_path_for_group_of_max_size(1, 4);

        assert_eq!(engine.get_earliest_meetup(1, 4), 5);
        assert_eq!(engine.get_critical_path(1, 4), vec![1, 3, 4]);
        assert_eq!(
            engine.get_waiting_periods(1, 4),
            vec![WaitPeriod { node: 4, wait: 3 }]
        );
    }

    #[test]
    fn test_meetup_without_flow() {
        let engine = create_scenario();
        assert_eq!(engine.get_earliest_meetup(1, 4), 0);
        assert!(engine.get_critical_path(1, 4).is_empty());
        assert!(engine.get_waiting_periods(1, 4).is_empty());
        assert_eq!(engine.metrics().query_count(QueryKind::CriticalPath), 1);
    }

    #[test]
    fn test_replace_network_keeps_metrics() {
        let mut engine = create_scenario();
        engine.get_max_capacity_path(1, 4);

        let old = engine.replace_network(Graph::from_edges(2, vec![(1, 2, 7, 3)]).unwrap());
        assert_eq!(old.size(), 5);
        assert_eq!(engine.network().size(), 2);
        assert_eq!(engine.get_max_capacity_path(1, 2).capacity, 7);
        assert_eq!(engine.metrics().query_count(QueryKind::WidestPath), 2);
    }
}

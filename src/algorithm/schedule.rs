//! 关键路径调度
//!
//! 在承载正流量的边构成的子图上做 Kahn 式拓扑遍历，计算每个节点的
//! 最晚到达时刻（所有分流的成员都到齐后才能一起出发），并据此给出
//! 各节点上先到成员的等待时长。

use crate::graph::Graph;
use crate::types::{NodeId, Predecessor, Time, WaitPeriod};
use std::collections::VecDeque;
use tracing::debug;

/// 一次调度的结果
#[derive(Debug, Clone)]
pub struct Schedule {
    source: NodeId,
    visited: Vec<bool>,
    earliest_start: Vec<Time>,
    /// 尚未处理的正流量前驱数，遍历结束后仍大于 0 的节点未被完整处理
    in_degree: Vec<usize>,
    parent: Vec<Predecessor>,
    /// 各节点最早的一次到达
    first_arrival: Vec<Option<Time>>,
}

impl Schedule {
    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn is_reached(&self, node: NodeId) -> bool {
        self.visited[node]
    }

    /// 节点被完整处理：已出队且所有正流量前驱都已处理
    pub fn is_resolved(&self, node: NodeId) -> bool {
        self.visited[node] && self.in_degree[node] == 0
    }

    pub fn earliest_start(&self, node: NodeId) -> Time {
        self.earliest_start[node]
    }

    pub fn remaining_in_degree(&self, node: NodeId) -> usize {
        self.in_degree[node]
    }

    pub fn parent(&self, node: NodeId) -> Predecessor {
        self.parent[node]
    }

    /// 所有成员在 end 汇合的最早时刻，end 未被完整处理时为 0
    pub fn earliest_meetup(&self, end: NodeId) -> Time {
        if self.is_resolved(end) {
            self.earliest_start[end]
        } else {
            0
        }
    }

    /// 决定汇合时刻的关键路径（起点到 end），end 未被完整处理时为空
    pub fn critical_path(&self, end: NodeId) -> Vec<NodeId> {
        if !self.is_resolved(end) {
            return Vec::new();
        }

        let mut path = vec![end];
        let mut current = end;
        while let Predecessor::Node(prev) = self.parent[current] {
            path.push(prev);
            current = prev;
        }
        path.reverse();
        path
    }

    /// 各节点上先到成员需要等待的时长
    ///
    /// 最早到达时刻严格早于该节点出发时刻（最晚到达）时输出；
    /// 没有正流量入边或所有到达时刻相同的节点不输出。
    pub fn waiting_periods(&self) -> Vec<WaitPeriod> {
        self.first_arrival
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(node, arrival)| {
                let arrival = (*arrival)?;
                let departure = self.earliest_start[node];
                (arrival < departure).then(|| WaitPeriod {
                    node,
                    wait: departure - arrival,
                })
            })
            .collect()
    }
}

/// 最长等待时长及其发生的节点
pub fn max_waiting_period(waits: &[WaitPeriod]) -> Option<(Time, Vec<NodeId>)> {
    let longest = waits.iter().map(|w| w.wait).max()?;
    let nodes = waits
        .iter()
        .filter(|w| w.wait == longest)
        .map(|w| w.node)
        .collect();
    Some((longest, nodes))
}

/// 调度器
pub struct Scheduler<'a> {
    graph: &'a Graph,
}

impl<'a> Scheduler<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }

    /// 从 start 出发计算正流量子图上的最长路径
    ///
    /// 该子图应当无环（由增广得到的流量分配满足这一点）；
    /// 在全零流量的图上结果没有意义。
    pub fn schedule(&self, start: NodeId) -> Schedule {
        let n = self.graph.size();
        let mut schedule = Schedule {
            source: start,
            visited: vec![false; n + 1],
            earliest_start: vec![0; n + 1],
            in_degree: vec![0; n + 1],
            parent: vec![Predecessor::None; n + 1],
            first_arrival: vec![None; n + 1],
        };
        schedule.parent[start] = Predecessor::Source;

        for edge in self.graph.edges().iter().filter(|e| e.is_active()) {
            schedule.in_degree[edge.destination()] += 1;
        }

        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(node) = queue.pop_front() {
            schedule.visited[node] = true;

            for (_, edge) in self.graph.outgoing_edges(node) {
                if !edge.is_active() {
                    continue;
                }

                let neighbor = edge.destination();
                if schedule.visited[neighbor] {
                    continue;
                }

                let end = schedule.earliest_start[node].saturating_add(edge.duration());
                if schedule.earliest_start[neighbor] < end {
                    schedule.earliest_start[neighbor] = end;
                    schedule.parent[neighbor] = Predecessor::Node(node);
                }

                schedule.in_degree[neighbor] = schedule.in_degree[neighbor].saturating_sub(1);
                if schedule.in_degree[neighbor] == 0 {
                    queue.push_back(neighbor);
                }
            }
        }

        self.record_first_arrivals(&mut schedule);

        debug!(
            start,
            reached = schedule.visited.iter().filter(|&&v| v).count(),
            "schedule computed"
        );
        schedule
    }

    /// 对每个节点取正流量入边上最早的到达时刻
    fn record_first_arrivals(&self, schedule: &mut Schedule) {
        for node in self.graph.node_ids() {
            schedule.first_arrival[node] = self
                .graph
                .incoming_edges(node)
                .filter(|(_, e)| e.is_active())
                .map(|(_, e)| schedule.earliest_start[e.origin()].saturating_add(e.duration()))
                .min();
        }
    }
}

//! 结果打印器
//!
//! 把引擎结果渲染成表格文本

use prettytable::{format, row, Table};

use crate::algorithm::PathResult;
use crate::engine::CutEdge;
use crate::graph::Graph;
use crate::metrics::MetricsSnapshot;
use crate::types::{group_dimension, Capacity, FlowEdge, NodeId, Time, WaitPeriod, UNBOUNDED};

/// 结果打印器
#[derive(Debug, Default, Clone, Copy)]
pub struct Printer;

/// 容量显示，`UNBOUNDED` 显示为 unbounded
pub fn format_capacity(capacity: Capacity) -> String {
    if capacity == UNBOUNDED {
        "unbounded".to_string()
    } else {
        capacity.to_string()
    }
}

/// 节点序列显示为 `1 -> 2 -> 4`
pub fn format_path(path: &[NodeId]) -> String {
    path.iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table
}

impl Printer {
    /// 单条路径
    pub fn path(&self, start: NodeId, end: NodeId, result: &PathResult) -> String {
        if !result.is_reached() {
            return format!("从 {} 无法到达 {}\n", start, end);
        }

        let mut table = new_table();
        table.set_titles(row!["Path", "Capacity", "Hops"]);
        table.add_row(row![
            format_path(&result.path),
            format_capacity(result.capacity),
            result.distance
        ]);
        table.to_string()
    }

    /// 流量分配表，末尾附团体规模
    pub fn flows(&self, flows: &[FlowEdge], start: NodeId) -> String {
        if flows.is_empty() {
            return "没有可用的路线\nGroup dimension: 0\n".to_string();
        }

        let mut table = new_table();
        table.set_titles(row!["Origin", "Destination", "Flow"]);
        for f in flows {
            table.add_row(row![f.origin, f.destination, f.flow]);
        }

        format!(
            "{}Group dimension: {}\n",
            table,
            group_dimension(flows, start)
        )
    }

    /// 汇合时刻与关键路径
    pub fn meetup(&self, start: NodeId, end: NodeId, time: Time, critical_path: &[NodeId]) -> String {
        let mut output = format!("最早汇合时刻 ({} -> {}): {}\n", start, end, time);
        if !critical_path.is_empty() {
            output.push_str(&format!("关键路径: {}\n", format_path(critical_path)));
        }
        output
    }

    /// 等待时长表与最长等待
    pub fn waits(&self, waits: &[WaitPeriod], longest: Option<(Time, Vec<NodeId>)>) -> String {
        let Some((wait, nodes)) = longest else {
            return "没有成员需要等待\n".to_string();
        };

        let mut table = new_table();
        table.set_titles(row!["Node", "Wait"]);
        for w in waits {
            table.add_row(row![w.node, w.wait]);
        }

        let nodes = nodes
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}最长等待 {} (节点 {})\n", table, wait, nodes)
    }

    /// 饱和割边
    pub fn bottleneck(&self, cut: &[CutEdge]) -> String {
        if cut.is_empty() {
            return "终点仍可达，当前分配还能扩大\n".to_string();
        }

        let mut table = new_table();
        table.set_titles(row!["Edge", "Origin", "Destination", "Capacity"]);
        for e in cut {
            table.add_row(row![e.id, e.origin, e.destination, e.capacity]);
        }

        let total = cut
            .iter()
            .fold(0, |acc: Capacity, e| acc.saturating_add(e.capacity));
        format!("{}割容量: {}\n", table, total)
    }

    /// 网络与指标统计
    pub fn stats(&self, graph: &Graph, flow_assigned: bool, metrics: &MetricsSnapshot) -> String {
        let mut table = new_table();
        table.set_titles(row!["Property", "Value"]);
        table.add_row(row!["Node Count", graph.size()]);
        table.add_row(row!["Edge Count", graph.edge_count()]);
        table.add_row(row!["Active Edges", graph.flow_assignment().len()]);
        table.add_row(row!["Flow Assigned", flow_assigned]);
        table.add_row(row!["Queries", metrics.total_queries]);
        for (kind, count) in metrics.queries_by_kind.iter().filter(|(_, c)| *c > 0) {
            table.add_row(row![format!("  {}", kind), count]);
        }
        table.add_row(row!["Rejected Inputs", metrics.rejected_inputs]);
        table.add_row(row![
            "Avg Query (ms)",
            format!("{:.3}", metrics.avg_query_duration_ms)
        ]);
        table.add_row(row!["Augmenting Paths", metrics.augmenting_paths]);
        table.to_string()
    }

    /// 帮助信息
    pub fn help() -> String {
        r#"
═══════════════════════════════════════════════════════════════
                   transit-flow 命令帮助
═══════════════════════════════════════════════════════════════

路径查询:
  widest, w <起点> <终点>          瓶颈容量最大的路径
  pareto, p <起点> <终点>          容量优先 / 跳数优先的最优路径

团体分流:
  group, g <起点> <终点> <人数>    为指定人数的团体分配路线
  increment, inc <起点> <终点> <n> 在当前分配上再增加 n 人
  maxgroup, mg <起点> <终点>       分配最大可能的团体
  bottleneck, cut <起点> <终点>    限制团体规模的饱和线路

调度 (需要先分配路线):
  meetup, m <起点> <终点>          最早汇合时刻与关键路径
  waits <起点> <终点>              各节点上的等待时长

其他:
  load <文件>                      重新加载数据集
  stats, info                      网络与查询统计
  help, h, ?                       显示帮助
  quit, exit, q                    退出程序

═══════════════════════════════════════════════════════════════
"#
        .to_string()
    }
}

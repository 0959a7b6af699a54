//! transit-flow - 交通网络路由与分流引擎
//!
//! 在有向交通网络上回答容量与调度问题：
//! - 最宽路径（最大化瓶颈容量）与帕累托最优路径
//! - 基于 Edmonds-Karp 的团体分流，可在已有分配上增量扩容
//! - 由流量分配推出的最早汇合时刻与各站点等待时长
//! - 数据集读取与交互式控制台

pub mod algorithm;
pub mod cli;
pub mod engine;
pub mod error;
pub mod graph;
pub mod heap;
pub mod import;
pub mod metrics;
pub mod types;

// 重导出常用类型
pub use algorithm::{Objective, PathResult};
pub use engine::{CutEdge, RouteEngine};
pub use error::{Error, Result};
pub use graph::{Edge, Graph, Node, MAX_NODES};
pub use import::{load_network, Dataset, DatasetOptions, DatasetReader};
pub use metrics::{Metrics, MetricsSnapshot};
pub use types::{Capacity, EdgeId, FlowEdge, NodeId, Time, WaitPeriod, UNBOUNDED};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

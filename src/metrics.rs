//! 性能指标收集模块
//!
//! 记录各类查询的次数、耗时以及增广统计，支持快照和 Prometheus 文本导出

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 查询类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryKind {
    WidestPath,
    ParetoPath,
    GroupOfSize,
    Increment,
    MaxGroup,
    Meetup,
    WaitingPeriods,
    CriticalPath,
    Bottleneck,
}

impl QueryKind {
    pub const ALL: [QueryKind; 9] = [
        QueryKind::WidestPath,
        QueryKind::ParetoPath,
        QueryKind::GroupOfSize,
        QueryKind::Increment,
        QueryKind::MaxGroup,
        QueryKind::Meetup,
        QueryKind::WaitingPeriods,
        QueryKind::CriticalPath,
        QueryKind::Bottleneck,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            QueryKind::WidestPath => "widest_path",
            QueryKind::ParetoPath => "pareto_path",
            QueryKind::GroupOfSize => "group_of_size",
            QueryKind::Increment => "increment",
            QueryKind::MaxGroup => "max_group",
            QueryKind::Meetup => "meetup",
            QueryKind::WaitingPeriods => "waiting_periods",
            QueryKind::CriticalPath => "critical_path",
            QueryKind::Bottleneck => "bottleneck",
        }
    }
}

/// 引擎指标
#[derive(Debug)]
pub struct Metrics {
    /// 按类型统计的查询数
    queries: [AtomicU64; 9],
    /// 被拒绝的输入（校验失败）
    rejected: AtomicU64,
    /// 查询总耗时（微秒）
    total_duration_us: AtomicU64,
    /// 慢查询数（>1s）
    slow_queries: AtomicU64,
    /// 增广路径总条数
    augmenting_paths: AtomicU64,
    /// 增广送达的总流量
    flow_delivered: AtomicU64,
    /// 启动时间
    start_time: Instant,
}

/// 可导出的指标快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_queries: u64,
    pub queries_by_kind: Vec<(String, u64)>,
    pub rejected_inputs: u64,
    pub avg_query_duration_ms: f64,
    pub slow_queries: u64,
    pub augmenting_paths: u64,
    pub flow_delivered: u64,
    pub uptime_seconds: u64,
}

/// Prometheus 格式指标
#[derive(Debug, Clone)]
pub struct PrometheusMetrics {
    pub content: String,
}

impl Metrics {
    /// 创建新的指标收集器
    pub fn new() -> Self {
        Self {
            queries: Default::default(),
            rejected: AtomicU64::new(0),
            total_duration_us: AtomicU64::new(0),
            slow_queries: AtomicU64::new(0),
            augmenting_paths: AtomicU64::new(0),
            flow_delivered: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// 记录查询开始
    pub fn record_query_start(&self, kind: QueryKind) -> QueryTimer {
        self.queries[kind.index()].fetch_add(1, Ordering::Relaxed);
        QueryTimer::new()
    }

    /// 记录查询完成
    pub fn record_query_complete(&self, timer: QueryTimer) {
        let duration = timer.elapsed();
        self.total_duration_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);

        // 慢查询：超过1秒
        if duration.as_secs() >= 1 {
            self.slow_queries.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// 记录被拒绝的输入
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录一次增广
    pub fn record_augmentation(&self, rounds: usize, delivered: u64) {
        self.augmenting_paths
            .fetch_add(rounds as u64, Ordering::Relaxed);
        self.flow_delivered.fetch_add(delivered, Ordering::Relaxed);
    }

    /// 某类查询的次数
    pub fn query_count(&self, kind: QueryKind) -> u64 {
        self.queries[kind.index()].load(Ordering::Relaxed)
    }

    /// 获取指标快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        let queries_by_kind: Vec<(String, u64)> = QueryKind::ALL
            .iter()
            .map(|&k| (k.name().to_string(), self.query_count(k)))
            .collect();
        let total_queries: u64 = queries_by_kind.iter().map(|(_, c)| c).sum();
        let total_duration_us = self.total_duration_us.load(Ordering::Relaxed);

        let avg_query_duration_ms = if total_queries > 0 {
            (total_duration_us as f64) / (total_queries as f64) / 1000.0
        } else {
            0.0
        };

        MetricsSnapshot {
            total_queries,
            queries_by_kind,
            rejected_inputs: self.rejected.load(Ordering::Relaxed),
            avg_query_duration_ms,
            slow_queries: self.slow_queries.load(Ordering::Relaxed),
            augmenting_paths: self.augmenting_paths.load(Ordering::Relaxed),
            flow_delivered: self.flow_delivered.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// 导出为 Prometheus 格式
    pub fn to_prometheus(&self) -> PrometheusMetrics {
        let snapshot = self.snapshot();

        let mut content = String::new();

        content.push_str("# HELP transit_flow_queries_total Number of engine queries by kind\n");
        content.push_str("# TYPE transit_flow_queries_total counter\n");
        for (kind, count) in &snapshot.queries_by_kind {
            content.push_str(&format!(
                "transit_flow_queries_total{{kind=\"{}\"}} {}\n",
                kind, count
            ));
        }

        content.push_str("# HELP transit_flow_rejected_inputs_total Inputs rejected by validation\n");
        content.push_str("# TYPE transit_flow_rejected_inputs_total counter\n");
        content.push_str(&format!(
            "transit_flow_rejected_inputs_total {}\n",
            snapshot.rejected_inputs
        ));

        content.push_str("# HELP transit_flow_query_duration_avg_ms Average query duration in milliseconds\n");
        content.push_str("# TYPE transit_flow_query_duration_avg_ms gauge\n");
        content.push_str(&format!(
            "transit_flow_query_duration_avg_ms {:.2}\n",
            snapshot.avg_query_duration_ms
        ));

        content.push_str("# HELP transit_flow_augmenting_paths_total Augmenting paths applied\n");
        content.push_str("# TYPE transit_flow_augmenting_paths_total counter\n");
        content.push_str(&format!(
            "transit_flow_augmenting_paths_total {}\n",
            snapshot.augmenting_paths
        ));

        content.push_str("# HELP transit_flow_flow_delivered_total Flow units delivered by augmentation\n");
        content.push_str("# TYPE transit_flow_flow_delivered_total counter\n");
        content.push_str(&format!(
            "transit_flow_flow_delivered_total {}\n",
            snapshot.flow_delivered
        ));

        PrometheusMetrics { content }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// 查询计时器
pub struct QueryTimer {
    start: Instant,
}

impl QueryTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

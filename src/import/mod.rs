//! 数据导入模块
//!
//! 读取分隔符分隔的网络数据集：
//!
//! ```text
//! 5 4            <- 表头，第一个字段为节点数
//! 1 2 5 1        <- origin destination capacity duration
//! 1 3 2 1
//! ```
//!
//! 默认分隔符为单个空格；连续的分隔符视为一个。

use crate::error::{Error, Result};
use crate::graph::{Graph, MAX_NODES};
use crate::types::{Capacity, NodeId, Time};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// 导入统计
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportStats {
    pub nodes: usize,
    pub edges: usize,
    pub duration_ms: u64,
}

/// 读取选项
#[derive(Debug, Clone, Copy)]
pub struct DatasetOptions {
    pub delimiter: u8,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self { delimiter: b' ' }
    }
}

/// 数据集中的一行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub origin: NodeId,
    pub destination: NodeId,
    pub capacity: Capacity,
    pub duration: Time,
}

/// 解析后的数据集
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub node_count: usize,
    pub rows: Vec<EdgeRecord>,
}

impl Dataset {
    /// 构建网络，端点越界时返回 `InvalidEdge`
    pub fn into_network(self) -> Result<Graph> {
        Graph::from_edges(
            self.node_count,
            self.rows
                .into_iter()
                .map(|r| (r.origin, r.destination, r.capacity, r.duration)),
        )
    }
}

/// 数据集读取器
#[derive(Debug, Default, Clone)]
pub struct DatasetReader {
    options: DatasetOptions,
}

impl DatasetReader {
    pub fn new(options: DatasetOptions) -> Self {
        Self { options }
    }

    /// 从文件读取
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<Dataset> {
        let path = path.as_ref();
        let file = File::open(path)?;
        debug!(path = %path.display(), "reading dataset");
        self.read_from(file)
    }

    /// 从任意输入读取
    pub fn read_from<R: Read>(&self, input: R) -> Result<Dataset> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .delimiter(self.options.delimiter)
            .from_reader(input);

        let mut records = reader.records();

        let header = match records.next() {
            Some(record) => record?,
            None => {
                return Err(Error::InvalidFormat {
                    line: 1,
                    reason: "缺少表头".to_string(),
                })
            }
        };
        let node_count = parse_header(&header)?;

        let mut rows = Vec::new();
        for record in records {
            let record = record?;
            rows.push(parse_row(&record)?);
        }

        Ok(Dataset { node_count, rows })
    }
}

fn line_of(record: &StringRecord) -> usize {
    record
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or_default()
}

/// 非空字段（连续分隔符产生的空字段被忽略）
fn fields(record: &StringRecord) -> impl Iterator<Item = &str> {
    record.iter().filter(|f| !f.is_empty())
}

fn parse_header(record: &StringRecord) -> Result<usize> {
    let line = line_of(record);
    let first = fields(record).next().ok_or_else(|| Error::InvalidFormat {
        line,
        reason: "表头为空".to_string(),
    })?;

    let node_count: usize = first.parse().map_err(|_| Error::InvalidFormat {
        line,
        reason: format!("节点数不是非负整数: {:?}", first),
    })?;

    if node_count > MAX_NODES {
        return Err(Error::InvalidFormat {
            line,
            reason: format!("节点数 {} 超过上限 {}", node_count, MAX_NODES),
        });
    }

    Ok(node_count)
}

fn parse_row(record: &StringRecord) -> Result<EdgeRecord> {
    let line = line_of(record);
    let values = fields(record)
        .map(|f| {
            f.parse::<u64>().map_err(|_| Error::InvalidFormat {
                line,
                reason: format!("不是非负整数: {:?}", f),
            })
        })
        .collect::<Result<Vec<u64>>>()?;

    let [origin, destination, capacity, duration] = values[..] else {
        return Err(Error::InvalidFormat {
            line,
            reason: format!("需要 4 个字段，实际 {} 个", values.len()),
        });
    };

    Ok(EdgeRecord {
        origin: origin as NodeId,
        destination: destination as NodeId,
        capacity,
        duration,
    })
}

/// 读取数据集并构建网络
pub fn load_network<P: AsRef<Path>>(path: P, options: DatasetOptions) -> Result<(Graph, ImportStats)> {
    let start = Instant::now();
    let path = path.as_ref();

    let graph = DatasetReader::new(options).read_path(path)?.into_network()?;

    let stats = ImportStats {
        nodes: graph.size(),
        edges: graph.edge_count(),
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        path = %path.display(),
        nodes = stats.nodes,
        edges = stats.edges,
        duration_ms = stats.duration_ms,
        "dataset loaded"
    );

    Ok((graph, stats))
}

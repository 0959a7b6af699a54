//! transit-flow 查询工具
//!
//! 对数据集执行单次查询，以表格或 JSON 输出

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;
use transit_flow::algorithm::{max_waiting_period, PathFinder};
use transit_flow::cli::{format_capacity, format_path, Printer};
use transit_flow::types::group_dimension;
use transit_flow::{
    load_network, Capacity, DatasetOptions, FlowEdge, Graph, NodeId, PathResult, RouteEngine,
};

#[derive(Parser, Debug)]
#[command(name = "transit-flow-query")]
#[command(about = "transit-flow 单次查询工具", version)]
struct Args {
    /// 数据集文件
    dataset: PathBuf,

    /// 字段分隔符
    #[arg(short, long, default_value_t = ' ')]
    delimiter: char,

    /// 以 JSON 输出
    #[arg(long)]
    json: bool,

    /// 流量表保持边的插入顺序
    #[arg(long)]
    no_sort: bool,

    /// 未设置 RUST_LOG 时的日志级别
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: QueryCommand,
}

#[derive(ClapArgs, Debug, Clone, Copy)]
struct Endpoints {
    /// 起点
    start: NodeId,
    /// 终点
    end: NodeId,
}

#[derive(ClapArgs, Debug, Clone, Copy)]
struct FlowArgs {
    #[command(flatten)]
    endpoints: Endpoints,

    /// 先分配该人数的团体（默认分配最大团体）
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    size: Option<Capacity>,
}

#[derive(Subcommand, Debug)]
enum QueryCommand {
    /// 瓶颈容量最大的路径
    Widest(Endpoints),

    /// 帕累托最优路径
    Pareto {
        #[command(flatten)]
        endpoints: Endpoints,

        /// 先比较跳数
        #[arg(long)]
        hops_first: bool,
    },

    /// 为指定人数的团体分配路线
    Group {
        #[command(flatten)]
        endpoints: Endpoints,

        /// 人数
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        size: Capacity,
    },

    /// 分配最大可能的团体
    Maxgroup(Endpoints),

    /// 所有成员在终点汇合的最早时刻
    Meetup(FlowArgs),

    /// 各节点上的等待时长
    Waits(FlowArgs),

    /// 限制团体规模的饱和线路
    Bottleneck(FlowArgs),

    /// 并行计算文件中每对 `起点 终点` 的最宽路径
    Batch {
        /// 每行一对节点
        pairs: PathBuf,
    },
}

#[derive(Serialize)]
struct FlowReport {
    start: NodeId,
    end: NodeId,
    group_dimension: Capacity,
    flows: Vec<FlowEdge>,
}

#[derive(Serialize)]
struct BatchEntry {
    start: NodeId,
    end: NodeId,
    #[serde(flatten)]
    result: PathResult,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if !args.delimiter.is_ascii() {
        bail!("分隔符必须是 ASCII 字符: {:?}", args.delimiter);
    }
    let options = DatasetOptions {
        delimiter: args.delimiter as u8,
    };

    let (graph, _) = load_network(&args.dataset, options)
        .with_context(|| format!("无法加载数据集 {}", args.dataset.display()))?;

    let output = run(&args, RouteEngine::new(graph))?;
    print!("{}", output);
    Ok(())
}

fn run(args: &Args, mut engine: RouteEngine) -> Result<String> {
    let printer = Printer;

    let output = match args.command {
        QueryCommand::Widest(Endpoints { start, end }) => {
            check_nodes(engine.network(), &[start, end])?;
            let result = engine.get_max_capacity_path(start, end);
            if args.json {
                to_json(&result)?
            } else {
                printer.path(start, end, &result)
            }
        }

        QueryCommand::Pareto {
            endpoints: Endpoints { start, end },
            hops_first,
        } => {
            check_nodes(engine.network(), &[start, end])?;
            let result = engine.get_pareto_optimal_path(start, end, !hops_first);
            if args.json {
                to_json(&result)?
            } else {
                printer.path(start, end, &result)
            }
        }

        QueryCommand::Group {
            endpoints: Endpoints { start, end },
            size,
        } => {
            check_nodes(engine.network(), &[start, end])?;
            let flows = engine.get_path_for_group_of_size(start, end, size);
            render_flows(args, start, end, flows)?
        }

        QueryCommand::Maxgroup(Endpoints { start, end }) => {
            check_nodes(engine.network(), &[start, end])?;
            let flows = engine.get_path_for_group_of_max_size(start, end);
            render_flows(args, start, end, flows)?
        }

        QueryCommand::Meetup(flow_args) => {
            let Endpoints { start, end } = assign(&mut engine, flow_args)?;
            let meetup = engine.get_earliest_meetup(start, end);
            let critical_path = engine.get_critical_path(start, end);
            if args.json {
                to_json(&json!({
                    "start": start,
                    "end": end,
                    "group_dimension": engine.group_size(start),
                    "meetup": meetup,
                    "critical_path": critical_path,
                }))?
            } else {
                printer.meetup(start, end, meetup, &critical_path)
            }
        }

        QueryCommand::Waits(flow_args) => {
            let Endpoints { start, end } = assign(&mut engine, flow_args)?;
            let waits = engine.get_waiting_periods(start, end);
            let longest = max_waiting_period(&waits);
            if args.json {
                to_json(&json!({
                    "start": start,
                    "end": end,
                    "waits": waits,
                    "max_wait": longest.as_ref().map(|(wait, _)| wait),
                    "max_wait_nodes": longest.as_ref().map(|(_, nodes)| nodes),
                }))?
            } else {
                printer.waits(&waits, longest)
            }
        }

        QueryCommand::Bottleneck(flow_args) => {
            let Endpoints { start, end } = assign(&mut engine, flow_args)?;
            let cut = engine.get_bottleneck_edges(start, end);
            if args.json {
                to_json(&cut)?
            } else {
                printer.bottleneck(&cut)
            }
        }

        QueryCommand::Batch { ref pairs } => {
            let pairs = read_pairs(pairs)?;
            check_nodes(
                engine.network(),
                &pairs.iter().flat_map(|&(s, e)| [s, e]).collect::<Vec<_>>(),
            )?;
            let entries = run_batch(engine.network(), &pairs);
            if args.json {
                to_json(&entries)?
            } else {
                render_batch(&entries)
            }
        }
    };

    Ok(output)
}

/// 校验节点 ID 在 `[1, n]` 内
fn check_nodes(graph: &Graph, nodes: &[NodeId]) -> Result<()> {
    for &node in nodes {
        if !graph.contains(node) {
            bail!("节点 {} 不存在，有效范围为 [1, {}]", node, graph.size());
        }
    }
    Ok(())
}

/// 调度类查询前先分配路线
fn assign(engine: &mut RouteEngine, flow_args: FlowArgs) -> Result<Endpoints> {
    let Endpoints { start, end } = flow_args.endpoints;
    check_nodes(engine.network(), &[start, end])?;
    match flow_args.size {
        Some(size) => engine.get_path_for_group_of_size(start, end, size),
        None => engine.get_path_for_group_of_max_size(start, end),
    };
    Ok(flow_args.endpoints)
}

fn render_flows(args: &Args, start: NodeId, end: NodeId, mut flows: Vec<FlowEdge>) -> Result<String> {
    if !args.no_sort {
        flows.sort();
    }
    if args.json {
        to_json(&FlowReport {
            start,
            end,
            group_dimension: group_dimension(&flows, start),
            flows,
        })
    } else {
        Ok(Printer.flows(&flows, start))
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value).context("JSON 序列化失败")?;
    text.push('\n');
    Ok(text)
}

/// 读取节点对文件，忽略空行与 # 注释
fn read_pairs(path: &Path) -> Result<Vec<(NodeId, NodeId)>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("无法读取 {}", path.display()))?;

    let mut pairs = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [start, end] = fields[..] else {
            bail!("第 {} 行需要 2 个字段: {}", index + 1, line);
        };
        let start = start
            .parse::<NodeId>()
            .with_context(|| format!("第 {} 行: 无效的节点 ID {}", index + 1, start))?;
        let end = end
            .parse::<NodeId>()
            .with_context(|| format!("第 {} 行: 无效的节点 ID {}", index + 1, end))?;
        pairs.push((start, end));
    }
    Ok(pairs)
}

/// 在共享的只读网络上并行搜索
fn run_batch(graph: &Graph, pairs: &[(NodeId, NodeId)]) -> Vec<BatchEntry> {
    let started = Instant::now();
    let entries: Vec<BatchEntry> = pairs
        .par_iter()
        .map(|&(start, end)| BatchEntry {
            start,
            end,
            result: PathFinder::new(graph).max_capacity_path(start, end),
        })
        .collect();

    info!(
        queries = entries.len(),
        duration_ms = started.elapsed().as_millis() as u64,
        "batch finished"
    );
    entries
}

fn render_batch(entries: &[BatchEntry]) -> String {
    use prettytable::{format, row, Table};

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Start", "End", "Path", "Capacity", "Hops"]);
    for entry in entries {
        if entry.result.is_reached() {
            table.add_row(row![
                entry.start,
                entry.end,
                format_path(&entry.result.path),
                format_capacity(entry.result.capacity),
                entry.result.distance
            ]);
        } else {
            table.add_row(row![entry.start, entry.end, "-", 0, "-"]);
        }
    }
    format!("{}{} 条查询\n", table, entries.len())
}

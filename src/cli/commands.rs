//! 控制台命令处理
//!
//! 解析并校验用户输入，只把合法的整数参数交给引擎

use std::path::PathBuf;

use crate::algorithm::max_waiting_period;
use crate::engine::RouteEngine;
use crate::error::{Error, Result};
use crate::import::{load_network, DatasetOptions};
use crate::types::{Capacity, FlowEdge, NodeId};

use super::printer::Printer;

/// 控制台命令执行结果
#[derive(Debug)]
pub enum CommandResult {
    /// 继续运行
    Continue,
    /// 退出程序
    Exit,
    /// 显示消息
    Message(String),
    /// 错误
    Error(String),
}

/// 已解析的命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Widest { start: NodeId, end: NodeId },
    Pareto { start: NodeId, end: NodeId },
    Group { start: NodeId, end: NodeId, size: Capacity },
    Increment { start: NodeId, end: NodeId, delta: Capacity },
    MaxGroup { start: NodeId, end: NodeId },
    Meetup { start: NodeId, end: NodeId },
    Waits { start: NodeId, end: NodeId },
    Bottleneck { start: NodeId, end: NodeId },
    Load(PathBuf),
    Stats,
    Help,
    Quit,
}

impl Command {
    /// 解析一行输入；节点 ID 必须在 `[1, node_count]` 内
    pub fn parse(input: &str, node_count: usize) -> Result<Self> {
        let mut words = input.split_whitespace();
        let cmd = words
            .next()
            .map(|w| w.to_lowercase())
            .ok_or_else(|| Error::InvalidArgument("空命令".to_string()))?;
        let args: Vec<&str> = words.collect();

        let command = match cmd.as_str() {
            "widest" | "w" => {
                let (start, end) = parse_pair(&cmd, &args, node_count)?;
                Command::Widest { start, end }
            }
            "pareto" | "p" => {
                let (start, end) = parse_pair(&cmd, &args, node_count)?;
                Command::Pareto { start, end }
            }
            "group" | "g" => {
                expect_args(&cmd, &args, 3, "<起点> <终点> <人数>")?;
                Command::Group {
                    start: parse_node(args[0], node_count)?,
                    end: parse_node(args[1], node_count)?,
                    size: parse_positive(args[2])?,
                }
            }
            "increment" | "inc" => {
                expect_args(&cmd, &args, 3, "<起点> <终点> <增量>")?;
                Command::Increment {
                    start: parse_node(args[0], node_count)?,
                    end: parse_node(args[1], node_count)?,
                    delta: parse_positive(args[2])?,
                }
            }
            "maxgroup" | "mg" => {
                let (start, end) = parse_pair(&cmd, &args, node_count)?;
                Command::MaxGroup { start, end }
            }
            "meetup" | "m" => {
                let (start, end) = parse_pair(&cmd, &args, node_count)?;
                Command::Meetup { start, end }
            }
            "waits" => {
                let (start, end) = parse_pair(&cmd, &args, node_count)?;
                Command::Waits { start, end }
            }
            "bottleneck" | "cut" => {
                let (start, end) = parse_pair(&cmd, &args, node_count)?;
                Command::Bottleneck { start, end }
            }
            "load" => {
                expect_args(&cmd, &args, 1, "<文件>")?;
                Command::Load(PathBuf::from(args[0]))
            }
            "stats" | "info" => Command::Stats,
            "help" | "h" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "未知命令: {}。输入 'help' 查看帮助。",
                    cmd
                )))
            }
        };

        Ok(command)
    }

    /// 需要已有流量分配的命令
    fn needs_flow(&self) -> bool {
        matches!(
            self,
            Command::Increment { .. } | Command::Meetup { .. } | Command::Waits { .. }
        )
    }
}

fn expect_args(cmd: &str, args: &[&str], count: usize, usage: &str) -> Result<()> {
    if args.len() != count {
        return Err(Error::InvalidArgument(format!("用法: {} {}", cmd, usage)));
    }
    Ok(())
}

fn parse_pair(cmd: &str, args: &[&str], node_count: usize) -> Result<(NodeId, NodeId)> {
    expect_args(cmd, args, 2, "<起点> <终点>")?;
    Ok((parse_node(args[0], node_count)?, parse_node(args[1], node_count)?))
}

/// 解析节点 ID
pub fn parse_node(value: &str, node_count: usize) -> Result<NodeId> {
    let node: NodeId = value
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("无效的节点 ID: {}", value)))?;
    if node == 0 || node > node_count {
        return Err(Error::InvalidArgument(format!(
            "节点 {} 不存在，有效范围为 [1, {}]",
            node, node_count
        )));
    }
    Ok(node)
}

/// 解析正整数（人数、增量）
pub fn parse_positive(value: &str) -> Result<Capacity> {
    match value.parse::<Capacity>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(Error::InvalidArgument(format!("需要正整数: {}", value))),
    }
}

/// 会话配置
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// 流量表按 (起点, 终点, 流量) 排序
    pub sort_flows: bool,
    /// `load` 命令使用的读取选项
    pub dataset: DatasetOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sort_flows: true,
            dataset: DatasetOptions::default(),
        }
    }
}

/// 控制台会话
pub struct Session {
    engine: RouteEngine,
    config: SessionConfig,
    /// 是否已有 group / maxgroup 的分配
    flow_assigned: bool,
    printer: Printer,
}

impl Session {
    pub fn new(engine: RouteEngine, config: SessionConfig) -> Self {
        Self {
            engine,
            config,
            flow_assigned: false,
            printer: Printer::default(),
        }
    }

    pub fn engine(&self) -> &RouteEngine {
        &self.engine
    }

    pub fn flow_assigned(&self) -> bool {
        self.flow_assigned
    }

    /// 解析并执行一行输入
    pub fn execute(&mut self, input: &str) -> CommandResult {
        if input.trim().is_empty() {
            return CommandResult::Continue;
        }

        let command = match Command::parse(input, self.engine.network().size()) {
            Ok(command) => command,
            Err(e) => return self.reject(e.to_string()),
        };

        if command.needs_flow() && !self.flow_assigned {
            return self.reject("还没有分配路线，请先执行 group 或 maxgroup".to_string());
        }

        self.dispatch(command)
    }

    fn reject(&self, message: String) -> CommandResult {
        self.engine.metrics().record_rejected();
        CommandResult::Error(message)
    }

    fn dispatch(&mut self, command: Command) -> CommandResult {
        match command {
            Command::Widest { start, end } => {
                let result = self.engine.get_max_capacity_path(start, end);
                CommandResult::Message(self.printer.path(start, end, &result))
            }

            Command::Pareto { start, end } => {
                let by_capacity = self.engine.get_pareto_optimal_path(start, end, true);
                let by_hops = self.engine.get_pareto_optimal_path(start, end, false);

                let mut output = String::from("容量优先:\n");
                output.push_str(&self.printer.path(start, end, &by_capacity));
                if by_capacity.capacity != by_hops.capacity
                    && by_capacity.distance != by_hops.distance
                {
                    output.push_str("跳数优先:\n");
                    output.push_str(&self.printer.path(start, end, &by_hops));
                }
                CommandResult::Message(output)
            }

            Command::Group { start, end, size } => {
                let flows = self.engine.get_path_for_group_of_size(start, end, size);
                self.flow_assigned = true;
                CommandResult::Message(self.render_flows(flows, start))
            }

            Command::Increment { start, end, delta } => {
                let flows = self.engine.get_path_with_increment(start, end, delta);
                CommandResult::Message(self.render_flows(flows, start))
            }

            Command::MaxGroup { start, end } => {
                let flows = self.engine.get_path_for_group_of_max_size(start, end);
                self.flow_assigned = true;
                CommandResult::Message(self.render_flows(flows, start))
            }

            Command::Meetup { start, end } => {
                let time = self.engine.get_earliest_meetup(start, end);
                let critical_path = self.engine.get_critical_path(start, end);
                CommandResult::Message(self.printer.meetup(start, end, time, &critical_path))
            }

            Command::Waits { start, end } => {
                let waits = self.engine.get_waiting_periods(start, end);
                let longest = max_waiting_period(&waits);
                CommandResult::Message(self.printer.waits(&waits, longest))
            }

            Command::Bottleneck { start, end } => {
                let cut = self.engine.get_bottleneck_edges(start, end);
                CommandResult::Message(self.printer.bottleneck(&cut))
            }

            Command::Load(path) => match load_network(&path, self.config.dataset) {
                Ok((graph, stats)) => {
                    self.engine.replace_network(graph);
                    self.flow_assigned = false;
                    CommandResult::Message(format!(
                        "已加载 {}: {} 个节点, {} 条边 ({} ms)\n",
                        path.display(),
                        stats.nodes,
                        stats.edges,
                        stats.duration_ms
                    ))
                }
                Err(e) => self.reject(format!("加载失败: {}", e)),
            },

            Command::Stats => CommandResult::Message(self.printer.stats(
                self.engine.network(),
                self.flow_assigned,
                &self.engine.metrics().snapshot(),
            )),

            Command::Help => CommandResult::Message(Printer::help()),

            Command::Quit => CommandResult::Exit,
        }
    }

    fn render_flows(&self, flows: Vec<FlowEdge>, start: NodeId) -> String {
        self.printer.flows(&self.arrange(flows), start)
    }

    fn arrange(&self, mut flows: Vec<FlowEdge>) -> Vec<FlowEdge> {
        if self.config.sort_flows {
            flows.sort();
        }
        flows
    }
}

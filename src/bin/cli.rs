//! transit-flow CLI 工具
//!
//! 交互式命令行界面

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use transit_flow::cli::{CommandCompleter, CommandResult, Session, SessionConfig};
use transit_flow::{load_network, DatasetOptions, RouteEngine};

#[derive(Parser, Debug)]
#[command(name = "transit-flow-cli")]
#[command(about = "transit-flow 交互式命令行工具", version)]
struct Args {
    /// 数据集文件
    dataset: PathBuf,

    /// 字段分隔符
    #[arg(short, long, default_value_t = ' ')]
    delimiter: char,

    /// 流量表保持边的插入顺序
    #[arg(long)]
    no_sort: bool,

    /// 未设置 RUST_LOG 时的日志级别
    #[arg(long, default_value = "warn")]
    log_level: String,
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
    let config = SessionConfig {
        sort_flows: !args.no_sort,
        dataset: DatasetOptions {
            delimiter: args.delimiter as u8,
        },
    };

    println!("{}", "transit-flow CLI - 交通网络路由与分流".bold());
    println!("=======================================");

    let (graph, stats) = load_network(&args.dataset, config.dataset)
        .with_context(|| format!("无法加载数据集 {}", args.dataset.display()))?;

    println!("数据集已加载: {}", args.dataset.display());
    println!("  节点数: {}", stats.nodes);
    println!("  边数: {}", stats.edges);
    println!("\n输入 'help' 查看命令列表，'quit' 退出\n");

    let mut session = Session::new(RouteEngine::new(graph), config);

    let mut editor: Editor<CommandCompleter, DefaultHistory> = Editor::new()?;
    editor.set_helper(Some(CommandCompleter::new()));

    loop {
        match editor.readline("transit> ") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }

                match session.execute(&line) {
                    CommandResult::Continue => {}
                    CommandResult::Exit => break,
                    CommandResult::Message(message) => print!("{}", message),
                    CommandResult::Error(message) => {
                        println!("{} {}", "错误:".red().bold(), message)
                    }
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    println!("再见！");
    Ok(())
}

//! 交互层
//!
//! 控制台会话、命令补全和结果渲染

mod commands;
mod completer;
mod printer;

pub use commands::{parse_node, parse_positive, Command, CommandResult, Session, SessionConfig};
pub use completer::CommandCompleter;
pub use printer::{format_capacity, format_path, Printer};

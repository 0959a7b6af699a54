//! 命令补全器
//!
//! 基于 rustyline 实现 Tab 补全：第一个词补全命令名，`load` 之后补全文件路径

use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

/// 命令列表
const COMMANDS: &[&str] = &[
    "widest",
    "pareto",
    "group",
    "increment",
    "maxgroup",
    "meetup",
    "waits",
    "bottleneck",
    "load",
    "stats",
    "help",
    "quit",
];

/// transit-flow 控制台补全器
pub struct CommandCompleter {
    files: FilenameCompleter,
}

impl Default for CommandCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandCompleter {
    pub fn new() -> Self {
        Self {
            files: FilenameCompleter::new(),
        }
    }

    /// 以 prefix 开头的命令
    pub fn candidates(prefix: &str) -> Vec<&'static str> {
        let prefix = prefix.to_lowercase();
        COMMANDS
            .iter()
            .copied()
            .filter(|cmd| cmd.starts_with(&prefix))
            .collect()
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_cursor = &line[..pos];
        let trimmed = line_to_cursor.trim_start();

        // 光标仍在第一个词上
        if !trimmed.contains(char::is_whitespace) {
            let start_pos = pos - trimmed.len();
            let completions = Self::candidates(trimmed)
                .into_iter()
                .map(|cmd| Pair {
                    display: cmd.to_string(),
                    replacement: format!("{} ", cmd),
                })
                .collect();
            return Ok((start_pos, completions));
        }

        if trimmed.to_lowercase().starts_with("load ") {
            return self.files.complete(line, pos, ctx);
        }

        Ok((pos, vec![]))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}

impl Validator for CommandCompleter {}

impl Helper for CommandCompleter {}

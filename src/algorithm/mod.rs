//! 图算法模块
//!
//! 包含路径搜索、最大流增广和关键路径调度

mod max_flow;
mod path_search;
mod schedule;

pub use max_flow::{min_cut, Augmentation, Direction, EdmondsKarp, ResidualSearch};
pub use path_search::{Objective, PathFinder, PathResult, SearchTree};
pub use schedule::{max_waiting_period, Schedule, Scheduler};

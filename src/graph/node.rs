//! 节点定义
//!
//! 节点只保存邻接表；遍历状态由各算法自己的结果结构持有

use crate::types::EdgeId;
use smallvec::SmallVec;

/// 邻接表，按边插入顺序保存
pub type Adjacency = SmallVec<[EdgeId; 4]>;

/// 节点
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    /// 出边
    outgoing: Adjacency,
    /// 入边
    incoming: Adjacency,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outgoing(&self) -> &[EdgeId] {
        &self.outgoing
    }

    pub fn incoming(&self) -> &[EdgeId] {
        &self.incoming
    }

    pub fn out_degree(&self) -> usize {
        self.outgoing.len()
    }

    pub fn in_degree(&self) -> usize {
        self.incoming.len()
    }

    pub(crate) fn add_outgoing(&mut self, edge: EdgeId) {
        self.outgoing.push(edge);
    }

    pub(crate) fn add_incoming(&mut self, edge: EdgeId) {
        self.incoming.push(edge);
    }
}

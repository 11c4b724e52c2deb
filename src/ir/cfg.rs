// Copyright (c) 2017-2020 Fabian Schuiki

//! Representation of the control flow in a `Function`.
//!
//! Each `Function` has an associated `ControlFlowGraph` which contains the
//! basic blocks and their names.

use crate::{
    impl_table_indexing,
    ir::Block,
    table::{PrimaryTable, TableKey},
};
use serde::{Deserialize, Serialize};

/// A control flow graph.
///
/// This is the main container for BBs and control flow related information.
/// Every `Function` has an associated control flow graph.
#[derive(Default, Serialize, Deserialize)]
pub struct ControlFlowGraph {
    /// The basic blocks in the graph.
    pub(crate) blocks: PrimaryTable<Block, BlockData>,
}

impl_table_indexing!(ControlFlowGraph, blocks, Block, BlockData);

/// Internal table storage for BBs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockData {
    /// The name of the BB.
    pub name: Option<String>,
}

impl ControlFlowGraph {
    /// Create a new control flow graph.
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a BB to the graph.
    pub(super) fn add_block(&mut self) -> Block {
        self.blocks.add(BlockData { name: None })
    }

    /// Return the name of a BB.
    pub fn get_name(&self, bb: Block) -> Option<&str> {
        self[bb].name.as_ref().map(AsRef::as_ref)
    }

    /// Set the name of a BB.
    pub fn set_name(&mut self, bb: Block, name: String) {
        self[bb].name = Some(name);
    }

    /// Clear the name of a BB.
    pub fn clear_name(&mut self, bb: Block) -> Option<String> {
        std::mem::replace(&mut self[bb].name, None)
    }
}

impl Block {
    /// Dump the BB in human-readable form.
    pub fn dump(self, cfg: &ControlFlowGraph) -> BlockDumper {
        BlockDumper(self, cfg)
    }
}

/// Temporary object to dump a `Block` in human-readable form.
pub struct BlockDumper<'a>(Block, &'a ControlFlowGraph);

impl std::fmt::Display for BlockDumper<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(name) = self.1.get_name(self.0) {
            write!(f, "%{}", name)
        } else {
            write!(f, "%bb{}", self.0.index())
        }
    }
}

// Copyright (c) 2017-2020 Fabian Schuiki

//! Instruction and BB ordering.

use crate::{
    ir::{Block, Inst},
    table::SecondaryTable,
};
use serde::{Deserialize, Serialize};

/// Determines the order of instructions and BBs in a `Function`.
#[derive(Default, Serialize, Deserialize)]
pub struct FunctionLayout {
    /// A linked list of BBs in layout order.
    bbs: SecondaryTable<Block, BlockNode>,
    /// The first BB in the layout.
    first_bb: Option<Block>,
    /// The last BB in the layout.
    last_bb: Option<Block>,
    /// A linked list of instructions in layout order, linked within their
    /// containing BB.
    insts: SecondaryTable<Inst, InstNode>,
}

/// A node in the layout's double-linked list of BBs.
#[derive(Default, Serialize, Deserialize)]
struct BlockNode {
    prev: Option<Block>,
    next: Option<Block>,
    first_inst: Option<Inst>,
    last_inst: Option<Inst>,
}

/// A node in a BB's double-linked list of instructions.
#[derive(Serialize, Deserialize)]
struct InstNode {
    block: Block,
    prev: Option<Inst>,
    next: Option<Inst>,
}

impl FunctionLayout {
    /// Create a new function layout.
    pub fn new() -> Self {
        Default::default()
    }
}

/// Basic block arrangement.
impl FunctionLayout {
    /// Append a BB to the end of the function.
    pub fn append_block(&mut self, bb: Block) {
        self.bbs.add(
            bb,
            BlockNode {
                prev: self.last_bb,
                ..Default::default()
            },
        );
        if let Some(prev) = self.last_bb {
            self.bbs[prev].next = Some(bb);
        }
        if self.first_bb.is_none() {
            self.first_bb = Some(bb);
        }
        self.last_bb = Some(bb);
    }

    /// Check if a BB has been inserted into the layout.
    pub fn is_block_inserted(&self, bb: Block) -> bool {
        self.bbs.contains(bb)
    }

    /// Return an iterator over all BBs in layout order.
    pub fn blocks<'a>(&'a self) -> impl Iterator<Item = Block> + 'a {
        std::iter::successors(self.first_bb, move |&bb| self.bbs[bb].next)
    }

    /// Get the first BB in the layout. This is the entry block.
    pub fn first_block(&self) -> Option<Block> {
        self.first_bb
    }

    /// Get the last BB in the layout.
    pub fn last_block(&self) -> Option<Block> {
        self.last_bb
    }

    /// Get the entry block of the layout, or panic if there is none.
    pub fn entry(&self) -> Block {
        self.first_bb.expect("layout has no entry block")
    }

    /// Get the BB preceding `bb` in the layout.
    pub fn prev_block(&self, bb: Block) -> Option<Block> {
        self.bbs[bb].prev
    }

    /// Get the BB following `bb` in the layout.
    pub fn next_block(&self, bb: Block) -> Option<Block> {
        self.bbs[bb].next
    }
}

/// Instruction arrangement.
impl FunctionLayout {
    /// Append an instruction to the end of a BB.
    pub fn append_inst(&mut self, inst: Inst, bb: Block) {
        let prev = self.bbs[bb].last_inst;
        self.insts.add(
            inst,
            InstNode {
                block: bb,
                prev,
                next: None,
            },
        );
        if let Some(prev) = prev {
            self.insts[prev].next = Some(inst);
        }
        let node = &mut self.bbs[bb];
        if node.first_inst.is_none() {
            node.first_inst = Some(inst);
        }
        node.last_inst = Some(inst);
    }

    /// Prepend an instruction to the beginning of a BB.
    pub fn prepend_inst(&mut self, inst: Inst, bb: Block) {
        let next = self.bbs[bb].first_inst;
        self.insts.add(
            inst,
            InstNode {
                block: bb,
                prev: None,
                next,
            },
        );
        if let Some(next) = next {
            self.insts[next].prev = Some(inst);
        }
        let node = &mut self.bbs[bb];
        if node.last_inst.is_none() {
            node.last_inst = Some(inst);
        }
        node.first_inst = Some(inst);
    }

    /// Insert an instruction after another instruction.
    pub fn insert_inst_after(&mut self, inst: Inst, after: Inst) {
        let (bb, next) = {
            let node = &self.insts[after];
            (node.block, node.next)
        };
        self.insts.add(
            inst,
            InstNode {
                block: bb,
                prev: Some(after),
                next,
            },
        );
        match next {
            Some(next) => self.insts[next].prev = Some(inst),
            None => self.bbs[bb].last_inst = Some(inst),
        }
        self.insts[after].next = Some(inst);
    }

    /// Insert an instruction before another instruction.
    pub fn insert_inst_before(&mut self, inst: Inst, before: Inst) {
        let (bb, prev) = {
            let node = &self.insts[before];
            (node.block, node.prev)
        };
        self.insts.add(
            inst,
            InstNode {
                block: bb,
                prev,
                next: Some(before),
            },
        );
        match prev {
            Some(prev) => self.insts[prev].next = Some(inst),
            None => self.bbs[bb].first_inst = Some(inst),
        }
        self.insts[before].prev = Some(inst);
    }

    /// Remove an instruction from its BB.
    pub fn remove_inst(&mut self, inst: Inst) {
        let node = self.insts.remove(inst).expect("inst not in layout");
        match node.next {
            Some(next) => self.insts[next].prev = node.prev,
            None => self.bbs[node.block].last_inst = node.prev,
        }
        match node.prev {
            Some(prev) => self.insts[prev].next = node.next,
            None => self.bbs[node.block].first_inst = node.next,
        }
    }

    /// Check if an instruction has been inserted into the layout.
    pub fn is_inst_inserted(&self, inst: Inst) -> bool {
        self.insts.contains(inst)
    }

    /// Return an iterator over all instructions in a BB in layout order.
    pub fn insts<'a>(&'a self, bb: Block) -> impl Iterator<Item = Inst> + 'a {
        std::iter::successors(self.bbs[bb].first_inst, move |&inst| self.insts[inst].next)
    }

    /// Return an iterator over all instructions in layout order.
    pub fn all_insts<'a>(&'a self) -> impl Iterator<Item = Inst> + 'a {
        self.blocks().flat_map(move |bb| self.insts(bb))
    }

    /// Get the first instruction in a BB.
    pub fn first_inst(&self, bb: Block) -> Option<Inst> {
        self.bbs[bb].first_inst
    }

    /// Get the last instruction in a BB.
    pub fn last_inst(&self, bb: Block) -> Option<Inst> {
        self.bbs[bb].last_inst
    }

    /// Get the terminator instruction of a BB, or panic if there is none.
    pub fn terminator(&self, bb: Block) -> Inst {
        self.bbs[bb]
            .last_inst
            .expect("block has no terminator")
    }

    /// Get the instruction preceding `inst` in its BB.
    pub fn prev_inst(&self, inst: Inst) -> Option<Inst> {
        self.insts[inst].prev
    }

    /// Get the instruction following `inst` in its BB.
    pub fn next_inst(&self, inst: Inst) -> Option<Inst> {
        self.insts[inst].next
    }

    /// Get the BB which contains `inst`.
    pub fn inst_block(&self, inst: Inst) -> Block {
        self.insts[inst].block
    }
}

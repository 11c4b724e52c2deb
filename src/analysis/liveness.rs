// Copyright (c) 2017-2021 Fabian Schuiki

//! Instruction-granular liveness analysis.
//!
//! This module computes, for every instruction in a function, the set of
//! values that are live immediately before and after it. The computation is
//! an iterative backward dataflow analysis over the equations
//!
//! ```text
//! in[n]  = use[n] ∪ (out[n] − def[n])
//! out[n] = ⋃ in[s]   for all successors s of n
//! ```
//!
//! iterated until a fixpoint is reached. Phi nodes require special handling:
//! their operands are not live at the phi itself, but only at the end of the
//! predecessor block the respective operand flows in from.

use crate::{
    analysis::PredecessorTable,
    ir::{prelude::*, ValueData},
};
use log::trace;
use std::collections::{HashMap, HashSet};

/// A liveness table.
///
/// Records for every instruction which values are live immediately before
/// and after it. The table is a snapshot; it is not updated when the
/// function changes.
#[derive(Debug, Clone)]
pub struct Liveness {
    /// Map from an instruction to the values live before it.
    ins: HashMap<Inst, HashSet<Value>>,
    /// Map from an instruction to the values live after it.
    outs: HashMap<Inst, HashSet<Value>>,
}

impl Liveness {
    /// Compute the liveness of all values in a function.
    ///
    /// Iterates over the instructions in sweeps, recomputing the live-in and
    /// live-out set of each from the current state of the table, until one
    /// full sweep causes no more change. Newly computed sets are visible
    /// within the same sweep. Termination is guaranteed since the sets only
    /// ever grow.
    ///
    /// The function is read-only during the computation. Panics if a phi
    /// node's incoming edges do not line up with the predecessors of its
    /// block.
    pub fn new(func: &Function, pt: &PredecessorTable) -> Self {
        let phi_uses = phi_edge_uses(func, pt);

        let mut ins: HashMap<Inst, HashSet<Value>> = HashMap::new();
        let mut outs: HashMap<Inst, HashSet<Value>> = HashMap::new();
        for inst in func.layout.all_insts() {
            ins.insert(inst, HashSet::new());
            outs.insert(inst, HashSet::new());
        }

        let mut sweeps = 0;
        let mut changed = true;
        while changed {
            changed = false;
            sweeps += 1;
            for bb in func.layout.blocks() {
                for inst in func.layout.insts(bb) {
                    let data = &func.dfg[inst];
                    let def = func.dfg.get_inst_result(inst);

                    // in[n] = use[n] ∪ (out[n] − def[n])
                    //
                    // A phi node has no use set of its own at this point; its
                    // operands are accounted for at the predecessors' ends.
                    let mut live: HashSet<Value> = outs[&inst]
                        .iter()
                        .cloned()
                        .filter(|&v| Some(v) != def)
                        .collect();
                    if !data.opcode().is_phi() {
                        live.extend(
                            data.args()
                                .iter()
                                .cloned()
                                .filter(|&v| tracked(&func.dfg, v)),
                        );
                    }
                    if live != ins[&inst] {
                        ins.insert(inst, live);
                        changed = true;
                    }

                    // out[n] = ⋃ in[s] for all successor instructions s,
                    // where a phi node successor contributes its live-out
                    // (minus its own def), plus its edge-specific uses when
                    // n is the terminator of the corresponding predecessor.
                    let mut live = HashSet::new();
                    if data.opcode().is_terminator() {
                        for &to_bb in data.blocks() {
                            let first = func
                                .layout
                                .first_inst(to_bb)
                                .expect("successor block is empty");
                            if func.dfg[first].opcode().is_phi() {
                                for phi in func
                                    .layout
                                    .insts(to_bb)
                                    .take_while(|&i| func.dfg[i].opcode().is_phi())
                                {
                                    live.extend(phi_uses[&phi][&bb].iter().cloned());
                                }
                                let phi_def = func.dfg.get_inst_result(first);
                                live.extend(
                                    outs[&first]
                                        .iter()
                                        .cloned()
                                        .filter(|&v| Some(v) != phi_def),
                                );
                            } else {
                                live.extend(ins[&first].iter().cloned());
                            }
                        }
                    } else {
                        let next = func
                            .layout
                            .next_inst(inst)
                            .expect("instruction has no successor");
                        if func.dfg[next].opcode().is_phi() {
                            let phi_def = func.dfg.get_inst_result(next);
                            live.extend(
                                outs[&next].iter().cloned().filter(|&v| Some(v) != phi_def),
                            );
                        } else {
                            live.extend(ins[&next].iter().cloned());
                        }
                    }
                    if live != outs[&inst] {
                        outs.insert(inst, live);
                        changed = true;
                    }
                }
            }
        }
        trace!("Liveness of @{} converged after {} sweeps", func.name, sweeps);

        Self { ins, outs }
    }

    /// Get the values live immediately before an instruction.
    pub fn live_in(&self, inst: Inst) -> &HashSet<Value> {
        &self.ins[&inst]
    }

    /// Get the values live immediately after an instruction.
    pub fn live_out(&self, inst: Inst) -> &HashSet<Value> {
        &self.outs[&inst]
    }
}

/// Compute the per-edge use sets of all phi nodes in a function.
///
/// For each phi node this produces a map from predecessor block to the values
/// the phi reads when control enters through that block. Panics if a phi does
/// not carry exactly one incoming value per predecessor edge.
fn phi_edge_uses(
    func: &Function,
    pt: &PredecessorTable,
) -> HashMap<Inst, HashMap<Block, HashSet<Value>>> {
    let mut map = HashMap::new();
    for bb in func.layout.blocks() {
        for inst in func.layout.insts(bb) {
            let data = &func.dfg[inst];
            if !data.opcode().is_phi() {
                continue;
            }
            let preds = pt.pred_set(bb);
            assert_eq!(
                data.blocks().len(),
                preds.len(),
                "phi {} has {} incoming values for {} predecessors",
                inst,
                data.blocks().len(),
                preds.len()
            );
            let mut uses: HashMap<Block, HashSet<Value>> =
                preds.iter().map(|&p| (p, HashSet::new())).collect();
            let mut seen = HashSet::new();
            for (&value, &pred) in data.args().iter().zip(data.blocks().iter()) {
                assert!(
                    seen.insert(pred),
                    "phi {} has multiple incoming values for {}",
                    inst,
                    pred
                );
                let set = match uses.get_mut(&pred) {
                    Some(set) => set,
                    None => panic!(
                        "phi {} names {} which is not a predecessor of {}",
                        inst, pred, bb
                    ),
                };
                if tracked(&func.dfg, value) {
                    set.insert(value);
                }
            }
            map.insert(inst, uses);
        }
    }
    map
}

/// Check whether a value takes part in liveness tracking.
///
/// Only instruction results and function arguments are tracked; placeholder
/// values are ignored.
fn tracked(dfg: &DataFlowGraph, value: Value) -> bool {
    match dfg[value] {
        ValueData::Inst { .. } | ValueData::Arg { .. } => true,
        ValueData::Placeholder { .. } => false,
    }
}

use sift::ir::prelude::*;
use sift::pass::{DeadCodeElim, Pass, PassContext, TrivialDeadCodeElim};
use sift::{int_ty, void_ty};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn new_func(name: &str, args: Vec<sift::Type>, ret: sift::Type) -> Function {
    let mut sig = Signature::new();
    for arg in args {
        sig.add_input(arg);
    }
    sig.set_return_type(ret);
    Function::new(name, sig)
}

/// `%x = add 1, 2; %y = mul %x, 3; ret 4` with both `%x` and `%y` unused.
fn dead_chain(name: &str) -> Function {
    let mut func = new_func(name, vec![], int_ty(32));
    let mut builder = FunctionBuilder::new(&mut func);
    let bb = builder.named_block("entry");
    builder.append_to(bb);
    let c1 = builder.ins().const_int((32, 1));
    let c2 = builder.ins().const_int((32, 2));
    let x = builder.ins().name("x").add(c1, c2);
    let c3 = builder.ins().const_int((32, 3));
    builder.ins().name("y").smul(x, c3);
    let c4 = builder.ins().const_int((32, 4));
    builder.ins().ret_value(c4);
    func
}

#[test]
fn removes_dead_chain() {
    init_logger();
    let mut func = dead_chain("chain");
    func.verify();
    let before = func.layout.all_insts().count();
    assert_eq!(before, 7);

    assert!(DeadCodeElim::run_on_function(&PassContext, &mut func));
    func.verify();

    // Only the returned constant and the terminator survive. `%y` goes
    // first, which in turn frees up `%x` and the other constants.
    let after = func.layout.all_insts().count();
    assert_eq!(after, 2);
    let bb = func.layout.entry();
    let remaining: Vec<_> = func
        .layout
        .insts(bb)
        .map(|inst| func.dfg[inst].opcode())
        .collect();
    assert_eq!(remaining, vec![Opcode::ConstInt, Opcode::RetValue]);

    // A second application finds nothing left to do.
    assert!(!DeadCodeElim::run_on_function(&PassContext, &mut func));
    assert_eq!(func.layout.all_insts().count(), after);
}

#[test]
fn phi_keeps_incoming_value_alive() {
    init_logger();
    let mut func = new_func("keep", vec![int_ty(1)], int_ty(32));
    let cond = func.input_arg(0);
    let mut builder = FunctionBuilder::new(&mut func);
    let entry = builder.named_block("entry");
    let bb1 = builder.named_block("then");
    let bb2 = builder.named_block("else");
    builder.append_to(entry);
    let c1 = builder.ins().const_int((32, 1));
    let c2 = builder.ins().const_int((32, 2));
    let x = builder.ins().name("x").add(c1, c2);
    builder.ins().br_cond(cond, bb1, bb2);
    builder.append_to(bb1);
    let y = builder.ins().name("y").phi(vec![x], vec![entry]);
    builder.ins().ret_value(y);
    builder.append_to(bb2);
    let c0 = builder.ins().const_int((32, 0));
    builder.ins().ret_value(c0);
    func.verify();

    // `%x` is only live along the edge into the phi, but that is enough;
    // neither it nor the phi may be removed.
    let before = func.layout.all_insts().count();
    assert!(!DeadCodeElim::run_on_function(&PassContext, &mut func));
    assert_eq!(func.layout.all_insts().count(), before);
    assert!(func.layout.is_inst_inserted(func.dfg.value_inst(x)));
    assert!(func.layout.is_inst_inserted(func.dfg.value_inst(y)));
    func.verify();
}

#[test]
fn side_effects_survive() {
    init_logger();
    let mut func = new_func("effects", vec![], void_ty());
    let mut builder = FunctionBuilder::new(&mut func);
    let bb = builder.named_block("entry");
    builder.append_to(bb);

    let mut log_sig = Signature::new();
    log_sig.add_input(int_ty(32));
    let log = builder.add_extern("log", log_sig);
    let mut get_sig = Signature::new();
    get_sig.set_return_type(int_ty(32));
    let get = builder.add_extern("get", get_sig);

    let c5 = builder.ins().const_int((32, 5));
    builder.ins().call(log, vec![c5]);
    // The result of this call is unused, but the call may have effects.
    builder.ins().call(get, vec![]);
    builder.ins().ret();
    func.verify();

    let before = func.layout.all_insts().count();
    assert!(!DeadCodeElim::run_on_function(&PassContext, &mut func));
    assert_eq!(func.layout.all_insts().count(), before);
    assert!(!TrivialDeadCodeElim::run_on_function(&PassContext, &mut func));
    assert_eq!(func.layout.all_insts().count(), before);
    func.verify();
}

#[test]
fn dead_loads_removed() {
    init_logger();
    let mut func = new_func("loads", vec![], void_ty());
    let mut builder = FunctionBuilder::new(&mut func);
    let bb = builder.named_block("entry");
    builder.append_to(bb);
    let c0 = builder.ins().const_int((32, 0));
    let slot = builder.ins().name("slot").var(c0);
    builder.ins().ld(slot);
    builder.ins().ret();
    func.verify();

    assert!(DeadCodeElim::run_on_function(&PassContext, &mut func));
    func.verify();
    assert_eq!(func.layout.all_insts().count(), 1);
    let bb = func.layout.entry();
    let term = func.layout.terminator(bb);
    assert_eq!(func.dfg[term].opcode(), Opcode::Ret);
}

#[test]
fn stores_survive() {
    init_logger();
    let mut func = new_func("stores", vec![], void_ty());
    let mut builder = FunctionBuilder::new(&mut func);
    let bb = builder.named_block("entry");
    builder.append_to(bb);
    let c0 = builder.ins().const_int((32, 0));
    let c7 = builder.ins().const_int((32, 7));
    let slot = builder.ins().name("slot").var(c0);
    builder.ins().st(slot, c7);
    builder.ins().ret();
    func.verify();

    // The store pins the slot, which pins both constants.
    let before = func.layout.all_insts().count();
    assert!(!DeadCodeElim::run_on_function(&PassContext, &mut func));
    assert_eq!(func.layout.all_insts().count(), before);
    func.verify();
}

#[test]
fn rounds_only_shrink() {
    init_logger();
    let mut func = dead_chain("shrink");
    let before = func.layout.all_insts().count();
    DeadCodeElim::run_on_function(&PassContext, &mut func);
    let after = func.layout.all_insts().count();
    assert!(after <= before);

    // No instruction may reference a removed value afterwards.
    func.verify();
    for bb in func.layout.blocks() {
        for inst in func.layout.insts(bb) {
            for &arg in func.dfg[inst].args() {
                assert!(func.dfg.contains_value(arg));
            }
        }
    }
}

#[test]
fn trivial_dce_cascades() {
    init_logger();
    let mut func = dead_chain("trivial");
    assert!(TrivialDeadCodeElim::run_on_function(&PassContext, &mut func));
    func.verify();

    // Pruning cascades into the operands, so one application suffices.
    assert_eq!(func.layout.all_insts().count(), 2);
    assert!(!TrivialDeadCodeElim::run_on_function(&PassContext, &mut func));
}

#[test]
fn runs_on_whole_module() {
    init_logger();
    let mut module = Module::new();
    let id0 = module.add_function(dead_chain("first"));
    let id1 = module.add_function(dead_chain("second"));

    assert!(DeadCodeElim::run_on_module(&PassContext, &mut module));
    module.verify().unwrap();
    assert_eq!(module[id0].layout.all_insts().count(), 2);
    assert_eq!(module[id1].layout.all_insts().count(), 2);
    assert!(!DeadCodeElim::run_on_module(&PassContext, &mut module));
}

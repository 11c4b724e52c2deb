#[macro_use]
extern crate indoc;

use sift::ir::prelude::*;
use sift::{int_ty, void_ty};

/// Create a `func @test() void` function populated by a callback. Useful to
/// act as a simple container to collect instructions.
fn within_func(return_type: sift::Type, f: impl FnOnce(&mut FunctionBuilder)) -> Function {
    let mut sig = Signature::new();
    sig.set_return_type(return_type);
    let mut func = Function::new("test", sig);
    let mut builder = FunctionBuilder::new(&mut func);
    let bb = builder.named_block("entry");
    builder.append_to(bb);
    f(&mut builder);
    func
}

#[test]
fn build_and_dump() {
    let func = within_func(int_ty(32), |builder| {
        let v1 = builder.ins().name("one").const_int((32, 1));
        let v2 = builder.ins().const_int((32, 2));
        let v3 = builder.ins().name("sum").add(v1, v2);
        builder.ins().ret_value(v3);
    });
    func.verify();
    assert_eq!(
        func.to_string(),
        indoc! {"
            func @test () i32 {
            %entry:
                %one = const i32 1
                %1 = const i32 2
                %sum = add i32 %one, %1
                ret %sum
            }"
        }
    );
}

#[test]
fn arguments_become_values() {
    let mut sig = Signature::new();
    sig.add_input(int_ty(8));
    sig.add_input(int_ty(8));
    sig.set_return_type(int_ty(8));
    let mut func = Function::new("test", sig);
    let x = func.input_arg(0);
    let y = func.input_arg(1);
    let mut builder = FunctionBuilder::new(&mut func);
    let bb = builder.named_block("entry");
    builder.append_to(bb);
    let z = builder.ins().xor(x, y);
    builder.ins().ret_value(z);
    func.verify();
    assert_eq!(func.dfg.value_type(x), int_ty(8));
    assert!(func.dfg.get_value_arg(x).is_some());
    assert!(func.dfg.get_value_inst(x).is_none());
    assert_eq!(func.dfg.uses(x).count(), 1);
}

#[test]
fn layout_order() {
    let func = within_func(void_ty(), |builder| {
        let v1 = builder.ins().const_int((32, 1));
        let v2 = builder.ins().const_int((32, 2));
        builder.ins().add(v1, v2);
        builder.ins().ret();
    });
    let bb = func.layout.entry();
    assert_eq!(func.layout.all_insts().count(), 4);
    assert_eq!(func.layout.insts(bb).count(), 4);
    let first = func.layout.first_inst(bb).unwrap();
    let last = func.layout.last_inst(bb).unwrap();
    assert_eq!(func.layout.prev_inst(first), None);
    assert_eq!(func.layout.next_inst(last), None);
    assert!(func.dfg[last].opcode().is_terminator());
    assert_eq!(func.layout.inst_block(first), bb);
}

#[test]
fn uses_are_tracked() {
    let mut func = within_func(void_ty(), |builder| {
        let v1 = builder.ins().const_int((32, 21));
        let v2 = builder.ins().umul(v1, v1);
        builder.ins().ret();
        let _ = v2;
    });
    let bb = func.layout.entry();
    let insts: Vec<_> = func.layout.insts(bb).collect();
    let v1 = func.dfg.inst_result(insts[0]);
    let v2 = func.dfg.inst_result(insts[1]);
    assert!(func.dfg.has_uses(v1));
    assert!(!func.dfg.has_uses(v2));
    assert_eq!(func.dfg.uses(v1).count(), 1);

    // Removing the multiply frees up the constant.
    let mut builder = FunctionBuilder::new(&mut func);
    builder.remove_inst(insts[1]);
    assert!(!func.dfg.has_uses(v1));
}

#[test]
fn placeholders_wire_up_loops() {
    let mut sig = Signature::new();
    sig.set_return_type(int_ty(32));
    let mut func = Function::new("test", sig);
    let mut builder = FunctionBuilder::new(&mut func);
    let entry = builder.named_block("entry");
    let body = builder.named_block("body");
    let exit = builder.named_block("exit");

    builder.append_to(entry);
    let c0 = builder.ins().const_int((32, 0));
    let c1 = builder.ins().const_int((32, 1));
    let c10 = builder.ins().const_int((32, 10));
    builder.ins().br(body);

    builder.append_to(body);
    let ph = builder.add_placeholder(int_ty(32));
    let i = builder.ins().name("i").phi(vec![c0, ph], vec![entry, body]);
    let next = builder.ins().name("next").add(i, c1);
    let cont = builder.ins().ult(next, c10);
    builder.ins().br_cond(cont, body, exit);
    assert_eq!(builder.replace_use(ph, next), 1);
    builder.remove_placeholder(ph);

    builder.append_to(exit);
    builder.ins().ret_value(i);

    func.verify();
    let phi_inst = func.dfg.value_inst(i);
    assert_eq!(func.dfg[phi_inst].args(), &[c0, next]);
    assert_eq!(func.dfg.uses(next).count(), 2);
}

#[test]
fn module_roundtrip() {
    let mut module = Module::new();
    let func = within_func(void_ty(), |builder| {
        builder.ins().ret();
    });
    let id = module.add_function(func);
    assert_eq!(module.function_ids().count(), 1);
    assert_eq!(module[id].name, "test");
    module.verify().unwrap();
}

#[test]
#[should_panic(expected = "in use")]
fn remove_used_inst_panics() {
    let mut func = within_func(void_ty(), |builder| {
        let v1 = builder.ins().const_int((32, 1));
        builder.ins().neg(v1);
        builder.ins().ret();
    });
    let bb = func.layout.entry();
    let first = func.layout.first_inst(bb).unwrap();
    let mut builder = FunctionBuilder::new(&mut func);
    builder.remove_inst(first);
}

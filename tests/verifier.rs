use sift::int_ty;
use sift::ir::prelude::*;
use sift::verifier::Verifier;

fn new_func(name: &str, args: Vec<sift::Type>, ret: sift::Type) -> Function {
    let mut sig = Signature::new();
    for arg in args {
        sig.add_input(arg);
    }
    sig.set_return_type(ret);
    Function::new(name, sig)
}

fn errors_of(func: &Function) -> String {
    let mut verifier = Verifier::new();
    verifier.verify_function(func);
    match verifier.finish() {
        Ok(()) => String::new(),
        Err(errs) => errs.to_string(),
    }
}

#[test]
fn well_formed_function() {
    let mut func = new_func("ok", vec![int_ty(32)], int_ty(32));
    let x = func.input_arg(0);
    let mut builder = FunctionBuilder::new(&mut func);
    let bb = builder.named_block("entry");
    builder.append_to(bb);
    let y = builder.ins().add(x, x);
    builder.ins().ret_value(y);
    assert_eq!(errors_of(&func), "");
}

#[test]
fn missing_entry_block() {
    let func = new_func("empty", vec![], int_ty(32));
    assert!(errors_of(&func).contains("no entry block"));
}

#[test]
fn empty_block() {
    let mut func = new_func("hole", vec![], int_ty(32));
    let mut builder = FunctionBuilder::new(&mut func);
    let entry = builder.named_block("entry");
    builder.named_block("hole");
    builder.append_to(entry);
    let c0 = builder.ins().const_int((32, 0));
    builder.ins().ret_value(c0);
    assert!(errors_of(&func).contains("block is empty"));
}

#[test]
fn missing_terminator() {
    let mut func = new_func("unterminated", vec![], int_ty(32));
    let mut builder = FunctionBuilder::new(&mut func);
    let bb = builder.named_block("entry");
    builder.append_to(bb);
    builder.ins().const_int((32, 0));
    assert!(errors_of(&func).contains("must be a terminator"));
}

#[test]
fn terminator_in_the_middle() {
    let mut func = new_func("midterm", vec![], int_ty(32));
    let mut builder = FunctionBuilder::new(&mut func);
    let entry = builder.named_block("entry");
    let next = builder.named_block("next");
    builder.append_to(entry);
    builder.ins().br(next);
    let c0 = builder.ins().const_int((32, 0));
    builder.ins().ret_value(c0);
    builder.append_to(next);
    let c1 = builder.ins().const_int((32, 1));
    builder.ins().ret_value(c1);
    assert!(errors_of(&func).contains("terminator must be at the end"));
}

#[test]
fn phi_not_in_prefix() {
    let mut func = new_func("latephi", vec![int_ty(1)], int_ty(32));
    let cond = func.input_arg(0);
    let mut builder = FunctionBuilder::new(&mut func);
    let entry = builder.named_block("entry");
    let bb1 = builder.named_block("a");
    let bb2 = builder.named_block("b");
    let join = builder.named_block("join");
    builder.append_to(entry);
    let x = builder.ins().const_int((32, 1));
    let y = builder.ins().const_int((32, 2));
    builder.ins().br_cond(cond, bb1, bb2);
    builder.append_to(bb1);
    builder.ins().br(join);
    builder.append_to(bb2);
    builder.ins().br(join);
    builder.append_to(join);
    let z = builder.ins().alias(x);
    let p = builder.ins().phi(vec![x, y], vec![bb1, bb2]);
    let q = builder.ins().add(p, z);
    builder.ins().ret_value(q);
    assert!(errors_of(&func).contains("phi must be at the beginning"));
}

#[test]
fn phi_arity_mismatch() {
    let mut func = new_func("arity", vec![int_ty(1)], int_ty(32));
    let cond = func.input_arg(0);
    let mut builder = FunctionBuilder::new(&mut func);
    let entry = builder.named_block("entry");
    let bb1 = builder.named_block("a");
    let bb2 = builder.named_block("b");
    let join = builder.named_block("join");
    builder.append_to(entry);
    let x = builder.ins().const_int((32, 1));
    builder.ins().br_cond(cond, bb1, bb2);
    builder.append_to(bb1);
    builder.ins().br(join);
    builder.append_to(bb2);
    builder.ins().br(join);
    builder.append_to(join);
    // One incoming value for two predecessor edges.
    let p = builder.ins().phi(vec![x], vec![bb1]);
    builder.ins().ret_value(p);
    assert!(errors_of(&func).contains("incoming values for 2 predecessors"));
}

#[test]
fn phi_names_non_predecessor() {
    let mut func = new_func("stray", vec![], int_ty(32));
    let mut builder = FunctionBuilder::new(&mut func);
    let entry = builder.named_block("entry");
    let next = builder.named_block("next");
    builder.append_to(entry);
    let x = builder.ins().const_int((32, 1));
    builder.ins().br(next);
    builder.append_to(next);
    let p = builder.ins().phi(vec![x], vec![next]);
    builder.ins().ret_value(p);
    assert!(errors_of(&func).contains("not a predecessor"));
}

#[test]
fn return_type_checked() {
    let mut func = new_func("badret", vec![], int_ty(32));
    let mut builder = FunctionBuilder::new(&mut func);
    let bb = builder.named_block("entry");
    builder.append_to(bb);
    builder.ins().ret();
    assert!(errors_of(&func).contains("must return a value of type i32"));
}

#[test]
fn branch_condition_checked() {
    let mut func = new_func("badbr", vec![int_ty(32)], int_ty(32));
    let wide = func.input_arg(0);
    let mut builder = FunctionBuilder::new(&mut func);
    let entry = builder.named_block("entry");
    let bb1 = builder.named_block("a");
    let bb2 = builder.named_block("b");
    builder.append_to(entry);
    builder.ins().br_cond(wide, bb1, bb2);
    builder.append_to(bb1);
    let c0 = builder.ins().const_int((32, 0));
    builder.ins().ret_value(c0);
    builder.append_to(bb2);
    let c1 = builder.ins().const_int((32, 1));
    builder.ins().ret_value(c1);
    assert!(errors_of(&func).contains("branch condition must be of type i1"));
}

#[test]
fn call_arity_checked() {
    let mut func = new_func("badcall", vec![], sift::void_ty());
    let mut builder = FunctionBuilder::new(&mut func);
    let bb = builder.named_block("entry");
    builder.append_to(bb);
    let mut ext_sig = Signature::new();
    ext_sig.add_input(int_ty(32));
    let ext = builder.add_extern("callee", ext_sig);
    builder.ins().call(ext, vec![]);
    builder.ins().ret();
    assert!(errors_of(&func).contains("expects 1 arguments"));
}

#[test]
fn leftover_placeholder_rejected() {
    let mut func = new_func("dangling", vec![], int_ty(32));
    let mut builder = FunctionBuilder::new(&mut func);
    let entry = builder.named_block("entry");
    let body = builder.named_block("body");
    builder.append_to(entry);
    let c0 = builder.ins().const_int((32, 0));
    builder.ins().br(body);
    builder.append_to(body);
    let ph = builder.add_placeholder(int_ty(32));
    let p = builder.ins().phi(vec![c0, ph], vec![entry, body]);
    let next = builder.ins().add(p, p);
    let cont = builder.ins().ult(next, c0);
    builder.ins().br_cond(cont, body, entry);
    // The placeholder is never replaced by the real value.
    assert!(errors_of(&func).contains("uses placeholder value"));
}

#[test]
fn module_verification_collects_errors() {
    let mut module = Module::new();
    module.add_function(new_func("empty", vec![], int_ty(32)));
    assert!(module.verify().is_err());
}

//! Tests for expression evaluation through the interpreter: member storage,
//! calls, conversions, arrays, strings and generic contexts.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use std::cell::Cell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use umbra_ir::{
    BinaryOp, ConversionKind, GenericParam, MemberUse, OpId, Operation, PrimitiveType, Span,
    TreeBuilder, TypeRef,
};
use umbra_runtime::{
    CancellationToken, EvalErrorKind, EvalResult, ObjectRef, RuntimeType, TypeKind, TypeOrigin,
    Value,
};

use crate::test_helpers::{closed, TestHost};
use crate::Session;

/// Build a tree with `build` and run it as a static entry point.
fn run(host: &TestHost, session: &Session, build: impl FnOnce(&mut TreeBuilder) -> OpId) -> EvalResult {
    let mut b = host.builder();
    let root = build(&mut b);
    host.run(session, b.finish(root))
}

/// Interpret an instance method on `obj`.
fn call_on(session: &Session, obj: &ObjectRef, method: umbra_ir::SymbolId) -> EvalResult {
    let frame = session.instance_frame(obj).unwrap();
    session.interpret(method, &frame, Vec::new(), &CancellationToken::new())
}

fn tuple(values: &[Value]) -> Value {
    Value::tuple(values.to_vec())
}

#[test]
fn test_field_store_and_load() {
    let host = TestHost::new();
    let counter = host.class("Counter");
    let value = host.field(counter, "value", TypeRef::I32);
    let method = host.method(counter, "Run", &[], TypeRef::I32);

    let mut b = host.builder();
    let field = MemberUse::new(value, TypeRef::named(counter));
    let this = b.this();
    let target = b.field(field.clone(), Some(this));
    let answer = b.int(42);
    let assign = b.assign(target, answer);
    let store = b.expr_stmt(assign);
    let this = b.this();
    let read = b.field(field, Some(this));
    let ret = b.ret(Some(read));
    let body = b.block(&[store, ret]);
    host.body(method, b.finish(body));

    let session = host.session();
    let obj = session
        .create_instance(&closed(counter), Vec::new(), &CancellationToken::new())
        .unwrap();
    assert_eq!(call_on(&session, &obj, method).unwrap(), Value::I32(42));
    assert_eq!(obj.load_slot(value), Some(Value::I32(42)));
}

#[test]
fn test_unassigned_field_reads_default() {
    let host = TestHost::new();
    let holder = host.class("Holder");
    let number = host.field(holder, "number", TypeRef::I64);
    let label = host.field(holder, "label", TypeRef::TEXT);
    let method = host.method(holder, "Read", &[], TypeRef::OBJECT);

    let mut b = host.builder();
    let n = b.field(MemberUse::new(number, TypeRef::named(holder)), None);
    let l = b.field(MemberUse::new(label, TypeRef::named(holder)), None);
    let list = b.list([n, l]);
    let pair = b.push(Operation::Tuple(list));
    let ret = b.ret(Some(pair));
    host.body(method, b.finish(ret));

    let session = host.session();
    let obj = session
        .create_instance(&closed(holder), Vec::new(), &CancellationToken::new())
        .unwrap();
    assert_eq!(
        call_on(&session, &obj, method).unwrap(),
        tuple(&[Value::I64(0), Value::Null])
    );
}

#[test]
fn test_static_call_with_parameters() {
    let host = TestHost::new();
    let math = host.class("Math");
    let mul_add = host.static_method(math, "MulAdd", &[("a", TypeRef::I32), ("b", TypeRef::I32)], TypeRef::I32);

    let mut b = host.builder();
    let a = b.param("a");
    let bp = b.param("b");
    let product = b.binary(BinaryOp::Mul, a, bp);
    let one = b.int(1);
    let sum = b.binary(BinaryOp::Add, product, one);
    let ret = b.ret(Some(sum));
    host.body(mul_add, b.finish(ret));

    let session = host.session();
    let result = run(&host, &session, |b| {
        let six = b.int(6);
        let seven = b.int(7);
        let call = b.call(MemberUse::new(mul_add, TypeRef::named(math)), None, &[six, seven]);
        b.ret(Some(call))
    });
    assert_eq!(result.unwrap(), Value::I32(43));
}

#[test]
fn test_arity_mismatch() {
    let host = TestHost::new();
    let math = host.class("Math");
    let square = host.static_method(math, "Square", &[("x", TypeRef::I32)], TypeRef::I32);
    let mut b = host.builder();
    let x = b.param("x");
    let ret = b.ret(Some(x));
    host.body(square, b.finish(ret));

    let session = host.session();
    let err = run(&host, &session, |b| {
        let call = b.call(MemberUse::new(square, TypeRef::named(math)), None, &[]);
        b.ret(Some(call))
    })
    .unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::ArityMismatch {
            member: "Square".to_string(),
            expected: 1,
            got: 0,
        }
    );
}

#[test]
fn test_compound_assignment_and_postfix_increment() {
    let host = TestHost::new();
    let session = host.session();
    let result = run(&host, &session, |b| {
        let init = b.int(800);
        let decl_x = b.declare("x", Some(init));
        let x = b.local("x");
        let eight = b.int(8);
        let add = b.compound(BinaryOp::Add, x, eight);
        let add = b.expr_stmt(add);
        let x = b.local("x");
        let inc = b.increment(x, true);
        let decl_y = b.declare("y", Some(inc));
        let x = b.local("x");
        let y = b.local("y");
        let list = b.list([x, y]);
        let pair = b.push(Operation::Tuple(list));
        let ret = b.ret(Some(pair));
        b.block(&[decl_x, add, decl_y, ret])
    });
    assert_eq!(result.unwrap(), tuple(&[Value::I32(809), Value::I32(808)]));
}

#[test]
fn test_prefix_decrement() {
    let host = TestHost::new();
    let session = host.session();
    let result = run(&host, &session, |b| {
        let init = b.int(5);
        let decl = b.declare("n", Some(init));
        let n = b.local("n");
        let dec = b.push(Operation::Increment {
            target: n,
            decrement: true,
            postfix: false,
            operator: None,
        });
        let ret = b.ret(Some(dec));
        b.block(&[decl, ret])
    });
    assert_eq!(result.unwrap(), Value::I32(4));
}

#[test]
fn test_interpolated_string() {
    let host = TestHost::new();
    let session = host.session();
    let result = run(&host, &session, |b| {
        let seven = b.int(7);
        let width = b.int(5);
        let spec = b.name("D3");
        let first = b.push(Operation::Interpolation {
            value: seven,
            alignment: Some(width),
            format: Some(spec),
        });
        let bar = b.name("|");
        let text = b.push(Operation::InterpolatedText(bar));
        let hi = b.text("hi");
        let second = b.push(Operation::Interpolation {
            value: hi,
            alignment: None,
            format: None,
        });
        let parts = b.list([first, text, second]);
        let s = b.push(Operation::InterpolatedString(parts));
        b.ret(Some(s))
    });
    assert_eq!(result.unwrap(), Value::text("  007|hi"));
}

#[test]
fn test_text_concatenation_renders_other_operand() {
    let host = TestHost::new();
    let session = host.session();
    let result = run(&host, &session, |b| {
        let label = b.text("n=");
        let n = b.int(3);
        let joined = b.binary(BinaryOp::Add, label, n);
        b.ret(Some(joined))
    });
    assert_eq!(result.unwrap(), Value::text("n=3"));
}

#[test]
fn test_conversions() {
    let host = TestHost::new();
    let session = host.session();
    let result = run(&host, &session, |b| {
        let big = b.int(300);
        let narrowed = b.convert(big, TypeRef::Primitive(PrimitiveType::U8), ConversionKind::Cast);
        let text = b.text("x");
        let failed = b.convert(text, TypeRef::I32, ConversionKind::TryCast);
        let list = b.list([narrowed, failed]);
        let pair = b.push(Operation::Tuple(list));
        b.ret(Some(pair))
    });
    assert_eq!(result.unwrap(), tuple(&[Value::U8(44), Value::Null]));
}

#[test]
fn test_invalid_cast() {
    let host = TestHost::new();
    let session = host.session();
    let err = run(&host, &session, |b| {
        let text = b.text("x");
        let cast = b.convert(text, TypeRef::I32, ConversionKind::Cast);
        b.ret(Some(cast))
    })
    .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidCast { .. }));
}

#[test]
fn test_coalesce_and_conditional_access() {
    let host = TestHost::new();
    let point = host.class("Point");
    let x = host.field(point, "x", TypeRef::I32);
    let session = host.session();
    let result = run(&host, &session, |b| {
        let null = b.null();
        let decl = b.declare("p", Some(null));
        let p = b.local("p");
        let root = b.push(Operation::ConditionalAccessInstance);
        let read = b.field(MemberUse::new(x, TypeRef::named(point)), Some(root));
        let access = b.push(Operation::ConditionalAccess {
            receiver: p,
            when_not_null: read,
        });
        let fallback = b.int(7);
        let coalesce = b.push(Operation::Coalesce {
            value: access,
            when_null: fallback,
        });
        let ret = b.ret(Some(coalesce));
        b.block(&[decl, ret])
    });
    assert_eq!(result.unwrap(), Value::I32(7));
}

#[test]
fn test_reference_equality() {
    let host = TestHost::new();
    let node = host.class("Node");
    let ctor = host.implicit_constructor(node);
    let session = host.session();
    let result = run(&host, &session, |b| {
        let first = b.new_object(MemberUse::new(ctor, TypeRef::named(node)), &[], None);
        let decl_a = b.declare("a", Some(first));
        let second = b.new_object(MemberUse::new(ctor, TypeRef::named(node)), &[], None);
        let decl_b = b.declare("b", Some(second));
        let a1 = b.local("a");
        let a2 = b.local("a");
        let same = b.binary(BinaryOp::Eq, a1, a2);
        let a = b.local("a");
        let other = b.local("b");
        let different = b.binary(BinaryOp::Eq, a, other);
        let a = b.local("a");
        let null = b.null();
        let not_null = b.binary(BinaryOp::NotEq, a, null);
        let list = b.list([same, different, not_null]);
        let triple = b.push(Operation::Tuple(list));
        let ret = b.ret(Some(triple));
        b.block(&[decl_a, decl_b, ret])
    });
    assert_eq!(
        result.unwrap(),
        tuple(&[Value::Bool(true), Value::Bool(false), Value::Bool(true)])
    );
}

#[test]
fn test_logical_operators_short_circuit() {
    let host = TestHost::new();
    let env = host.loaded_class("Env");
    let probe = host.loaded_method(env, "Probe", &[], TypeRef::BOOL, true);
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    host.native(probe, move |_| {
        counter.set(counter.get() + 1);
        Ok(Value::Bool(true))
    });

    let session = host.session();
    let result = run(&host, &session, |b| {
        let probe_use = MemberUse::new(probe, TypeRef::named(env));
        let f = b.bool(false);
        let call = b.call(probe_use.clone(), None, &[]);
        let and = b.binary(BinaryOp::And, f, call);
        let t = b.bool(true);
        let call = b.call(probe_use.clone(), None, &[]);
        let or = b.binary(BinaryOp::Or, t, call);
        let t = b.bool(true);
        let call = b.call(probe_use, None, &[]);
        let evaluated = b.binary(BinaryOp::And, t, call);
        let list = b.list([and, or, evaluated]);
        let triple = b.push(Operation::Tuple(list));
        b.ret(Some(triple))
    });
    assert_eq!(
        result.unwrap(),
        tuple(&[Value::Bool(false), Value::Bool(true), Value::Bool(true)])
    );
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_multidimensional_array() {
    let host = TestHost::new();
    let session = host.session();
    let result = run(&host, &session, |b| {
        let int = b.ty(TypeRef::I32);
        let two = b.int(2);
        let three = b.int(3);
        let dims = b.list([two, three]);
        let create = b.push(Operation::ArrayCreation {
            element: int,
            rank: 2,
            dimensions: dims,
            initializer: None,
        });
        let decl = b.declare("grid", Some(create));

        let grid = b.local("grid");
        let i = b.int(1);
        let j = b.int(2);
        let indices = b.list([i, j]);
        let element = b.push(Operation::ArrayElement { array: grid, indices });
        let five = b.int(5);
        let assign = b.assign(element, five);
        let store = b.expr_stmt(assign);

        let grid = b.local("grid");
        let i = b.int(1);
        let j = b.int(2);
        let indices = b.list([i, j]);
        let set = b.push(Operation::ArrayElement { array: grid, indices });
        let grid = b.local("grid");
        let i = b.int(0);
        let j = b.int(0);
        let indices = b.list([i, j]);
        let unset = b.push(Operation::ArrayElement { array: grid, indices });
        let sum = b.binary(BinaryOp::Add, set, unset);
        let ret = b.ret(Some(sum));
        b.block(&[decl, store, ret])
    });
    assert_eq!(result.unwrap(), Value::I32(5));
}

#[test]
fn test_nested_array_initializer() {
    let host = TestHost::new();
    let session = host.session();
    let result = run(&host, &session, |b| {
        let int = b.ty(TypeRef::I32);
        let rows = [[1, 2], [3, 4]].map(|row| {
            let items = row.map(|n| b.int(n));
            let items = b.list(items);
            b.push(Operation::ArrayInitializer(items))
        });
        let rows = b.list(rows);
        let init = b.push(Operation::ArrayInitializer(rows));
        let create = b.push(Operation::ArrayCreation {
            element: int,
            rank: 2,
            dimensions: umbra_ir::OpRange::EMPTY,
            initializer: Some(init),
        });
        let decl = b.declare("m", Some(create));
        let m = b.local("m");
        let i = b.int(1);
        let j = b.int(0);
        let indices = b.list([i, j]);
        let element = b.push(Operation::ArrayElement { array: m, indices });
        let ret = b.ret(Some(element));
        b.block(&[decl, ret])
    });
    assert_eq!(result.unwrap(), Value::I32(3));
}

#[test]
fn test_array_index_out_of_range() {
    let host = TestHost::new();
    let session = host.session();
    let err = run(&host, &session, |b| {
        let int = b.ty(TypeRef::I32);
        let two = b.int(2);
        let dims = b.list([two]);
        let create = b.push(Operation::ArrayCreation {
            element: int,
            rank: 1,
            dimensions: dims,
            initializer: None,
        });
        let index = b.int(2);
        let indices = b.list([index]);
        let element = b.push(Operation::ArrayElement {
            array: create,
            indices,
        });
        b.ret(Some(element))
    })
    .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::IndexOutOfRange { index: 2, length: 2 });
}

#[test]
fn test_foreach_over_array() {
    let host = TestHost::new();
    let session = host.session();
    let result = run(&host, &session, |b| {
        let zero = b.int(0);
        let decl = b.declare("sum", Some(zero));
        let int = b.ty(TypeRef::I32);
        let items = [1, 2, 3, 4].map(|n| b.int(n));
        let items = b.list(items);
        let init = b.push(Operation::ArrayInitializer(items));
        let create = b.push(Operation::ArrayCreation {
            element: int,
            rank: 1,
            dimensions: umbra_ir::OpRange::EMPTY,
            initializer: Some(init),
        });
        let sum = b.local("sum");
        let item = b.local("item");
        let add = b.compound(BinaryOp::Add, sum, item);
        let body = b.expr_stmt(add);
        let local = b.name("item");
        let each = b.push(Operation::ForEachLoop {
            local,
            collection: create,
            body,
        });
        let sum = b.local("sum");
        let ret = b.ret(Some(sum));
        b.block(&[decl, each, ret])
    });
    assert_eq!(result.unwrap(), Value::I32(10));
}

#[test]
fn test_deconstruction() {
    let host = TestHost::new();
    let session = host.session();
    let result = run(&host, &session, |b| {
        let a = b.name("a");
        let target_a = b.push(Operation::DeclarationTarget(a));
        let discard = b.push(Operation::Discard);
        let targets = b.list([target_a, discard]);
        let target = b.push(Operation::Tuple(targets));
        let one = b.int(1);
        let two = b.int(2);
        let values = b.list([one, two]);
        let value = b.push(Operation::Tuple(values));
        let deconstruct = b.push(Operation::Deconstruct { target, value });
        let stmt = b.expr_stmt(deconstruct);
        let a = b.local("a");
        let ret = b.ret(Some(a));
        b.block(&[stmt, ret])
    });
    assert_eq!(result.unwrap(), Value::I32(1));
}

#[test]
fn test_unsupported_operation_kind() {
    let host = TestHost::new();
    let session = host.session();
    let err = run(&host, &session, |b| {
        let throw = b.push(Operation::Throw(None));
        b.block(&[throw])
    })
    .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::UnsupportedOperation { kind: "Throw" });
}

#[test]
fn test_undefined_local_carries_span() {
    let host = TestHost::new();
    let session = host.session();
    let err = run(&host, &session, |b| {
        b.at(Span::new(3, 9));
        let missing = b.local("missing");
        b.at(Span::DUMMY);
        b.ret(Some(missing))
    })
    .unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UndefinedName {
            name: "missing".to_string()
        }
    );
    assert_eq!(err.span, Some(Span::new(3, 9)));
}

#[test]
fn test_this_in_static_context() {
    let host = TestHost::new();
    let session = host.session();
    let err = run(&host, &session, |b| {
        let this = b.this();
        b.ret(Some(this))
    })
    .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::NoCurrentInstance);
}

#[test]
fn test_type_parameters_resolve_through_class_frame() {
    let host = TestHost::new();
    let boxed = host.generic_class("Box", 1);
    let t = TypeRef::Param(GenericParam::type_level(0));
    let empty = host.static_method(boxed, "Empty", &[], t.clone());
    let kind = host.static_method(boxed, "Kind", &[], TypeRef::OBJECT);

    let mut b = host.builder();
    let t_id = b.ty(t.clone());
    let default = b.push(Operation::DefaultValue(t_id));
    let ret = b.ret(Some(default));
    host.body(empty, b.finish(ret));

    let mut b = host.builder();
    let t_id = b.ty(t);
    let type_of = b.push(Operation::TypeOf(t_id));
    let ret = b.ret(Some(type_of));
    host.body(kind, b.finish(ret));

    let box_of = |arg: TypeRef| TypeRef::Named {
        def: boxed,
        args: vec![arg],
    };
    let session = host.session();
    let result = run(&host, &session, |b| {
        let default_int = b.call(MemberUse::new(empty, box_of(TypeRef::I32)), None, &[]);
        let kind_text = b.call(MemberUse::new(kind, box_of(TypeRef::TEXT)), None, &[]);
        let list = b.list([default_int, kind_text]);
        let pair = b.push(Operation::Tuple(list));
        b.ret(Some(pair))
    });
    assert_eq!(
        result.unwrap(),
        tuple(&[Value::I32(0), Value::Type(RuntimeType::TEXT)])
    );
}

#[test]
fn test_method_type_arguments() {
    let host = TestHost::new();
    let util = host.class("Util");
    let describe = host.static_method(util, "Describe", &[], TypeRef::OBJECT);
    let mut b = host.builder();
    let t_id = b.ty(TypeRef::Param(GenericParam::method_level(0)));
    let type_of = b.push(Operation::TypeOf(t_id));
    let ret = b.ret(Some(type_of));
    host.body(describe, b.finish(ret));

    let session = host.session();
    let result = run(&host, &session, |b| {
        let call_use = MemberUse::new(describe, TypeRef::named(util)).with_type_args(vec![TypeRef::I64]);
        let call = b.call(call_use, None, &[]);
        b.ret(Some(call))
    });
    assert_eq!(
        result.unwrap(),
        Value::Type(RuntimeType::Primitive(PrimitiveType::I64))
    );
}

#[test]
fn test_entry_points_carry_method_type_arguments() {
    let host = TestHost::new();
    let util = host.class("Util");
    let describe = host.method(util, "Describe", &[], TypeRef::OBJECT);
    let mut b = host.builder();
    let t_id = b.ty(TypeRef::Param(GenericParam::method_level(0)));
    let type_of = b.push(Operation::TypeOf(t_id));
    let ret = b.ret(Some(type_of));
    host.body(describe, b.finish(ret));

    let session = host.session();
    let token = CancellationToken::new();
    let obj = session
        .create_instance(&closed(util), Vec::new(), &token)
        .unwrap();
    let frame = session.instance_frame(&obj).unwrap();
    assert_eq!(
        session
            .interpret_generic(describe, &frame, vec![RuntimeType::TEXT], Vec::new(), &token)
            .unwrap(),
        Value::Type(RuntimeType::TEXT)
    );

    let long = RuntimeType::Primitive(PrimitiveType::I64);
    assert_eq!(
        obj.dispatch_generic(describe, &[long.clone()], Vec::new())
            .unwrap(),
        Value::Type(long)
    );
}

#[test]
fn test_unbound_generic_parameter() {
    let host = TestHost::new();
    let session = host.session();
    let err = run(&host, &session, |b| {
        let t_id = b.ty(TypeRef::Param(GenericParam::type_level(0)));
        let default = b.push(Operation::DefaultValue(t_id));
        b.ret(Some(default))
    })
    .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UnboundGenericParameter { .. }));
}

#[test]
fn test_static_storage_per_closed_type() {
    let host = TestHost::new();
    let boxed = host.generic_class("Box", 1);
    let count = host.static_field(boxed, "count", TypeRef::I32);
    let session = host.session();

    let bump = |arg: TypeRef| {
        let field = MemberUse::new(
            count,
            TypeRef::Named {
                def: boxed,
                args: vec![arg],
            },
        );
        run(&host, &session, move |b| {
            let target = b.field(field.clone(), None);
            let one = b.int(1);
            let add = b.compound(BinaryOp::Add, target, one);
            let stmt = b.expr_stmt(add);
            let read = b.field(field, None);
            let ret = b.ret(Some(read));
            b.block(&[stmt, ret])
        })
        .unwrap()
    };

    assert_eq!(bump(TypeRef::I32), Value::I32(1));
    assert_eq!(bump(TypeRef::I32), Value::I32(2));
    assert_eq!(bump(TypeRef::TEXT), Value::I32(1));
}

#[test]
fn test_computed_property_runs_getter() {
    let host = TestHost::new();
    let circle = host.class("Circle");
    let ctor = host.implicit_constructor(circle);
    let radius = host.field(circle, "radius", TypeRef::I32);
    let (diameter, getter) = host.computed_property(circle, "Diameter", TypeRef::I32);

    let mut b = host.builder();
    let r = b.field(MemberUse::new(radius, TypeRef::named(circle)), None);
    let two = b.int(2);
    let product = b.binary(BinaryOp::Mul, r, two);
    let ret = b.ret(Some(product));
    host.body(getter, b.finish(ret));

    let session = host.session();
    let result = run(&host, &session, |b| {
        let create = b.new_object(MemberUse::new(ctor, TypeRef::named(circle)), &[], None);
        let decl = b.declare("c", Some(create));
        let c = b.local("c");
        let target = b.field(MemberUse::new(radius, TypeRef::named(circle)), Some(c));
        let four = b.int(4);
        let assign = b.assign(target, four);
        let store = b.expr_stmt(assign);
        let c = b.local("c");
        let read = b.property(MemberUse::new(diameter, TypeRef::named(circle)), Some(c));
        let ret = b.ret(Some(read));
        b.block(&[decl, store, ret])
    });
    assert_eq!(result.unwrap(), Value::I32(8));
}

#[test]
fn test_object_initializer_assigns_through_implicit_receiver() {
    let host = TestHost::new();
    let point = host.class("Point");
    let ctor = host.implicit_constructor(point);
    let x = host.auto_property(point, "X", TypeRef::I32);
    let session = host.session();
    let result = run(&host, &session, |b| {
        let receiver = b.implicit_receiver();
        let target = b.property(MemberUse::new(x, TypeRef::named(point)), Some(receiver));
        let nine = b.int(9);
        let assign = b.assign(target, nine);
        let items = b.list([assign]);
        let init = b.push(Operation::ObjectInitializer(items));
        let create = b.new_object(MemberUse::new(ctor, TypeRef::named(point)), &[], Some(init));
        let read = b.property(MemberUse::new(x, TypeRef::named(point)), Some(create));
        b.ret(Some(read))
    });
    assert_eq!(result.unwrap(), Value::I32(9));
}

#[test]
fn test_type_test_against_interface() {
    let host = TestHost::new();
    let shape = host.declare_type("IShape", TypeKind::Interface, TypeOrigin::Symbolic, 0, None);
    let square = host.class("Square");
    let ctor = host.implicit_constructor(square);
    host.implement(square, TypeRef::named(shape));
    let unrelated = host.class("Unrelated");

    let session = host.session();
    let result = run(&host, &session, |b| {
        let create = b.new_object(MemberUse::new(ctor, TypeRef::named(square)), &[], None);
        let decl = b.declare("s", Some(create));
        let is = |b: &mut TreeBuilder, operand: OpId, target: TypeRef| {
            let target = b.ty(target);
            b.push(Operation::IsType {
                operand,
                target,
                negated: false,
            })
        };
        let s = b.local("s");
        let is_shape = is(b, s, TypeRef::named(shape));
        let s = b.local("s");
        let is_unrelated = is(b, s, TypeRef::named(unrelated));
        let null = b.null();
        let null_is_shape = is(b, null, TypeRef::named(shape));
        let list = b.list([is_shape, is_unrelated, null_is_shape]);
        let triple = b.push(Operation::Tuple(list));
        let ret = b.ret(Some(triple));
        b.block(&[decl, ret])
    });
    assert_eq!(
        result.unwrap(),
        tuple(&[Value::Bool(true), Value::Bool(false), Value::Bool(false)])
    );
}

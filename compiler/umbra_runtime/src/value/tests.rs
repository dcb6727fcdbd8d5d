#![allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::errors::EvalErrorKind;
use pretty_assertions::assert_eq;
use umbra_ir::{SymbolId, TypeDefId};

#[test]
fn test_categories_are_closed_over_primitives() {
    assert_eq!(Value::I32(1).category(), Some(NumericCategory::I32));
    assert_eq!(Value::text("a").category(), Some(NumericCategory::Text));
    assert_eq!(Value::Null.category(), None);
    assert_eq!(Value::tuple(vec![]).category(), None);
    assert!(NumericCategory::U16.is_integer());
    assert!(NumericCategory::F32.is_real());
    assert!(!NumericCategory::Char.is_integer());
}

#[test]
fn test_from_constant_looks_up_text() {
    let interner = StringInterner::new();
    let name = interner.intern("hello");
    assert_eq!(
        Value::from_constant(Constant::Text(name), &interner),
        Value::text("hello")
    );
    assert_eq!(
        Value::from_constant(Constant::f64(1.5), &interner),
        Value::F64(1.5)
    );
}

#[test]
fn test_objects_compare_by_identity() {
    let ty = RuntimeType::named(TypeDefId::new(1), vec![]);
    let a = ObjectRef::new(ty.clone());
    let b = ObjectRef::new(ty);
    assert_eq!(Value::Object(a.clone()), Value::Object(a.clone()));
    assert!(Value::Object(a.clone()) != Value::Object(b.clone()));
    assert!(Value::Object(a.clone()).reference_eq(&Value::Object(a)));
    assert!(!Value::Object(b).reference_eq(&Value::Null));
    assert!(Value::Null.reference_eq(&Value::Null));
}

#[test]
fn test_slots_start_empty() {
    let obj = ObjectRef::new(RuntimeType::named(TypeDefId::new(1), vec![]));
    let field = SymbolId::new(9);
    assert_eq!(obj.load_slot(field), None);
    obj.store_slot(field, Value::I32(42));
    assert_eq!(obj.load_slot(field), Some(Value::I32(42)));
}

#[test]
fn test_dispatch_without_link_fails() {
    let obj = ObjectRef::new(RuntimeType::named(TypeDefId::new(1), vec![]));
    let err = obj.dispatch(SymbolId::new(1), vec![]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::ProxyNotBound { .. }));
}

#[test]
fn test_weak_object_does_not_keep_instance_alive() {
    let obj = ObjectRef::new(RuntimeType::named(TypeDefId::new(1), vec![]));
    let weak = obj.downgrade();
    assert!(weak.upgrade().is_some());
    drop(obj);
    assert!(weak.upgrade().is_none());
}

#[test]
fn test_rectangular_array_indexing() {
    let arr = ArrayRef::new(RuntimeType::I32, vec![2, 3]);
    assert_eq!(arr.len(), 6);
    assert_eq!(arr.get(&[1, 2]).unwrap(), Value::I32(0));
    arr.set(&[1, 2], Value::I32(7)).unwrap();
    assert_eq!(arr.get(&[1, 2]).unwrap(), Value::I32(7));
    assert_eq!(arr.values()[5], Value::I32(7));

    let err = arr.get(&[2, 0]).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::IndexOutOfRange {
            index: 2,
            length: 2
        }
    );
    assert!(arr.get(&[-1, 0]).is_err());
}

#[test]
fn test_display() {
    assert_eq!(Value::Bool(true).to_string(), "True");
    assert_eq!(Value::F64(3.0).to_string(), "3");
    assert_eq!(Value::Null.to_string(), "");
    assert_eq!(
        Value::tuple(vec![Value::I32(1), Value::text("a")]).to_string(),
        "(1, a)"
    );
}

#[test]
fn test_format_specifiers() {
    assert_eq!(format_with(&Value::I32(42), Some("D5"), None).unwrap(), "00042");
    assert_eq!(format_with(&Value::I32(-7), Some("D3"), None).unwrap(), "-007");
    assert_eq!(format_with(&Value::I32(255), Some("X4"), None).unwrap(), "00FF");
    assert_eq!(format_with(&Value::I8(-1), Some("x"), None).unwrap(), "ff");
    assert_eq!(format_with(&Value::F64(1.23456), Some("F2"), None).unwrap(), "1.23");
    assert_eq!(
        format_with(&Value::F64(1234567.891), Some("N1"), None).unwrap(),
        "1,234,567.9"
    );
    assert_eq!(format_with(&Value::I32(-1234), Some("N0"), None).unwrap(), "-1,234");
}

#[test]
fn test_alignment() {
    assert_eq!(format_with(&Value::I32(5), None, Some(3)).unwrap(), "  5");
    assert_eq!(format_with(&Value::text("ab"), None, Some(-4)).unwrap(), "ab  ");
}

#[test]
fn test_invalid_format_is_malformed_program() {
    let err = format_with(&Value::text("a"), Some("D2"), None).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::InvalidFormat {
            spec: "D2".to_string(),
            type_name: "string".to_string()
        }
    );
}

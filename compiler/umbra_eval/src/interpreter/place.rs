//! Assignment targets.
//!
//! A [`Place`] is a write target with its receiver and indices already
//! evaluated. Every write resolves its place first and evaluates the value
//! second, so `a[i()] = f()` calls `i` before `f`.

use smallvec::SmallVec;
use umbra_ir::{BinaryOp, MemberUseId, Name, OpId, Operation};
use umbra_runtime::{
    null_reference, type_mismatch, unsupported_operation, ArrayRef, EvalError, EvalResult, Value,
};

use super::{binary_values, Interpreter};
use crate::bridge::ResolvedMember;
use crate::unary_operators::step;

enum Place {
    Local(Name),
    Member {
        member: ResolvedMember,
        receiver: Option<Value>,
        index: Vec<Value>,
        is_virtual: bool,
    },
    Element {
        array: ArrayRef,
        indices: SmallVec<[i64; 2]>,
    },
    Discard,
    /// Deconstruction target.
    Tuple(Vec<Place>),
}

impl Interpreter<'_> {
    fn place(&mut self, id: OpId) -> Result<Place, EvalError> {
        let op = *self.tree.arena.get(id);
        let place = match op {
            Operation::Local(name) | Operation::Parameter(name) => Ok(Place::Local(name)),
            Operation::DeclarationTarget(name) => {
                self.frame()
                    .declare(name)
                    .map_err(|e| e.into_eval(self.session.name(name)))?;
                Ok(Place::Local(name))
            }
            Operation::Discard => Ok(Place::Discard),
            Operation::FieldRef { field, receiver } => {
                let (member, receiver) = self.member_target(field, receiver)?;
                Ok(Place::Member {
                    member,
                    receiver,
                    index: Vec::new(),
                    is_virtual: false,
                })
            }
            Operation::PropertyRef {
                property,
                receiver,
                index,
                is_virtual,
            } => {
                let (member, receiver) = self.member_target(property, receiver)?;
                let index = self.eval_list(index)?;
                Ok(Place::Member {
                    member,
                    receiver,
                    index,
                    is_virtual,
                })
            }
            Operation::ArrayElement { array, indices } => {
                let (array, indices) = self.element_target(array, indices)?;
                Ok(Place::Element { array, indices })
            }
            Operation::Tuple(targets) => {
                let tree = self.tree.clone();
                let places = tree
                    .arena
                    .list(targets)
                    .iter()
                    .map(|&target| self.place(target))
                    .collect::<Result<_, _>>()?;
                Ok(Place::Tuple(places))
            }
            other => Err(unsupported_operation(other.kind_name())),
        };
        place.map_err(|e| e.or_span(self.tree.arena.span(id)))
    }

    fn member_target(
        &mut self,
        member: MemberUseId,
        receiver: Option<OpId>,
    ) -> Result<(ResolvedMember, Option<Value>), EvalError> {
        let member = self.resolve_member(member)?;
        let receiver = self.receiver_for(&member, receiver)?;
        Ok((member, receiver))
    }

    fn load(&self, place: &Place) -> EvalResult {
        match place {
            Place::Local(name) => self.read_name(*name),
            Place::Member {
                member,
                receiver,
                index,
                is_virtual,
            } => self
                .session
                .get_member(member, receiver.clone(), index.clone(), *is_virtual),
            Place::Element { array, indices } => array.get(indices),
            Place::Discard | Place::Tuple(_) => {
                Err(unsupported_operation("read of a write-only target"))
            }
        }
    }

    fn store(&self, place: &Place, value: Value) -> Result<(), EvalError> {
        match place {
            Place::Local(name) => self
                .frame()
                .assign(*name, value)
                .map_err(|e| e.into_eval(self.session.name(*name))),
            Place::Member {
                member,
                receiver,
                index,
                is_virtual,
            } => self.session.set_member(
                member,
                receiver.clone(),
                index.clone(),
                value,
                *is_virtual,
            ),
            Place::Element { array, indices } => array.set(indices, value),
            Place::Discard => Ok(()),
            Place::Tuple(places) => match value {
                Value::Tuple(values) if values.len() == places.len() => {
                    for (place, value) in places.iter().zip(values.iter()) {
                        self.store(place, value.clone())?;
                    }
                    Ok(())
                }
                Value::Null => Err(null_reference("Deconstruct")),
                other => Err(type_mismatch(
                    &format!("tuple of {}", places.len()),
                    &other.type_name(),
                )),
            },
        }
    }

    pub(super) fn eval_assign(&mut self, target: OpId, value: OpId) -> EvalResult {
        let place = self.place(target)?;
        let value = self.eval(value)?;
        self.store(&place, value.clone())?;
        Ok(value)
    }

    /// `target op= value`: the place is read once and written once.
    pub(super) fn eval_compound_assign(
        &mut self,
        op: BinaryOp,
        target: OpId,
        value: OpId,
        operator: Option<MemberUseId>,
    ) -> EvalResult {
        let place = self.place(target)?;
        let current = self.load(&place)?;
        let rhs = self.eval(value)?;
        let result = match operator {
            Some(operator) => self.call_operator(operator, vec![current, rhs])?,
            None => binary_values(op, &current, &rhs)?,
        };
        self.store(&place, result.clone())?;
        Ok(result)
    }

    /// `++`/`--`; postfix yields the old value, prefix the new one.
    pub(super) fn eval_increment(
        &mut self,
        target: OpId,
        decrement: bool,
        postfix: bool,
        operator: Option<MemberUseId>,
    ) -> EvalResult {
        let place = self.place(target)?;
        let old = self.load(&place)?;
        let new = match operator {
            Some(operator) => self.call_operator(operator, vec![old.clone()])?,
            None => step(&old, decrement)?,
        };
        self.store(&place, new.clone())?;
        Ok(if postfix { old } else { new })
    }

    pub(super) fn eval_deconstruct(&mut self, target: OpId, value: OpId) -> EvalResult {
        let place = self.place(target)?;
        let value = self.eval(value)?;
        self.store(&place, value.clone())?;
        Ok(value)
    }
}

//! Assignability between closed runtime types.
//!
//! Used by constructor resolution, type tests and reference casts. Base
//! types and interfaces come from the descriptor layer and are closed
//! against the type arguments of the type being walked.

use umbra_ir::PrimitiveType;
use umbra_runtime::{DescriptorLayer, EvalError, RuntimeType, Substitution, Value};

pub struct TypeRelations<'a> {
    descriptors: &'a dyn DescriptorLayer,
}

impl<'a> TypeRelations<'a> {
    pub fn new(descriptors: &'a dyn DescriptorLayer) -> Self {
        TypeRelations { descriptors }
    }

    /// Whether a value of type `from` can be stored where `to` is expected
    /// without conversion.
    pub fn is_assignable(&self, from: &RuntimeType, to: &RuntimeType) -> Result<bool, EvalError> {
        if from == to || to.is_primitive(PrimitiveType::Object) {
            return Ok(true);
        }
        match (from, to) {
            (RuntimeType::Nullable(inner), _) => self.is_assignable(inner, to),
            (_, RuntimeType::Nullable(inner)) => self.is_assignable(from, inner),
            (
                RuntimeType::Array {
                    element: from_element,
                    rank: from_rank,
                },
                RuntimeType::Array {
                    element: to_element,
                    rank: to_rank,
                },
            ) => Ok(from_rank == to_rank
                && from_element.accepts_null()
                && self.is_assignable(from_element, to_element)?),
            (RuntimeType::Tuple(from_elements), RuntimeType::Tuple(to_elements)) => {
                if from_elements.len() != to_elements.len() {
                    return Ok(false);
                }
                for (f, t) in from_elements.iter().zip(to_elements.iter()) {
                    if !self.is_assignable(f, t)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (RuntimeType::Named { def, args }, _) => {
                let descriptor = self.descriptors.type_descriptor(*def)?;
                let subst = Substitution::of_type(args);
                let supertypes = descriptor.base.iter().chain(&descriptor.interfaces);
                for supertype in supertypes {
                    let closed = RuntimeType::resolve(supertype, &subst)?;
                    if self.is_assignable(&closed, to)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    /// Whether `value` can be passed where `to` is expected. Null matches
    /// only reference-capable types.
    pub fn accepts_value(&self, value: &Value, to: &RuntimeType) -> Result<bool, EvalError> {
        match value.runtime_type() {
            None => Ok(value.is_null() && to.accepts_null()),
            Some(from) => self.is_assignable(&from, to),
        }
    }
}

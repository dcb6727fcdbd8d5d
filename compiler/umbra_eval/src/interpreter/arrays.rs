//! Array creation, nested initializers and element access.

use smallvec::SmallVec;
use umbra_ir::{OpId, OpRange, Operation, TypeRefId};
use umbra_runtime::{
    index_out_of_range, missing_context, null_reference, type_mismatch, ArrayRef, EvalError,
    EvalResult, Value,
};

use super::{ArrayInitContext, Interpreter};

impl Interpreter<'_> {
    pub(super) fn element_target(
        &mut self,
        array: OpId,
        indices: OpRange,
    ) -> Result<(ArrayRef, SmallVec<[i64; 2]>), EvalError> {
        let array = match self.eval(array)? {
            Value::Array(array) => array,
            Value::Null => return Err(null_reference("[]")),
            other => return Err(type_mismatch("array", &other.type_name())),
        };
        let indices = self
            .eval_list(indices)?
            .iter()
            .map(Value::as_index)
            .collect::<Result<_, _>>()?;
        Ok((array, indices))
    }

    pub(super) fn eval_element_read(&mut self, array: OpId, indices: OpRange) -> EvalResult {
        let (array, indices) = self.element_target(array, indices)?;
        array.get(&indices)
    }

    /// `new T[d0, d1] { ... }`. Missing dimensions are taken from the shape
    /// of the initializer.
    pub(super) fn eval_array_creation(
        &mut self,
        element: TypeRefId,
        rank: u8,
        dimensions: OpRange,
        initializer: Option<OpId>,
    ) -> EvalResult {
        let element = self.resolve_type(element)?;
        let lengths = if dimensions.is_empty() {
            match initializer {
                Some(initializer) => self.initializer_shape(initializer, rank),
                None => vec![0; usize::from(rank)],
            }
        } else {
            self.eval_list(dimensions)?
                .iter()
                .map(|dimension| {
                    let n = dimension.as_index()?;
                    usize::try_from(n).map_err(|_| index_out_of_range(n, 0))
                })
                .collect::<Result<Vec<_>, _>>()?
        };
        if lengths.len() != usize::from(rank) {
            return Err(type_mismatch(
                &format!("{rank} dimensions"),
                &format!("{} dimensions", lengths.len()),
            ));
        }

        let array = ArrayRef::new(element, lengths);
        if let Some(initializer) = initializer {
            self.array_inits.push(ArrayInitContext {
                array: array.clone(),
                path: SmallVec::new(),
            });
            let result = self.eval(initializer);
            self.array_inits.pop();
            result?;
        }
        Ok(Value::Array(array))
    }

    /// Lengths of each dimension, read from the first initializer at every
    /// nesting level.
    fn initializer_shape(&self, initializer: OpId, rank: u8) -> Vec<usize> {
        let mut lengths = Vec::with_capacity(usize::from(rank));
        let mut current = Some(initializer);
        while let Some(id) = current {
            if lengths.len() == usize::from(rank) {
                break;
            }
            let Operation::ArrayInitializer(items) = *self.tree.arena.get(id) else {
                break;
            };
            lengths.push(items.len());
            current = self.tree.arena.list(items).first().copied();
        }
        lengths
    }

    /// One level of `{ ... }`. Nested initializers extend the index path;
    /// anything else is an element stored at the path plus its position.
    pub(super) fn eval_array_initializer(&mut self, items: OpRange) -> EvalResult {
        if self.array_inits.is_empty() {
            return Err(missing_context("array creation"));
        }
        let tree = self.tree.clone();
        for (position, &item) in tree.arena.list(items).iter().enumerate() {
            let position = i64::try_from(position).unwrap_or(i64::MAX);
            if matches!(tree.arena.get(item), Operation::ArrayInitializer(_)) {
                if let Some(context) = self.array_inits.last_mut() {
                    context.path.push(position);
                }
                let result = self.eval(item);
                if let Some(context) = self.array_inits.last_mut() {
                    context.path.pop();
                }
                result?;
            } else {
                let value = self.eval(item)?;
                let Some(context) = self.array_inits.last() else {
                    return Err(missing_context("array creation"));
                };
                let mut indices = context.path.clone();
                indices.push(position);
                context.array.set(&indices, value)?;
            }
        }
        Ok(Value::Void)
    }
}

//! Rectangular arrays.
//!
//! Elements are stored row-major in one flat vector. Jagged arrays are
//! arrays whose elements are arrays.

use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::{index_out_of_range, EvalError, EvalResult};
use crate::runtime_type::RuntimeType;
use crate::value::Value;

#[derive(Clone, Debug)]
pub struct ArrayValue {
    pub element: RuntimeType,
    pub lengths: Vec<usize>,
    pub data: Vec<Value>,
}

impl ArrayValue {
    fn flat_index(&self, indices: &[i64]) -> Result<usize, EvalError> {
        if indices.len() != self.lengths.len() {
            return Err(crate::errors::arity_mismatch(
                "array element access",
                self.lengths.len(),
                indices.len(),
            ));
        }
        let mut flat = 0usize;
        for (&index, &length) in indices.iter().zip(&self.lengths) {
            let i = usize::try_from(index)
                .ok()
                .filter(|&i| i < length)
                .ok_or_else(|| index_out_of_range(index, length))?;
            flat = flat * length + i;
        }
        Ok(flat)
    }
}

/// Shared, mutable array handle. Equality is identity.
#[derive(Clone, Debug)]
pub struct ArrayRef(Rc<RefCell<ArrayValue>>);

impl ArrayRef {
    /// A default-filled array with the given dimension lengths.
    pub fn new(element: RuntimeType, lengths: Vec<usize>) -> Self {
        let total = lengths.iter().product();
        let data = vec![element.default_value(); total];
        ArrayRef(Rc::new(RefCell::new(ArrayValue {
            element,
            lengths,
            data,
        })))
    }

    /// A single-dimensional array holding `values`.
    pub fn from_values(element: RuntimeType, values: Vec<Value>) -> Self {
        ArrayRef(Rc::new(RefCell::new(ArrayValue {
            element,
            lengths: vec![values.len()],
            data: values,
        })))
    }

    pub fn rank(&self) -> usize {
        self.0.borrow().lengths.len()
    }

    pub fn lengths(&self) -> Vec<usize> {
        self.0.borrow().lengths.clone()
    }

    /// Total number of elements across all dimensions.
    pub fn len(&self) -> usize {
        self.0.borrow().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type(&self) -> RuntimeType {
        self.0.borrow().element.clone()
    }

    pub fn runtime_type(&self) -> RuntimeType {
        let inner = self.0.borrow();
        let rank = u8::try_from(inner.lengths.len()).unwrap_or(u8::MAX);
        RuntimeType::array(inner.element.clone(), rank)
    }

    pub fn get(&self, indices: &[i64]) -> EvalResult {
        let inner = self.0.borrow();
        let flat = inner.flat_index(indices)?;
        Ok(inner.data[flat].clone())
    }

    pub fn set(&self, indices: &[i64], value: Value) -> Result<(), EvalError> {
        let mut inner = self.0.borrow_mut();
        let flat = inner.flat_index(indices)?;
        inner.data[flat] = value;
        Ok(())
    }

    /// Snapshot of all elements in row-major order.
    pub fn values(&self) -> Vec<Value> {
        self.0.borrow().data.clone()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Python bindings summing arrays exported through the [Arrow PyCapsule interface].
//!
//! [Arrow PyCapsule interface]: https://arrow.apache.org/docs/format/CDataInterface/PyCapsuleInterface.html

use pyo3::exceptions::{PyOverflowError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyCapsule, PyTuple};
use pyo3::{intern, wrap_pyfunction};

use arrow_ingest::{
    sum_exported, ArrowCArrayExportable, CapsulePair, IngestError, OverflowMode, SumOptions,
    TaggedHandle,
};

/// Maps an [`IngestError`] to the Python exception raised for it.
///
/// Errors raised by `__arrow_c_array__` itself are re-raised as they are.
pub fn to_py_err(err: IngestError) -> PyErr {
    match err {
        IngestError::External(source) => match source.downcast::<PyErr>() {
            Ok(err) => *err,
            Err(other) => PyTypeError::new_err(other.to_string()),
        },
        IngestError::UnsupportedType(_) => PyValueError::new_err(err.to_string()),
        IngestError::Overflow => PyOverflowError::new_err(err.to_string()),
        _ => PyTypeError::new_err(err.to_string()),
    }
}

/// A Python object implementing `__arrow_c_array__`
#[derive(Debug)]
pub struct PyArrowCArray<'py> {
    obj: Bound<'py, PyAny>,
}

impl<'py> PyArrowCArray<'py> {
    /// Fails with [`IngestError::ProtocolMissing`] if `obj` has no `__arrow_c_array__` attribute.
    ///
    /// An exception raised while looking the attribute up counts as a missing attribute.
    pub fn try_new(obj: Bound<'py, PyAny>) -> Result<Self, IngestError> {
        match obj.hasattr(intern!(obj.py(), "__arrow_c_array__")) {
            Ok(true) => Ok(Self { obj }),
            Ok(false) | Err(_) => Err(IngestError::ProtocolMissing),
        }
    }
}

impl ArrowCArrayExportable for PyArrowCArray<'_> {
    fn export_c_array(&self) -> Result<CapsulePair, IngestError> {
        let py = self.obj.py();
        let result = self
            .obj
            .call_method0(intern!(py, "__arrow_c_array__"))
            .map_err(IngestError::external)?;
        let tuple = result
            .downcast::<PyTuple>()
            .map_err(|_| IngestError::MalformedProtocolResult)?;
        CapsulePair::try_from_iter(tuple.iter().map(capsule_handle))
    }
}

/// Wraps a capsule in a handle that keeps a reference to it until released.
/// Anything that is not a capsule becomes a handle failing every tag check.
fn capsule_handle(item: Bound<'_, PyAny>) -> TaggedHandle {
    let Ok(capsule) = item.downcast_into::<PyCapsule>() else {
        return TaggedHandle::invalid();
    };
    let tag = capsule.name().ok().flatten().map(|name| name.to_owned());
    let pointer = capsule.pointer();
    let owner = capsule.unbind();
    // SAFETY: the capsule owns the pointee and lives as long as `owner`
    unsafe { TaggedHandle::new(tag, pointer, move |_| drop(owner)) }
}

/// Sums the non-null values of `obj`, which must implement `__arrow_c_array__`
pub fn sum_object(obj: &Bound<'_, PyAny>, checked: bool) -> PyResult<i64> {
    let overflow = match checked {
        true => OverflowMode::Checked,
        false => OverflowMode::Wrapping,
    };
    let options = SumOptions::new().with_overflow(overflow);
    let array = PyArrowCArray::try_new(obj.clone()).map_err(to_py_err)?;
    sum_exported(&array, &options).map_err(to_py_err)
}

/// Sums an Arrow array, skipping nulls
#[pyfunction]
#[pyo3(signature = (obj, /, *, checked = false))]
fn sum(obj: &Bound<'_, PyAny>, checked: bool) -> PyResult<i64> {
    sum_object(obj, checked)
}

/// Sums Arrow arrays exported through the Arrow PyCapsule interface
#[pymodule]
pub fn pyarrow_ext(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(sum, m)?)?;
    Ok(())
}

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

use std::ffi::CStr;

use arrow_array::ffi::{FFI_ArrowArray, FFI_ArrowSchema};
use arrow_array::{Array, Float64Array, Int32Array, Int64Array, Int8Array};
use arrow_data::ArrayData;
use pyo3::exceptions::{PyKeyError, PyOverflowError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyCapsule, PyTuple};
use pyo3::wrap_pymodule;

use pyarrow_ext::sum_object;

/// Exports an array through `__arrow_c_array__` with configurable capsule names
#[pyclass]
struct Exporter {
    data: ArrayData,
    schema_tag: &'static CStr,
    array_tag: &'static CStr,
}

impl Exporter {
    fn new(array: impl Array) -> Self {
        Self {
            data: array.into_data(),
            schema_tag: c"arrow_schema",
            array_tag: c"arrow_array",
        }
    }

    fn with_tags(mut self, schema_tag: &'static CStr, array_tag: &'static CStr) -> Self {
        self.schema_tag = schema_tag;
        self.array_tag = array_tag;
        self
    }
}

#[pymethods]
impl Exporter {
    #[pyo3(signature = (requested_schema = None))]
    fn __arrow_c_array__<'py>(
        &self,
        py: Python<'py>,
        requested_schema: Option<Bound<'py, PyAny>>,
    ) -> PyResult<Bound<'py, PyTuple>> {
        assert!(requested_schema.is_none());
        let schema = FFI_ArrowSchema::try_from(self.data.data_type())
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        let array = FFI_ArrowArray::new(&self.data);
        let schema = PyCapsule::new(py, schema, Some(self.schema_tag.to_owned()))?;
        let array = PyCapsule::new(py, array, Some(self.array_tag.to_owned()))?;
        PyTuple::new(py, [schema.into_any(), array.into_any()])
    }
}

const PY_EXPORTERS: &CStr = c"
class NoProtocol:
    pass

class BrokenLookup:
    @property
    def __arrow_c_array__(self):
        raise ValueError('lookup failed')

class ThreeTuple:
    def __arrow_c_array__(self, requested_schema=None):
        return (1, 2, 3)

class NotATuple:
    def __arrow_c_array__(self, requested_schema=None):
        return 1

class NotCapsules:
    def __arrow_c_array__(self, requested_schema=None):
        return (1, 2)

class Raises:
    def __arrow_c_array__(self, requested_schema=None):
        raise KeyError('nope')
";

fn py_exporter<'py>(py: Python<'py>, class: &str) -> Bound<'py, PyAny> {
    let module = PyModule::from_code(py, PY_EXPORTERS, c"exporters.py", c"exporters").unwrap();
    module.getattr(class).unwrap().call0().unwrap()
}

fn rust_exporter<'py>(py: Python<'py>, exporter: Exporter) -> Bound<'py, PyAny> {
    Bound::new(py, exporter).unwrap().into_any()
}

#[test]
fn test_sum_with_nulls() {
    pyo3::prepare_freethreaded_python();

    Python::with_gil(|py| {
        let array = Int32Array::from(vec![Some(1), None, Some(3), None, Some(5)]);
        let obj = rust_exporter(py, Exporter::new(array));
        assert_eq!(sum_object(&obj, false).unwrap(), 9);
        // a second call exports fresh capsules and sees the same values
        assert_eq!(sum_object(&obj, false).unwrap(), 9);
    })
}

#[test]
fn test_sum_empty() {
    pyo3::prepare_freethreaded_python();

    Python::with_gil(|py| {
        let obj = rust_exporter(py, Exporter::new(Int8Array::from(Vec::<i8>::new())));
        assert_eq!(sum_object(&obj, false).unwrap(), 0);
    })
}

#[test]
fn test_protocol_missing() {
    pyo3::prepare_freethreaded_python();

    Python::with_gil(|py| {
        let objs = [
            py_exporter(py, "NoProtocol"),
            py_exporter(py, "BrokenLookup"),
            py.None().into_bound(py),
        ];
        for obj in objs {
            let err = sum_object(&obj, false).unwrap_err();
            assert!(err.is_instance_of::<PyTypeError>(py));
            assert_eq!(
                err.value(py).to_string(),
                "Provided object has no method: '__arrow_c_array__'"
            );
        }
    })
}

#[test]
fn test_malformed_result() {
    pyo3::prepare_freethreaded_python();

    Python::with_gil(|py| {
        for class in ["ThreeTuple", "NotATuple"] {
            let err = sum_object(&py_exporter(py, class), false).unwrap_err();
            assert!(err.is_instance_of::<PyTypeError>(py));
            assert_eq!(
                err.value(py).to_string(),
                "__arrow_c_array__() did not return a two-tuple"
            );
        }
    })
}

#[test]
fn test_exporter_exception_is_reraised() {
    pyo3::prepare_freethreaded_python();

    Python::with_gil(|py| {
        let err = sum_object(&py_exporter(py, "Raises"), false).unwrap_err();
        assert!(err.is_instance_of::<PyKeyError>(py));
    })
}

#[test]
fn test_invalid_capsules() {
    pyo3::prepare_freethreaded_python();

    Python::with_gil(|py| {
        let err = sum_object(&py_exporter(py, "NotCapsules"), false).unwrap_err();
        assert!(err.is_instance_of::<PyTypeError>(py));
        assert_eq!(
            err.value(py).to_string(),
            "Could not extract 'arrow_schema' capsule"
        );

        let exporter = Exporter::new(Int32Array::from(vec![1]))
            .with_tags(c"arrow_schema", c"arrow_array_stream");
        let err = sum_object(&rust_exporter(py, exporter), false).unwrap_err();
        assert!(err.is_instance_of::<PyTypeError>(py));
        assert_eq!(
            err.value(py).to_string(),
            "Could not extract 'arrow_array' capsule"
        );
    })
}

#[test]
fn test_unsupported_type() {
    pyo3::prepare_freethreaded_python();

    Python::with_gil(|py| {
        let obj = rust_exporter(py, Exporter::new(Float64Array::from(vec![1.5, 2.5])));
        let err = sum_object(&obj, false).unwrap_err();
        assert!(err.is_instance_of::<PyValueError>(py));
        assert_eq!(
            err.value(py).to_string(),
            "Can only sum signed integral types"
        );
    })
}

#[test]
fn test_overflow() {
    pyo3::prepare_freethreaded_python();

    Python::with_gil(|py| {
        let array = Int64Array::from(vec![Some(i64::MAX), None, Some(1)]);
        let obj = rust_exporter(py, Exporter::new(array));
        assert_eq!(sum_object(&obj, false).unwrap(), i64::MIN);

        let err = sum_object(&obj, true).unwrap_err();
        assert!(err.is_instance_of::<PyOverflowError>(py));
    })
}

#[test]
fn test_module_function() {
    pyo3::prepare_freethreaded_python();

    Python::with_gil(|py| {
        let module = wrap_pymodule!(pyarrow_ext::pyarrow_ext)(py);
        let sum = module.bind(py).getattr("sum").unwrap();

        let obj = rust_exporter(py, Exporter::new(Int32Array::from(vec![Some(2), None, Some(2)])));
        let total: i64 = sum.call1((obj,)).unwrap().extract().unwrap();
        assert_eq!(total, 4);
    })
}

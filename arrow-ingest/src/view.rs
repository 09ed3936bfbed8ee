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

//! Validated views over an imported schema / array pair

use std::collections::HashMap;

use arrow_array::cast::AsArray;
use arrow_array::ffi::FFI_ArrowSchema;
use arrow_array::types::{Int16Type, Int32Type, Int64Type, Int8Type};
use arrow_array::{Array, ArrayRef};
use arrow_schema::{DataType, Field};
use tracing::trace;

use crate::error::{schema_view_error, IngestError};

/// The interpretation of an `ArrowSchema`: name, logical type, nullability and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaView {
    field: Field,
}

impl SchemaView {
    /// Interprets `schema`, failing with [`IngestError::SchemaView`] if it is malformed
    pub fn try_new(schema: &FFI_ArrowSchema) -> Result<Self, IngestError> {
        let field = Field::try_from(schema).map_err(schema_view_error)?;
        Ok(Self { field })
    }

    /// The field name, empty if the producer did not set one
    pub fn name(&self) -> &str {
        self.field.name()
    }

    /// The logical type decoded from the format string
    pub fn data_type(&self) -> &DataType {
        self.field.data_type()
    }

    /// Whether the producer flagged the field as nullable
    pub fn is_nullable(&self) -> bool {
        self.field.is_nullable()
    }

    /// Key / value metadata attached to the field
    pub fn metadata(&self) -> &HashMap<String, String> {
        self.field.metadata()
    }

    /// The whole imported [`Field`]
    pub fn field(&self) -> &Field {
        &self.field
    }
}

/// A validated array together with the schema it was imported with.
///
/// The view owns the imported buffers; the producer's `release` callback runs
/// when the last view over them is dropped.
#[derive(Debug)]
pub struct TypedView {
    schema: SchemaView,
    array: ArrayRef,
}

impl TypedView {
    pub(crate) fn new(schema: SchemaView, array: ArrayRef) -> Self {
        Self { schema, array }
    }

    /// The schema this view was imported with
    pub fn schema(&self) -> &SchemaView {
        &self.schema
    }

    /// Shorthand for `self.schema().data_type()`
    pub fn data_type(&self) -> &DataType {
        self.schema.data_type()
    }

    /// The validated array backing this view
    pub fn array(&self) -> &ArrayRef {
        &self.array
    }

    /// Number of slots, nulls included
    pub fn len(&self) -> usize {
        self.array.len()
    }

    /// Returns true if the view has no slots
    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    /// Number of null slots
    pub fn null_count(&self) -> usize {
        self.array.null_count()
    }

    /// Returns true if slot `i` is null
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()` and the array has a validity bitmap
    pub fn is_null(&self, i: usize) -> bool {
        self.array.is_null(i)
    }

    /// Returns slot `i` widened to `i64`, or `None` if the view is not a signed integer type.
    ///
    /// The value of a null slot is unspecified.
    ///
    /// # Safety
    ///
    /// `i` must be less than `self.len()`
    pub unsafe fn value_as_i64_unchecked(&self, i: usize) -> Option<i64> {
        let array = &self.array;
        let v = match self.data_type() {
            DataType::Int8 => array.as_primitive::<Int8Type>().value_unchecked(i) as i64,
            DataType::Int16 => array.as_primitive::<Int16Type>().value_unchecked(i) as i64,
            DataType::Int32 => array.as_primitive::<Int32Type>().value_unchecked(i) as i64,
            DataType::Int64 => array.as_primitive::<Int64Type>().value_unchecked(i),
            _ => return None,
        };
        Some(v)
    }
}

impl Drop for TypedView {
    fn drop(&mut self) {
        trace!(data_type = %self.data_type(), len = self.len(), "releasing array view");
    }
}

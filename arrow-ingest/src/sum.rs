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

//! Null-skipping sum over the signed integer types

use arrow_array::cast::AsArray;
use arrow_array::types::{Int16Type, Int32Type, Int64Type, Int8Type};
use arrow_array::{Array, ArrowPrimitiveType, PrimitiveArray};
use arrow_schema::DataType;

use crate::error::IngestError;
use crate::handle::ArrowCArrayExportable;
use crate::ingest::ingest_with_options;
use crate::options::{OverflowMode, SumOptions};
use crate::view::TypedView;

/// Sums the non-null values of `view`, wrapping on overflow
///
/// ```
/// # use std::sync::Arc;
/// # use arrow_array::{ArrayRef, Int32Array};
/// # use arrow_ingest::{ingest, sum};
/// let array: ArrayRef = Arc::new(Int32Array::from(vec![Some(1), None, Some(3), None, Some(5)]));
/// let view = ingest(&array).unwrap();
/// assert_eq!(sum(&view).unwrap(), 9);
/// ```
pub fn sum(view: &TypedView) -> Result<i64, IngestError> {
    sum_with_options(view, &SumOptions::default())
}

/// Sums the non-null values of `view`.
///
/// Only `Int8`, `Int16`, `Int32` and `Int64` are supported, every other type fails with
/// [`IngestError::UnsupportedType`]. Values are widened to `i64` before accumulation.
pub fn sum_with_options(view: &TypedView, options: &SumOptions) -> Result<i64, IngestError> {
    let array = view.array();
    match view.data_type() {
        DataType::Int8 => sum_signed(array.as_primitive::<Int8Type>(), options.overflow),
        DataType::Int16 => sum_signed(array.as_primitive::<Int16Type>(), options.overflow),
        DataType::Int32 => sum_signed(array.as_primitive::<Int32Type>(), options.overflow),
        DataType::Int64 => sum_signed(array.as_primitive::<Int64Type>(), options.overflow),
        other => Err(IngestError::UnsupportedType(other.clone())),
    }
}

/// Imports `obj` and sums it; the view is released before returning, whatever the outcome
pub fn sum_exported<E>(obj: &E, options: &SumOptions) -> Result<i64, IngestError>
where
    E: ArrowCArrayExportable + ?Sized,
{
    let view = ingest_with_options(obj, &options.ingest)?;
    sum_with_options(&view, options)
}

fn sum_signed<T>(array: &PrimitiveArray<T>, overflow: OverflowMode) -> Result<i64, IngestError>
where
    T: ArrowPrimitiveType,
    T::Native: Into<i64>,
{
    let mut acc = 0_i64;
    for i in 0..array.len() {
        if array.is_null(i) {
            continue;
        }
        // SAFETY: i < len and the buffers were validated against the schema on import
        let value: i64 = unsafe { array.value_unchecked(i) }.into();
        acc = match overflow {
            OverflowMode::Wrapping => acc.wrapping_add(value),
            OverflowMode::Checked => acc.checked_add(value).ok_or(IngestError::Overflow)?,
        };
    }
    Ok(acc)
}

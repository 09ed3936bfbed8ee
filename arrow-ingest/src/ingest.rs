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

//! Imports the pair exported by an [`ArrowCArrayExportable`] into a [`TypedView`]

use std::ptr::NonNull;

use arrow_array::ffi::{from_ffi_and_data_type, FFI_ArrowArray, FFI_ArrowSchema};
use arrow_array::make_array;
use arrow_data::{layout, ArrayData, BufferSpec};
use arrow_schema::DataType;
use tracing::{debug, warn};

use crate::error::{array_view_error, IngestError};
use crate::handle::{ArrowCArrayExportable, CapsulePair, ARRAY_TAG, SCHEMA_TAG};
use crate::options::IngestOptions;
use crate::view::{SchemaView, TypedView};

/// Imports `obj` into a [`TypedView`] with the default [`IngestOptions`]
///
/// ```
/// # use std::sync::Arc;
/// # use arrow_array::{ArrayRef, Int32Array};
/// # use arrow_schema::DataType;
/// # use arrow_ingest::ingest;
/// let array: ArrayRef = Arc::new(Int32Array::from(vec![Some(1), None, Some(3)]));
/// let view = ingest(&array).unwrap();
/// assert_eq!(view.data_type(), &DataType::Int32);
/// assert_eq!(view.len(), 3);
/// assert!(view.is_null(1));
/// ```
pub fn ingest<E>(obj: &E) -> Result<TypedView, IngestError>
where
    E: ArrowCArrayExportable + ?Sized,
{
    ingest_with_options(obj, &IngestOptions::default())
}

/// Imports `obj` into a [`TypedView`].
///
/// `obj` is asked for a fresh handle pair exactly once. The schema is borrowed from
/// its handle, while the array is moved out of its handle and owned by the returned
/// view, leaving a released struct behind. Both handles are released before returning,
/// on success as well as on failure.
pub fn ingest_with_options<E>(obj: &E, options: &IngestOptions) -> Result<TypedView, IngestError>
where
    E: ArrowCArrayExportable + ?Sized,
{
    let CapsulePair { schema, array } = obj.export_c_array()?;

    let schema_ptr = schema
        .checked_pointer(SCHEMA_TAG)
        .ok_or(IngestError::InvalidSchemaCapsule)?
        .cast::<FFI_ArrowSchema>();
    let array_ptr = array
        .checked_pointer(ARRAY_TAG)
        .ok_or(IngestError::InvalidArrayCapsule)?
        .cast::<FFI_ArrowArray>();

    // SAFETY: the tag was checked and `schema` keeps the struct alive until the end of scope
    let schema_view = SchemaView::try_new(unsafe { schema_ptr.as_ref() })?;
    let data = import_array(array_ptr, schema_view.data_type(), options)?;

    debug!(
        data_type = %schema_view.data_type(),
        len = data.len(),
        null_count = data.null_count(),
        "imported array view"
    );
    Ok(TypedView::new(schema_view, make_array(data)))
}

fn import_array(
    ptr: NonNull<FFI_ArrowArray>,
    data_type: &DataType,
    options: &IngestOptions,
) -> Result<ArrayData, IngestError> {
    // SAFETY: the tag was checked by the caller, whose handle outlives this call
    if unsafe { ptr.as_ref() }.is_released() {
        return Err(IngestError::ArrayView(
            "array has already been released".to_string(),
        ));
    }

    // From here on the struct is ours: any early return drops it and calls `release`
    let array = unsafe { FFI_ArrowArray::from_raw(ptr.as_ptr()) };
    let mut data =
        unsafe { from_ffi_and_data_type(array, data_type.clone()) }.map_err(array_view_error)?;

    if let Some((buffer_type, index, alignment)) = first_misaligned(&data) {
        if !options.align_buffers {
            return Err(IngestError::ArrayView(format!(
                "buffers[{index}] in array of type {buffer_type} \
                 is not aligned to {alignment} bytes"
            )));
        }
        warn!(%buffer_type, index, alignment, "copying misaligned buffers");
        data.align_buffers();
    }

    let validated = if options.full_validation {
        data.validate_full()
    } else {
        data.validate()
    };
    validated.map_err(array_view_error)?;

    Ok(data)
}

/// Returns the type, buffer index and required alignment of the first fixed-width
/// buffer whose address is misaligned, searching children depth first
fn first_misaligned(data: &ArrayData) -> Option<(DataType, usize, usize)> {
    let layout = layout(data.data_type());
    let own = data
        .buffers()
        .iter()
        .zip(layout.buffers.iter())
        .enumerate()
        .find_map(|(index, (buffer, spec))| match spec {
            BufferSpec::FixedWidth { alignment, .. }
                if buffer.as_ptr().align_offset(*alignment) != 0 =>
            {
                Some((data.data_type().clone(), index, *alignment))
            }
            _ => None,
        });
    own.or_else(|| data.child_data().iter().find_map(first_misaligned))
}

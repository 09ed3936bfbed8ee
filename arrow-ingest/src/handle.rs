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

//! Tagged handles carrying the two C Data Interface structs across a component boundary.
//!
//! A [`TaggedHandle`] is a raw pointer paired with a name tag and a release callback.
//! Producers such as the Python `PyCapsule` adapter or the Rust exporters below wrap
//! their pointers in handles and hand a [`CapsulePair`] to the ingestor, which checks
//! the tag once with [`TaggedHandle::checked_pointer`] and never again.
//!
//! ```
//! # use arrow_array::{ArrayRef, Int32Array};
//! # use arrow_ingest::{ArrowCArrayExportable, ARRAY_TAG, SCHEMA_TAG};
//! # use std::sync::Arc;
//! let array: ArrayRef = Arc::new(Int32Array::from(vec![1, 2, 3]));
//! let pair = array.export_c_array().unwrap();
//! assert!(pair.schema.checked_pointer(SCHEMA_TAG).is_some());
//! assert!(pair.array.checked_pointer(SCHEMA_TAG).is_none());
//! assert!(pair.array.checked_pointer(ARRAY_TAG).is_some());
//! ```

use std::ffi::{c_void, CStr, CString};
use std::fmt::{Debug, Formatter};
use std::ptr::NonNull;

use arrow_array::ffi::{FFI_ArrowArray, FFI_ArrowSchema};
use arrow_array::{Array, ArrayRef};
use arrow_data::ArrayData;
use tracing::trace;

use crate::error::{schema_view_error, IngestError};

/// Name tag of a handle pointing at an `ArrowSchema`
pub const SCHEMA_TAG: &CStr = c"arrow_schema";

/// Name tag of a handle pointing at an `ArrowArray`
pub const ARRAY_TAG: &CStr = c"arrow_array";

type ReleaseFn = Box<dyn FnOnce(*mut c_void)>;

/// An opaque pointer tagged with a name, released exactly once when dropped
pub struct TaggedHandle {
    tag: Option<CString>,
    pointer: *mut c_void,
    release: Option<ReleaseFn>,
}

impl TaggedHandle {
    /// Creates a handle over `pointer`.
    ///
    /// `release` is invoked with `pointer` when the handle is dropped and must free
    /// whatever keeps the pointee alive.
    ///
    /// # Safety
    ///
    /// `pointer` is either null or valid for reads and writes of the struct named by
    /// `tag` until `release` has run.
    pub unsafe fn new(
        tag: Option<CString>,
        pointer: *mut c_void,
        release: impl FnOnce(*mut c_void) + 'static,
    ) -> Self {
        Self {
            tag,
            pointer,
            release: Some(Box::new(release)),
        }
    }

    /// A handle that fails every check, standing in for an element that is not a handle at all
    pub fn invalid() -> Self {
        Self {
            tag: None,
            pointer: std::ptr::null_mut(),
            release: None,
        }
    }

    /// The tag this handle was created with
    pub fn tag(&self) -> Option<&CStr> {
        self.tag.as_deref()
    }

    /// Returns the pointer if the handle carries `expected` and is not null
    pub fn checked_pointer(&self, expected: &CStr) -> Option<NonNull<c_void>> {
        match self.tag() {
            Some(tag) if tag == expected => NonNull::new(self.pointer),
            _ => None,
        }
    }
}

impl Drop for TaggedHandle {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            trace!(tag = ?self.tag, "releasing handle");
            release(self.pointer);
        }
    }
}

impl Debug for TaggedHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaggedHandle")
            .field("tag", &self.tag)
            .field("pointer", &self.pointer)
            .finish()
    }
}

/// The `(schema, array)` pair returned by [`ArrowCArrayExportable::export_c_array`]
#[derive(Debug)]
pub struct CapsulePair {
    /// Expected to be tagged [`SCHEMA_TAG`]
    pub schema: TaggedHandle,
    /// Expected to be tagged [`ARRAY_TAG`]
    pub array: TaggedHandle,
}

impl CapsulePair {
    /// Builds a pair from an ordered sequence, which must hold exactly two handles
    pub fn try_from_iter<I>(handles: I) -> Result<Self, IngestError>
    where
        I: IntoIterator<Item = TaggedHandle>,
    {
        let mut handles = handles.into_iter();
        match (handles.next(), handles.next(), handles.next()) {
            (Some(schema), Some(array), None) => Ok(Self { schema, array }),
            _ => Err(IngestError::MalformedProtocolResult),
        }
    }
}

/// A value that can export itself as an `ArrowSchema` / `ArrowArray` handle pair.
///
/// This mirrors the `__arrow_c_array__` method of the Arrow PyCapsule interface:
/// each call produces a fresh pair whose array the consumer may move out of.
pub trait ArrowCArrayExportable {
    /// Export a fresh handle pair.
    ///
    /// Failures of the exporter itself should be reported as [`IngestError::External`]
    fn export_c_array(&self) -> Result<CapsulePair, IngestError>;
}

impl ArrowCArrayExportable for ArrayData {
    fn export_c_array(&self) -> Result<CapsulePair, IngestError> {
        let schema = FFI_ArrowSchema::try_from(self.data_type()).map_err(schema_view_error)?;
        let array = FFI_ArrowArray::new(self);
        Ok(CapsulePair {
            schema: boxed_handle(SCHEMA_TAG, schema),
            array: boxed_handle(ARRAY_TAG, array),
        })
    }
}

impl ArrowCArrayExportable for ArrayRef {
    fn export_c_array(&self) -> Result<CapsulePair, IngestError> {
        self.to_data().export_c_array()
    }
}

/// Moves `value` to the heap behind a handle; dropping the handle drops the box,
/// which in turn invokes the struct's own `release` unless it was moved out
pub(crate) fn boxed_handle<T: 'static>(tag: &CStr, value: T) -> TaggedHandle {
    let pointer = Box::into_raw(Box::new(value)) as *mut c_void;
    // SAFETY: the pointer comes from Box::into_raw and is freed only by the callback
    unsafe {
        TaggedHandle::new(Some(tag.to_owned()), pointer, |ptr| {
            drop(Box::from_raw(ptr as *mut T))
        })
    }
}

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

//! Imports arrays exported through the [Arrow C Data Interface] and sums their
//! signed integer values.
//!
//! An exporter implements [`ArrowCArrayExportable`] by handing out a [`CapsulePair`]:
//! two [`TaggedHandle`]s pointing at an `ArrowSchema` and an `ArrowArray`, tagged
//! `arrow_schema` and `arrow_array` as in the [Arrow PyCapsule interface].
//! [`ingest`] validates the pair into a [`TypedView`] and [`sum`] adds up its non-null
//! values.
//!
//! ```
//! # use std::sync::Arc;
//! # use arrow_array::{ArrayRef, Int64Array};
//! # use arrow_ingest::{sum_exported, OverflowMode, SumOptions};
//! let array: ArrayRef = Arc::new(Int64Array::from(vec![Some(i64::MAX), None, Some(1)]));
//!
//! // wraps by default
//! assert_eq!(sum_exported(&array, &SumOptions::default()).unwrap(), i64::MIN);
//!
//! // or reports the overflow
//! let checked = SumOptions::new().with_overflow(OverflowMode::Checked);
//! assert!(sum_exported(&array, &checked).is_err());
//! ```
//!
//! [Arrow C Data Interface]: https://arrow.apache.org/docs/format/CDataInterface.html
//! [Arrow PyCapsule interface]: https://arrow.apache.org/docs/format/CDataInterface/PyCapsuleInterface.html

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod handle;
mod ingest;
pub mod options;
mod sum;
pub mod view;

pub use error::IngestError;
pub use handle::{ArrowCArrayExportable, CapsulePair, TaggedHandle, ARRAY_TAG, SCHEMA_TAG};
pub use ingest::{ingest, ingest_with_options};
pub use options::{IngestOptions, OverflowMode, SumOptions};
pub use sum::{sum, sum_exported, sum_with_options};
pub use view::{SchemaView, TypedView};

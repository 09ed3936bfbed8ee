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

//! Defines [`IngestError`], the failures of importing and summing an exported array

use std::error::Error;
use std::fmt::{Display, Formatter};

use arrow_schema::{ArrowError, DataType};

/// Failures raised while importing an array through the C Data Interface or summing it.
///
/// Every variant is terminal for the call that produced it.
#[derive(Debug)]
#[non_exhaustive]
pub enum IngestError {
    /// The object does not implement the `__arrow_c_array__` protocol
    ProtocolMissing,
    /// The protocol method returned something other than a two-element tuple
    MalformedProtocolResult,
    /// The first element is not a non-null handle tagged `arrow_schema`
    InvalidSchemaCapsule,
    /// The second element is not a non-null handle tagged `arrow_array`
    InvalidArrayCapsule,
    /// The schema descriptor could not be interpreted
    SchemaView(String),
    /// The array descriptor is inconsistent with its schema
    ArrayView(String),
    /// Summation is only defined for signed integers
    UnsupportedType(DataType),
    /// The accumulator overflowed under [`OverflowMode::Checked`](crate::OverflowMode::Checked)
    Overflow,
    /// A failure raised by the exporter itself, passed through untouched
    External(Box<dyn Error + Send + Sync>),
}

impl IngestError {
    /// Wraps an error raised by an exporter so it can be recovered with [`Self::into_external`]
    pub fn external<E>(error: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self::External(error.into())
    }

    /// Returns the exporter error if this is [`IngestError::External`]
    pub fn into_external(self) -> Result<Box<dyn Error + Send + Sync>, Self> {
        match self {
            Self::External(e) => Ok(e),
            other => Err(other),
        }
    }
}

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::ProtocolMissing => {
                write!(f, "Provided object has no method: '__arrow_c_array__'")
            }
            IngestError::MalformedProtocolResult => {
                write!(f, "__arrow_c_array__() did not return a two-tuple")
            }
            IngestError::InvalidSchemaCapsule => {
                write!(f, "Could not extract 'arrow_schema' capsule")
            }
            IngestError::InvalidArrayCapsule => {
                write!(f, "Could not extract 'arrow_array' capsule")
            }
            IngestError::SchemaView(desc) => write!(f, "{desc}"),
            IngestError::ArrayView(desc) => write!(f, "{desc}"),
            IngestError::UnsupportedType(_) => {
                write!(f, "Can only sum signed integral types")
            }
            IngestError::Overflow => write!(f, "Overflow happened while summing"),
            IngestError::External(source) => write!(f, "{source}"),
        }
    }
}

impl Error for IngestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            IngestError::External(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Converts an [`ArrowError`] raised while building the schema view
pub(crate) fn schema_view_error(e: ArrowError) -> IngestError {
    IngestError::SchemaView(arrow_message(e))
}

/// Converts an [`ArrowError`] raised while building the array view
pub(crate) fn array_view_error(e: ArrowError) -> IngestError {
    IngestError::ArrayView(arrow_message(e))
}

// Strips the variant prefix `ArrowError` adds to its display, keeping only the diagnostic
fn arrow_message(e: ArrowError) -> String {
    match e {
        ArrowError::CDataInterface(msg)
        | ArrowError::InvalidArgumentError(msg)
        | ArrowError::SchemaError(msg)
        | ArrowError::ParseError(msg)
        | ArrowError::NotYetImplemented(msg) => msg,
        other => other.to_string(),
    }
}

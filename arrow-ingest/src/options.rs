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

//! Options controlling ingestion and summation

/// How the sum accumulator behaves when it leaves the `i64` range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OverflowMode {
    /// Two's-complement wraparound
    #[default]
    Wrapping,
    /// Fail with [`IngestError::Overflow`](crate::IngestError::Overflow)
    Checked,
}

/// Options for [`ingest_with_options`](crate::ingest_with_options)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IngestOptions {
    /// Copy buffers whose address does not satisfy the alignment of their type.
    /// When `false`, misaligned buffers are rejected instead
    pub align_buffers: bool,
    /// Validate the values of the imported array (offsets, dictionary keys, UTF-8, ...)
    /// in addition to its layout, recursing into children
    pub full_validation: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            align_buffers: true,
            full_validation: true,
        }
    }
}

impl IngestOptions {
    /// Same as [`IngestOptions::default`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [`Self::align_buffers`]
    pub fn with_align_buffers(mut self, align_buffers: bool) -> Self {
        self.align_buffers = align_buffers;
        self
    }

    /// Sets [`Self::full_validation`]
    pub fn with_full_validation(mut self, full_validation: bool) -> Self {
        self.full_validation = full_validation;
        self
    }
}

/// Options for [`sum_with_options`](crate::sum_with_options)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SumOptions {
    /// Behaviour of the accumulator on overflow
    pub overflow: OverflowMode,
    /// Options used by [`sum_exported`](crate::sum_exported) to import the array
    pub ingest: IngestOptions,
}

impl SumOptions {
    /// Same as [`SumOptions::default`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [`Self::overflow`]
    pub fn with_overflow(mut self, overflow: OverflowMode) -> Self {
        self.overflow = overflow;
        self
    }

    /// Sets [`Self::ingest`]
    pub fn with_ingest_options(mut self, ingest: IngestOptions) -> Self {
        self.ingest = ingest;
        self
    }
}

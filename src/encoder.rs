// Copyright (c) 2023 Huawei Device Co., Ltd.
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! [HPACK] encoder implementation.
//!
//! [HPACK]: https://httpwg.org/specs/rfc7541.html

use crate::error::HpackError;
use crate::field::HeaderField;
use crate::representation::{encode_representation, Name, Representation};
use crate::table::{DynamicTable, TableIndex, TableSearcher};

/// Encoder implementation of [HPACK].
///
/// [HPACK]: https://httpwg.org/specs/rfc7541.html
///
/// The encoder owns the sending side's [`DynamicTable`] and mirrors every
/// insertion it instructs the peer's decoder to perform, so the two tables
/// evolve in lockstep.
///
/// Representation choice per field:
/// - an exact table match becomes an indexed field;
/// - a sensitive field always becomes a never-indexed literal, with an
///   indexed name when one is available;
/// - a field too large to ever fit the table becomes a literal without
///   indexing, leaving the table untouched;
/// - everything else becomes a literal with incremental indexing and is
///   inserted into the local table.
pub struct HpackEncoder {
    table: DynamicTable,
    /// Protocol-negotiated ceiling for the table size.
    limit: usize,
    use_huffman: bool,
    /// Size updates applied locally but not yet written to the wire. They
    /// are emitted, in order, at the front of the next encoded block.
    pending_size_updates: Vec<usize>,
}

impl HpackEncoder {
    /// Creates an `HpackEncoder` with the given dynamic table size. When
    /// `use_huffman` is set, string literals are Huffman-coded whenever
    /// the coded form is no longer than the raw octets.
    pub fn new(max_size: usize, use_huffman: bool) -> Self {
        Self {
            table: DynamicTable::with_max_size(max_size),
            limit: max_size,
            use_huffman,
            pending_size_updates: Vec::new(),
        }
    }

    /// Encodes a header list into one header block, applying any pending
    /// size updates first.
    pub fn encode(&mut self, headers: &[HeaderField]) -> Vec<u8> {
        let mut dst = Vec::new();
        for max_size in std::mem::take(&mut self.pending_size_updates) {
            encode_representation(&Representation::SizeUpdate { max_size }, false, &mut dst);
        }
        for field in headers {
            self.encode_field(field, &mut dst);
        }
        dst
    }

    /// Changes the dynamic table size. The change takes effect locally at
    /// once and is signaled to the peer by a size update emitted at the
    /// front of the next encoded block, as `RFC7541 section-4.2` requires.
    ///
    /// Fails with [`HpackError::SizeUpdateViolation`], without touching any
    /// state, if `max_size` exceeds the ceiling the protocol negotiated.
    pub fn set_max_dynamic_table_size(&mut self, max_size: usize) -> Result<(), HpackError> {
        if max_size > self.limit {
            return Err(HpackError::SizeUpdateViolation);
        }
        self.table.update_size(max_size);
        self.pending_size_updates.push(max_size);
        Ok(())
    }

    /// Notifies the encoder of a new protocol-level table size ceiling,
    /// typically from a settings exchange. If the table's current maximum
    /// size exceeds the new ceiling, the table shrinks at once and the
    /// mandatory in-band size update is queued automatically.
    pub fn update_table_size_limit(&mut self, max_size: usize) {
        self.limit = max_size;
        if self.table.max_size() > max_size {
            self.table.update_size(max_size);
            self.pending_size_updates.push(max_size);
        }
    }

    /// Returns the dynamic table for diagnostics.
    pub fn table(&self) -> &DynamicTable {
        &self.table
    }

    fn encode_field(&mut self, field: &HeaderField, dst: &mut Vec<u8>) {
        // The index is resolved against the table as it stands before any
        // insertion this field causes, matching what the decoder sees.
        let index = TableSearcher::new(&self.table).index(field.name(), field.value());

        if field.is_sensitive() {
            let name = match index {
                Some(TableIndex::Field(i)) | Some(TableIndex::Name(i)) => Name::Index(i),
                None => Name::Literal(field.name().to_vec()),
            };
            encode_representation(
                &Representation::LiteralNeverIndexed {
                    name,
                    value: field.value().to_vec(),
                },
                self.use_huffman,
                dst,
            );
            return;
        }

        if let Some(TableIndex::Field(i)) = index {
            encode_representation(&Representation::Indexed { index: i }, self.use_huffman, dst);
            return;
        }

        let name = match index {
            Some(TableIndex::Name(i)) => Name::Index(i),
            _ => Name::Literal(field.name().to_vec()),
        };
        let value = field.value().to_vec();
        if field.size() > self.table.max_size() {
            // The entry could only flush the whole table and still not fit,
            // so it is not worth a table slot on either side.
            encode_representation(
                &Representation::LiteralWithoutIndexing { name, value },
                self.use_huffman,
                dst,
            );
        } else {
            encode_representation(
                &Representation::LiteralWithIndexing { name, value },
                self.use_huffman,
                dst,
            );
            self.table
                .update(field.name().to_vec(), field.value().to_vec());
        }
    }
}

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

//! Static and dynamic table implementations of [HPACK], and the combined
//! index space over both.
//!
//! [HPACK]: https://httpwg.org/specs/rfc7541.html

use std::collections::VecDeque;

use crate::field::HeaderField;

/// `TableSearcher` is used to find specified content in the static and
/// dynamic tables through the combined index space: indices `1..=61`
/// address the static table, indices `62..` address the dynamic table,
/// newest entry first. Index 0 is always invalid.
pub(crate) struct TableSearcher<'a> {
    dynamic: &'a DynamicTable,
}

impl<'a> TableSearcher<'a> {
    pub(crate) fn new(dynamic: &'a DynamicTable) -> Self {
        Self { dynamic }
    }

    /// Searches a field name in the static and dynamic tables.
    pub(crate) fn field_name(&self, index: usize) -> Option<Vec<u8>> {
        match index {
            0 => None,
            1..=STATIC_TABLE_SIZE => StaticTable::field_name(index).map(|n| n.as_bytes().to_vec()),
            _ => self.dynamic.field_name(index - STATIC_TABLE_SIZE - 1),
        }
    }

    /// Searches a full field in the static and dynamic tables.
    pub(crate) fn field(&self, index: usize) -> Option<(Vec<u8>, Vec<u8>)> {
        match index {
            0 => None,
            1..=STATIC_TABLE_SIZE => StaticTable::field(index)
                .map(|(n, v)| (n.as_bytes().to_vec(), v.as_bytes().to_vec())),
            _ => self.dynamic.field(index - STATIC_TABLE_SIZE - 1),
        }
    }

    /// Searches the combined index of a field. An exact match in either
    /// table wins over a name-only match.
    pub(crate) fn index(&self, name: &[u8], value: &[u8]) -> Option<TableIndex> {
        match (
            StaticTable::index(name, value),
            self.dynamic.index(name, value),
        ) {
            (x @ Some(TableIndex::Field(_)), _) => x,
            (_, Some(TableIndex::Field(i))) => Some(TableIndex::Field(i + STATIC_TABLE_SIZE + 1)),
            (x @ Some(TableIndex::Name(_)), _) => x,
            (_, Some(TableIndex::Name(i))) => Some(TableIndex::Name(i + STATIC_TABLE_SIZE + 1)),
            _ => None,
        }
    }
}

/// Result of a reverse table lookup: either the whole field matched, or
/// only its name.
pub(crate) enum TableIndex {
    Field(usize),
    Name(usize),
}

/// The [`Dynamic Table`][dynamic_table] implementation of [HPACK].
///
/// [dynamic_table]: https://httpwg.org/specs/rfc7541.html#dynamic.table
/// [HPACK]: https://httpwg.org/specs/rfc7541.html
///
/// # Introduction
/// The dynamic table consists of a list of header fields maintained in
/// first-in, first-out order. The first and newest entry in a dynamic table
/// is at the lowest index, and the oldest entry of a dynamic table is at
/// the highest index.
///
/// The dynamic table is initially empty. Entries are added as each header
/// block is processed, and evicted from the oldest end whenever the total
/// size would exceed `max_size`. The table can contain duplicate entries.
///
/// The encoder and the decoder each own one instance per connection
/// direction; both replay the same deterministic transition rules so that
/// their tables stay equal without any shared state.
#[derive(Debug)]
pub struct DynamicTable {
    queue: VecDeque<(Vec<u8>, Vec<u8>)>,
    curr_size: usize,
    max_size: usize,
}

impl DynamicTable {
    /// Creates a `DynamicTable` with the given size limit.
    pub(crate) fn with_max_size(max_size: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            curr_size: 0,
            max_size,
        }
    }

    /// Returns the total size of all entries, as defined by
    /// `RFC7541 section-4.1` (name length + value length + 32 per entry).
    pub fn curr_size(&self) -> usize {
        self.curr_size
    }

    /// Returns the current maximum size of the table.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the entry at 0-based position `index`, newest first.
    pub fn entry(&self, index: usize) -> Option<HeaderField> {
        self.queue
            .get(index)
            .map(|(n, v)| HeaderField::new(n.clone(), v.clone()))
    }

    /// Gets a field name by 0-based index.
    pub(crate) fn field_name(&self, index: usize) -> Option<Vec<u8>> {
        self.queue.get(index).map(|(n, _)| n.clone())
    }

    /// Gets a full field by 0-based index.
    pub(crate) fn field(&self, index: usize) -> Option<(Vec<u8>, Vec<u8>)> {
        self.queue.get(index).cloned()
    }

    /// Prepends a new entry, evicting from the oldest end until the size
    /// invariant holds again. An entry larger than `max_size` on its own
    /// leaves the table empty: everything is evicted, the entry included.
    pub(crate) fn update(&mut self, name: Vec<u8>, value: Vec<u8>) {
        self.curr_size += entry_size(&name, &value);
        self.queue.push_front((name, value));
        self.fit_size();
    }

    /// Updates the table's maximum size and evicts until the invariant
    /// holds.
    pub(crate) fn update_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        self.fit_size();
    }

    /// Evicts oldest entries until `curr_size <= max_size`.
    fn fit_size(&mut self) {
        while self.curr_size > self.max_size {
            match self.queue.pop_back() {
                Some((name, value)) => self.curr_size -= entry_size(&name, &value),
                None => break,
            }
        }
    }

    /// Tries to get the 0-based index of a field, preferring an exact match
    /// and otherwise the lowest name-only match.
    fn index(&self, name: &[u8], value: &[u8]) -> Option<TableIndex> {
        let mut name_index = None;
        for (i, (n, v)) in self.queue.iter().enumerate() {
            match (n.as_slice() == name, v.as_slice() == value, &name_index) {
                (true, true, _) => return Some(TableIndex::Field(i)),
                (true, false, None) => name_index = Some(TableIndex::Name(i)),
                _ => {}
            }
        }
        name_index
    }
}

fn entry_size(name: &[u8], value: &[u8]) -> usize {
    name.len() + value.len() + 32
}

/// Number of entries in the static table.
pub(crate) const STATIC_TABLE_SIZE: usize = 61;

/// The [`Static Table`][static_table] implementation of [HPACK]: the
/// predefined list of 61 common header fields from `RFC7541 Appendix A`,
/// process-wide constant data with no lifecycle beyond initialization.
///
/// [static_table]: https://httpwg.org/specs/rfc7541.html#static.table
/// [HPACK]: https://httpwg.org/specs/rfc7541.html
pub(crate) struct StaticTable;

/// `RFC7541 Appendix A`, indices 1 through 61. Entries without a value in
/// the RFC table carry the empty string.
const STATIC_TABLE: [(&str, &str); STATIC_TABLE_SIZE] = [
    (":authority", ""),
    (":method", "GET"),
    (":method", "POST"),
    (":path", "/"),
    (":path", "/index.html"),
    (":scheme", "http"),
    (":scheme", "https"),
    (":status", "200"),
    (":status", "204"),
    (":status", "206"),
    (":status", "304"),
    (":status", "400"),
    (":status", "404"),
    (":status", "500"),
    ("accept-charset", ""),
    ("accept-encoding", "gzip, deflate"),
    ("accept-language", ""),
    ("accept-ranges", ""),
    ("accept", ""),
    ("access-control-allow-origin", ""),
    ("age", ""),
    ("allow", ""),
    ("authorization", ""),
    ("cache-control", ""),
    ("content-disposition", ""),
    ("content-encoding", ""),
    ("content-language", ""),
    ("content-length", ""),
    ("content-location", ""),
    ("content-range", ""),
    ("content-type", ""),
    ("cookie", ""),
    ("date", ""),
    ("etag", ""),
    ("expect", ""),
    ("expires", ""),
    ("from", ""),
    ("host", ""),
    ("if-match", ""),
    ("if-modified-since", ""),
    ("if-none-match", ""),
    ("if-range", ""),
    ("if-unmodified-since", ""),
    ("last-modified", ""),
    ("link", ""),
    ("location", ""),
    ("max-forwards", ""),
    ("proxy-authenticate", ""),
    ("proxy-authorization", ""),
    ("range", ""),
    ("referer", ""),
    ("refresh", ""),
    ("retry-after", ""),
    ("server", ""),
    ("set-cookie", ""),
    ("strict-transport-security", ""),
    ("transfer-encoding", ""),
    ("user-agent", ""),
    ("vary", ""),
    ("via", ""),
    ("www-authenticate", ""),
];

impl StaticTable {
    /// Gets a field name by the given 1-based index.
    fn field_name(index: usize) -> Option<&'static str> {
        STATIC_TABLE.get(index.checked_sub(1)?).map(|(n, _)| *n)
    }

    /// Gets a full field by the given 1-based index.
    fn field(index: usize) -> Option<(&'static str, &'static str)> {
        STATIC_TABLE.get(index.checked_sub(1)?).copied()
    }

    /// Tries to get the 1-based index of a field, preferring an exact
    /// match and otherwise the lowest name-only match.
    fn index(name: &[u8], value: &[u8]) -> Option<TableIndex> {
        let mut name_index = None;
        for (i, (n, v)) in STATIC_TABLE.iter().enumerate() {
            match (n.as_bytes() == name, v.as_bytes() == value, &name_index) {
                (true, true, _) => return Some(TableIndex::Field(i + 1)),
                (true, false, None) => name_index = Some(TableIndex::Name(i + 1)),
                _ => {}
            }
        }
        name_index
    }
}

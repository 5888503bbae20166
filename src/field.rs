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

//! Header field definition used by the HPACK codec.
//!
//! A header field is an ordered pair of byte strings. Names are
//! case-sensitive at this layer; lower-casing is an HTTP-layer concern.

/// A single HTTP header field as seen by the HPACK codec: a name/value pair
/// of opaque byte strings, plus a sensitivity marker.
///
/// A sensitive field is transmitted with the [never-indexed] literal
/// representation so that it cannot be probed through the dynamic table,
/// and intermediaries are required to keep it that way when re-encoding.
/// The marker round-trips: decoding a never-indexed literal yields a
/// sensitive field.
///
/// [never-indexed]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.2.3
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    name: Vec<u8>,
    value: Vec<u8>,
    sensitive: bool,
}

impl HeaderField {
    /// Creates a regular header field.
    pub fn new(name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            sensitive: false,
        }
    }

    /// Creates a header field that must only ever use the never-indexed
    /// literal representation.
    pub fn new_sensitive(name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            sensitive: true,
        }
    }

    /// Returns the field name.
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Returns the field value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Returns whether this field is marked never-indexed.
    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// Returns the table size of this field.
    ///
    /// RFC7541-4.1: The additional 32 octets account for an estimated
    /// overhead associated with an entry. For example, an entry structure
    /// using two 64-bit pointers to reference the name and the value of the
    /// entry and two 64-bit integers for counting the number of references
    /// to the name and value would have 32 octets of overhead.
    pub fn size(&self) -> usize {
        self.name.len() + self.value.len() + 32
    }

    pub(crate) fn into_parts(self) -> (Vec<u8>, Vec<u8>) {
        (self.name, self.value)
    }
}

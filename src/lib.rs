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

//! [HPACK] header compression for HTTP/2, as defined in [RFC7541].
//!
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//! [RFC7541]: https://www.rfc-editor.org/rfc/rfc7541.html
//!
//! This crate turns a list of header fields into a compact binary header
//! block and reconstructs the exact list on the receiving end. Both sides
//! maintain a bounded dynamic table of recently transmitted fields that
//! the wire format references by index instead of re-sending the octets.
//!
//! The surrounding HTTP/2 machinery (frame I/O, stream multiplexing,
//! settings negotiation) stays outside: the codec consumes and produces
//! whole header blocks and receives table-size-limit notifications from
//! the protocol layer.
//!
//! # Example
//!
//! ```
//! use hpack_codec::{HeaderField, HpackDecoder, HpackEncoder};
//! use hpack_codec::{DEFAULT_HEADER_TABLE_SIZE, DEFAULT_MAX_HEADER_LIST_SIZE};
//!
//! let mut encoder = HpackEncoder::new(DEFAULT_HEADER_TABLE_SIZE, true);
//! let mut decoder = HpackDecoder::with_max_size(
//!     DEFAULT_HEADER_TABLE_SIZE,
//!     DEFAULT_MAX_HEADER_LIST_SIZE,
//! );
//!
//! let headers = vec![
//!     HeaderField::new(":method", "GET"),
//!     HeaderField::new(":path", "/"),
//!     HeaderField::new_sensitive("authorization", "Basic dG9wOnNlY3JldA=="),
//! ];
//! let block = encoder.encode(&headers);
//! assert_eq!(decoder.decode(&block).unwrap(), headers);
//! ```

mod decoder;
mod encoder;
mod error;
mod field;
mod huffman;
mod integer;
mod representation;
mod table;

#[cfg(test)]
mod test_util;

pub use decoder::HpackDecoder;
pub use encoder::HpackEncoder;
pub use error::HpackError;
pub use field::HeaderField;
pub use table::DynamicTable;

/// The default `SETTINGS_HEADER_TABLE_SIZE` of HTTP/2, in octets.
pub const DEFAULT_HEADER_TABLE_SIZE: usize = 4096;

/// The default limit for the total size of a decoded header list, in
/// octets, counting 32 octets of overhead per field.
pub const DEFAULT_MAX_HEADER_LIST_SIZE: usize = 16 << 20;

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

//! Errors of the [HPACK] codec.
//!
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! # Introduction
//! HPACK has no field-level recovery. Once an integer encoding, a table
//! index or a Huffman sequence is corrupted, the dynamic table state is
//! unrecoverable and the whole connection must be torn down with a
//! `COMPRESSION_ERROR`. Every error below is therefore a connection error
//! from the caller's perspective: after any decoding failure the decoder
//! instance must be discarded.

use core::fmt;

/// Errors that can occur while encoding or decoding an HPACK header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HpackError {
    /// A decoded integer exceeds the representable range (`usize`). This is
    /// the classic HPACK integer-overflow attack surface; the value is
    /// rejected before it can size any allocation or table lookup.
    IntegerOverflow,

    /// The input ended before a continuation sequence or a length-prefixed
    /// string was complete.
    TruncatedInput,

    /// A combined index of 0, or one beyond the current union of the static
    /// and dynamic tables.
    InvalidIndex,

    /// A Huffman bit sequence that resolves to no symbol, contains the EOS
    /// symbol, or carries malformed padding (longer than 7 bits or not a
    /// prefix of EOS).
    InvalidHuffmanCode,

    /// A dynamic table size update exceeds the negotiated ceiling, or a
    /// required update was not seen before a dependent table reference.
    SizeUpdateViolation,

    /// A field representation prefix matching none of the five defined
    /// forms. Unreachable given the bit layout, but checked defensively.
    MalformedFieldRepresentation,

    /// The decoded header list exceeds the configured maximum size
    /// (`SETTINGS_MAX_HEADER_LIST_SIZE` mirror).
    HeaderListTooLarge,
}

impl fmt::Display for HpackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::IntegerOverflow => "decoded integer overflows the representable range",
            Self::TruncatedInput => "input ends before the encoding is complete",
            Self::InvalidIndex => "invalid header table index",
            Self::InvalidHuffmanCode => "invalid huffman code or padding",
            Self::SizeUpdateViolation => "dynamic table size update violation",
            Self::MalformedFieldRepresentation => "malformed field representation",
            Self::HeaderListTooLarge => "decoded header list exceeds the configured maximum",
        };
        write!(f, "{}", message)
    }
}

impl std::error::Error for HpackError {}

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

//! [Header Field Representation] implementation of [HPACK].
//!
//! [Header Field Representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-2.4
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! # Description from RFC7541
//! An encoded header field can be represented either as an index or as a
//! literal.
//!
//! An [indexed representation] defines a header field as a reference to an
//! entry in either the static table or the dynamic table.
//!
//! A [literal representation] defines a header field by specifying its
//! name and value. The header field name can be represented literally or as a
//! reference to an entry in either the static table or the dynamic table.
//! The header field value is represented literally.
//!
//! Three different literal representations are defined:
//!
//! - A literal representation that adds the header field as a new entry at the
//! beginning of the dynamic table (see
//! [Literal Header Field with Incremental Indexing]).
//!
//! - A literal representation that does not add the header field to the dynamic
//! table (see [Literal Header Field without Indexing]).
//!
//! - A literal representation that does not add the header field to the dynamic
//! table, with the additional stipulation that this header field always use a
//! literal representation, in particular when re-encoded by an intermediary
//! (see [Literal Header Field Never Indexed]). This representation is intended
//! for protecting header field values that are not to be put at risk by
//! compressing them (see [Never-Indexed Literals] for more details).
//!
//! The literal representation of a header field name or of a header field value
//! can encode the sequence of octets either directly or using a static
//! Huffman code (see [String Literal Representation]).
//!
//! [Literal Header Field Never Indexed]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.2.3
//! [Literal Header Field with Incremental Indexing]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.2.1
//! [Literal Header Field without Indexing]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.2.2
//! [Never-Indexed Literals]: https://www.rfc-editor.org/rfc/rfc7541.html#section-7.1.3
//! [String Literal Representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-5.2
//! [indexed representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.1
//! [literal representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.2

use crate::error::HpackError;
use crate::huffman::{huffman_decode, huffman_encode, huffman_encoded_len};
use crate::integer::{decode_integer, encode_integer};

/// Definition and [binary format] of each of the different
/// [header field representations] and the [dynamic table size update]
/// instruction.
///
/// [binary format]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6
/// [header field representations]: https://www.rfc-editor.org/rfc/rfc7541.html#section-3.2
/// [dynamic table size update]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.3
pub(crate) enum Representation {
    /// An [indexed header field representation] identifies an entry in either
    /// the static table or the dynamic table. It causes a header field to be
    /// added to the decoded header list.
    ///
    /// [indexed header field representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.1
    ///
    /// # Binary Format
    /// `Indexed Header Field`:
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 1 |        Index (7+)         |
    /// +---+---------------------------+
    /// ```
    Indexed { index: usize },

    /// A [literal header field with incremental indexing representation]
    /// results in appending a header field to the decoded header list and
    /// inserting it as a new entry into the dynamic table.
    ///
    /// [literal header field with incremental indexing representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.2.1
    ///
    /// # Binary Format
    /// `Literal Header Field with Incremental Indexing -- Indexed Name`:
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 1 |      Index (6+)       |
    /// +---+---+-----------------------+
    /// | H |     Value Length (7+)     |
    /// +---+---------------------------+
    /// | Value String (Length octets)  |
    /// +-------------------------------+
    /// ```
    ///
    /// `Literal Header Field with Incremental Indexing -- New Name`:
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 1 |           0           |
    /// +---+---+-----------------------+
    /// | H |     Name Length (7+)      |
    /// +---+---------------------------+
    /// |  Name String (Length octets)  |
    /// +---+---------------------------+
    /// | H |     Value Length (7+)     |
    /// +---+---------------------------+
    /// | Value String (Length octets)  |
    /// +-------------------------------+
    /// ```
    LiteralWithIndexing { name: Name, value: Vec<u8> },

    /// A [literal header field without indexing representation] results in
    /// appending a header field to the decoded header list without altering
    /// the dynamic table.
    ///
    /// [literal header field without indexing representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.2.2
    ///
    /// # Binary Format
    /// `Literal Header Field without Indexing -- Indexed Name`:
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 0 | 0 | 0 |  Index (4+)   |
    /// +---+---+---+---+---------------+
    /// | H |     Value Length (7+)     |
    /// +---+---------------------------+
    /// | Value String (Length octets)  |
    /// +-------------------------------+
    /// ```
    LiteralWithoutIndexing { name: Name, value: Vec<u8> },

    /// A [literal header field never-indexed representation] results in
    /// appending a header field to the decoded header list without altering
    /// the dynamic table. Intermediaries **MUST** use the same
    /// representation when re-encoding this header field.
    ///
    /// [literal header field never-indexed representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.2.3
    ///
    /// # Binary Format
    /// `Literal Header Field Never Indexed -- Indexed Name`:
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 0 | 0 | 1 |  Index (4+)   |
    /// +---+---+---+---+---------------+
    /// | H |     Value Length (7+)     |
    /// +---+---------------------------+
    /// | Value String (Length octets)  |
    /// +-------------------------------+
    /// ```
    LiteralNeverIndexed { name: Name, value: Vec<u8> },

    /// A [dynamic table size update] signals a change to the size of the
    /// dynamic table.
    ///
    /// [dynamic table size update]: https://www.rfc-editor.org/rfc/rfc7541.html#section-6.3
    ///
    /// # Binary Format
    /// `Maximum Dynamic Table Size Change`:
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 0 | 1 |   Max size (5+)   |
    /// +---+---+---+-------------------+
    /// ```
    SizeUpdate { max_size: usize },
}

/// Name of `Representation`. It can be represented as string literals or an
/// index.
pub(crate) enum Name {
    Index(usize),
    Literal(Vec<u8>),
}

/// Prefix bit of `Representation`. An integer is represented in two
/// parts: a prefix that fills the current octet and an optional list of octets
/// that are used if the integer value does not fit within the prefix.
///
/// # Binary Format
/// ```text
///   0   1   2   3   4   5   6   7
/// +---+---+---+---+---+---+---+---+
/// | PrefixBit |       Value       |
/// +---+---+---+-------------------+
/// ```
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) struct PrefixBit(u8);

impl PrefixBit {
    pub(crate) const INDEXED: Self = Self(0x80);
    pub(crate) const LITERAL_WITH_INDEXING: Self = Self(0x40);
    pub(crate) const SIZE_UPDATE: Self = Self(0x20);
    pub(crate) const LITERAL_NEVER_INDEXED: Self = Self(0x10);
    pub(crate) const LITERAL_WITHOUT_INDEXING: Self = Self(0x00);

    /// Creates a `PrefixBit` from a byte. The interface will convert the
    /// incoming byte to the most suitable prefix bit.
    pub(crate) fn from_u8(byte: u8) -> Self {
        match byte {
            x if x >= 0x80 => Self::INDEXED,
            x if x >= 0x40 => Self::LITERAL_WITH_INDEXING,
            x if x >= 0x20 => Self::SIZE_UPDATE,
            x if x >= 0x10 => Self::LITERAL_NEVER_INDEXED,
            _ => Self::LITERAL_WITHOUT_INDEXING,
        }
    }

    /// Returns the corresponding `PrefixIndexMask` according to the current
    /// prefix bit.
    pub(crate) fn prefix_index_mask(&self) -> PrefixIndexMask {
        match self.0 {
            0x80 => PrefixIndexMask::INDEXED,
            0x40 => PrefixIndexMask::LITERAL_WITH_INDEXING,
            0x20 => PrefixIndexMask::SIZE_UPDATE,
            0x10 => PrefixIndexMask::LITERAL_NEVER_INDEXED,
            _ => PrefixIndexMask::LITERAL_WITHOUT_INDEXING,
        }
    }
}

/// Prefix index mask of `Representation`.
///
/// # Binary Format
/// ```text
///   0   1   2   3   4   5   6   7
/// +---+---+---+---+---+---+---+---+
/// | PrefixBit |       Value       |
/// +---+---+---+-------------------+
///
/// +---+---+---+---+---+---+---+---+
/// | 0 | 0 | 0 | 1 | 1 | 1 | 1 | 1 |
/// +---+---+---+---+---+---+---+---+
/// |<-      PrefixIndexMask      ->|
/// ```
pub(crate) struct PrefixIndexMask(pub(crate) u8);

impl PrefixIndexMask {
    pub(crate) const INDEXED: Self = Self(0x7f);
    pub(crate) const LITERAL_WITH_INDEXING: Self = Self(0x3f);
    pub(crate) const SIZE_UPDATE: Self = Self(0x1f);
    pub(crate) const LITERAL_NEVER_INDEXED: Self = Self(0x0f);
    pub(crate) const LITERAL_WITHOUT_INDEXING: Self = Self(0x0f);

    /// The H bit and length mask of a string literal.
    pub(crate) const HUFFMAN: u8 = 0x80;
    pub(crate) const STRING_LENGTH: Self = Self(0x7f);
}

/// Decodes a single `Representation` from the front of `buf`, advancing the
/// cursor past the consumed bytes.
pub(crate) fn decode_representation(buf: &mut &[u8]) -> Result<Representation, HpackError> {
    let first = *buf.first().ok_or(HpackError::TruncatedInput)?;
    let prefix = PrefixBit::from_u8(first);
    let index = decode_integer(buf, prefix.prefix_index_mask().0)?;

    match prefix {
        PrefixBit::INDEXED => Ok(Representation::Indexed { index }),
        PrefixBit::SIZE_UPDATE => Ok(Representation::SizeUpdate { max_size: index }),
        _ => {
            let name = if index == 0 {
                Name::Literal(decode_string(buf)?)
            } else {
                Name::Index(index)
            };
            let value = decode_string(buf)?;
            match prefix {
                PrefixBit::LITERAL_WITH_INDEXING => {
                    Ok(Representation::LiteralWithIndexing { name, value })
                }
                PrefixBit::LITERAL_NEVER_INDEXED => {
                    Ok(Representation::LiteralNeverIndexed { name, value })
                }
                PrefixBit::LITERAL_WITHOUT_INDEXING => {
                    Ok(Representation::LiteralWithoutIndexing { name, value })
                }
                // `PrefixBit::from_u8` is total over the five patterns, so
                // this arm is unreachable unless the classification breaks.
                _ => Err(HpackError::MalformedFieldRepresentation),
            }
        }
    }
}

/// Serializes a single `Representation` to `dst`. Literal strings use the
/// Huffman code only when `use_huffman` is set and the coded form is no
/// longer than the raw octets.
pub(crate) fn encode_representation(repr: &Representation, use_huffman: bool, dst: &mut Vec<u8>) {
    match repr {
        Representation::Indexed { index } => {
            encode_integer(*index, PrefixIndexMask::INDEXED.0, 0x80, dst);
        }
        Representation::SizeUpdate { max_size } => {
            encode_integer(*max_size, PrefixIndexMask::SIZE_UPDATE.0, 0x20, dst);
        }
        Representation::LiteralWithIndexing { name, value } => {
            encode_literal(0x40, PrefixIndexMask::LITERAL_WITH_INDEXING.0, name, value, use_huffman, dst);
        }
        Representation::LiteralNeverIndexed { name, value } => {
            encode_literal(0x10, PrefixIndexMask::LITERAL_NEVER_INDEXED.0, name, value, use_huffman, dst);
        }
        Representation::LiteralWithoutIndexing { name, value } => {
            encode_literal(0x00, PrefixIndexMask::LITERAL_WITHOUT_INDEXING.0, name, value, use_huffman, dst);
        }
    }
}

fn encode_literal(
    prefix: u8,
    mask: u8,
    name: &Name,
    value: &[u8],
    use_huffman: bool,
    dst: &mut Vec<u8>,
) {
    match name {
        Name::Index(index) => encode_integer(*index, mask, prefix, dst),
        Name::Literal(name) => {
            encode_integer(0, mask, prefix, dst);
            encode_string(name, use_huffman, dst);
        }
    }
    encode_string(value, use_huffman, dst);
}

/// Decodes a length-prefixed, optionally Huffman-coded string literal.
///
/// The declared length is checked against the remaining input before any
/// allocation takes place, so a forged length can never trigger an
/// oversized allocation or an out-of-bounds read.
fn decode_string(buf: &mut &[u8]) -> Result<Vec<u8>, HpackError> {
    let first = *buf.first().ok_or(HpackError::TruncatedInput)?;
    let huffman = (first & PrefixIndexMask::HUFFMAN) != 0;
    let len = decode_integer(buf, PrefixIndexMask::STRING_LENGTH.0)?;
    if len > buf.len() {
        return Err(HpackError::TruncatedInput);
    }
    let (octets, rest) = buf.split_at(len);
    *buf = rest;
    if huffman {
        let mut dst = Vec::with_capacity(octets.len() << 1);
        huffman_decode(octets, &mut dst)?;
        Ok(dst)
    } else {
        Ok(octets.to_vec())
    }
}

fn encode_string(src: &[u8], use_huffman: bool, dst: &mut Vec<u8>) {
    if use_huffman && !src.is_empty() {
        let coded = huffman_encoded_len(src);
        if coded <= src.len() {
            encode_integer(coded, PrefixIndexMask::STRING_LENGTH.0, PrefixIndexMask::HUFFMAN, dst);
            huffman_encode(src, dst);
            return;
        }
    }
    encode_integer(src.len(), PrefixIndexMask::STRING_LENGTH.0, 0x00, dst);
    dst.extend_from_slice(src);
}

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

//! [Huffman coding] implementation of [HPACK] string literals.
//!
//! [Huffman coding]: https://en.wikipedia.org/wiki/Huffman_coding
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! # Huffman code in HTTP/2
//! There is a table of Huffman code in `RFC7541 Appendix B`. This
//! [Huffman code] was generated from statistics obtained on a large sample
//! of HTTP headers. It is a canonical Huffman code with some tweaking to
//! ensure that no symbol has a unique code length.
//!
//! [Huffman code]: https://www.rfc-editor.org/rfc/rfc7541.html#ref-HUFFMAN

mod consts;

use core::cmp::Ordering;
use std::sync::OnceLock;

use consts::{EOS, HUFFMAN_CODES};

use crate::error::HpackError;

/// Converts a string to a Huffman code, and then puts it into the
/// specified `Vec<u8>`. The final byte is padded with the high-order bits
/// of the EOS code (all ones) up to the byte boundary.
pub(crate) fn huffman_encode(src: &[u8], dst: &mut Vec<u8>) {
    // We use `state` to hold temporary encoding state, and `unfilled` for
    // the number of bits in `state` not yet occupied. Each symbol's code is
    // placed MSB-first into `state`; whenever `state` fills up, its eight
    // bytes are flushed to `dst`.
    let mut state = 0u64;
    let mut unfilled = 64u8;

    for byte in src.iter() {
        let (nbits, code) = HUFFMAN_CODES[*byte as usize];
        let code = code as u64;
        match unfilled.cmp(&nbits) {
            Ordering::Greater => {
                state |= code << (unfilled - nbits);
                unfilled -= nbits;
            }
            Ordering::Equal => {
                state |= code;
                dst.extend_from_slice(&state.to_be_bytes());
                state = 0;
                unfilled = 64;
            }
            // The code straddles the state boundary: the high part finishes
            // the current `state`, the low part starts the next one.
            Ordering::Less => {
                let spill = nbits - unfilled;
                state |= code >> spill;
                dst.extend_from_slice(&state.to_be_bytes());
                state = code << (64 - spill);
                unfilled = 64 - spill;
            }
        }
    }

    // RFC7541-5.2: pad the remainder of the last byte with the most
    // significant bits of the EOS code.
    if unfilled != 64 {
        state |= u64::MAX >> (64 - unfilled);
        let len = 8 - (unfilled >> 3) as usize;
        dst.extend_from_slice(&state.to_be_bytes()[..len]);
    }
}

/// Returns the exact number of bytes `huffman_encode` would produce for
/// `src`, without encoding. Used to pick the shorter of the raw and
/// Huffman string forms.
pub(crate) fn huffman_encoded_len(src: &[u8]) -> usize {
    let bits: usize = src
        .iter()
        .map(|byte| HUFFMAN_CODES[*byte as usize].0 as usize)
        .sum();
    (bits + 7) / 8
}

/// Converts a Huffman code into a literal string, and then puts it into the
/// specified `Vec<u8>`.
///
/// Fails with [`HpackError::InvalidHuffmanCode`] on a bit sequence that
/// resolves to no symbol, a sequence containing the EOS symbol, padding
/// longer than 7 bits, or padding bits that are not a prefix of EOS.
pub(crate) fn huffman_decode(src: &[u8], dst: &mut Vec<u8>) -> Result<(), HpackError> {
    let tree = decode_tree();
    let mut node = 0usize;
    // Bits consumed since the last completed symbol, and whether all of
    // them were ones. Valid padding is an all-ones EOS prefix of at most 7
    // bits.
    let mut pending = 0u8;
    let mut all_ones = true;

    for byte in src.iter() {
        for shift in (0..8).rev() {
            let bit = (byte >> shift) & 1;
            node = match tree[node].children[bit as usize] {
                Some(next) => next as usize,
                None => return Err(HpackError::InvalidHuffmanCode),
            };
            pending += 1;
            all_ones &= bit == 1;
            if let Some(symbol) = tree[node].symbol {
                // RFC7541-5.2: a Huffman-encoded string literal containing
                // the EOS symbol MUST be treated as a decoding error.
                if symbol as usize == EOS {
                    return Err(HpackError::InvalidHuffmanCode);
                }
                dst.push(symbol as u8);
                node = 0;
                pending = 0;
                all_ones = true;
            }
        }
    }

    if pending == 0 || (all_ones && pending <= 7) {
        Ok(())
    } else {
        Err(HpackError::InvalidHuffmanCode)
    }
}

/// A node of the Huffman decode trie. Leaves carry the decoded symbol.
struct HuffmanNode {
    children: [Option<u16>; 2],
    symbol: Option<u16>,
}

impl HuffmanNode {
    const fn new() -> Self {
        Self {
            children: [None, None],
            symbol: None,
        }
    }
}

/// Returns the decode trie built from [`HUFFMAN_CODES`], constructing it on
/// first use. The table is never mutated after load.
fn decode_tree() -> &'static [HuffmanNode] {
    static TREE: OnceLock<Vec<HuffmanNode>> = OnceLock::new();
    TREE.get_or_init(|| {
        let mut nodes = vec![HuffmanNode::new()];
        for (symbol, (nbits, code)) in HUFFMAN_CODES.iter().enumerate() {
            let mut node = 0usize;
            for shift in (0..*nbits).rev() {
                let bit = ((code >> shift) & 1) as usize;
                node = match nodes[node].children[bit] {
                    Some(next) => next as usize,
                    None => {
                        let next = nodes.len();
                        nodes[node].children[bit] = Some(next as u16);
                        nodes.push(HuffmanNode::new());
                        next
                    }
                };
            }
            nodes[node].symbol = Some(symbol as u16);
        }
        nodes
    })
}

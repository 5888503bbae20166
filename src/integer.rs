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

//! [Integer Representation] implementation of [HPACK].
//!
//! [Integer Representation]: https://httpwg.org/specs/rfc7541.html#integer.representation
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! # Introduction
//! Integers are used to represent name indexes, header field indexes, or
//! string lengths. An integer representation can start anywhere within an
//! octet. To allow for optimized processing, an integer representation always
//! finishes at the end of an octet.

use crate::error::HpackError;

/// Encodes an integer according to `Pseudocode to represent an integer I` in
/// `RFC7541 section-5.1` and appends the result to `dst`.
///
/// `mask` is the all-ones prefix mask (e.g. `0x7f` for a 7-bit prefix) and
/// `prefix` is the representation pattern already occupying the remaining
/// high bits of the first byte.
///
/// # Pseudocode
/// ```text
/// if I < 2^N - 1, encode I on N bits
/// else
///     encode (2^N - 1) on N bits
///     I = I - (2^N - 1)
///     while I >= 128
///          encode (I % 128 + 128) on 8 bits
///          I = I / 128
///     encode I on 8 bits
/// ```
pub(crate) fn encode_integer(mut value: usize, mask: u8, prefix: u8, dst: &mut Vec<u8>) {
    if value < mask as usize {
        dst.push(prefix | (value as u8));
        return;
    }
    dst.push(prefix | mask);
    value -= mask as usize;
    while value >= 128 {
        dst.push(((value & 0x7f) as u8) | 0x80);
        value >>= 7;
    }
    dst.push(value as u8);
}

/// Decodes an integer according to `Pseudocode to decode an integer I` in
/// `RFC7541 section-5.1`, advancing `buf` past the consumed bytes.
///
/// Fails with [`HpackError::TruncatedInput`] if the continuation bits
/// promise more bytes than `buf` holds, and with
/// [`HpackError::IntegerOverflow`] if the value does not fit in `usize`.
/// Overflow is detected with checked arithmetic before the value is ever
/// used, never by wraparound.
///
/// # Pseudocode
/// ```text
/// decode I from the next N bits
/// if I < 2^N - 1, return I
/// else
///     M = 0
///     repeat
///         B = next octet
///         I = I + (B & 127) * 2^M
///         M = M + 7
///     while B & 128 == 128
///     return I
/// ```
pub(crate) fn decode_integer(buf: &mut &[u8], mask: u8) -> Result<usize, HpackError> {
    let (first, rest) = buf.split_first().ok_or(HpackError::TruncatedInput)?;
    *buf = rest;

    let mut value = (first & mask) as usize;
    if value < mask as usize {
        return Ok(value);
    }

    let mut shift = 0u32;
    loop {
        let (byte, rest) = buf.split_first().ok_or(HpackError::TruncatedInput)?;
        *buf = rest;

        value = 1usize
            .checked_shl(shift)
            .and_then(|m| m.checked_mul((byte & 0x7f) as usize))
            .and_then(|add| add.checked_add(value))
            .ok_or(HpackError::IntegerOverflow)?;
        if (byte & 0x80) == 0 {
            return Ok(value);
        }
        shift += 7;
    }
}

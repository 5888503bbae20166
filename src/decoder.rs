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

//! [HPACK] decoder implementation.
//!
//! [HPACK]: https://httpwg.org/specs/rfc7541.html

use crate::error::HpackError;
use crate::field::HeaderField;
use crate::representation::{decode_representation, Name, Representation};
use crate::table::{DynamicTable, TableSearcher};

/// Decoder implementation of [HPACK].
///
/// [HPACK]: https://httpwg.org/specs/rfc7541.html
///
/// The decoder owns one [`DynamicTable`] per connection direction and
/// replays every table mutation the peer's encoder performed, so both
/// tables stay equal without any shared state.
///
/// Decoder failure is terminal: once [`decode`](HpackDecoder::decode)
/// returns an error, the table state is unrecoverable and the instance
/// must be discarded along with the connection.
pub struct HpackDecoder {
    table: DynamicTable,
    /// Protocol-negotiated ceiling for the table size. In-band size
    /// updates above this value are a compression error.
    limit: usize,
    max_header_list_size: usize,
    /// Set when `update_table_size_limit` lowered the ceiling below the
    /// table's current maximum size. The peer must acknowledge the new
    /// limit with an in-band size update before any dynamic table
    /// reference is legal again.
    need_size_update: bool,
}

impl HpackDecoder {
    /// Creates an `HpackDecoder` with the given dynamic table size and
    /// header list size limit.
    pub fn with_max_size(header_table_size: usize, max_header_list_size: usize) -> Self {
        Self {
            table: DynamicTable::with_max_size(header_table_size),
            limit: header_table_size,
            max_header_list_size,
            need_size_update: false,
        }
    }

    /// Decodes a complete header block into the header list it represents.
    ///
    /// The block is consumed in full; a representation that runs past the
    /// end of the input fails with [`HpackError::TruncatedInput`]. After
    /// any error the decoder must not be reused.
    pub fn decode(&mut self, block: &[u8]) -> Result<Vec<HeaderField>, HpackError> {
        let mut buf = block;
        let mut fields = Vec::new();
        let mut list_size = 0usize;
        while !buf.is_empty() {
            match decode_representation(&mut buf)? {
                Representation::Indexed { index } => {
                    let (name, value) = self.field_by_index(index)?;
                    self.push_field(HeaderField::new(name, value), &mut list_size, &mut fields)?;
                }
                Representation::LiteralWithIndexing { name, value } => {
                    let name = self.name_by_repr(name)?;
                    self.table.update(name.clone(), value.clone());
                    self.push_field(HeaderField::new(name, value), &mut list_size, &mut fields)?;
                }
                Representation::LiteralWithoutIndexing { name, value } => {
                    let name = self.name_by_repr(name)?;
                    self.push_field(HeaderField::new(name, value), &mut list_size, &mut fields)?;
                }
                Representation::LiteralNeverIndexed { name, value } => {
                    let name = self.name_by_repr(name)?;
                    self.push_field(
                        HeaderField::new_sensitive(name, value),
                        &mut list_size,
                        &mut fields,
                    )?;
                }
                Representation::SizeUpdate { max_size } => {
                    if max_size > self.limit {
                        return Err(HpackError::SizeUpdateViolation);
                    }
                    self.table.update_size(max_size);
                    self.need_size_update = false;
                }
            }
        }
        Ok(fields)
    }

    /// Notifies the decoder of a new protocol-level table size ceiling,
    /// typically from a settings exchange.
    ///
    /// Lowering the ceiling below the table's current maximum size arms a
    /// guard: the peer is required to emit an in-band size update at or
    /// below the new ceiling, and until one arrives every dynamic table
    /// reference fails with [`HpackError::SizeUpdateViolation`]. Static
    /// table references do not depend on table state and stay legal.
    pub fn update_table_size_limit(&mut self, max_size: usize) {
        self.limit = max_size;
        self.need_size_update = max_size < self.table.max_size();
    }

    /// Returns the dynamic table for diagnostics.
    pub fn table(&self) -> &DynamicTable {
        &self.table
    }

    fn field_by_index(&self, index: usize) -> Result<(Vec<u8>, Vec<u8>), HpackError> {
        self.check_dynamic_ref(index)?;
        TableSearcher::new(&self.table)
            .field(index)
            .ok_or(HpackError::InvalidIndex)
    }

    fn name_by_repr(&self, name: Name) -> Result<Vec<u8>, HpackError> {
        match name {
            Name::Index(index) => {
                self.check_dynamic_ref(index)?;
                TableSearcher::new(&self.table)
                    .field_name(index)
                    .ok_or(HpackError::InvalidIndex)
            }
            Name::Literal(octets) => Ok(octets),
        }
    }

    fn check_dynamic_ref(&self, index: usize) -> Result<(), HpackError> {
        if self.need_size_update && index > crate::table::STATIC_TABLE_SIZE {
            return Err(HpackError::SizeUpdateViolation);
        }
        Ok(())
    }

    fn push_field(
        &self,
        field: HeaderField,
        list_size: &mut usize,
        fields: &mut Vec<HeaderField>,
    ) -> Result<(), HpackError> {
        *list_size += field.size();
        if *list_size > self.max_header_list_size {
            return Err(HpackError::HeaderListTooLarge);
        }
        fields.push(field);
        Ok(())
    }
}

#[cfg(test)]
mod ut_decoder {
    use super::HpackDecoder;
    use crate::error::HpackError;
    use crate::field::HeaderField;
    use crate::test_util::decode;

    const MAX_HEADER_LIST_SIZE: usize = 16 << 20;

    macro_rules! decoder_test_case {
        (
            $decoder: expr, $block: expr =>
            $(($name: expr, $value: expr)),* $(,)? ;
            $size: expr
        ) => {
            let block = decode($block).unwrap();
            let fields = $decoder.decode(&block).unwrap();
            let expected: Vec<HeaderField> = vec![$(field($name, $value)),*];
            assert_eq!(fields, expected);
            assert_eq!($decoder.table().curr_size(), $size);
        };
    }

    fn field(name: &str, value: &str) -> HeaderField {
        HeaderField::new(name, value)
    }

    /// UT test cases for `HpackDecoder::decode`.
    ///
    /// # Brief
    /// 1. Creates an `HpackDecoder`.
    /// 2. Decodes the single-representation examples from
    ///    `RFC7541 Appendix C.2`.
    /// 3. Checks the header lists and table sizes.
    #[test]
    fn ut_hpack_decoder_single_representations() {
        // C.2.1. Literal Header Field with Indexing.
        let mut decoder = HpackDecoder::with_max_size(4096, MAX_HEADER_LIST_SIZE);
        decoder_test_case!(
            decoder, "400a637573746f6d2d6b65790d637573746f6d2d686561646572" =>
            ("custom-key", "custom-header"); 55
        );

        // C.2.2. Literal Header Field without Indexing.
        let mut decoder = HpackDecoder::with_max_size(4096, MAX_HEADER_LIST_SIZE);
        decoder_test_case!(
            decoder, "040c2f73616d706c652f70617468" =>
            (":path", "/sample/path"); 0
        );

        // C.2.3. Literal Header Field Never Indexed.
        let mut decoder = HpackDecoder::with_max_size(4096, MAX_HEADER_LIST_SIZE);
        let block = decode("100870617373776f726406736563726574").unwrap();
        let fields = decoder.decode(&block).unwrap();
        assert_eq!(
            fields,
            vec![HeaderField::new_sensitive("password", "secret")]
        );
        assert!(fields[0].is_sensitive());
        assert_eq!(decoder.table().curr_size(), 0);

        // C.2.4. Indexed Header Field.
        let mut decoder = HpackDecoder::with_max_size(4096, MAX_HEADER_LIST_SIZE);
        decoder_test_case!(decoder, "82" => (":method", "GET"); 0);
    }

    /// UT test cases for `HpackDecoder::decode`.
    ///
    /// # Brief
    /// 1. Creates an `HpackDecoder`.
    /// 2. Decodes the request sequence from `RFC7541 Appendix C.3` on one
    ///    decoder instance.
    /// 3. Checks the header lists and the evolving table sizes.
    #[test]
    fn ut_hpack_decoder_request_without_huffman() {
        let mut decoder = HpackDecoder::with_max_size(4096, MAX_HEADER_LIST_SIZE);

        // C.3.1. First Request.
        decoder_test_case!(
            decoder, "828684410f7777772e6578616d706c652e636f6d" =>
            (":method", "GET"),
            (":scheme", "http"),
            (":path", "/"),
            (":authority", "www.example.com");
            57
        );

        // C.3.2. Second Request.
        decoder_test_case!(
            decoder, "828684be58086e6f2d6361636865" =>
            (":method", "GET"),
            (":scheme", "http"),
            (":path", "/"),
            (":authority", "www.example.com"),
            ("cache-control", "no-cache");
            110
        );

        // C.3.3. Third Request.
        decoder_test_case!(
            decoder, "828785bf400a637573746f6d2d6b65790c637573746f6d2d76616c7565" =>
            (":method", "GET"),
            (":scheme", "https"),
            (":path", "/index.html"),
            (":authority", "www.example.com"),
            ("custom-key", "custom-value");
            164
        );
    }

    /// UT test cases for `HpackDecoder::decode`.
    ///
    /// # Brief
    /// 1. Creates an `HpackDecoder`.
    /// 2. Decodes the Huffman-coded request sequence from
    ///    `RFC7541 Appendix C.4` on one decoder instance.
    /// 3. Checks the header lists and the evolving table sizes.
    #[test]
    fn ut_hpack_decoder_request_with_huffman() {
        let mut decoder = HpackDecoder::with_max_size(4096, MAX_HEADER_LIST_SIZE);

        // C.4.1. First Request.
        decoder_test_case!(
            decoder, "828684418cf1e3c2e5f23a6ba0ab90f4ff" =>
            (":method", "GET"),
            (":scheme", "http"),
            (":path", "/"),
            (":authority", "www.example.com");
            57
        );

        // C.4.2. Second Request.
        decoder_test_case!(
            decoder, "828684be5886a8eb10649cbf" =>
            (":method", "GET"),
            (":scheme", "http"),
            (":path", "/"),
            (":authority", "www.example.com"),
            ("cache-control", "no-cache");
            110
        );

        // C.4.3. Third Request.
        decoder_test_case!(
            decoder, "828785bf408825a849e95ba97d7f8925a849e95bb8e8b4bf" =>
            (":method", "GET"),
            (":scheme", "https"),
            (":path", "/index.html"),
            (":authority", "www.example.com"),
            ("custom-key", "custom-value");
            164
        );
    }

    /// UT test cases for `HpackDecoder::decode`.
    ///
    /// # Brief
    /// 1. Creates an `HpackDecoder` with a 256-octet table.
    /// 2. Decodes the response sequence from `RFC7541 Appendix C.5` on one
    ///    decoder instance, forcing evictions.
    /// 3. Checks the header lists and the evolving table sizes.
    #[test]
    fn ut_hpack_decoder_response_without_huffman() {
        let mut decoder = HpackDecoder::with_max_size(256, MAX_HEADER_LIST_SIZE);

        // C.5.1. First Response.
        decoder_test_case!(
            decoder,
            "4803333032580770726976617465611d4d6f6e2c203231204f637420323031332032303a31333a323120474d546e1768747470733a2f2f7777772e6578616d706c652e636f6d" =>
            (":status", "302"),
            ("cache-control", "private"),
            ("date", "Mon, 21 Oct 2013 20:13:21 GMT"),
            ("location", "https://www.example.com");
            222
        );

        // C.5.2. Second Response. The insertion evicts ":status: 302".
        decoder_test_case!(
            decoder, "4803333037c1c0bf" =>
            (":status", "307"),
            ("cache-control", "private"),
            ("date", "Mon, 21 Oct 2013 20:13:21 GMT"),
            ("location", "https://www.example.com");
            222
        );

        // C.5.3. Third Response. Two more entries are evicted.
        decoder_test_case!(
            decoder,
            "88c1611d4d6f6e2c203231204f637420323031332032303a31333a323220474d54c05a04677a69709477696e5a69643d455854524f4e455552373b206d61782d6167653d333630303b2076657273696f6e3d3163" =>
            (":status", "200"),
            ("cache-control", "private"),
            ("date", "Mon, 21 Oct 2013 20:13:22 GMT"),
            ("location", "https://www.example.com"),
            ("content-encoding", "gzip"),
            ("set-cookie", "foo=ASDJKHQKBZXOQWEOPIUAXQWEOIU; max-age=3600; version=1");
            215
        );
        assert_eq!(decoder.table().len(), 3);
    }

    /// UT test cases for `HpackDecoder::decode`.
    ///
    /// # Brief
    /// 1. Creates an `HpackDecoder` with a 256-octet table.
    /// 2. Decodes the Huffman-coded response sequence from
    ///    `RFC7541 Appendix C.6` on one decoder instance.
    /// 3. Checks the header lists and the evolving table sizes.
    #[test]
    fn ut_hpack_decoder_response_with_huffman() {
        let mut decoder = HpackDecoder::with_max_size(256, MAX_HEADER_LIST_SIZE);

        // C.6.1. First Response.
        decoder_test_case!(
            decoder,
            "488264025885aec3771a4b6196d07abe941054d444a8200595040b8166e082a62d1bff6e919d29ad171863c78f0b97c8e9ae82ae43d3" =>
            (":status", "302"),
            ("cache-control", "private"),
            ("date", "Mon, 21 Oct 2013 20:13:21 GMT"),
            ("location", "https://www.example.com");
            222
        );

        // C.6.2. Second Response.
        decoder_test_case!(
            decoder, "4883640effc1c0bf" =>
            (":status", "307"),
            ("cache-control", "private"),
            ("date", "Mon, 21 Oct 2013 20:13:21 GMT"),
            ("location", "https://www.example.com");
            222
        );

        // C.6.3. Third Response.
        decoder_test_case!(
            decoder,
            "88c16196d07abe941054d444a8200595040b8166e084a62d1bffc05a839bd9ab77ad94e7821dd7f2e6c7b335dfdfcd5b3960d5af27087f3672c1ab270fb5291f9587316065c003ed4ee5b1063d5007" =>
            (":status", "200"),
            ("cache-control", "private"),
            ("date", "Mon, 21 Oct 2013 20:13:22 GMT"),
            ("location", "https://www.example.com"),
            ("content-encoding", "gzip"),
            ("set-cookie", "foo=ASDJKHQKBZXOQWEOPIUAXQWEOIU; max-age=3600; version=1");
            215
        );
    }

    /// UT test cases for `HpackDecoder::decode` error paths.
    ///
    /// # Brief
    /// 1. Decodes blocks carrying each class of malformed input.
    /// 2. Checks that the distinct error kinds are reported.
    #[test]
    fn ut_hpack_decoder_errors() {
        // Index 0 is never valid.
        let mut decoder = HpackDecoder::with_max_size(4096, MAX_HEADER_LIST_SIZE);
        assert_eq!(decoder.decode(&[0x80]), Err(HpackError::InvalidIndex));

        // Index 62 with an empty dynamic table is past the union.
        let mut decoder = HpackDecoder::with_max_size(4096, MAX_HEADER_LIST_SIZE);
        assert_eq!(decoder.decode(&[0xbe]), Err(HpackError::InvalidIndex));

        // An indexed name past the union fails the same way.
        let mut decoder = HpackDecoder::with_max_size(4096, MAX_HEADER_LIST_SIZE);
        assert_eq!(decoder.decode(&[0x7f, 0x00]), Err(HpackError::InvalidIndex));

        // A size update above the negotiated ceiling.
        let mut decoder = HpackDecoder::with_max_size(4096, MAX_HEADER_LIST_SIZE);
        decoder.update_table_size_limit(100);
        // 200 with a 5-bit prefix.
        assert_eq!(
            decoder.decode(&[0x3f, 0xa9, 0x01]),
            Err(HpackError::SizeUpdateViolation)
        );

        // Truncated string literal.
        let mut decoder = HpackDecoder::with_max_size(4096, MAX_HEADER_LIST_SIZE);
        let block = decode("400a637573746f6d").unwrap();
        assert_eq!(decoder.decode(&block), Err(HpackError::TruncatedInput));

        // Malformed Huffman padding inside a literal.
        let mut decoder = HpackDecoder::with_max_size(4096, MAX_HEADER_LIST_SIZE);
        let block = decode("0481ff").unwrap();
        assert_eq!(decoder.decode(&block), Err(HpackError::InvalidHuffmanCode));
    }

    /// UT test cases for `HpackDecoder::update_table_size_limit`.
    ///
    /// # Brief
    /// 1. Fills a dynamic table, then lowers the ceiling.
    /// 2. Checks that dynamic references fail until an in-band size update
    ///    at or below the ceiling arrives, while static references and
    ///    literals stay legal.
    #[test]
    fn ut_hpack_decoder_size_limit_crossing() {
        let mut decoder = HpackDecoder::with_max_size(4096, MAX_HEADER_LIST_SIZE);
        let block = decode("410f7777772e6578616d706c652e636f6d").unwrap();
        decoder.decode(&block).unwrap();
        assert_eq!(decoder.table().curr_size(), 57);

        decoder.update_table_size_limit(100);

        // Dynamic reference before the in-band update.
        assert_eq!(decoder.decode(&[0xbe]), Err(HpackError::SizeUpdateViolation));

        // Static references are still legal.
        let mut decoder = HpackDecoder::with_max_size(4096, MAX_HEADER_LIST_SIZE);
        decoder.decode(&decode("410f7777772e6578616d706c652e636f6d").unwrap()).unwrap();
        decoder.update_table_size_limit(100);
        assert_eq!(
            decoder.decode(&[0x82]),
            Ok(vec![HeaderField::new(":method", "GET")])
        );

        // An in-band update at the ceiling disarms the guard; the entry
        // survived the shrink and is referable again.
        let block = decode("3f45be").unwrap();
        assert_eq!(
            decoder.decode(&block),
            Ok(vec![HeaderField::new(":authority", "www.example.com")])
        );
        assert_eq!(decoder.table().max_size(), 100);
    }

    /// UT test cases for the header list size guard.
    ///
    /// # Brief
    /// 1. Creates an `HpackDecoder` with a small header list limit.
    /// 2. Decodes a block whose cumulative field sizes exceed it.
    /// 3. Checks that `HeaderListTooLarge` is reported.
    #[test]
    fn ut_hpack_decoder_header_list_too_large() {
        let mut decoder = HpackDecoder::with_max_size(4096, 60);
        // ":method: GET" costs 42 octets, two of them cross 60.
        assert_eq!(decoder.decode(&[0x82]), Ok(vec![field(":method", "GET")]));

        let mut decoder = HpackDecoder::with_max_size(4096, 60);
        assert_eq!(
            decoder.decode(&[0x82, 0x82]),
            Err(HpackError::HeaderListTooLarge)
        );
    }
}

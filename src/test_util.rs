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

//! Test utilities.

/// Decodes a hex string into octets. Returns `None` if the string has an
/// odd length or holds a non-hex character.
pub fn decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    let mut result = Vec::with_capacity(s.len() / 2);
    let bytes = s.as_bytes();
    for chunk in bytes.chunks(2) {
        let high = hex_value(chunk[0])?;
        let low = hex_value(chunk[1])?;
        result.push((high << 4) | low);
    }
    Some(result)
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod ut_test_util {
    use super::decode;

    /// UT test cases for `decode`.
    ///
    /// # Brief
    /// 1. Calls `decode`, passing in valid and invalid hex strings.
    /// 2. Checks if the test results are correct.
    #[test]
    fn ut_test_util_decode() {
        assert_eq!(decode(""), Some(Vec::new()));
        assert_eq!(decode("828684"), Some(vec![0x82, 0x86, 0x84]));
        assert_eq!(decode("FFff"), Some(vec![0xff, 0xff]));
        assert_eq!(decode("8"), None);
        assert_eq!(decode("8g"), None);
    }
}

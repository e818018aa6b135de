#![no_main]

use ctestfw::inspect::{HEADER_PREFIX_LEN, classify_header};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let kind = classify_header(data);
    // Bytes past the header prefix never change the verdict
    let prefix = &data[..data.len().min(HEADER_PREFIX_LEN)];
    assert_eq!(kind, classify_header(prefix));
});

#![no_main]

use libfuzzer_sys::fuzz_target;
use snowshoe::derive::parse_capture_date;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let _ = parse_capture_date(input);
    }
});

#![no_main]

use libfuzzer_sys::fuzz_target;
use snowshoe::loader::read_observations;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as a CSV body under a valid header.
    // Loading should never panic, whatever the rows contain.
    if let Ok(body) = std::str::from_utf8(data) {
        let input = format!("date,grid,age,sex,hindft,weight\n{}", body);
        let _ = read_observations(std::io::Cursor::new(input));
    }
});

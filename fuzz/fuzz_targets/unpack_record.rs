#![no_main]
use libfuzzer_sys::fuzz_target;
use rawpack::Format;

fuzz_target!(|data: &[u8]| {
    let format = Format::parse("bBhHiIqQs3sS4S").unwrap();
    if let Ok(values) = format.unpack(data) {
        // Whatever decodes must pack again without error
        let _ = format.pack(&values).unwrap();
    }
});

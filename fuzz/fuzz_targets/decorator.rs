#![no_main]

use gclog_ingest::decorator;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    if let Some((dec, message)) = decorator::split(&text) {
        assert!(dec.len <= text.len());
        assert!(message.len() <= text.len() - dec.len);
    }
});

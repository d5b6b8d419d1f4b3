#![no_main]

use libfuzzer_sys::fuzz_target;
use qvdscope::decode_bytes;

fuzz_target!(|data: &[u8]| {
    if let Ok(table) = decode_bytes(data) {
        // Constant tables may declare more rows than fit in memory
        if table.row_count() <= 1 << 16 {
            let _ = table.to_frame();
        }
    }
});

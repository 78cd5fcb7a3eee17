#![no_main]

use std::path::Path;

use hw_projects_storage::compute_shard_path;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(contract_no) = std::str::from_utf8(data) else {
        return;
    };
    let shard = compute_shard_path(Path::new("/volume"), contract_no);
    // Placeholders replace ASCII digits one for one.
    assert_eq!(shard.shard4.len(), contract_no.len());
    assert_eq!(shard.shard3.len(), contract_no.len());
    let _ = shard.dir();
});

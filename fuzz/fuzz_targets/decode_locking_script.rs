#![no_main]

use boostpow::Job;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(job) = Job::from_locking_script(data) {
        let re_encoded = job.to_locking_script();
        let _ = Job::from_locking_script(&re_encoded);
    }
});

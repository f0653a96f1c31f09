#![no_main]

use boostpow::Redeem;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&flags, rest)) = data.split_first() else { return };
    let is_bounty = flags & 0b01 != 0;
    let is_v2 = flags & 0b10 != 0;
    if let Ok(redeem) = Redeem::from_unlocking_script(rest, is_bounty, is_v2) {
        let re_encoded = redeem.to_unlocking_script();
        let _ = Redeem::from_unlocking_script(&re_encoded, is_bounty, is_v2);
    }
});

#![no_main]

use libfuzzer_sys::fuzz_target;
use powdist_distributor::accept_reply;
use powdist_types::WorkRequest;
use powdist_work::NanoWorkValidator;

const HASH: &str = "718CC2121C3E641059BC1C2CFC45666C99E8AE922F7A807B7D07B62C995D79E2";

fuzz_target!(|data: &[u8]| {
    // Arbitrary backend replies must be accepted or rejected, never panic.
    let Ok(reply) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let validator = NanoWorkValidator::new();
    let _ = accept_reply(reply, &validator, &WorkRequest::new(HASH));
});

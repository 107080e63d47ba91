//! Fuzz target: `Envelope::decode_bytes`
//!
//! Drives arbitrary bytes into the envelope decoder and asserts that it
//! never panics and that anything it accepts re-encodes to a frame that
//! decodes to the same envelope.
//!
//! cargo fuzz run fuzz_envelope_decode

#![no_main]

use irrigation::telemetry::envelope::Envelope;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(env) = Envelope::decode_bytes(data) {
        let again = Envelope::decode(&env.encode()).expect("re-encoded envelope must decode");
        assert_eq!(again.kind, env.kind);
        assert_eq!(again.payload.len(), env.payload.len());
    }
});

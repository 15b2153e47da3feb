#![no_main]

use libfuzzer_sys::fuzz_target;
use offtarget::fingerprint::bridge::{parse_reply, parse_set_bits};
use offtarget::fingerprint::{Featurizer, FingerprintAdapter, LineProtocol};
use std::io::{self, Cursor};

fuzz_target!(|data: &[u8]| {
    // Single reply lines must be rejected cleanly, never panic
    if let Ok(text) = std::str::from_utf8(data) {
        for line in text.lines() {
            if let Ok(payload) = parse_reply(line) {
                let _ = parse_set_bits(payload);
            }
        }
    }

    // Treat the input as everything a misbehaving bridge writes to stdout
    let protocol = LineProtocol::new(Cursor::new(data), io::sink());
    let mut adapter = FingerprintAdapter::new(protocol);
    for descriptor in ["CCO", "c1ccccc1", "CC(=O)Oc1ccccc1C(=O)O"] {
        let poisoned = adapter.engine().is_poisoned();
        let result = adapter.compute(descriptor);
        if poisoned {
            assert!(matches!(result, Err(ref e) if e.is_session_lost()));
        }
    }
    let _ = adapter.close();
});

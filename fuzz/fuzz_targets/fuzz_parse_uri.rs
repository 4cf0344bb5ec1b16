#![no_main]

use couchlink::ClientUri;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Arbitrary input must either parse or fail cleanly, never panic.
    let _ = ClientUri::parse(text, None);

    // Force the prefix so the parser body gets exercised too.
    let uri = format!("jdbc:couchbase:{text}");
    if let Ok(parsed) = ClientUri::parse(&uri, None) {
        let _ = parsed.connection_string_with_scheme();
        let _ = parsed.to_string();
    }
});

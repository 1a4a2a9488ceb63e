#![no_main]

//! Formatting must never panic and must be idempotent: formatting the
//! output a second time yields the same bytes.

use libfuzzer_sys::fuzz_target;
use mdtidy_lib::format_source;

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };

    // Skip extreme inputs
    if content.len() > 50_000 {
        return;
    }

    let Ok(first) = format_source(content) else {
        return;
    };
    if first.fell_back {
        return;
    }

    for line in first.content.split('\n') {
        assert!(!line.ends_with(' ') && !line.ends_with('\t'), "trailing whitespace survived");
    }

    let second = format_source(&first.content).expect("formatted output must parse");
    assert_eq!(first.content, second.content, "Formatting is not idempotent");
});

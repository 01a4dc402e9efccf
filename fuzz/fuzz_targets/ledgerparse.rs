#![no_main]

use ledgerparse::LedgerParser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let parser = LedgerParser::default();
        let strict = parser.parse_entries(text);
        let (entries, errors) = parser.parse_recovering(text);

        // a clean strict parse leaves nothing for recovery to skip
        if let Ok(strict) = strict {
            assert!(errors.is_empty());
            assert_eq!(strict, entries);
        }
        for err in errors {
            assert!(err.offset() <= text.len());
        }
    }
});

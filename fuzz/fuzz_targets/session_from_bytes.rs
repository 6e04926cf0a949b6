#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let cfg = dwarf_headers::ExtractConfig::default();
    if let Ok(session) = dwarf_headers::Session::from_bytes(data) {
        if let Ok(outcome) = session.extract(&cfg) {
            let _ = dwarf_headers::emit::render_udts(&outcome.registry, &cfg.emit);
        }
    }
});

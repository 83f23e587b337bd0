#![no_main]

use hat_roles::ManagerConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Anything that parses must also pass validation.
    if let Ok(config) = ManagerConfig::from_json_str(text) {
        assert!(config.validate().is_ok());
    }
});

//! Fuzz target: persisted config blob
//!
//! Feeds arbitrary bytes to the config store as if read back from flash.
//! Loading must never panic, and anything it accepts must pass validation
//! and survive a save/load cycle.
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use libfuzzer_sys::fuzz_target;
use wheeltest::adapters::nvs::NvsAdapter;
use wheeltest::app::ports::ConfigPort;

fuzz_target!(|data: &[u8]| {
    let nvs = NvsAdapter::new().expect("sim NVS");
    nvs.put_raw(data);

    if let Ok(cfg) = nvs.load() {
        assert_eq!(cfg.validate(), Ok(()));
        nvs.save(&cfg).expect("valid config must save");
        assert_eq!(nvs.load().expect("reload"), cfg);
    }
});

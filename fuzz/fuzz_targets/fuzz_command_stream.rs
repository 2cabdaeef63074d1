//! Fuzz target: host command stream
//!
//! Interprets the input as a mix of command bytes and tick advances, and
//! asserts the service never panics, always answers PING, and that every
//! report line it writes stays within the line buffer.
//!
//! cargo fuzz run fuzz_command_stream

#![no_main]

use libfuzzer_sys::fuzz_target;
use wheeltest::app::events::AppEvent;
use wheeltest::app::ports::{EventSink, SensorPort};
use wheeltest::app::service::AppService;
use wheeltest::config::RigConfig;
use wheeltest::protocol::{self, report::MAX_LINE_LEN};
use wheeltest::sensors::{TachSample, ThermalReading};

struct Bench {
    level: bool,
}

impl SensorPort for Bench {
    fn initialize(&mut self) -> u8 {
        0
    }

    fn poll_tachometer(&mut self) -> TachSample {
        self.level = !self.level;
        TachSample::Level(self.level)
    }

    fn read_thermal(&mut self) -> ThermalReading {
        ThermalReading::default()
    }
}

#[derive(Default)]
struct Checker {
    pongs: usize,
}

impl EventSink for Checker {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Pong => self.pongs += 1,
            AppEvent::Report(r) => {
                let line = r.encode().expect("report line overflow");
                assert!(line.len() <= MAX_LINE_LEN);
            }
            _ => {}
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let config = RigConfig {
        report_every_ticks: 3,
        ..Default::default()
    };
    let mut app = AppService::new(config);
    let mut hw = Bench { level: true };
    let mut sink = Checker::default();
    app.start(&mut sink);

    let mut now_us = 0u64;
    let mut pings = 0;
    for &byte in data {
        // High bit set: advance time by that many ticks instead.
        if byte & 0x80 != 0 {
            for _ in 0..(byte & 0x7F) {
                now_us += 1_000;
                app.tick(now_us, &mut hw, &mut sink);
            }
            continue;
        }
        if byte == protocol::PING {
            pings += 1;
        }
        app.handle_byte(byte, now_us, &mut hw, &mut sink);
        assert_eq!(app.is_recording(), app.session().is_some());
    }
    assert_eq!(sink.pongs, pings);
});

//! Mock hardware for integration tests.
//!
//! Two layers of doubles:
//! - [`MockHw`] stands in for the whole [`SensorPort`] and records every
//!   call, for driving `AppService` directly.
//! - [`MlxBus`], [`SharedAdc`] and [`ScriptedPin`] sit under the real
//!   `HardwareAdapter`, modelling the I2C thermometers (with PEC), the
//!   thermistor ADC and the tach input.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use embedded_hal::digital::{self, InputPin};
use embedded_hal::i2c::{self, ErrorKind, I2c, NoAcknowledgeSource, Operation};

use wheeltest::app::events::AppEvent;
use wheeltest::app::ports::{EventSink, SensorPort};
use wheeltest::protocol::report::Report;
use wheeltest::protocol::transport::Transport;
use wheeltest::sensors::infrared::smbus_pec;
use wheeltest::sensors::{AnalogInput, SampleStatus, TachSample, TemperatureSample, ThermalReading};

// ── SensorPort call record ────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwCall {
    Initialize,
    PollTachometer,
    ReadThermal,
    Release,
}

// ── MockHw ────────────────────────────────────────────────────

pub struct MockHw {
    pub calls: Vec<HwCall>,
    /// Levels returned by successive polls; idle (high) once exhausted.
    pub levels: VecDeque<bool>,
    pub thermal: ThermalReading,
    pub online: u8,
}

impl MockHw {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            levels: VecDeque::new(),
            thermal: bench_reading(),
            online: 2,
        }
    }

    /// Queue `count` falling-edge revolutions, one every `period_ticks`
    /// polls. The next poll reads the idle level; the first edge lands on
    /// the poll after it.
    pub fn script_revolutions(&mut self, period_ticks: usize, count: usize) {
        self.levels.push_back(true);
        for _ in 0..count {
            self.levels.push_back(false);
            self.levels.extend(std::iter::repeat_n(true, period_ticks - 1));
        }
    }

    pub fn count(&self, call: HwCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }
}

impl Default for MockHw {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHw {
    fn initialize(&mut self) -> u8 {
        self.calls.push(HwCall::Initialize);
        self.online
    }

    fn poll_tachometer(&mut self) -> TachSample {
        self.calls.push(HwCall::PollTachometer);
        TachSample::Level(self.levels.pop_front().unwrap_or(true))
    }

    fn read_thermal(&mut self) -> ThermalReading {
        self.calls.push(HwCall::ReadThermal);
        self.thermal
    }

    fn release(&mut self) {
        self.calls.push(HwCall::Release);
    }
}

/// All three channels fresh: wheel 41.27, bearing 35.02, axle 29.88.
pub fn bench_reading() -> ThermalReading {
    let fresh = |celsius| TemperatureSample {
        celsius,
        status: SampleStatus::Fresh,
    };
    ThermalReading {
        wheel: fresh(41.27),
        bearing: fresh(35.02),
        axle: fresh(29.88),
    }
}

// ── Event sinks ───────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Report(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Loopback transport ────────────────────────────────────────

/// Host link double: `rx` is what the host sent, `tx` what the rig wrote.
#[derive(Default)]
pub struct LoopbackTransport {
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    /// Accept at most this many bytes per write.
    pub write_limit: Option<usize>,
    pub fail_writes: bool,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host_sends(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// Everything written so far, as text lines (PONG bytes excluded).
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.tx)
            .replace('\u{0B}', "")
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

impl Transport for LoopbackTransport {
    type Error = &'static str;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, &'static str> {
        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, &'static str> {
        if self.fail_writes {
            return Err("link down");
        }
        let n = self.write_limit.map_or(data.len(), |l| l.min(data.len()));
        self.tx.extend_from_slice(&data[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), &'static str> {
        Ok(())
    }
}

// ── MLX90614 bus model ────────────────────────────────────────

#[derive(Debug)]
pub struct BusError(ErrorKind);

impl i2c::Error for BusError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

#[derive(Default)]
struct MlxState {
    words: HashMap<u8, u16>,
    nack: Vec<u8>,
    bad_pec: Vec<u8>,
    transactions: u32,
}

/// Shared-handle I2C bus with any number of thermometers on it. Clones
/// see the same devices, so a test can change readings after handing
/// the bus to the adapter.
#[derive(Clone, Default)]
pub struct MlxBus(Rc<RefCell<MlxState>>);

impl MlxBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit (or update) a device reading `celsius` on both registers.
    pub fn set_celsius(&self, address: u8, celsius: f32) {
        let raw = ((celsius + 273.15) / 0.02).round() as u16;
        self.0.borrow_mut().words.insert(address, raw);
    }

    pub fn set_nack(&self, address: u8, nack: bool) {
        let mut s = self.0.borrow_mut();
        s.nack.retain(|a| *a != address);
        if nack {
            s.nack.push(address);
        }
    }

    pub fn corrupt_pec(&self, address: u8) {
        self.0.borrow_mut().bad_pec.push(address);
    }

    pub fn transactions(&self) -> u32 {
        self.0.borrow().transactions
    }
}

impl i2c::ErrorType for MlxBus {
    type Error = BusError;
}

impl I2c for MlxBus {
    fn transaction(&mut self, address: u8, ops: &mut [Operation<'_>]) -> Result<(), BusError> {
        let mut s = self.0.borrow_mut();
        s.transactions += 1;
        let Some(&word) = s.words.get(&address) else {
            return Err(BusError(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)));
        };
        if s.nack.contains(&address) {
            return Err(BusError(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)));
        }
        let mut cmd = 0;
        for op in ops {
            match op {
                Operation::Write(b) => cmd = b[0],
                Operation::Read(buf) => {
                    let [lo, hi] = word.to_le_bytes();
                    let mut pec = smbus_pec(&[address << 1, cmd, (address << 1) | 1, lo, hi]);
                    if s.bad_pec.contains(&address) {
                        pec ^= 0xFF;
                    }
                    buf.copy_from_slice(&[lo, hi, pec]);
                }
            }
        }
        Ok(())
    }
}

// ── Thermistor ADC and tach pin ───────────────────────────────

/// ADC whose code the test can change after the adapter owns it.
/// `None` makes reads fail.
#[derive(Clone)]
pub struct SharedAdc(pub Rc<Cell<Option<u16>>>);

impl SharedAdc {
    pub fn new(code: u16) -> Self {
        Self(Rc::new(Cell::new(Some(code))))
    }

    pub fn set(&self, code: Option<u16>) {
        self.0.set(code);
    }
}

impl AnalogInput for SharedAdc {
    type Error = ();

    fn read_raw(&mut self) -> Result<u16, ()> {
        self.0.get().ok_or(())
    }
}

#[derive(Debug)]
pub struct PinError;

impl digital::Error for PinError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

/// Tach pin replaying a script; `None` entries fail the read. Idle
/// (high) once the script is exhausted.
#[derive(Clone, Default)]
pub struct ScriptedPin(pub Rc<RefCell<VecDeque<Option<bool>>>>);

impl ScriptedPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, level: Option<bool>) {
        self.0.borrow_mut().push_back(level);
    }

    /// Same shape as [`MockHw::script_revolutions`].
    pub fn script_revolutions(&self, period_ticks: usize, count: usize) {
        self.push(Some(true));
        for _ in 0..count {
            self.push(Some(false));
            for _ in 1..period_ticks {
                self.push(Some(true));
            }
        }
    }
}

impl digital::ErrorType for ScriptedPin {
    type Error = PinError;
}

impl InputPin for ScriptedPin {
    fn is_high(&mut self) -> Result<bool, PinError> {
        match self.0.borrow_mut().pop_front() {
            Some(Some(level)) => Ok(level),
            Some(None) => Err(PinError),
            None => Ok(true),
        }
    }

    fn is_low(&mut self) -> Result<bool, PinError> {
        self.is_high().map(|h| !h)
    }
}

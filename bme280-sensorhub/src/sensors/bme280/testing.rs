//! Simulated BME280 register file for driver and registry tests.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

use super::registers::*;
use crate::bus::RegisterBus;
use crate::hal::Clock;

pub const TP_BLOCK: [u8; CALIB_TP_LEN] = [
    0x70, 0x6B, 0x43, 0x67, 0x18, 0xFC, 0x7D, 0x8E, 0x43, 0xD6, 0xD0, 0x0B, 0x27,
    0x0B, 0x8C, 0x00, 0xF9, 0xFF, 0x8C, 0x3C, 0xF8, 0xC6, 0x70, 0x17, 0x00, 0x4B,
];
pub const H_BLOCK: [u8; CALIB_H_LEN] = [0x6A, 0x01, 0x00, 0x14, 0x24, 0x03, 0x1E];
/// pressure 415148, temperature 519888, humidity 30000
pub const DATA_BURST: [u8; DATA_LEN] = [0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00, 0x75, 0x30];

#[derive(Error, Debug)]
#[error("simulated write failure")]
pub struct FakeBusError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    Select(u8),
    Write { register: u8, value: Option<u8>, end_of_burst: bool },
    Read { register: u8, len: usize },
}

pub struct FakeState {
    pub registers: [u8; 256],
    pointer: u8,
    pub transcript: Vec<Transfer>,
    /// Values served from the chip id register before it settles on `registers[0xD0]`
    pub chip_id_script: VecDeque<u8>,
    /// Status values served one per read after a soft reset
    pub status_script: VecDeque<u8>,
    pub failing_reads: HashSet<u8>,
    pub short_reads: HashSet<u8>,
    pub fail_writes: bool,
    pub delays: Vec<u32>,
}

impl FakeState {
    /// Register writes that carried a value, in order
    pub fn value_writes(&self) -> Vec<(u8, u8, bool)> {
        self.transcript
            .iter()
            .filter_map(|t| match *t {
                Transfer::Write { register, value: Some(value), end_of_burst } => Some((register, value, end_of_burst)),
                _ => None,
            })
            .collect()
    }

    pub fn reads_of(&self, register: u8) -> usize {
        self.transcript
            .iter()
            .filter(|t| matches!(t, Transfer::Read { register: r, .. } if *r == register))
            .count()
    }

    pub fn clear_transcript(&mut self) {
        self.transcript.clear();
    }
}

/// Handle onto a shared simulated device; clone one for the driver and keep one for assertions.
#[derive(Clone)]
pub struct FakeBus {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBus {
    pub fn new() -> Self {
        let mut registers = [0u8; 256];
        registers[CHIP_ID_ADDR as usize] = CHIP_ID;
        registers[CALIB_TP_ADDR as usize..CALIB_TP_ADDR as usize + CALIB_TP_LEN].copy_from_slice(&TP_BLOCK);
        registers[CALIB_H_ADDR as usize..CALIB_H_ADDR as usize + CALIB_H_LEN].copy_from_slice(&H_BLOCK);
        registers[DATA_ADDR as usize..DATA_ADDR as usize + DATA_LEN].copy_from_slice(&DATA_BURST);

        Self {
            state: Arc::new(Mutex::new(FakeState {
                registers,
                pointer: 0,
                transcript: Vec::new(),
                chip_id_script: VecDeque::new(),
                status_script: VecDeque::new(),
                failing_reads: HashSet::new(),
                short_reads: HashSet::new(),
                fail_writes: false,
                delays: Vec::new(),
            })),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn clock(&self) -> FakeClock {
        FakeClock { state: self.state.clone() }
    }
}

impl RegisterBus for FakeBus {
    type Error = FakeBusError;

    fn select(&mut self, address: u8) -> Result<(), FakeBusError> {
        self.state().transcript.push(Transfer::Select(address));
        Ok(())
    }

    fn write(&mut self, register: u8, value: Option<u8>, end_of_burst: bool) -> Result<(), FakeBusError> {
        let mut state = self.state();
        if state.fail_writes && value.is_some() {
            return Err(FakeBusError);
        }
        state.transcript.push(Transfer::Write { register, value, end_of_burst });
        state.pointer = register;
        if let Some(value) = value {
            state.registers[register as usize] = value;
        }
        Ok(())
    }

    fn read(&mut self, len: usize) -> Option<Vec<u8>> {
        let mut state = self.state();
        let register = state.pointer;
        state.transcript.push(Transfer::Read { register, len });

        if state.failing_reads.contains(&register) {
            return None;
        }
        if state.short_reads.contains(&register) {
            return Some(Vec::new());
        }
        if register == CHIP_ID_ADDR {
            if let Some(id) = state.chip_id_script.pop_front() {
                return Some(vec![id]);
            }
        }
        if register == STATUS_ADDR {
            if let Some(status) = state.status_script.pop_front() {
                return Some(vec![status]);
            }
        }
        let start = register as usize;
        Some(state.registers[start..start + len].to_vec())
    }
}

/// Clock that records requested delays instead of sleeping
pub struct FakeClock {
    state: Arc<Mutex<FakeState>>,
}

impl Clock for FakeClock {
    fn delay_ms(&mut self, ms: u32) {
        self.state.lock().unwrap().delays.push(ms);
    }
}

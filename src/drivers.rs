//! Stimulus drivers and oracle checks.
//!
//! Each write or read keeps the reference model in lockstep with exactly one
//! enable pulse on the device. A transaction the model cannot accept is not
//! issued; the request becomes a flag check instead.

use log::debug;

use crate::clock::Domain;
use crate::engine::Trigger;
use crate::error::{Flag, HarnessError, Result};
use crate::ports::{FifoPorts, Port};
use crate::session::Session;

/// Rising edge of whichever clock comes first.
pub(crate) const EITHER_RISING: [Trigger; 2] = [
    Trigger::rising(Domain::Write),
    Trigger::rising(Domain::Read),
];

impl<D: FifoPorts> Session<D> {
    /// Assert `i_rst_n`, release it on the first rising edge of either clock,
    /// and require `o_rempty` afterwards. Clears the reference model.
    pub fn reset(&mut self) -> Result<()> {
        self.engine.drive(Port::RstN, 0);
        let released_on = self.engine.wait_first(&EITHER_RISING);
        self.engine.drive(Port::RstN, 1);
        self.model.clear();
        debug!(
            "reset released on {:?} clock at t={}ps",
            released_on.domain,
            self.engine.now_ps()
        );

        let empty = self.engine.sample(Port::REmpty);
        if empty != 1 {
            return Err(HarnessError::ResetInvariant {
                actual: empty,
                time_ps: self.engine.now_ps(),
            });
        }
        Ok(())
    }

    /// Push `value` through the write port. Returns `false` without touching
    /// the device when the model is full, after confirming the device agrees.
    pub fn write(&mut self, value: u32) -> Result<bool> {
        if self.model.is_full() {
            debug!("write {:#04x} held back: model full", value);
            self.stats.skipped += 1;
            self.check_flags()?;
            return Ok(false);
        }

        let value = value & self.config.data_mask();
        self.engine.wait(Trigger::falling(Domain::Write));
        self.engine.drive(Port::Wr, 1);
        self.engine.drive(Port::WData, value);
        self.engine.wait(Trigger::rising(Domain::Write));
        self.engine.drive(Port::Wr, 0);
        self.engine.drive(Port::WData, self.config.wdata_filler);

        let pushed = self.model.try_push(value);
        debug_assert!(pushed);
        self.stats.writes += 1;
        debug!("wrote {:#04x} at t={}ps, {} queued", value, self.engine.now_ps(), self.model.len());
        Ok(true)
    }

    /// Pop one value through the read port and compare it with the model
    /// head. Returns `None` without touching the device when the model is
    /// empty, after confirming the device agrees.
    pub fn read(&mut self) -> Result<Option<u32>> {
        let Some(expected) = self.model.peek() else {
            debug!("read held back: model empty");
            self.stats.skipped += 1;
            self.check_flags()?;
            return Ok(None);
        };

        self.engine.wait(Trigger::falling(Domain::Read));
        self.engine.drive(Port::Rr, 1);
        self.engine.wait(Trigger::rising(Domain::Read));
        self.engine.drive(Port::Rr, 0);
        // o_rdata is registered; it holds this read's value from the next half cycle
        self.engine.wait(Trigger::falling(Domain::Read));
        let actual = self.engine.sample(Port::RData);

        let index = self.values_read;
        self.values_read += 1;
        self.stats.reads += 1;
        self.model.try_pop();
        debug!("read #{} = {:#04x} at t={}ps", index, actual, self.engine.now_ps());
        if actual != expected {
            return Err(HarnessError::DataMismatch {
                index,
                expected,
                actual,
                time_ps: self.engine.now_ps(),
            });
        }
        Ok(Some(actual))
    }

    /// Let the pointer synchronizers catch up: `settle_edges` rising edges on
    /// the read clock and on the write clock, alternating.
    pub fn settle(&mut self) {
        for _ in 0..self.config.settle_edges {
            self.engine.wait(Trigger::rising(Domain::Read));
            self.engine.wait(Trigger::rising(Domain::Write));
        }
    }

    /// Compare `o_rempty` and `o_wfull` with the model. Only meaningful once
    /// the device has settled.
    pub fn check_flags(&mut self) -> Result<()> {
        self.stats.flag_checks += 1;
        self.compare_flag(Flag::Empty, Port::REmpty, self.model.is_empty())?;
        self.compare_flag(Flag::Full, Port::WFull, self.model.is_full())
    }

    fn compare_flag(&self, flag: Flag, port: Port, expected: bool) -> Result<()> {
        let actual = self.engine.sample(port) != 0;
        if actual != expected {
            return Err(HarnessError::FlagMismatch {
                flag,
                expected,
                actual,
                occupancy: self.model.len(),
                time_ps: self.engine.now_ps(),
            });
        }
        Ok(())
    }
}

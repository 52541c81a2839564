//! Cycle-level software rendition of the dual-clock FIFO.
//!
//! Mirrors `rtl/async_fifo.sv`: binary and Gray pointers per domain, two-flop
//! synchronizers carrying each Gray pointer into the opposite domain, full and
//! empty registered in their own domain, and a registered read port. Lets the
//! harness run without an HDL simulator, and can be made faulty on purpose.

use crate::ports::{FifoPorts, Port};

/// Deliberate defects for exercising the harness' failure paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `o_rdata` never leaves zero
    StuckAtZeroData,
    /// Write pulses are ignored
    DropWrites,
    /// `o_wfull` never asserts
    FullNeverAsserted,
    /// Reset drives `o_rempty` low instead of high
    ResetLeavesEmptyLow,
}

#[derive(Debug, Clone)]
pub struct AsyncFifoModel {
    depth: u32,
    data_mask: u32,
    fault: Option<Fault>,
    mem: Vec<u32>,

    // inputs
    rst_n: u32,
    wclk: u32,
    rclk: u32,
    wr: u32,
    wdata: u32,
    rr: u32,
    last_wclk: u32,
    last_rclk: u32,

    // write domain
    wbin: u32,
    wgray: u32,
    wq1_rgray: u32,
    wq2_rgray: u32,
    wfull: bool,

    // read domain
    rbin: u32,
    rgray: u32,
    rq1_wgray: u32,
    rq2_wgray: u32,
    rempty: bool,
    rdata: u32,
}

impl AsyncFifoModel {
    /// Power-on state: pointers cleared but both flags deasserted until the
    /// first clock edge or reset.
    pub fn new(depth: usize, data_width: u32) -> Self {
        assert!(
            depth >= 2 && depth.is_power_of_two(),
            "depth must be a power of two"
        );
        let data_mask = if data_width >= 32 {
            u32::MAX
        } else {
            (1u32 << data_width) - 1
        };
        Self {
            depth: depth as u32,
            data_mask,
            fault: None,
            mem: vec![0; depth],
            rst_n: 1,
            wclk: 0,
            rclk: 0,
            wr: 0,
            wdata: 0,
            rr: 0,
            last_wclk: 0,
            last_rclk: 0,
            wbin: 0,
            wgray: 0,
            wq1_rgray: 0,
            wq2_rgray: 0,
            wfull: false,
            rbin: 0,
            rgray: 0,
            rq1_wgray: 0,
            rq2_wgray: 0,
            rempty: false,
            rdata: 0,
        }
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }

    fn has_fault(&self, fault: Fault) -> bool {
        self.fault == Some(fault)
    }

    fn ptr_mask(&self) -> u32 {
        2 * self.depth - 1
    }

    fn reset(&mut self) {
        self.wbin = 0;
        self.wgray = 0;
        self.wq1_rgray = 0;
        self.wq2_rgray = 0;
        self.wfull = false;
        self.rbin = 0;
        self.rgray = 0;
        self.rq1_wgray = 0;
        self.rq2_wgray = 0;
        self.rdata = 0;
        self.rempty = !self.has_fault(Fault::ResetLeavesEmptyLow);
    }

    fn write_edge(&mut self, rgray: u32) {
        let push = self.wr != 0 && !self.wfull && !self.has_fault(Fault::DropWrites);
        if push {
            let addr = (self.wbin & (self.depth - 1)) as usize;
            self.mem[addr] = self.wdata & self.data_mask;
        }
        let wbin_next = (self.wbin + push as u32) & self.ptr_mask();
        let wgray_next = to_gray(wbin_next);
        // full when the pointers differ only in their two top bits
        let wrap = self.depth | (self.depth >> 1);
        self.wfull =
            wgray_next == (self.wq2_rgray ^ wrap) && !self.has_fault(Fault::FullNeverAsserted);
        self.wbin = wbin_next;
        self.wgray = wgray_next;
        self.wq2_rgray = self.wq1_rgray;
        self.wq1_rgray = rgray;
    }

    fn read_edge(&mut self, wgray: u32) {
        let pop = self.rr != 0 && !self.rempty;
        if pop {
            let addr = (self.rbin & (self.depth - 1)) as usize;
            self.rdata = if self.has_fault(Fault::StuckAtZeroData) {
                0
            } else {
                self.mem[addr]
            };
        }
        let rbin_next = (self.rbin + pop as u32) & self.ptr_mask();
        let rgray_next = to_gray(rbin_next);
        self.rempty = rgray_next == self.rq2_wgray;
        self.rbin = rbin_next;
        self.rgray = rgray_next;
        self.rq2_wgray = self.rq1_wgray;
        self.rq1_wgray = wgray;
    }
}

impl FifoPorts for AsyncFifoModel {
    fn poke(&mut self, port: Port, value: u32) {
        let bit = value & 1;
        match port {
            Port::RstN => self.rst_n = bit,
            Port::WClk => self.wclk = bit,
            Port::RClk => self.rclk = bit,
            Port::Wr => self.wr = bit,
            Port::WData => self.wdata = value & self.data_mask,
            Port::Rr => self.rr = bit,
            Port::RData | Port::WFull | Port::REmpty => {}
        }
    }

    fn peek(&self, port: Port) -> u32 {
        match port {
            Port::RstN => self.rst_n,
            Port::WClk => self.wclk,
            Port::RClk => self.rclk,
            Port::Wr => self.wr,
            Port::WData => self.wdata,
            Port::Rr => self.rr,
            Port::RData => self.rdata,
            Port::WFull => self.wfull as u32,
            Port::REmpty => self.rempty as u32,
        }
    }

    fn evaluate(&mut self) {
        let wclk_rose = self.wclk == 1 && self.last_wclk == 0;
        let rclk_rose = self.rclk == 1 && self.last_rclk == 0;
        self.last_wclk = self.wclk;
        self.last_rclk = self.rclk;

        if self.rst_n == 0 {
            self.reset();
            return;
        }

        // both domains sample the other's pointer as it was before this instant
        let (wgray, rgray) = (self.wgray, self.rgray);
        if wclk_rose {
            self.write_edge(rgray);
        }
        if rclk_rose {
            self.read_edge(wgray);
        }
    }

    fn geometry(&self) -> Option<(usize, u32)> {
        Some((self.depth as usize, self.data_mask.count_ones()))
    }
}

fn to_gray(bin: u32) -> u32 {
    bin ^ (bin >> 1)
}

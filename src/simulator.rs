use camino::Utf8Path;
use eyre::Result;
use marlin::{
    verilator::{VerilatorRuntime, VerilatorRuntimeOptions},
    verilog::prelude::*,
};

use crate::ports::{FifoPorts, Port};

/// Geometry baked into `rtl/async_fifo.sv`.
pub const RTL_DEPTH: usize = 32;
pub const RTL_DATA_WIDTH: u32 = 8;

// Dual-clock FIFO under test
#[verilog(src = "rtl/async_fifo.sv", name = "async_fifo")]
pub struct AsyncFifoRtl;

pub fn create_fifo_runtime() -> Result<VerilatorRuntime> {
    create_fifo_runtime_in(Utf8Path::new("artifacts"))
}

pub fn create_fifo_runtime_in(artifact_dir: &Utf8Path) -> Result<VerilatorRuntime> {
    let include_paths = [Utf8Path::new("rtl")];
    let src_files = [Utf8Path::new("rtl/async_fifo.sv")];

    VerilatorRuntime::new(
        artifact_dir,
        &src_files,
        &include_paths,
        [],
        VerilatorRuntimeOptions::default_logging(),
    )
    .map_err(|e| eyre::eyre!("Failed to create runtime: {}", e))
}

impl FifoPorts for AsyncFifoRtl<'_> {
    fn poke(&mut self, port: Port, value: u32) {
        let bit = (value & 1) as u8;
        match port {
            Port::RstN => self.i_rst_n = bit,
            Port::WClk => self.i_wclk = bit,
            Port::RClk => self.i_rclk = bit,
            Port::Wr => self.i_wr = bit,
            Port::WData => self.i_wdata = value as u8,
            Port::Rr => self.i_rr = bit,
            Port::RData | Port::WFull | Port::REmpty => {}
        }
    }

    fn peek(&self, port: Port) -> u32 {
        let raw = match port {
            Port::RstN => self.i_rst_n,
            Port::WClk => self.i_wclk,
            Port::RClk => self.i_rclk,
            Port::Wr => self.i_wr,
            Port::WData => self.i_wdata,
            Port::Rr => self.i_rr,
            Port::RData => self.o_rdata,
            Port::WFull => self.o_wfull,
            Port::REmpty => self.o_rempty,
        };
        raw as u32
    }

    fn evaluate(&mut self) {
        self.eval();
    }

    fn geometry(&self) -> Option<(usize, u32)> {
        Some((RTL_DEPTH, RTL_DATA_WIDTH))
    }
}

//! Signal-level contract of the dual-clock FIFO under test.

use std::fmt;

/// One named port of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    RstN,
    WClk,
    RClk,
    Wr,
    WData,
    Rr,
    RData,
    WFull,
    REmpty,
}

impl Port {
    pub const ALL: [Port; 9] = [
        Port::RstN,
        Port::WClk,
        Port::RClk,
        Port::Wr,
        Port::WData,
        Port::Rr,
        Port::RData,
        Port::WFull,
        Port::REmpty,
    ];

    /// HDL name of the port.
    pub fn name(self) -> &'static str {
        match self {
            Port::RstN => "i_rst_n",
            Port::WClk => "i_wclk",
            Port::RClk => "i_rclk",
            Port::Wr => "i_wr",
            Port::WData => "i_wdata",
            Port::Rr => "i_rr",
            Port::RData => "o_rdata",
            Port::WFull => "o_wfull",
            Port::REmpty => "o_rempty",
        }
    }

    pub fn is_input(self) -> bool {
        !matches!(self, Port::RData | Port::WFull | Port::REmpty)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A device exposing the FIFO port list.
///
/// Inputs written with [`FifoPorts::poke`] take effect at the next
/// [`FifoPorts::evaluate`]; outputs read with [`FifoPorts::peek`] reflect the
/// last evaluation. Implementations never expose internal state.
pub trait FifoPorts {
    /// Drive an input port. Writes to output ports are ignored.
    fn poke(&mut self, port: Port, value: u32);

    /// Sample any port.
    fn peek(&self, port: Port) -> u32;

    /// Propagate the current input levels through the device.
    fn evaluate(&mut self);

    /// Fixed `(depth, data_width)` of the device, if it has one.
    fn geometry(&self) -> Option<(usize, u32)> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_names_match_rtl() {
        let names: Vec<_> = Port::ALL.iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            [
                "i_rst_n", "i_wclk", "i_rclk", "i_wr", "i_wdata", "i_rr", "o_rdata", "o_wfull",
                "o_rempty"
            ]
        );
    }

    #[test]
    fn test_port_directions() {
        let outputs: Vec<_> = Port::ALL.iter().filter(|p| !p.is_input()).collect();
        assert_eq!(outputs, [&Port::RData, &Port::WFull, &Port::REmpty]);
    }
}

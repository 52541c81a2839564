//! Free-running clock sources.

use crate::ports::Port;

/// Which side of the FIFO a clock belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Write,
    Read,
}

impl Domain {
    pub fn clock_port(self) -> Port {
        match self {
            Domain::Write => Port::WClk,
            Domain::Read => Port::RClk,
        }
    }
}

/// Periodic square wave on one clock port.
///
/// The line idles low until `phase`, then toggles every half period; rising
/// edges land at `phase + k * period`. Odd periods are split with the extra
/// picosecond on the low half.
#[derive(Debug, Clone)]
pub struct Clock {
    domain: Domain,
    high_ps: u64,
    low_ps: u64,
    level: bool,
    next_toggle_ps: u64,
}

impl Clock {
    pub fn new(domain: Domain, period_ps: u64, phase_ps: u64) -> Self {
        assert!(period_ps >= 2, "clock period must be at least 2ps");
        let high_ps = period_ps / 2;
        Self {
            domain,
            high_ps,
            low_ps: period_ps - high_ps,
            level: false,
            next_toggle_ps: phase_ps,
        }
    }

    pub fn from_ns(domain: Domain, period_ns: u64, phase_ps: u64) -> Self {
        Self::new(domain, period_ns * 1_000, phase_ps)
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn period_ps(&self) -> u64 {
        self.high_ps + self.low_ps
    }

    pub fn next_toggle_ps(&self) -> u64 {
        self.next_toggle_ps
    }

    /// Flip the line and schedule the next toggle. Returns the new level.
    pub fn toggle(&mut self) -> bool {
        self.level = !self.level;
        self.next_toggle_ps += if self.level { self.high_ps } else { self.low_ps };
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rising_edges_every_period() {
        let mut clk = Clock::from_ns(Domain::Write, 7, 0);
        let mut rising = Vec::new();
        for _ in 0..6 {
            let at = clk.next_toggle_ps();
            if clk.toggle() {
                rising.push(at);
            }
        }
        assert_eq!(rising, vec![0, 7_000, 14_000]);
    }

    #[test]
    fn test_odd_period_split() {
        let mut clk = Clock::new(Domain::Read, 13, 5);
        assert_eq!(clk.next_toggle_ps(), 5);
        assert!(clk.toggle());
        assert_eq!(clk.next_toggle_ps(), 11);
        assert!(!clk.toggle());
        assert_eq!(clk.next_toggle_ps(), 18);
        assert_eq!(clk.period_ps(), 13);
    }

    #[test]
    fn test_domain_ports() {
        assert_eq!(Domain::Write.clock_port(), Port::WClk);
        assert_eq!(Domain::Read.clock_port(), Port::RClk);
    }
}

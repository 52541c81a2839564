//! Edge-triggered suspension over two free-running clocks.
//!
//! The harness is the only task of control. Whenever it waits for an edge the
//! engine advances simulated time toggle by toggle, driving both clock ports
//! and evaluating the device after each timestamp, and hands control back
//! once the awaited edge has been applied. Inputs poked while the harness
//! runs are seen by the device at the next edge.

use log::trace;

use crate::clock::{Clock, Domain};
use crate::config::HarnessConfig;
use crate::ports::{FifoPorts, Port};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Rising,
    Falling,
}

/// A clock edge a caller can suspend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Trigger {
    pub domain: Domain,
    pub edge: Edge,
}

impl Trigger {
    pub const fn rising(domain: Domain) -> Self {
        Self {
            domain,
            edge: Edge::Rising,
        }
    }

    pub const fn falling(domain: Domain) -> Self {
        Self {
            domain,
            edge: Edge::Falling,
        }
    }
}

pub struct SimEngine<D> {
    dut: D,
    wclk: Clock,
    rclk: Clock,
    now_ps: u64,
    rising_edges: [u64; 2],
}

impl<D: FifoPorts> SimEngine<D> {
    /// Start both clocks on `dut`. They run for the engine's lifetime.
    pub fn new(dut: D, config: &HarnessConfig) -> Self {
        Self::with_clocks(
            dut,
            Clock::from_ns(Domain::Write, config.wclk_period_ns, config.wclk_phase_ps),
            Clock::from_ns(Domain::Read, config.rclk_period_ns, config.rclk_phase_ps),
        )
    }

    pub fn with_clocks(mut dut: D, wclk: Clock, rclk: Clock) -> Self {
        assert_eq!(wclk.domain(), Domain::Write);
        assert_eq!(rclk.domain(), Domain::Read);
        dut.poke(Port::WClk, 0);
        dut.poke(Port::RClk, 0);
        dut.evaluate();
        Self {
            dut,
            wclk,
            rclk,
            now_ps: 0,
            rising_edges: [0; 2],
        }
    }

    pub fn now_ps(&self) -> u64 {
        self.now_ps
    }

    /// Rising edges seen so far on `domain`.
    pub fn rising_edges(&self, domain: Domain) -> u64 {
        self.rising_edges[domain_index(domain)]
    }

    pub fn drive(&mut self, port: Port, value: u32) {
        debug_assert!(port.is_input(), "{port} is an output");
        self.dut.poke(port, value);
    }

    pub fn sample(&self, port: Port) -> u32 {
        self.dut.peek(port)
    }

    pub fn dut(&self) -> &D {
        &self.dut
    }

    /// Suspend until `trigger` fires.
    pub fn wait(&mut self, trigger: Trigger) {
        self.wait_first(&[trigger]);
    }

    /// Suspend until any of `triggers` fires and report which one did. When
    /// several fire at the same instant the earliest listed wins.
    pub fn wait_first(&mut self, triggers: &[Trigger]) -> Trigger {
        assert!(!triggers.is_empty(), "waiting on nothing would never resume");
        loop {
            let fired = self.step();
            if let Some(hit) = triggers.iter().find(|t| fired.contains(&Some(**t))) {
                return *hit;
            }
        }
    }

    /// Suspend for `count` rising edges of `domain`.
    pub fn clock_cycles(&mut self, domain: Domain, count: usize) {
        for _ in 0..count {
            self.wait(Trigger::rising(domain));
        }
    }

    /// Advance to the next timestamp with a clock toggle.
    fn step(&mut self) -> [Option<Trigger>; 2] {
        let t = self.wclk.next_toggle_ps().min(self.rclk.next_toggle_ps());
        self.now_ps = t;

        let mut fired = [None; 2];
        for clk in [&mut self.wclk, &mut self.rclk] {
            if clk.next_toggle_ps() != t {
                continue;
            }
            let domain = clk.domain();
            let level = clk.toggle();
            self.dut.poke(domain.clock_port(), level as u32);
            let trigger = if level {
                self.rising_edges[domain_index(domain)] += 1;
                Trigger::rising(domain)
            } else {
                Trigger::falling(domain)
            };
            trace!("t={}ps {:?}", t, trigger);
            fired[domain_index(domain)] = Some(trigger);
        }

        self.dut.evaluate();
        fired
    }
}

fn domain_index(domain: Domain) -> usize {
    match domain {
        Domain::Write => 0,
        Domain::Read => 1,
    }
}

//! One harness run: session context and the phase pipeline.

use std::fmt;

use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::HarnessConfig;
use crate::drivers::EITHER_RISING;
use crate::engine::SimEngine;
use crate::error::{HarnessError, Result};
use crate::model::RefModel;
use crate::ports::{FifoPorts, Port};

/// Stages of a session, visited strictly in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Init,
    Reset,
    WriteOnly,
    ReadOnly,
    ReadWrite,
    Done,
}

impl Phase {
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Init => Some(Phase::Reset),
            Phase::Reset => Some(Phase::WriteOnly),
            Phase::WriteOnly => Some(Phase::ReadOnly),
            Phase::ReadOnly => Some(Phase::ReadWrite),
            Phase::ReadWrite => Some(Phase::Done),
            Phase::Done => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Init => "init",
            Phase::Reset => "reset",
            Phase::WriteOnly => "write-only",
            Phase::ReadOnly => "read-only",
            Phase::ReadWrite => "read-write",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Transaction counters for one phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseStats {
    pub writes: usize,
    pub reads: usize,
    /// Transactions refused by the model and turned into a flag check.
    pub skipped: usize,
    pub flag_checks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub seed: u64,
    pub end_time_ps: u64,
    pub phases: Vec<(Phase, PhaseStats)>,
    pub values_read: usize,
    pub final_occupancy: usize,
}

impl SessionReport {
    pub fn stats(&self, phase: Phase) -> Option<PhaseStats> {
        self.phases
            .iter()
            .find(|(p, _)| *p == phase)
            .map(|(_, stats)| *stats)
    }

    pub fn total(&self) -> PhaseStats {
        self.phases
            .iter()
            .fold(PhaseStats::default(), |acc, (_, s)| PhaseStats {
                writes: acc.writes + s.writes,
                reads: acc.reads + s.reads,
                skipped: acc.skipped + s.skipped,
                flag_checks: acc.flag_checks + s.flag_checks,
            })
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "seed {} finished at {}ps", self.seed, self.end_time_ps)?;
        for (phase, s) in &self.phases {
            writeln!(
                f,
                "  {:<10} writes={:<3} reads={:<3} skipped={:<3} flag checks={}",
                phase.to_string(),
                s.writes,
                s.reads,
                s.skipped,
                s.flag_checks
            )?;
        }
        write!(
            f,
            "  {} values read back, {} left in FIFO",
            self.values_read, self.final_occupancy
        )
    }
}

/// State of a single harness run against one device.
///
/// Owns the simulation, the reference model and the stimulus; every phase and
/// driver operates on it. Nothing outlives the session.
pub struct Session<D> {
    pub(crate) config: HarnessConfig,
    pub(crate) engine: SimEngine<D>,
    pub(crate) model: RefModel,
    pub(crate) stats: PhaseStats,
    pub(crate) values_read: usize,
    stimulus: Vec<u32>,
    seed: u64,
    phase: Phase,
    history: Vec<(Phase, PhaseStats)>,
}

impl<D: FifoPorts> Session<D> {
    pub fn new(dut: D, config: HarnessConfig) -> Result<Self> {
        config.validate()?;
        if let Some((depth, width)) = dut.geometry() {
            if (depth, width) != (config.depth, config.data_width) {
                return Err(HarnessError::config(format!(
                    "device is {}x{} but config expects {}x{}",
                    depth, width, config.depth, config.data_width
                )));
            }
        }

        let seed = config.seed.unwrap_or_else(rand::random);
        let stimulus = generate_stimulus(seed, config.iterations, config.data_mask());
        let engine = SimEngine::new(dut, &config);
        let model = RefModel::new(config.depth, config.data_width);

        Ok(Self {
            config,
            engine,
            model,
            stats: PhaseStats::default(),
            values_read: 0,
            stimulus,
            seed,
            phase: Phase::Init,
            history: Vec::new(),
        })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn stimulus(&self) -> &[u32] {
        &self.stimulus
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn model(&self) -> &RefModel {
        &self.model
    }

    pub fn engine(&self) -> &SimEngine<D> {
        &self.engine
    }

    /// Drive idle levels on every input, then let one clock edge pass.
    pub fn init(&mut self) {
        self.engine.drive(Port::RstN, 1);
        self.engine.drive(Port::Wr, 0);
        self.engine.drive(Port::WData, 0);
        self.engine.drive(Port::Rr, 0);
        self.engine.wait_first(&EITHER_RISING);
    }

    /// Run the remaining phases to completion. The first failed assertion
    /// aborts the run and leaves the session in the failing phase.
    pub fn run(&mut self) -> Result<SessionReport> {
        info!(
            "session seed={} depth={} width={} iterations={}",
            self.seed, self.config.depth, self.config.data_width, self.config.iterations
        );
        while self.phase != Phase::Done {
            match self.phase {
                Phase::Init => self.init(),
                Phase::Reset => self.reset()?,
                Phase::WriteOnly => write_only(self)?,
                Phase::ReadOnly => read_only(self)?,
                Phase::ReadWrite => read_write(self)?,
                Phase::Done => unreachable!(),
            }
            self.advance();
        }
        Ok(self.report())
    }

    pub fn report(&self) -> SessionReport {
        SessionReport {
            seed: self.seed,
            end_time_ps: self.engine.now_ps(),
            phases: self.history.clone(),
            values_read: self.values_read,
            final_occupancy: self.model.len(),
        }
    }

    fn advance(&mut self) {
        let stats = std::mem::take(&mut self.stats);
        info!(
            "{} phase passed at t={}ps: writes={} reads={} skipped={} flag checks={}",
            self.phase,
            self.engine.now_ps(),
            stats.writes,
            stats.reads,
            stats.skipped,
            stats.flag_checks
        );
        self.history.push((self.phase, stats));
        if let Some(next) = self.phase.next() {
            self.phase = next;
        }
    }
}

/// Uniform values over the data bus range, reproducible from `seed`.
pub fn generate_stimulus(seed: u64, len: usize, mask: u32) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(0..=mask)).collect()
}

fn write_only<D: FifoPorts>(session: &mut Session<D>) -> Result<()> {
    for i in 0..session.config.phase_len() {
        let value = session.stimulus[i];
        if session.write(value)? {
            session.engine.drive(Port::Wr, 0);
            session.settle();
        }
        session.check_flags()?;
    }
    Ok(())
}

fn read_only<D: FifoPorts>(session: &mut Session<D>) -> Result<()> {
    for _ in 0..session.config.phase_len() {
        if session.read()?.is_some() {
            session.engine.drive(Port::Rr, 0);
            session.settle();
        }
        session.check_flags()?;
    }
    Ok(())
}

fn read_write<D: FifoPorts>(session: &mut Session<D>) -> Result<()> {
    let n = session.config.phase_len();
    for i in n..2 * n {
        if session.read()?.is_some() {
            session.engine.drive(Port::Rr, 0);
        }
        let value = session.stimulus[i];
        session.write(value)?;
        session.settle();
        session.check_flags()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavioral::AsyncFifoModel;

    fn session(iterations: usize) -> Session<AsyncFifoModel> {
        let config = HarnessConfig {
            iterations,
            seed: Some(1),
            ..Default::default()
        };
        Session::new(AsyncFifoModel::new(32, 8), config).unwrap()
    }

    #[test]
    fn test_phase_order_is_linear() {
        let mut phase = Phase::Init;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            assert!(next > phase);
            seen.push(next);
            phase = next;
        }
        assert_eq!(seen.len(), 6);
        assert_eq!(phase, Phase::Done);
    }

    #[test]
    fn test_stimulus_reproducible_and_in_range() {
        let a = generate_stimulus(9, 100, 0xff);
        let b = generate_stimulus(9, 100, 0xff);
        assert_eq!(a, b);
        assert_eq!(a.len(), 100);
        assert!(a.iter().all(|v| *v <= 0xff));
        assert_ne!(a, generate_stimulus(10, 100, 0xff));
    }

    #[test]
    fn test_geometry_mismatch_rejected() {
        let config = HarnessConfig::default();
        let err = Session::new(AsyncFifoModel::new(16, 8), config).err().unwrap();
        assert!(matches!(err, HarnessError::Config { .. }));
    }

    #[test]
    fn test_full_run_visits_every_phase() {
        let mut session = session(100);
        let report = session.run().unwrap();
        assert_eq!(session.phase(), Phase::Done);
        let phases: Vec<_> = report.phases.iter().map(|(p, _)| *p).collect();
        assert_eq!(
            phases,
            vec![
                Phase::Init,
                Phase::Reset,
                Phase::WriteOnly,
                Phase::ReadOnly,
                Phase::ReadWrite
            ]
        );

        // 50 writes into a 32 deep FIFO: 18 refused
        let wo = report.stats(Phase::WriteOnly).unwrap();
        assert_eq!((wo.writes, wo.skipped, wo.flag_checks), (32, 18, 68));
        // 50 reads from 32 entries: 18 refused
        let ro = report.stats(Phase::ReadOnly).unwrap();
        assert_eq!((ro.reads, ro.skipped), (32, 18));
        // first iteration finds nothing to read, then one in one out
        let rw = report.stats(Phase::ReadWrite).unwrap();
        assert_eq!((rw.reads, rw.writes, rw.skipped), (49, 50, 1));

        assert_eq!(report.values_read, 81);
        assert_eq!(report.final_occupancy, 1);
        assert_eq!(report.seed, 1);
    }

    #[test]
    fn test_report_display() {
        let mut session = session(4);
        let report = session.run().unwrap();
        let text = report.to_string();
        assert!(text.starts_with("seed 1 finished at"));
        assert!(text.contains("write-only"));
        assert_eq!(report.total().writes, 4);
    }
}

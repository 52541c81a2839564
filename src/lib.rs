pub mod behavioral;
pub mod clock;
pub mod config;
pub mod drivers;
pub mod engine;
pub mod error;
pub mod model;
pub mod ports;
pub mod session;
pub mod simulator;

pub use behavioral::{AsyncFifoModel, Fault};
pub use clock::{Clock, Domain};
pub use config::HarnessConfig;
pub use engine::{Edge, SimEngine, Trigger};
pub use error::{Flag, HarnessError, Result};
pub use model::RefModel;
pub use ports::{FifoPorts, Port};
pub use session::{Phase, PhaseStats, Session, SessionReport};
pub use simulator::*;

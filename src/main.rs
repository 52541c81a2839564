use afifo_tb::{
    create_fifo_runtime, AsyncFifoModel, AsyncFifoRtl, FifoPorts, HarnessConfig, Session,
    SessionReport,
};
use eyre::{Result, WrapErr};

fn main() -> Result<()> {
    env_logger::init();
    let config = HarnessConfig::from_env().wrap_err("invalid AFIFO_* settings")?;

    // AFIFO_BACKEND=model runs the software FIFO instead of Verilator
    let report = match std::env::var("AFIFO_BACKEND").as_deref() {
        Ok("model") => {
            println!("Running async FIFO harness against the behavioral model...");
            let dut = AsyncFifoModel::new(config.depth, config.data_width);
            run_session(dut, config)?
        }
        _ => {
            println!("Running async FIFO harness against rtl/async_fifo.sv...");
            let runtime = create_fifo_runtime()?;
            let dut = runtime
                .create_model_simple::<AsyncFifoRtl>()
                .map_err(|e| eyre::eyre!("Failed to create FIFO model: {:?}", e))?;
            run_session(dut, config)?
        }
    };

    println!("{report}");
    println!("All checks passed.");
    Ok(())
}

fn run_session<D: FifoPorts>(dut: D, config: HarnessConfig) -> Result<SessionReport> {
    let mut session = Session::new(dut, config)?;
    let seed = session.seed();
    session
        .run()
        .wrap_err_with(|| format!("harness failed (replay with AFIFO_SEED={seed})"))
}

use anyhow::Context;
use clap::Args;

#[derive(Args, Debug)]
pub struct StartArgs {
    /// UUID of the guest to boot
    pub uuid: String,
}

pub fn execute(args: StartArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    bhyvebox::config::validate_uuid(&args.uuid)?;
    tracing::info!(uuid = %args.uuid, "Booting guest");
    let runtime = global.create_runtime()?;

    let state = runtime
        .start(&args.uuid)
        .with_context(|| format!("failed to start guest {}", args.uuid))?;

    tracing::info!(uuid = %args.uuid, state = %state.sequence, "Guest exited");
    println!("{}", state.sequence);
    Ok(())
}

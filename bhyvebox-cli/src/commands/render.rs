use anyhow::Context;
use clap::Args;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// UUID of the guest
    pub uuid: String,
}

pub fn execute(args: RenderArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    bhyvebox::config::validate_uuid(&args.uuid)?;
    let runtime = global.create_runtime()?;

    let commands = runtime
        .render(&args.uuid)
        .with_context(|| format!("failed to render guest {}", args.uuid))?;
    for (_, command) in commands {
        println!("{}", command);
    }
    Ok(())
}

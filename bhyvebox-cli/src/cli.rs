use crate::commands;
use bhyvebox::{BhyveboxOptions, BhyveboxRuntime};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bhyvebox", version, about = "Provision and boot bhyve guests on ZFS")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalFlags {
    /// State directory for guest locks [default: ~/.bhyvebox]
    #[arg(long, global = true, env = "BHYVEBOX_HOME")]
    pub home: Option<PathBuf>,

    /// ZFS pool or parent dataset holding guests, e.g. zroot/guests
    #[arg(long, global = true, env = "BHYVEBOX_POOL")]
    pub pool: Option<String>,

    /// Directory under which guest datasets are mounted
    #[arg(long, global = true, default_value = "/")]
    pub mount_root: PathBuf,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub debug: bool,
}

impl GlobalFlags {
    pub fn options(&self) -> BhyveboxOptions {
        let mut options = BhyveboxOptions::default();
        if let Some(home) = &self.home {
            options.home_dir = home.clone();
        }
        if let Some(pool) = self.pool.as_ref().filter(|p| !p.is_empty()) {
            options.pool = Some(pool.clone());
        }
        options.mount_root = self.mount_root.clone();
        options
    }

    pub fn create_runtime(&self) -> anyhow::Result<BhyveboxRuntime> {
        Ok(BhyveboxRuntime::new(self.options())?)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Provision storage for a new guest and save its configuration
    Create(commands::create::CreateArgs),
    /// Boot a guest through grub-bhyve and bhyve (blocks until it exits)
    Start(commands::start::StartArgs),
    /// List provisioned guests
    #[command(alias = "ls")]
    List(commands::list::ListArgs),
    /// Print both boot commands for a guest without running them
    Render(commands::render::RenderArgs),
}

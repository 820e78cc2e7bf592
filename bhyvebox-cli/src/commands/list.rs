use bhyvebox::VmConfig;
use clap::{Args, ValueEnum};
use comfy_table::presets::NOTHING;
use comfy_table::{ContentArrangement, Table};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Only print UUIDs
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn execute(args: ListArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let runtime = global.create_runtime()?;
    let guests = runtime.list()?;

    if args.quiet {
        for guest in &guests {
            println!("{}", guest.uuid);
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&guests)?),
        OutputFormat::Table => println!("{}", render_table(&guests)),
    }
    Ok(())
}

fn render_table(guests: &[VmConfig]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(vec!["UUID", "NAME", "VCPUS", "RAM", "DISK"]);

    for guest in guests {
        table.add_row(vec![
            guest.uuid.clone(),
            guest.name.clone(),
            guest.vcpus.to_string(),
            guest.ram.clone(),
            guest.disk_size.clone(),
        ]);
    }
    table
}

use anyhow::Context;
use bhyvebox::VmConfig;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub struct CreateArgs {
    /// Start from a JSON guest configuration; flags override its fields
    #[arg(long, value_name = "FILE")]
    pub from_file: Option<PathBuf>,

    /// Guest name passed to bhyve
    #[arg(long)]
    pub name: Option<String>,

    /// Guest UUID (a UUID is randomly generated by default)
    #[arg(long)]
    pub uuid: Option<String>,

    /// Number of virtual CPUs
    #[arg(long)]
    pub vcpus: Option<u32>,

    /// Guest memory, e.g. 512M or 2G
    #[arg(long)]
    pub ram: Option<String>,

    /// grub-bhyve root partition
    #[arg(long)]
    pub bootpartition: Option<String>,

    #[arg(long)]
    pub diskdriver: Option<String>,

    /// Boot disk backing device [default: the guest's disk0 zvol]
    #[arg(long)]
    pub diskdevice: Option<String>,

    /// Size of the disk0 volume
    #[arg(long)]
    pub disksize: Option<String>,

    #[arg(long)]
    pub nicdriver: Option<String>,

    /// NIC backing device; the NIC is attached only when set
    #[arg(long)]
    pub nicdevice: Option<String>,

    #[arg(long)]
    pub nicid: Option<String>,

    /// First serial console device, e.g. /dev/nmdm0A
    #[arg(long)]
    pub serialconsole1: Option<String>,

    #[arg(long)]
    pub serialconsole2: Option<String>,

    /// Host bridge emulation
    #[arg(long)]
    pub hostbridge: Option<String>,

    /// LPC bridge emulation
    #[arg(long)]
    pub lpc: Option<String>,

    /// Generate ACPI tables (-A)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub genacpitables: Option<bool>,

    /// Include guest memory in core dumps (-C)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub incguestcoremem: Option<bool>,

    /// Exit on unemulated I/O port access (-e)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub exitonunemuioport: Option<bool>,

    /// Exit on guest PAUSE (-P)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub exitonpause: Option<bool>,

    /// Yield the CPU when the guest issues HLT (-H)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub yieldcpuonhlt: Option<bool>,

    /// Ignore unimplemented MSR accesses (-w)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub ignoreunimplementedmsraccess: Option<bool>,

    /// Force MSI interrupts (-W)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub forcemsiinterrupts: Option<bool>,

    /// Run the local APIC in x2APIC mode (-x)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub apicx2mode: Option<bool>,

    /// Disable MP table generation (-Y)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub disablemptablegeneration: Option<bool>,

    /// Wire guest memory (-S)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub wireguestmemory: Option<bool>,
}

impl CreateArgs {
    /// Base configuration (file or defaults) with every given flag applied.
    pub fn to_config(&self) -> anyhow::Result<VmConfig> {
        let mut config = match &self.from_file {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                serde_json::from_str::<VmConfig>(&raw)
                    .with_context(|| format!("failed to parse {}", path.display()))?
            }
            None => VmConfig::default(),
        };

        let strings = [
            (&self.name, &mut config.name),
            (&self.uuid, &mut config.uuid),
            (&self.ram, &mut config.ram),
            (&self.bootpartition, &mut config.boot_partition),
            (&self.diskdriver, &mut config.disk_driver),
            (&self.diskdevice, &mut config.disk_device),
            (&self.disksize, &mut config.disk_size),
            (&self.nicdriver, &mut config.nic_driver),
            (&self.nicdevice, &mut config.nic_device),
            (&self.nicid, &mut config.nic_id),
            (&self.serialconsole1, &mut config.serial_console1),
            (&self.serialconsole2, &mut config.serial_console2),
            (&self.hostbridge, &mut config.host_bridge),
            (&self.lpc, &mut config.lpc),
        ];
        for (flag, field) in strings {
            if let Some(value) = flag {
                *field = value.clone();
            }
        }

        let switches = [
            (self.genacpitables, &mut config.gen_acpi_tables),
            (self.incguestcoremem, &mut config.inc_guest_core_mem),
            (self.exitonunemuioport, &mut config.exit_on_unemu_io_port),
            (self.exitonpause, &mut config.exit_on_pause),
            (self.yieldcpuonhlt, &mut config.yield_cpu_on_hlt),
            (
                self.ignoreunimplementedmsraccess,
                &mut config.ignore_unimplemented_msr_access,
            ),
            (self.forcemsiinterrupts, &mut config.force_msi_interrupts),
            (self.apicx2mode, &mut config.apic_x2_mode),
            (
                self.disablemptablegeneration,
                &mut config.disable_mp_table_generation,
            ),
            (self.wireguestmemory, &mut config.wire_guest_memory),
        ];
        for (flag, field) in switches {
            if let Some(value) = flag {
                *field = value;
            }
        }

        if let Some(vcpus) = self.vcpus {
            config.vcpus = vcpus;
        }

        Ok(config)
    }
}

pub fn execute(args: CreateArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let mut config = args.to_config()?;
    config.ensure_uuid();
    config.validate()?;
    tracing::debug!(uuid = %config.uuid, name = %config.name, "Resolved guest configuration");

    let runtime = global.create_runtime()?;
    let created = runtime
        .create(config)
        .context("failed to create guest")?;

    tracing::info!(uuid = %created.uuid, pool = runtime.pool(), "Create finished");
    println!("{}", created.uuid);
    Ok(())
}

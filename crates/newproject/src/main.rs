//! newproject - Start a Dplug plugin from the example template
//!
//! Asks for the vendor and plugin identifiers (or takes them from flags),
//! then creates `<Plugin_Name>/` next to the template.

use anyhow::Result;
use clap::Parser;
use newproject::{Config, PluginIdentity};
use plugkit_core::Prompter;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "newproject")]
#[command(about = "Create a new Dplug plugin project from the example template")]
#[command(version)]
#[command(after_help = r#"PROMPTS:
    Any identifier not given as a flag is asked for interactively:
    Vendor Name, Vendor ID, Plugin Name, Plugin ID, CFBundle Identifier,
    Synth? (y/n), Receives MIDI? (y/n)

CONFIG:
    ~/.config/plugkit/newproject.toml (template, main_source_prefix,
    [placeholders], [defaults])

EXAMPLES:
    newproject                                       # Answer prompts
    newproject --plugin-name "Big Fuzz" --synth      # Prompt for the rest
    newproject --template ../dplug/examples/distort --output ~/plugins
"#)]
struct Cli {
    /// Vendor name (e.g. "Acme Audio")
    #[arg(long)]
    vendor_name: Option<String>,

    /// Four-character vendor code
    #[arg(long)]
    vendor_id: Option<String>,

    /// Plugin name; spaces become underscores in the directory name
    #[arg(long)]
    plugin_name: Option<String>,

    /// Four-character plugin code
    #[arg(long)]
    plugin_id: Option<String>,

    /// CFBundle identifier prefix (e.g. "com.acme")
    #[arg(long)]
    bundle_id: Option<String>,

    /// The plugin is a synth
    #[arg(long)]
    synth: bool,

    /// The plugin receives MIDI
    #[arg(long)]
    midi: bool,

    /// Don't ask the y/n questions; unset flags mean "no"
    #[arg(long, short = 'y')]
    yes: bool,

    /// Template directory (default from config, else ./example-plugin)
    #[arg(long)]
    template: Option<PathBuf>,

    /// Directory in which to create the project
    #[arg(long, default_value = ".")]
    output: PathBuf,

    /// Config file to use instead of the default one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show what would be created without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let mut prompter = Prompter::stdio();
    let identity = gather_identity(&cli, &config, &mut prompter)?;

    let materializer = config.materializer(cli.template.as_deref(), &cli.output);

    if cli.dry_run {
        let plan = materializer.plan(&identity)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            println!("Would create: {}", plan.destination.display());
            println!("  {} -> {}", plan.main_source, plan.main_target);
        }
        return Ok(());
    }

    if !cli.json {
        println!(
            "info: Creating project from template: {}",
            materializer.template().display()
        );
    }

    let report = materializer.materialize(&identity)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("success: Project created: {}", report.destination.display());
    for file in &report.rewritten {
        println!("  {} ({} replacements)", file.path.display(), file.replacements);
    }
    println!("  {} other files copied", report.files_copied);
    println!();
    println!("Next steps:");
    println!("  cd {}", report.destination.display());

    Ok(())
}

/// Fill in the plugin identity from flags, prompting for whatever is missing
fn gather_identity<R: BufRead, W: Write>(
    cli: &Cli,
    config: &Config,
    prompter: &mut Prompter<R, W>,
) -> Result<PluginIdentity> {
    let defaults = &config.defaults;

    let mut ask = |value: &Option<String>, label: &str, default: Option<&str>| match value {
        Some(v) => Ok(v.clone()),
        None => prompter.ask(label, default),
    };

    let vendor_name = ask(&cli.vendor_name, "Vendor Name", defaults.vendor_name.as_deref())?;
    let vendor_id = ask(&cli.vendor_id, "Vendor ID", defaults.vendor_id.as_deref())?;
    let plugin_name = ask(&cli.plugin_name, "Plugin Name", None)?;
    let plugin_id = ask(&cli.plugin_id, "Plugin ID", None)?;
    let bundle_id = ask(&cli.bundle_id, "CFBundle Identifier", defaults.bundle_id.as_deref())?;

    let is_synth = cli.synth || (!cli.yes && prompter.confirm("Synth?")?);
    let receives_midi = cli.midi || (!cli.yes && prompter.confirm("Receives MIDI?")?);

    Ok(PluginIdentity {
        vendor_name,
        vendor_id,
        plugin_name,
        plugin_id,
        bundle_id,
        is_synth,
        receives_midi,
    }
    .trimmed())
}

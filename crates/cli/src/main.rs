mod inspect;
mod render;

use std::fs;
use std::io::{self, Read};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use asset_label_core::canned;
use asset_label_core::store::DEFAULT_DIR_NAME;
use asset_label_core::{
    CompileOptions, FieldMap, LabelTemplate, MissingFieldPolicy, RecordLookup,
    ReservedCharPolicy, StaticRecords, TemplateStore, compile_with, template_variables,
};
use asset_label_print_client::{CupsSpooler, DispatchConfig, PrinterDispatch};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::render::{Format, print_dispatch, print_json, print_names, render_error};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "assetlabel",
    version,
    about = "Asset labels: compile templates to ZPL and send them to print queues"
)]
struct Cli {
    /// Output mode: "pretty" for terminal text, "json" for machine-readable
    /// JSON. Defaults to "pretty" when stdout is a TTY, "json" otherwise.
    /// Device programs are always written raw.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Log spooler commands and compile details to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Template directory [default: $HOME/ADT_Label_Templates].
    #[arg(long, global = true, env = "ASSETLABEL_TEMPLATES")]
    templates: Option<PathBuf>,

    #[command(flatten)]
    spooler: SpoolerArgs,

    #[command(subcommand)]
    cmd: Cmd,
}

/// Print spooler settings.
#[derive(Args, Debug)]
struct SpoolerArgs {
    /// Program used to list print queues.
    #[arg(long, global = true, env = "ASSETLABEL_LPSTAT", default_value = "lpstat")]
    lpstat: String,

    /// Program used to submit print jobs.
    #[arg(long, global = true, env = "ASSETLABEL_LP", default_value = "lp")]
    lp: String,

    /// CUPS server (host[:port]).
    #[arg(long, global = true, env = "CUPS_SERVER")]
    cups_server: Option<String>,

    /// Job title shown in the print queue.
    #[arg(long, global = true)]
    job_title: Option<String>,

    /// Log every payload handed to the spooler to stderr.
    #[arg(long, global = true)]
    trace_io: bool,
}

impl SpoolerArgs {
    fn dispatch(&self) -> PrinterDispatch<CupsSpooler> {
        PrinterDispatch::cups(
            DispatchConfig::default()
                .with_lpstat(&self.lpstat)
                .with_lp(&self.lp)
                .with_server(self.cups_server.clone())
                .with_job_title(self.job_title.clone())
                .with_trace_io(self.trace_io),
        )
    }
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// List the print queues known to the OS.
    Printers,

    /// Compile a template to a device program.
    Compile {
        /// Template JSON file, or the name of a stored template.
        template: String,
        /// Field value as KEY=VALUE (repeatable; overrides record values).
        #[arg(long = "field", short = 'f', value_parser = parse_key_val)]
        fields: Vec<(String, String)>,
        /// JSON array of device records to look up --serial in.
        #[arg(long, requires = "serial")]
        records: Option<PathBuf>,
        /// Serial number to look up in --records.
        #[arg(long, requires = "records")]
        serial: Option<String>,
        /// Unresolved placeholder handling.
        #[arg(long, value_enum, default_value_t = MissingArg::Passthrough)]
        missing: MissingArg,
        #[command(flatten)]
        delivery: Delivery,
    },

    /// List the placeholder names a template uses.
    Variables {
        /// Template JSON file, or the name of a stored template.
        template: String,
    },

    /// Generate one of the fixed label layouts.
    Label {
        #[command(subcommand)]
        kind: LabelKind,
        #[command(flatten)]
        delivery: Delivery,
    },

    /// Send a device program to a print queue.
    Print {
        /// Exact print queue name.
        #[arg(long, short)]
        printer: String,
        /// Number of jobs to submit.
        #[arg(long, default_value_t = 1)]
        copies: usize,
        /// Program file, or "-" for stdin.
        #[arg(default_value = "-")]
        file: String,
    },

    /// Show the literal text of each field in a device program.
    Inspect {
        /// Program file, or "-" for stdin.
        #[arg(default_value = "-")]
        file: String,
    },

    /// Manage the template directory.
    Templates {
        #[command(subcommand)]
        action: TemplatesAction,
    },
}

#[derive(Subcommand, Debug)]
enum LabelKind {
    /// Asset tag with serial bar code and optional IMEI bar code.
    AssetTag {
        serial: String,
        #[arg(long)]
        imei: Option<String>,
    },
    /// Serial label with SKU, serial bar code, and date.
    Serial {
        sku: String,
        serial: String,
        /// Print date (YYYY-MM-DD) [default: today].
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Any value as a bar code.
    Barcode { value: String },
    /// SKU card with description.
    SkuCard { sku: String, description: String },
    /// Device summary label.
    Image {
        summary: String,
        device_sku: String,
        #[arg(long)]
        prefix: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum TemplatesAction {
    /// List stored template files.
    List,
    /// Create the template directory and seed the built-in templates.
    Init,
    /// Print a stored template as JSON.
    Show { name: String },
}

/// Output and dispatch options shared by `compile` and `label`.
#[derive(Args, Debug)]
struct Delivery {
    /// `^` / `~` handling in field data.
    #[arg(long, value_enum, global = true, default_value_t = ReservedArg::Reject)]
    reserved: ReservedArg,
    /// Send the program to this print queue instead of writing it to stdout.
    #[arg(long = "print", global = true, value_name = "PRINTER")]
    print_to: Option<String>,
    /// Number of jobs to submit with --print.
    #[arg(long, global = true, default_value_t = 1, requires = "print_to")]
    copies: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MissingArg {
    /// Leave `${name}` in the output.
    Passthrough,
    /// Replace with an empty string.
    Empty,
    /// Fail compilation.
    Fail,
}

impl From<MissingArg> for MissingFieldPolicy {
    fn from(a: MissingArg) -> Self {
        match a {
            MissingArg::Passthrough => MissingFieldPolicy::Passthrough,
            MissingArg::Empty => MissingFieldPolicy::Empty,
            MissingArg::Fail => MissingFieldPolicy::Fail,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReservedArg {
    /// Fail compilation.
    Reject,
    /// Emit the field under ^FH with hex escapes.
    HexEscape,
}

impl From<ReservedArg> for ReservedCharPolicy {
    fn from(a: ReservedArg) -> Self {
        match a {
            ReservedArg::Reject => ReservedCharPolicy::Reject,
            ReservedArg::HexEscape => ReservedCharPolicy::HexEscape,
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    if k.is_empty() {
        return Err(format!("empty key in {s:?}"));
    }
    Ok((k.to_string(), v.to_string()))
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());
    init_logging(cli.verbose, cli.spooler.trace_io);

    match run(&cli, format) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            render_error(format, &err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, trace_io: bool) {
    let default = default_log_filter(verbose, trace_io);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

/// Filter used when `RUST_LOG` is unset. Payload traces are logged at
/// `trace` level by the print client, so `--trace-io` must enable it there.
fn default_log_filter(verbose: bool, trace_io: bool) -> &'static str {
    match (verbose, trace_io) {
        (false, false) => "warn",
        (true, false) => "debug",
        (false, true) => "warn,asset_label_print_client=trace",
        (true, true) => "debug,asset_label_print_client=trace",
    }
}

fn run(cli: &Cli, format: Format) -> Result<()> {
    match &cli.cmd {
        Cmd::Printers => cmd_printers(cli, format),
        Cmd::Compile {
            template,
            fields,
            records,
            serial,
            missing,
            delivery,
        } => {
            let template = resolve_template(cli, template)?;
            let fields = gather_fields(fields, records.as_deref(), serial.as_deref())?;
            let options = CompileOptions {
                missing: (*missing).into(),
                reserved: delivery.reserved.into(),
            };
            let program = compile_with(&template, &fields, options)
                .with_context(|| format!("compiling template {:?}", template.name))?;
            deliver(cli, format, delivery, &program)
        }
        Cmd::Variables { template } => {
            let template = resolve_template(cli, template)?;
            let names = template_variables(&template);
            print_names(format, "variables", &names)
        }
        Cmd::Label { kind, delivery } => {
            let program = generate_label(kind, delivery.reserved.into())?;
            deliver(cli, format, delivery, &program)
        }
        Cmd::Print {
            printer,
            copies,
            file,
        } => {
            let program = read_input(file)?;
            send(cli, format, printer, *copies, &program)
        }
        Cmd::Inspect { file } => cmd_inspect(file, format),
        Cmd::Templates { action } => cmd_templates(cli, action, format),
    }
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_printers(cli: &Cli, format: Format) -> Result<()> {
    let names = cli
        .spooler
        .dispatch()
        .list_printers()
        .context("listing print queues")?;
    print_names(format, "printers", &names)
}

fn generate_label(kind: &LabelKind, policy: ReservedCharPolicy) -> Result<String> {
    let program = match kind {
        LabelKind::AssetTag { serial, imei } => canned::asset_tag(serial, imei.as_deref(), policy),
        LabelKind::Serial { sku, serial, date } => match date {
            Some(date) => canned::serial_label_dated(sku, serial, *date, policy),
            None => canned::serial_label(sku, serial, policy),
        },
        LabelKind::Barcode { value } => canned::generic_barcode(value, policy),
        LabelKind::SkuCard { sku, description } => canned::sku_card(sku, description, policy),
        LabelKind::Image {
            summary,
            device_sku,
            prefix,
        } => canned::image_label(summary, device_sku, prefix.as_deref(), policy),
    };
    program.context("generating label")
}

fn cmd_inspect(file: &str, format: Format) -> Result<()> {
    let program = read_input(file)?;
    let fields = inspect::field_texts(&program)?;
    match format {
        Format::Json => print_json(&serde_json::json!({ "fields": fields })),
        Format::Pretty => {
            for field in &fields {
                let marker = if field.hex_escaped { " (^FH)" } else { "" };
                println!("{:>6}{marker}: {}", field.offset, field.text);
            }
            Ok(())
        }
    }
}

fn cmd_templates(cli: &Cli, action: &TemplatesAction, format: Format) -> Result<()> {
    let store = open_store(cli)?;
    match action {
        TemplatesAction::List => print_names(format, "templates", &store.names()?),
        TemplatesAction::Init => {
            let dir = store.dir().display().to_string();
            match format {
                Format::Json => print_json(&serde_json::json!({ "directory": dir })),
                Format::Pretty => {
                    eprintln!("templates ready in {dir}");
                    Ok(())
                }
            }
        }
        TemplatesAction::Show { name } => {
            println!("{}", store.load(name)?.to_json()?);
            Ok(())
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Write the program to stdout, or dispatch it when `--print` was given.
fn deliver(cli: &Cli, format: Format, delivery: &Delivery, program: &str) -> Result<()> {
    match &delivery.print_to {
        Some(printer) => send(cli, format, printer, delivery.copies, program),
        None => {
            println!("{program}");
            Ok(())
        }
    }
}

fn send(cli: &Cli, format: Format, printer: &str, copies: usize, program: &str) -> Result<()> {
    if copies == 0 {
        bail!("--copies must be at least 1");
    }
    let dispatch = cli.spooler.dispatch();
    let result = dispatch
        .send_copies(printer, program, copies, |p| {
            log::debug!("copy {} of {} accepted", p.sent, p.total);
            ControlFlow::Continue(())
        })
        .with_context(|| format!("printing to {printer:?}"))?;
    print_dispatch(format, printer, &result)
}

fn open_store(cli: &Cli) -> Result<TemplateStore> {
    let dir = match &cli.templates {
        Some(dir) => dir.clone(),
        None => {
            let home = std::env::var_os("HOME")
                .context("HOME is not set; pass --templates or set ASSETLABEL_TEMPLATES")?;
            PathBuf::from(home).join(DEFAULT_DIR_NAME)
        }
    };
    TemplateStore::open(&dir).with_context(|| format!("opening template directory {}", dir.display()))
}

/// A path to a template file, or else a stored template name.
fn resolve_template(cli: &Cli, arg: &str) -> Result<LabelTemplate> {
    let path = Path::new(arg);
    if path.is_file() {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return LabelTemplate::from_json(&json)
            .with_context(|| format!("failed to load template {}", path.display()));
    }
    Ok(open_store(cli)?.load(arg)?)
}

fn gather_fields(
    overrides: &[(String, String)],
    records: Option<&Path>,
    serial: Option<&str>,
) -> Result<FieldMap> {
    let mut fields = FieldMap::new();
    if let (Some(records), Some(serial)) = (records, serial) {
        let json = fs::read_to_string(records)
            .with_context(|| format!("failed to read {}", records.display()))?;
        let records = StaticRecords::from_json(&json)?;
        match records.lookup(serial)? {
            Some(found) => fields.extend(found),
            None => bail!("no record with serial {serial:?}"),
        }
    }
    fields.extend(overrides.iter().cloned());
    Ok(fields)
}

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(file).with_context(|| format!("failed to read {file}"))
    }
}

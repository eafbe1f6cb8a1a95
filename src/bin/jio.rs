//! jio CLI
//!
//! Validate JSON payload files against the built-in schemas.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use jio::{
    array, boolean, load_document, number, object, string, validate, Error, Keys, ObjectSchema,
};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jio")]
#[command(about = "Validate and coerce JSON documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a payload and print the transformed document
    Validate {
        /// Payload file to validate
        payload: PathBuf,

        /// Built-in schema to validate against
        #[arg(long, value_enum)]
        schema: BuiltinSchema,

        /// Output file (stdout if not specified)
        #[arg(long, conflicts_with = "json")]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// List the built-in schemas
    Schemas,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuiltinSchema {
    /// Application settings with an on/off debug switch
    Settings,
    /// DNS record whose target format depends on its type
    DnsRecord,
}

impl BuiltinSchema {
    fn build(self) -> ObjectSchema {
        match self {
            BuiltinSchema::Settings => settings_schema(),
            BuiltinSchema::DnsRecord => dns_record_schema(),
        }
    }
}

fn settings_schema() -> ObjectSchema {
    object().keys(
        Keys::new()
            .key(
                "debug",
                string().valid(["on", "off"]).convert(|s| {
                    if s == "on" {
                        "off".to_string()
                    } else {
                        s.to_string()
                    }
                }),
            )
            .key("title", string().default("t"))
            .key(
                "list",
                array().items(vec![number().into(), string().into()]),
            )
            .key("is", boolean().truthy(["yes"]).required()),
    )
}

fn dns_record_schema() -> ObjectSchema {
    object().keys(
        Keys::new()
            .key(
                "type",
                string()
                    .lowercase()
                    .valid(["cname", "a", "host"])
                    .required(),
            )
            .key(
                "target",
                string()
                    .when("type", "cname", string().regex(r"^.+\.$"))
                    .when("type", "a", string().regex(r"^\d+\.\d+\.\d+\.\d+$")),
            ),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Validate {
            payload,
            schema,
            output,
            pretty,
            json,
        } => run_validate(&payload, schema, output, pretty, json),
        Commands::Schemas => {
            run_schemas();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Machine-readable result of `validate --json`.
#[derive(Serialize)]
struct Report {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    document: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn run_validate(
    payload_path: &Path,
    schema: BuiltinSchema,
    output: Option<PathBuf>,
    pretty: bool,
    json_output: bool,
) -> Result<(), u8> {
    let payload = load_document(payload_path).map_err(|e| {
        report_error(json_output, &e, pretty);
        e.exit_code() as u8
    })?;

    tracing::debug!(payload = %payload_path.display(), "validating payload");

    let document = validate(&schema.build(), payload).map_err(|e| {
        let e = Error::from(e);
        report_error(json_output, &e, pretty);
        e.exit_code() as u8
    })?;

    if json_output {
        let report = Report {
            valid: true,
            document: Some(document),
            field: None,
            error: None,
        };
        println!("{}", render(&report, pretty)?);
        return Ok(());
    }

    let rendered = render(&document, pretty)?;
    match output {
        Some(path) => {
            std::fs::write(&path, &rendered).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", rendered);
        }
    }

    Ok(())
}

fn run_schemas() {
    for schema in BuiltinSchema::value_variants() {
        if let Some(value) = schema.to_possible_value() {
            match value.get_help() {
                Some(help) => println!("{}\t{}", value.get_name(), help),
                None => println!("{}", value.get_name()),
            }
        }
    }
}

fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String, u8> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })
}

/// Output an error in plain text or JSON format.
fn report_error(json_output: bool, err: &Error, pretty: bool) {
    if !json_output {
        eprintln!("Error: {}", err);
        return;
    }
    let field = match err {
        Error::Invalid(invalid) => invalid.field().map(str::to_string),
        _ => None,
    };
    let report = Report {
        valid: false,
        document: None,
        field,
        error: Some(err.to_string()),
    };
    if let Ok(rendered) = render(&report, pretty) {
        println!("{}", rendered);
    }
}

//! tomino-gen: builds, validates and prints tomino schemas.
//!
//! Reads a type universe (JSON), resolves the requested symbols and prints
//! their IR together with the wire tag of every field.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tomino::schema::{BuildOptions, TypePath, TypeUniverse, generate};
use tomino::{StructField, StructRecord};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// ARGUMENTS
// =============================================================================

/// Build and validate amino-compatible schemas for the given symbols
#[derive(Parser, Debug)]
#[command(name = "tomino-gen", version)]
struct Cli {
    /// type universe JSON file ('-' for stdin)
    #[arg(long, short)]
    input: PathBuf,

    /// qualified symbols to generate, like 'net/url.URL'
    #[arg(required = true)]
    symbols: Vec<String>,

    /// output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// maximum nesting depth of type descriptions
    #[arg(long, default_value_t = tomino::limits::MAX_SCHEMA_DEPTH)]
    max_depth: usize,

    /// resolve named types again at every use
    #[arg(long)]
    no_cache: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

// =============================================================================
// OUTPUT
// =============================================================================

#[derive(Serialize)]
struct FieldTag<'a> {
    name: &'a str,
    number: u32,
    wire_type: tomino::WireType,
    tag: String,
}

#[derive(Serialize)]
struct Generated<'a> {
    symbol: &'a str,
    record: &'a StructRecord,
    tags: Vec<FieldTag<'a>>,
}

fn field_tag(field: &StructField) -> Result<FieldTag<'_>> {
    let tag = field
        .present_tag()
        .with_context(|| format!("computing tag of {}", field.name))?;
    Ok(FieldTag {
        name: &field.name,
        number: field.bin_field_num,
        wire_type: tag.wire_type(),
        tag: tag.to_string(),
    })
}

fn render_json(records: &[StructRecord]) -> Result<String> {
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let tags = record.fields.iter().map(field_tag).collect::<Result<Vec<_>>>()?;
        out.push(Generated {
            symbol: &record.source,
            record,
            tags,
        });
    }
    Ok(serde_json::to_string_pretty(&out)?)
}

fn render_text(records: &[StructRecord]) -> Result<String> {
    let mut out = String::new();
    for record in records {
        writeln!(out, "{} ({} fields)", record.source, record.fields.len())?;
        for field in &record.fields {
            let tag = field_tag(field)?;
            writeln!(out, "  {field}  tag={}", tag.tag)?;
        }
    }
    Ok(out)
}

// =============================================================================
// MAIN
// =============================================================================

fn load_universe(input: &Path) -> Result<TypeUniverse> {
    let json = if input.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading type universe from stdin")?;
        buf
    } else {
        fs::read_to_string(input)
            .with_context(|| format!("reading type universe {}", input.display()))?
    };
    TypeUniverse::from_json(&json).context("parsing type universe")
}

fn run(cli: &Cli) -> Result<String> {
    let universe = load_universe(&cli.input)?;
    tracing::info!(types = universe.len(), "loaded type universe");

    let symbols = cli
        .symbols
        .iter()
        .map(|s| TypePath::parse_qualified(s))
        .collect::<Result<Vec<_>, _>>()?;

    let mut options = BuildOptions::new().with_max_depth(cli.max_depth);
    if cli.no_cache {
        options = options.without_cache();
    }

    let records = generate(&universe, &symbols, options)?;
    tracing::info!(symbols = records.len(), "generated IR");

    match cli.format {
        Format::Text => render_text(&records),
        Format::Json => render_json(&records),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let out = run(&cli)?;
    print!("{out}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tomino::schema::{BasicKind, FieldDesc, TypeDesc};

    fn records() -> Vec<StructRecord> {
        let path = TypePath::new("example.com/p", "T");
        let universe = TypeUniverse::new().with(
            path.clone(),
            TypeDesc::strukt(vec![
                FieldDesc::new("A", TypeDesc::basic(BasicKind::Int)),
                FieldDesc::new("F", TypeDesc::basic(BasicKind::Uint64))
                    .with_tag(r#"binary:"fixed64""#),
                FieldDesc::new("P", TypeDesc::pointer(TypeDesc::basic(BasicKind::Uint32))),
            ]),
        );
        generate(&universe, &[path], BuildOptions::default()).unwrap()
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&records()).unwrap();
        assert_eq!(
            text,
            "example.com/p.T (3 fields)\n\
             \x20 0001=A[] { int64 }  tag=08\n\
             \x20 0002=F[fixed64] { uint64 }  tag=11\n\
             \x20 0003=P[write_empty] { *uint32 }  tag=18\n"
        );
    }

    #[test]
    fn test_render_json() {
        let json: serde_json::Value = serde_json::from_str(&render_json(&records()).unwrap()).unwrap();
        assert_eq!(json[0]["symbol"], "example.com/p.T");
        assert_eq!(json[0]["tags"][1]["tag"], "11");
        assert_eq!(json[0]["tags"][1]["wire_type"], "I64");
        assert_eq!(json[0]["record"]["fields"][1]["flags"], serde_json::json!(["fixed64"]));
        assert_eq!(json[0]["tags"][2]["tag"], "18");
        assert_eq!(json[0]["record"]["fields"][2]["flags"], serde_json::json!(["write_empty"]));
    }

    #[test]
    fn test_url_fixture_tags() {
        let universe = TypeUniverse::from_json(include_str!("../testdata/url.json")).unwrap();
        let path = TypePath::parse_qualified("net/url.URL").unwrap();
        let records = generate(&universe, &[path], BuildOptions::default()).unwrap();
        let url = &records[0];
        assert_eq!(url.fields.len(), 11);

        let tags: Vec<String> = url.fields.iter().map(|f| field_tag(f).unwrap().tag).collect();
        assert_eq!(
            tags,
            ["0a", "12", "1a", "22", "2a", "32", "38", "40", "4a", "52", "5a"]
        );

        let user = url.field("User").unwrap();
        assert_eq!(user.to_string(), "0003=User[write_empty] { *struct Userinfo }");
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "tomino-gen",
            "--input",
            "universe.json",
            "--format",
            "json",
            "--no-cache",
            "net/url.URL",
        ])
        .unwrap();
        assert_eq!(cli.format, Format::Json);
        assert!(cli.no_cache);
        assert_eq!(cli.max_depth, tomino::limits::MAX_SCHEMA_DEPTH);
        assert_eq!(cli.symbols, ["net/url.URL"]);

        assert!(Cli::try_parse_from(["tomino-gen", "--input", "u.json"]).is_err());
    }
}

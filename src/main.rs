use clap::Parser;
use ldtemplate::{ContextBuilder, GeneratorError, Indent, RelationNames};
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Generates a JSON-LD document from JSON data and a template document.
#[derive(Parser, Debug)]
#[command(name = "ldtemplate", version, about, long_about = None)]
struct Args {
    /// Template document (`{ "_template": ..., "_schema": ... }` or a bare template)
    #[arg(short, long)]
    template: PathBuf,

    /// Input data; reads stdin when omitted or `-`
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Extra static schema merged over the output
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Spaces per level, or a literal indent string
    #[arg(short, long)]
    indent: Option<String>,

    /// Key under which template expressions see the parent container
    #[arg(long)]
    parent_key: Option<String>,

    /// Key under which template expressions see the sequence index
    #[arg(long)]
    index_key: Option<String>,

    /// Output file; writes stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn parse_indent(raw: &str) -> Indent {
    match raw.parse::<usize>() {
        Ok(n) => Indent::Spaces(n),
        Err(_) => Indent::Text(raw.to_string()),
    }
}

fn main() -> Result<(), GeneratorError> {
    if env::var("RUST_LOG").is_err() {
        unsafe {
            env::set_var("RUST_LOG", "ldtemplate=info");
        }
    }
    env_logger::init();

    let args = Args::parse();

    let mut builder = ContextBuilder::new().with_template_file(&args.template)?;
    if let Some(schema) = &args.schema {
        builder = builder.with_schema_file(schema)?;
    }
    if let Some(indent) = &args.indent {
        builder = builder.with_indent(parse_indent(indent));
    }
    if args.parent_key.is_some() || args.index_key.is_some() {
        let defaults = RelationNames::default();
        builder = builder.with_relations(RelationNames::new(
            args.parent_key.unwrap_or(defaults.parent),
            args.index_key.unwrap_or(defaults.index),
        ));
    }
    let generator = builder.build()?;

    let document = match &args.data {
        Some(path) if path.as_os_str() != "-" => generator.generate_from_str(&fs::read_to_string(path)?)?,
        _ => generator.generate_from_reader(io::stdin().lock())?,
    };

    match &args.output {
        Some(path) => {
            fs::write(path, document)?;
            log::info!("wrote {}", path.display());
        }
        None => println!("{document}"),
    }
    Ok(())
}

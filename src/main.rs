// Sat Oct 17 2026 - Alex

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use exttype_layout::{
    config::LayoutConfig,
    exttype::{ClassDefinition, DefinitionSet, LayoutReport, TypeRegistry},
    utils::logging::{self, LoggingUtils},
};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Compute extension type layouts and vtable slots", long_about = None)]
struct Args {
    /// JSON file with class definitions in declaration order
    classes: PathBuf,

    /// JSON layout config (pointer and header sizes)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the layouts as JSON
    #[arg(long)]
    json: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InputFile {
    Classes(Vec<ClassDefinition>),
    Document {
        #[serde(default)]
        config: Option<LayoutConfig>,
        classes: Vec<ClassDefinition>,
    },
}

fn main() {
    let args = Args::parse();

    match args.log_level.as_deref() {
        Some(level) => LoggingUtils::init_logger(LoggingUtils::level_from_str(level)),
        None => logging::init(args.verbose),
    }

    match run(&args) {
        Ok(0) => {}
        Ok(failures) => {
            eprintln!("{} {} class(es) failed to build", "[!]".red(), failures);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{} {:#}", "[!]".red(), e);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> anyhow::Result<usize> {
    let text = std::fs::read_to_string(&args.classes)
        .with_context(|| format!("reading {}", args.classes.display()))?;
    let input: InputFile = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", args.classes.display()))?;

    let (embedded_config, classes) = match input {
        InputFile::Classes(classes) => (None, classes),
        InputFile::Document { config, classes } => (config, classes),
    };
    let config = match args.config {
        Some(ref path) => LayoutConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => embedded_config.unwrap_or_default(),
    };

    let definitions: DefinitionSet = classes.into_iter().collect();
    log::info!("{} class definition(s) loaded", definitions.len());

    let registry = TypeRegistry::with_config(config)?.with_source(definitions.clone());
    let mut reports = Vec::new();
    let mut failures = 0;

    for def in definitions.iter() {
        match registry.build_definition(def) {
            Ok(descriptor) => reports.push(LayoutReport::from(descriptor.as_ref())),
            Err(e) => {
                eprintln!("{} {}: {}", "[!]".red(), def.decl.id, e);
                failures += 1;
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{} {}", "[+]".green(), report.id.cyan().bold());
            print!("{}", report);
            println!();
        }
    }

    Ok(failures)
}

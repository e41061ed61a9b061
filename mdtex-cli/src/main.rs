// Command-line interface for mdtex
//
// This binary converts markdown (or a pre-tokenized JSON token tree) into LaTeX, and
// optionally compiles the result to PDF. All the work happens in mdtex-render; this
// crate parses arguments, loads settings through mdtex-config and reports errors.
//
// Usage:
//  mdtex <input> [-o <file.tex>] [--pdf <file.pdf>]      - Convert one file (default)
//  mdtex convert <input> ...                             - Same as above (explicit)
//  mdtex batch <inputs>... [--output-dir <dir>] [--jobs N] - Convert many files in parallel
//  mdtex images <paths>... [--output-dir <dir>]          - Convert BMP/TIFF/GIF/WebP/SVG images to PNG
//  mdtex list                                            - List built-in configs and templates
//
// Construct overrides:
//
// The template of any construct can be replaced for one run with --extra-<construct> <template>.
// The CLI layer strips the "extra-" prefix; the rest must be a construct key. The template is
// always the next argument, even when it starts with '-' (e.g. --extra-thematic-break ---).
// Example:
//  mdtex notes.md --extra-strong '\textsf{\bfseries <text>}' --extra-heading '\<heading_type>*{<text>}'

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use mdtex_config::{Loader, MdtexConfig, LOCAL_CONFIG_FILE};
use mdtex_render::{
    builtin_configs, builtin_templates, convert_batch, convert_file, ConfigMap, Construct,
    ConvertError, ConvertOptions, TokenizerRegistry,
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &["convert", "batch", "images", "list", "help"];

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports:
/// - `--extra-<key> <template>` (the next argument, whatever it starts with)
/// - `--extras-<key> <template>` (alias for `--extra-<key>`)
///
/// A trailing `--extra-<key>` without a template is an error.
fn parse_extra_args(args: &[String]) -> Result<(Vec<String>, HashMap<String, String>), String> {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key_opt = if let Some(key) = arg.strip_prefix("--extra-") {
            Some(key)
        } else {
            arg.strip_prefix("--extras-")
        };

        if let Some(key) = key_opt {
            let template = args
                .get(i + 1)
                .ok_or_else(|| format!("{arg} needs a template value"))?;
            extra_params.insert(key.to_string(), template.clone());
            i += 2;
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    Ok((cleaned_args, extra_params))
}

/// Turn `--extra-*` parameters into construct overrides.
///
/// Keys may use `-` or `_` (`--extra-block-quote` and `--extra-block_quote`
/// both name `block_quote`). Unknown constructs are an error.
fn construct_overrides(extra_params: &HashMap<String, String>) -> Result<ConfigMap, String> {
    let mut overrides = ConfigMap::new();
    for (key, template) in extra_params {
        let normalized = key.replace('-', "_");
        let construct = Construct::from_key(&normalized).ok_or_else(|| {
            format!("Unknown construct '{key}' in --extra-{key} (see `mdtex list`)")
        })?;
        overrides.insert(construct.key().to_string(), template.clone());
    }
    Ok(overrides)
}

/// Put `convert` in front of a bare input path so `mdtex doc.md` works.
fn with_default_subcommand(args: Vec<String>) -> Vec<String> {
    match args.get(1) {
        Some(first) if !first.starts_with('-') && !SUBCOMMANDS.contains(&first.as_str()) => {
            let mut injected = vec![args[0].clone(), "convert".to_string()];
            injected.extend_from_slice(&args[1..]);
            injected
        }
        _ => args,
    }
}

/// Flags shared by `convert` and `batch`.
fn render_args() -> [Arg; 4] {
    [
        Arg::new("from")
            .long("from")
            .help("Input tokenizer: markdown or tokens (detected from the extension)")
            .value_hint(ValueHint::Other),
        Arg::new("config-name")
            .long("config-name")
            .value_name("NAME")
            .help("Construct config: default, chinese, academic, or a file path")
            .value_hint(ValueHint::Other),
        Arg::new("template")
            .long("template")
            .value_name("NAME")
            .help("Document template: basic, academic, chinese_book, or a file path")
            .value_hint(ValueHint::Other),
        Arg::new("no-escape")
            .long("no-escape")
            .help("Do not escape LaTeX metacharacters in text")
            .action(ArgAction::SetTrue),
    ]
}

fn build_cli() -> Command {
    Command::new("mdtex")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Template-driven Markdown to LaTeX converter")
        .long_about(
            "mdtex converts markdown documents to LaTeX. Every construct renders through a\n\
            template taken from a construct config (default, chinese, academic, or a file),\n\
            and the result is wrapped in a document template (basic, academic, chinese_book,\n\
            or a file containing <!-- INSERT_CONTENT -->).\n\n\
            Construct Overrides:\n  \
            Use --extra-<construct> <template> to replace one construct's template.\n\n\
            Examples:\n  \
            mdtex notes.md                               # Write notes.tex\n  \
            mdtex notes.md --config-name academic --pdf notes.pdf\n  \
            mdtex batch docs/*.md --output-dir build     # Convert many files\n  \
            mdtex notes.md --extra-strong '\\textsf{<text>}'",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to an mdtex.toml settings file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert one file to LaTeX (default command)")
                .arg(
                    Arg::new("input")
                        .help("Input file path (.md, .markdown, or a .json token tree)")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output .tex path (defaults to the input with a .tex extension)")
                        .value_hint(ValueHint::FilePath),
                )
                .args(render_args())
                .arg(
                    Arg::new("pdf")
                        .long("pdf")
                        .value_name("PATH")
                        .help("Also compile the LaTeX to this PDF path")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("batch")
                .about("Convert many files in parallel")
                .arg(
                    Arg::new("inputs")
                        .help("Input file paths")
                        .required(true)
                        .num_args(1..)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output-dir")
                        .long("output-dir")
                        .value_name("DIR")
                        .help("Write every output here as <stem>.tex (defaults to next to each input)")
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("jobs")
                        .long("jobs")
                        .short('j')
                        .help("Worker threads (defaults to batch.jobs from the settings)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .args(render_args()),
        )
        .subcommand(
            Command::new("images")
                .about("Convert images LaTeX cannot include (BMP, TIFF, GIF, WebP, SVG) to PNG")
                .arg(
                    Arg::new("paths")
                        .help("Image files, or directories whose images are converted")
                        .required(true)
                        .num_args(1..)
                        .index(1)
                        .value_hint(ValueHint::AnyPath),
                )
                .arg(
                    Arg::new("output-dir")
                        .long("output-dir")
                        .value_name("DIR")
                        .help("Write every PNG here (defaults to next to each image)")
                        .value_hint(ValueHint::DirPath),
                ),
        )
        .subcommand(Command::new("list").about("List built-in construct configs and document templates"))
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, extra_params) = parse_extra_args(&args).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let matches = build_cli()
        .try_get_matches_from(with_default_subcommand(cleaned_args))
        .unwrap_or_else(|e| e.exit());

    let overrides = construct_overrides(&extra_params).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));

    match matches.subcommand() {
        Some(("convert", sub_matches)) => handle_convert_command(sub_matches, overrides, &config),
        Some(("batch", sub_matches)) => handle_batch_command(sub_matches, overrides, &config),
        Some(("images", sub_matches)) => handle_images_command(sub_matches, &config),
        Some(("list", _)) => handle_list_command(),
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_cli_config(explicit_path: Option<&str>) -> MdtexConfig {
    let loader = Loader::new().with_optional_file(LOCAL_CONFIG_FILE);
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

/// Settings first, then command line flags, then construct overrides.
fn convert_options(
    sub_matches: &ArgMatches,
    overrides: ConfigMap,
    config: &MdtexConfig,
) -> ConvertOptions {
    let mut options = config.convert_options();
    if let Some(name) = sub_matches.get_one::<String>("config-name") {
        options = options.with_config(name.as_str());
    }
    if let Some(name) = sub_matches.get_one::<String>("template") {
        options = options.with_template(name.as_str());
    }
    if sub_matches.get_flag("no-escape") {
        options = options.with_escape(false);
    }
    if let Some(from) = sub_matches.get_one::<String>("from") {
        options = options.with_tokenizer(from.as_str());
    }
    options.overrides.extend(overrides);
    options
}

fn handle_convert_command(sub_matches: &ArgMatches, overrides: ConfigMap, config: &MdtexConfig) {
    let input = sub_matches
        .get_one::<String>("input")
        .expect("input is required");
    let output = sub_matches.get_one::<String>("output").map(PathBuf::from);
    let options = convert_options(sub_matches, overrides, config);

    let written = convert_file(Path::new(input), output.as_deref(), &options).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    println!("{}", written.display());

    if let Some(pdf_path) = sub_matches.get_one::<String>("pdf") {
        let tex = fs::read_to_string(&written).unwrap_or_else(|e| {
            eprintln!("Error reading file '{}': {e}", written.display());
            std::process::exit(1);
        });
        // Relative image paths in the source resolve from the .tex location.
        let working_dir = written
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let compiler = config.compiler().with_working_dir(working_dir);
        let report = compiler
            .compile_to_path(&tex, Path::new(pdf_path))
            .unwrap_or_else(|e| {
                eprintln!("Error: {e}");
                std::process::exit(1);
            });
        for warning in &report.warnings {
            eprintln!("Warning: {warning}");
        }
        println!("{pdf_path}");
    }
}

fn handle_batch_command(sub_matches: &ArgMatches, overrides: ConfigMap, config: &MdtexConfig) {
    let inputs: Vec<PathBuf> = sub_matches
        .get_many::<String>("inputs")
        .expect("inputs are required")
        .map(PathBuf::from)
        .collect();
    let output_dir = sub_matches.get_one::<String>("output-dir").map(PathBuf::from);
    let jobs = sub_matches
        .get_one::<usize>("jobs")
        .copied()
        .unwrap_or_else(|| config.jobs());
    let options = convert_options(sub_matches, overrides, config);

    let outcomes = convert_batch(&inputs, output_dir.as_deref(), &options, jobs);
    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(path) => println!("{}", path.display()),
            Err(e) => {
                eprintln!("Error converting '{}': {e}", outcome.input.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} files failed", outcomes.len());
        std::process::exit(1);
    }
}

fn handle_images_command(sub_matches: &ArgMatches, config: &MdtexConfig) {
    let paths: Vec<PathBuf> = sub_matches
        .get_many::<String>("paths")
        .expect("paths are required")
        .map(PathBuf::from)
        .collect();
    let output_dir = sub_matches.get_one::<String>("output-dir").map(PathBuf::from);

    let converter = config.image_converter();
    if !converter.is_ready() {
        eprintln!("Error: no image conversion tool found (install ImageMagick, rsvg-convert or sips)");
        std::process::exit(1);
    }

    let mut results: Vec<(PathBuf, Result<PathBuf, ConvertError>)> = Vec::new();
    for path in &paths {
        if path.is_dir() {
            match converter.convert_dir(path, output_dir.as_deref()) {
                Ok(outcomes) => {
                    results.extend(outcomes.into_iter().map(|o| (o.input, o.result)));
                }
                Err(e) => results.push((path.clone(), Err(e))),
            }
        } else {
            results.push((path.clone(), converter.convert(path, output_dir.as_deref())));
        }
    }

    let mut failed = 0;
    for (input, result) in &results {
        match result {
            Ok(png) => println!("{}", png.display()),
            Err(e) => {
                eprintln!("Error converting '{}': {e}", input.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} images failed", results.len());
        std::process::exit(1);
    }
}

fn handle_list_command() {
    println!("Construct configs:");
    for name in builtin_configs() {
        println!("  {name}");
    }

    println!("\nDocument templates:");
    for name in builtin_templates() {
        println!("  {name}");
    }

    println!("\nInput tokenizers:");
    let registry = TokenizerRegistry::with_defaults();
    for name in registry.list() {
        println!("  {name}");
    }

    println!("\nConstructs (for --extra-<construct>):");
    for construct in Construct::ALL {
        println!("  {}", construct.key());
    }
}

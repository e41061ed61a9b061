use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the command tree in src/main.rs
// Build scripts can't access src/ modules, so the flags are repeated here
fn render_args() -> [Arg; 4] {
    [
        Arg::new("from")
            .long("from")
            .help("Input tokenizer")
            .value_parser(["markdown", "tokens"]),
        Arg::new("config-name")
            .long("config-name")
            .help("Construct config name or path")
            .value_hint(ValueHint::FilePath),
        Arg::new("template")
            .long("template")
            .help("Document template name or path")
            .value_hint(ValueHint::FilePath),
        Arg::new("no-escape")
            .long("no-escape")
            .help("Do not escape LaTeX metacharacters in text")
            .action(ArgAction::SetTrue),
    ]
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("mdtex")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Template-driven Markdown to LaTeX converter")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to an mdtex.toml settings file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert one file to LaTeX")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                )
                .args(render_args())
                .arg(Arg::new("pdf").long("pdf").value_hint(ValueHint::FilePath)),
        )
        .subcommand(
            Command::new("batch")
                .about("Convert many files in parallel")
                .arg(
                    Arg::new("inputs")
                        .required(true)
                        .num_args(1..)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output-dir")
                        .long("output-dir")
                        .value_hint(ValueHint::DirPath),
                )
                .arg(Arg::new("jobs").long("jobs").short('j'))
                .args(render_args()),
        )
        .subcommand(
            Command::new("images")
                .about("Convert images LaTeX cannot include to PNG")
                .arg(
                    Arg::new("paths")
                        .required(true)
                        .num_args(1..)
                        .index(1)
                        .value_hint(ValueHint::AnyPath),
                )
                .arg(
                    Arg::new("output-dir")
                        .long("output-dir")
                        .value_hint(ValueHint::DirPath),
                ),
        )
        .subcommand(Command::new("list").about("List built-in configs and templates"));

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "mdtex", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "mdtex", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "mdtex", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}

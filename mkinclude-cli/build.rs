//! Build script for mkinclude-cli.
//!
//! This script generates man pages at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs
/// When adding/removing/modifying commands, update both files.
fn build_cli() -> Command {
    Command::new("mkinclude")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect include-once and from-here resolution for GNU make")
        .long_about(
            "Command-line companion to the mkinclude make plugin: resolves paths, \
             evaluates from-here and traces include graphs outside of make",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Configuration file to load on top of the user configuration")
                .value_name("PATH")
                .global(true)
                .env("MKINCLUDE_CONFIG"),
        )
        .subcommands(vec![
            Command::new("resolve")
                .about("Print the canonical form of one or more paths")
                .long_about("Resolve paths lexically against a base directory, as include-once does"),
            Command::new("from-here")
                .about("Evaluate $(from-here LIST) for a given context")
                .long_about("Resolve a word list against the current context directory"),
            Command::new("trace")
                .about("Dry-run a build description and print its inclusion tree")
                .long_about(
                    "Follow include directives and the include functions through a \
                     build description without running make",
                ),
            Command::new("show-config")
                .about("Show the configuration in effect")
                .long_about("Print the layered configuration with every default filled in"),
            Command::new("validate")
                .about("Validate a configuration file")
                .long_about("Check an mkinclude configuration file for errors"),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate shell completion scripts for bash, zsh, fish, or PowerShell"),
        ])
}

fn main() {
    // Generate man pages at build time
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    let app = build_cli();
    let man = Man::new(app);
    let mut buffer = Vec::new();
    man.render(&mut buffer).unwrap();

    fs::write(man_dir.join("mkinclude.1"), buffer).unwrap();

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}

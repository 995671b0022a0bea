// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result};
use banview_tui::RunOptions;
use config::Config;
use runtime::SnapshotRuntime;
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `banview --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let snapshot_path = config.snapshot_path()?;
    if options.print_snapshot_path {
        println!("{}", snapshot_path.display());
        return Ok(());
    }

    let mut source = if options.demo {
        SnapshotRuntime::demo(config.demo_seed())
    } else {
        SnapshotRuntime::from_file(&snapshot_path).with_context(|| {
            format!(
                "open snapshot {} -- if this path is wrong, set [source].snapshot_path or BANVIEW_SNAPSHOT_PATH, or launch with --demo",
                snapshot_path.display()
            )
        })?
    };
    if options.check_only {
        return Ok(());
    }

    let run_options = RunOptions {
        show_totals: config.show_totals(),
    };
    banview_tui::run_app(&mut source, &run_options)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_snapshot_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_snapshot_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-snapshot-path" => {
                options.print_snapshot_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("banview");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-snapshot-path    Print resolved snapshot path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch with seeded demo bans (in-memory)");
    println!("  --check                  Validate config + snapshot without launching");
    println!("  --help                   Show this help");
}

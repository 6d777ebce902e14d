use std::path::PathBuf;

use apod_tui::RunOptions;

const HELP: &str = "APOD-TUI: browse Astronomy Picture of the Day galleries from the terminal.

  --feed <url>         Load the gallery from this JSON feed
  --config <path>      Read configuration from this file
  --version, -V        Show version and exit
  --help,    -h        Show this help message";

enum CliAction {
    Exit(i32),
    Run(RunOptions),
}

fn main() {
    let options = match handle_cli_flags(std::env::args().skip(1)) {
        CliAction::Exit(code) => std::process::exit(code),
        CliAction::Run(options) => options,
    };

    if let Err(err) = apod_tui::run(options) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

fn handle_cli_flags(mut args: impl Iterator<Item = String>) -> CliAction {
    let mut options = RunOptions::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("APOD-TUI {}", apod_tui::VERSION);
                return CliAction::Exit(0);
            }
            "--help" | "-h" => {
                println!("{HELP}");
                return CliAction::Exit(0);
            }
            "--feed" => match args.next() {
                Some(url) => options.feed_url = Some(url),
                None => {
                    eprintln!("--feed requires a URL");
                    return CliAction::Exit(2);
                }
            },
            "--config" => match args.next() {
                Some(path) => options.config_file = Some(PathBuf::from(path)),
                None => {
                    eprintln!("--config requires a path");
                    return CliAction::Exit(2);
                }
            },
            other => {
                eprintln!("unknown argument: {other}\n\n{HELP}");
                return CliAction::Exit(2);
            }
        }
    }
    CliAction::Run(options)
}

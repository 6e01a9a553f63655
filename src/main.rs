use gravity_sim::app::{self, RunOptions};
use std::env;
use std::path::PathBuf;

fn print_usage() {
    println!("Usage: gravity_sim [--config FILE] [--load FILE] [--ticks N] [--save FILE]");
    println!();
    println!("  --config FILE   init config (TOML); ./init_config.toml or defaults when omitted");
    println!("  --load FILE     start from a saved snapshot (JSON, optionally .gz)");
    println!("  --ticks N       stop after N ticks");
    println!("  --save FILE     write a snapshot when the tick limit is reached");
}

fn parse_args(args: &[String]) -> Result<RunOptions, String> {
    let mut options = RunOptions::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let mut value = || iter.next().cloned().ok_or_else(|| format!("{flag} needs a value"));
        match flag.as_str() {
            "--config" => options.config_path = Some(PathBuf::from(value()?)),
            "--load" => options.load_path = Some(PathBuf::from(value()?)),
            "--save" => options.save_path = Some(PathBuf::from(value()?)),
            "--ticks" => {
                let raw = value()?;
                let ticks = raw.parse().map_err(|_| format!("invalid tick count: {raw}"))?;
                options.ticks = Some(ticks);
            }
            _ => return Err(format!("unknown argument: {flag}")),
        }
    }
    if options.save_path.is_some() && options.ticks.is_none() {
        return Err("--save requires --ticks".to_string());
    }
    Ok(options)
}

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("{msg}");
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(e) = app::run(options) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

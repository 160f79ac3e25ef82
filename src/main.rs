// SPDX-License-Identifier: GPL-3.0-or-later
use log::info;
use std::env;
use std::process::ExitCode;
use target_search::*;

const USAGE: &str = "usage: target_search angle [setting.json] [step_deg] | shannon <num_pts> | config";

fn load_setting(path: Option<&String>) -> Result<SearchSetting, ConfigError> {
    match path {
        Some(path) => SearchSetting::from_file(path),
        None => Ok(SearchSetting::default()),
    }
}

fn run(args: &[String]) -> Result<(), String> {
    match args.get(1).map(String::as_str) {
        Some("angle") => {
            let setting = load_setting(args.get(2)).map_err(|e| e.to_string())?;
            let step: f64 = match args.get(3) {
                Some(s) => s.parse().map_err(|_| format!("bad step {s:?}"))?,
                None => 1.0,
            };
            info!("sweeping {} model every {step} degrees", setting.model);
            println!("{}", json::stringify(angle_sweep_json(&setting, step)));
        }
        Some("shannon") => {
            let n: usize = args
                .get(2)
                .ok_or(USAGE)?
                .parse()
                .map_err(|_| "expect usize".to_string())?;
            println!("{}", json::stringify(shannon_curve_json(n)));
        }
        Some("config") => {
            println!("{}", json::stringify_pretty(SearchSetting::default().to_json(), 2));
        }
        _ => return Err(USAGE.to_string()),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;

use glob::glob;
use round_rules::{validate_catalogs, RoundCatalogs};

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("validate-data") => validate_data(),
        Some("help") | None => {
            print_usage();
            Ok(())
        }
        Some(cmd) => {
            eprintln!("Unknown xtask '{cmd}'.");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: cargo xtask validate-data");
    eprintln!("       cargo xtask help");
}

fn validate_data() -> Result<(), Box<dyn Error>> {
    check_json_syntax()?;

    // Honour the *_PATH overrides so edited catalogs can be checked before use.
    let catalogs = RoundCatalogs::from_env();
    let issues = validate_catalogs(&catalogs);
    if issues.is_empty() {
        println!(
            "Catalogs consistent: {} planets, {} platoons, {} prototypes, {} maps",
            catalogs.planets.len(),
            catalogs.platoons.len(),
            catalogs.prototypes.len(),
            catalogs.blueprints.len()
        );
        return Ok(());
    }

    for issue in &issues {
        eprintln!("  {issue}");
    }
    Err(format!("{} catalog issue(s) found", issues.len()).into())
}

fn check_json_syntax() -> Result<(), Box<dyn Error>> {
    let patterns = [
        Path::new("round_rules").join("src").join("data").join("*.json"),
        Path::new("integration_tests")
            .join("tests")
            .join("fixtures")
            .join("*.json"),
    ];

    let mut checked = 0;
    for pattern in &patterns {
        for entry in glob(&pattern.to_string_lossy())? {
            let path = entry?;
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str::<serde_json::Value>(&raw)
                .map_err(|err| format!("{}: {err}", path.display()))?;
            checked += 1;
        }
    }

    if checked == 0 {
        return Err("no data files found; run from the workspace root".into());
    }
    println!("Parsed {checked} data files");
    Ok(())
}

use std::cmp::Ordering;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde_json::Value;

use jrv::criteria::ast::{Criteria, Order, OrderDirection};
use jrv::criteria::eval::{compare_values, validate_object, validate_object_with_messages};
use jrv::criteria::rules::{parse_rules, RuleMap};
use jrv::error::CriteriaError;
use jrv::records;

#[derive(Parser)]
#[command(name = "jrv", about = "Validate JSON and YAML records against declarative criteria rules")]
struct Cli {
    #[arg(long, env = "JRV_ROOT")]
    root: Option<PathBuf>,

    #[arg(long, help = "Read record paths from stdin")]
    stdin: bool,

    #[arg(long, help = "Print failure messages instead of passing paths")]
    messages: bool,

    #[arg(long, help = "Sort passing records by FIELD or FIELD:desc")]
    sort: Option<String>,

    #[arg(help = "Rules file (YAML, or JSON for .json)")]
    rules: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let Some(rules_path) = cli.rules else {
        eprintln!("Error: no rules file provided");
        return ExitCode::from(2);
    };

    let rule_map = match load_rule_map(&rules_path) {
        Ok(map) => map,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    let mut criteria = match parse_rules(&rule_map) {
        Ok(criteria) => criteria,
        Err(e) => {
            eprintln!("Rule error: {}", e);
            return ExitCode::from(2);
        }
    };

    if let Some(sort) = &cli.sort {
        match parse_sort(sort) {
            Ok(order) => criteria = criteria.and(Criteria::new(Vec::new(), vec![order])),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(2);
            }
        }
    }

    let files = if cli.stdin {
        records::read_paths_from_stdin()
    } else {
        let Some(root) = cli.root else {
            eprintln!("Error: no record root specified. Use --root or set JRV_ROOT");
            return ExitCode::from(2);
        };
        records::collect_record_files(&root)
    };

    let loaded: Vec<(PathBuf, Value)> = files
        .into_iter()
        .filter_map(|path| {
            let record = records::load_record(&path)?;
            Some((path, record))
        })
        .collect();

    if cli.messages {
        run_messages_mode(&loaded, &criteria)
    } else {
        run_filter_mode(&loaded, &criteria)
    }
}

fn load_rule_map(path: &PathBuf) -> Result<RuleMap, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("cannot read rules file {}: {}", path.display(), e))?;
    if records::is_json(path) {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&content).map_err(|e| e.to_string())
    }
}

fn parse_sort(arg: &str) -> Result<Order, CriteriaError> {
    match arg.split_once(':') {
        Some((field, direction)) => Ok(Order::new(field, direction.parse()?)),
        None => Ok(Order::new(arg, OrderDirection::Asc)),
    }
}

fn run_filter_mode(loaded: &[(PathBuf, Value)], criteria: &Criteria) -> ExitCode {
    let mut passing: Vec<&(PathBuf, Value)> = Vec::new();

    for entry in loaded {
        match validate_object(&entry.1, criteria) {
            Ok(true) => passing.push(entry),
            Ok(false) => {}
            Err(e) => {
                eprintln!("Validation error: {}", e);
                return ExitCode::from(2);
            }
        }
    }

    sort_records(&mut passing, &criteria.orders());

    for (path, _) in &passing {
        println!("{}", path.display());
    }

    if passing.is_empty() {
        ExitCode::from(1)
    } else {
        ExitCode::from(0)
    }
}

fn run_messages_mode(loaded: &[(PathBuf, Value)], criteria: &Criteria) -> ExitCode {
    let mut all_valid = true;

    for (path, record) in loaded {
        match validate_object_with_messages(record, criteria) {
            Ok((true, _)) => {}
            Ok((false, messages)) => {
                all_valid = false;
                for message in messages {
                    println!("{}: {}", path.display(), message);
                }
            }
            Err(e) => {
                eprintln!("Validation error: {}", e);
                return ExitCode::from(2);
            }
        }
    }

    if all_valid {
        ExitCode::from(0)
    } else {
        ExitCode::from(1)
    }
}

fn sort_records(records: &mut [&(PathBuf, Value)], orders: &[&Order]) {
    if orders.is_empty() {
        return;
    }
    records.sort_by(|(_, a), (_, b)| {
        for order in orders {
            let left = a.get(&order.field).unwrap_or(&Value::Null);
            let right = b.get(&order.field).unwrap_or(&Value::Null);
            let mut ordering = compare_values(left, right).unwrap_or(Ordering::Equal);
            if order.direction == OrderDirection::Desc {
                ordering = ordering.reverse();
            }
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

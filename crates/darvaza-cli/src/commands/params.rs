//! Parameter listing command.

#![allow(clippy::print_literal)]

use clap::Args;
use darvaza_config::{ParamId, STATE_LEN};

#[derive(Args)]
pub struct ParamsArgs {
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&params_json())?);
        return Ok(());
    }

    println!(
        "  {:>3}  {:18}  {:8}  {:7}  {}",
        "#", "Id", "Label", "Default", "Description"
    );
    println!(
        "  {:>3}  {:18}  {:8}  {:7}  {}",
        "-", "--", "-----", "-------", "-----------"
    );
    for id in ParamId::ALL {
        println!(
            "  {:>3}  {:18}  {:8}  {:<7.3}  {}",
            id.index(),
            id.name(),
            id.label(),
            id.default_value(),
            id.description()
        );
    }
    println!();
    println!(
        "Values are normalized to 0..1. Saved state is {} bytes: the values in this order, then the bypass flag.",
        STATE_LEN
    );
    Ok(())
}

fn params_json() -> serde_json::Value {
    let params: Vec<serde_json::Value> = ParamId::ALL
        .iter()
        .map(|id| {
            serde_json::json!({
                "index": id.index(),
                "id": id.name(),
                "label": id.label(),
                "default": id.default_value(),
                "toggle": id.is_toggle(),
                "description": id.description(),
            })
        })
        .collect();
    serde_json::Value::Array(params)
}

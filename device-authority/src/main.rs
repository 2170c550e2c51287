//! Device Authority CLI

use anyhow::Result;
use device_authority::{
    Capability, CommandDispatcher, CommandKind, GrantTable, PermissionAuthority, SoftLock,
};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let table = load_policy()?;

    match args[1].as_str() {
        "list" => {
            list_capabilities(&table);
        }
        "check" => {
            let capability = parse_capability_arg(&args)?;
            println!("{}: {:?}", capability, table.check(capability));
        }
        "request" => {
            let capability = parse_capability_arg(&args)?;
            let state = table.request(capability).await;
            println!("{capability}: {state:?}");
        }
        "lock" => {
            let lock = Arc::new(SoftLock::new(device_admin_enabled()));
            let dispatcher = CommandDispatcher::new(lock);
            let outcome = dispatcher.dispatch(&CommandKind::Lock);
            println!("{}", outcome.message);
            if !outcome.success {
                std::process::exit(1);
            }
        }
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_usage() {
    println!("Device Authority v{}", device_authority::VERSION);
    println!();
    println!("Usage:");
    println!("  device-authority list                 Show all capability grant states");
    println!("  device-authority check <capability>   Check a capability without prompting");
    println!("  device-authority request <capability> Request a capability grant");
    println!("  device-authority lock                 Attempt an immediate device lock");
    println!();
    println!("Environment:");
    println!("  DEVICE_POLICY  Path to a JSON or YAML grant policy file");
    println!("  DEVICE_ADMIN   Set to 1 to simulate device admin being enabled");
}

fn parse_capability_arg(args: &[String]) -> Result<Capability> {
    let name = args
        .get(2)
        .ok_or_else(|| anyhow::anyhow!("missing capability argument"))?;
    Ok(Capability::parse(name)?)
}

fn list_capabilities(table: &GrantTable) {
    println!("Capability grants:");
    for capability in Capability::ALL {
        println!("  {:<12} {:?}", capability.as_str(), table.check(capability));
    }
}

/// Load the grant policy named by DEVICE_POLICY, or fall back to a
/// permissive in-memory table.
fn load_policy() -> Result<GrantTable> {
    match env::var("DEVICE_POLICY") {
        Ok(path) => {
            let body = std::fs::read_to_string(&path)?;
            let table = if path.ends_with(".yaml") || path.ends_with(".yml") {
                GrantTable::from_yaml(&body)?
            } else {
                GrantTable::from_json(&body)?
            };
            Ok(table)
        }
        Err(_) => Ok(GrantTable::permissive()),
    }
}

fn device_admin_enabled() -> bool {
    matches!(
        env::var("DEVICE_ADMIN").as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

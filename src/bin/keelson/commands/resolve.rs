//! `keelson resolve` command

use anyhow::Result;

use crate::cli::ResolveArgs;
use keelson::ops::resolve_project;
use keelson::util::GlobalContext;

pub fn execute(args: ResolveArgs, ctx: &GlobalContext) -> Result<()> {
    let resolution = resolve_project(ctx, &args.target.options(Vec::new()))?;
    let report = resolution.report();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Resolved target `{}` ({}) in {} passes",
        report.target, report.arch, report.passes
    );

    println!();
    println!("Packages ({}):", report.packages.len());
    for pkg in &report.packages {
        println!("  {}", pkg);
    }

    println!();
    if report.features.is_empty() {
        println!("Features: (none)");
    } else {
        println!("Features: {}", report.features.join(" "));
    }

    Ok(())
}

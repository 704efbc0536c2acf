//! `keelson flags` command

use anyhow::{Context, Result};

use crate::cli::FlagsArgs;
use keelson::ops::resolve_project;
use keelson::util::GlobalContext;

pub fn execute(args: FlagsArgs, ctx: &GlobalContext) -> Result<()> {
    let resolution = resolve_project(ctx, &args.target.options(vec![args.package.clone()]))?;
    let id = resolution
        .roots
        .first()
        .copied()
        .with_context(|| format!("package `{}` was not resolved", args.package))?;

    let mut builder = resolution.builder;
    let pkg_name = builder
        .package(id)
        .map(|p| p.to_string())
        .unwrap_or_else(|| args.package.clone());
    let ci = builder.compiler_info(id)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(ci)?);
        return Ok(());
    }

    if args.compile {
        println!("{}", ci.compile_args().join(" "));
        return Ok(());
    }

    if args.link {
        println!("{}", ci.lflags.join(" "));
        return Ok(());
    }

    println!("# Compiler info for `{}`:", pkg_name);
    println!("cflags: {}", ci.cflags.join(" "));
    println!("lflags: {}", ci.lflags.join(" "));
    println!("aflags: {}", ci.aflags.join(" "));
    println!("includes:");
    for dir in &ci.includes {
        println!("  {}", dir.display());
    }
    println!("fingerprint: {}", ci.short_fingerprint());

    Ok(())
}

//! `keelson tree` command

use std::collections::HashSet;

use anyhow::{Context, Result};

use crate::cli::TreeArgs;
use keelson::core::{PackageId, PackageRegistry, Project};
use keelson::ops::resolve_project;
use keelson::util::GlobalContext;
use keelson::Builder;

pub fn execute(args: TreeArgs, ctx: &GlobalContext) -> Result<()> {
    let resolution = resolve_project(ctx, &args.target.options(vec![args.package.clone()]))?;
    let root_id = resolution
        .roots
        .first()
        .copied()
        .with_context(|| format!("package `{}` was not resolved", args.package))?;

    let mut seen = HashSet::new();
    print_tree(
        &resolution.builder,
        root_id,
        0,
        args.depth.unwrap_or(usize::MAX),
        &mut seen,
    );

    Ok(())
}

fn print_tree(
    builder: &Builder<Project>,
    pkg_id: PackageId,
    depth: usize,
    max_depth: usize,
    seen: &mut HashSet<PackageId>,
) {
    if depth > max_depth {
        return;
    }

    let Some(bpkg) = builder.package(pkg_id) else {
        return;
    };

    let is_duplicate = !seen.insert(pkg_id);

    let prefix = if depth == 0 {
        String::new()
    } else {
        format!("{}├── ", "│   ".repeat(depth - 1))
    };

    let version = bpkg
        .package()
        .version()
        .map(|v| format!(" v{}", v))
        .unwrap_or_default();
    let dup_marker = if is_duplicate { " (*)" } else { "" };

    println!("{}{}{}{}", prefix, bpkg, version, dup_marker);

    // Already printed above; stop here so cycles terminate.
    if is_duplicate {
        return;
    }

    for dep in bpkg.deps() {
        if let Some(dep_id) = builder.registry().resolve(dep) {
            print_tree(builder, dep_id, depth + 1, max_depth, seen);
        }
    }
}

//! Installed plugin handlers.

use anyhow::Result;

use super::report;
use crate::cli::output::{
    format_table, print_hint, print_kv, print_table, print_warning, OutputMode,
};
use crate::init::AppContext;
use crate::outcome::OpResult;
use crate::plugins::{PluginManifest, PluginScan};
use crate::StarError;

fn manifest_rows(manifests: &[PluginManifest], numbered: bool) -> Vec<Vec<String>> {
    manifests
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let mut row = vec![
                m.name.clone(),
                m.version.clone(),
                m.entry_point.clone().unwrap_or_else(|| "(first match)".to_string()),
                m.description.clone().unwrap_or_default(),
            ];
            if numbered {
                row.insert(0, (i + 1).to_string());
            }
            row
        })
        .collect()
}

pub fn handle_list(ctx: &AppContext, mode: OutputMode) -> Result<()> {
    let result = ctx.manifests.scan_installed();
    report(&result, mode, |scan: &PluginScan| {
        print_table(
            &["Name", "Version", "Entry Point", "Description"],
            manifest_rows(&scan.manifests, false),
        );
        for skipped in &scan.skipped {
            print_warning(&format!("{}: {}", skipped.folder.display(), skipped.reason));
        }
    });
    Ok(())
}

/// Pick a plugin by name, or from a numbered list when no name was given.
fn choose_manifest(
    ctx: &AppContext,
    name: Option<&str>,
    version: Option<&str>,
    mode: OutputMode,
) -> OpResult<PluginManifest> {
    if let Some(name) = name {
        return ctx.manifests.load_installed(name, version);
    }

    let scan = ctx.manifests.scan_installed();
    let manifests = match scan.value {
        Some(scan) if !scan.manifests.is_empty() => scan.manifests,
        _ => {
            return OpResult::error(&StarError::NoMatch {
                entity: "installed plugin".to_string(),
            })
        }
    };

    let table = format_table(
        &["#", "Name", "Version", "Entry Point", "Description"],
        manifest_rows(&manifests, true),
    );
    match mode {
        OutputMode::Human => println!("{}", table),
        OutputMode::Json => eprintln!("{}", table),
    }

    let max = i64::try_from(manifests.len()).unwrap_or(i64::MAX);
    loop {
        let number = match ctx
            .prompter
            .ask_int("Enter the number of the plugin you wish to run:", 1, max)
        {
            Ok(n) => n,
            Err(e) => return OpResult::error(&e),
        };
        match usize::try_from(number)
            .ok()
            .filter(|n| *n >= 1)
            .and_then(|n| manifests.get(n - 1))
        {
            Some(manifest) => return OpResult::ok(manifest.clone()),
            None => ctx.renderer.error(&format!(
                "Invalid number, it needs to be between 1 and {}",
                manifests.len()
            )),
        }
    }
}

pub fn handle_run(
    ctx: &AppContext,
    name: Option<&str>,
    version: Option<&str>,
    mode: OutputMode,
) -> Result<()> {
    let chosen = choose_manifest(ctx, name, version, mode);
    let Some(manifest) = chosen.value.as_ref().filter(|_| !chosen.is_error) else {
        report(&chosen, mode, |_| {});
        return Ok(());
    };

    ctx.renderer
        .working(&format!("Loading plugin '{}'...", manifest.name));
    let result = ctx.plugin_runtime.load_and_run(
        &ctx.plugin_registry,
        manifest,
        ctx.caller_id,
        &ctx.config.plugin_config_json(),
    );

    report(&result, mode, |run| {
        print_kv("Plugin", &format!("{} {}", run.name, run.version));
        print_kv("Entry Module", &run.entry_module);
        print_kv("Exit Code", &run.exit_code.to_string());
        if let Some(fuel) = run.fuel_consumed {
            print_kv("Fuel Consumed", &fuel.to_string());
        }
        for line in &run.output {
            print_hint(line);
        }
    });
    Ok(())
}

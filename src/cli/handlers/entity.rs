//! Wizard-backed handlers for every entity kind.

use anyhow::Result;

use super::report;
use crate::cli::output::{print_kv, print_table, OutputMode};
use crate::init::AppContext;
use crate::models::EntityKind;

pub async fn handle_create(ctx: &AppContext, kind: EntityKind, mode: OutputMode) -> Result<()> {
    let result = ctx.wizard(kind).create().await;
    if let Some(entity) = &result.value {
        ctx.session_manager.record_access(entity.id).await;
    }

    report(&result, mode, |entity| {
        print_kv("Id", &entity.id.to_string());
        print_kv("Dependencies", &entity.dependencies.len().to_string());
    });
    Ok(())
}

pub async fn handle_show(
    ctx: &AppContext,
    kind: EntityKind,
    token: &str,
    mode: OutputMode,
) -> Result<()> {
    let result = ctx.wizard(kind).show(token).await;
    if let Some(resolved) = &result.value {
        ctx.session_manager.record_access(resolved.entity.id).await;
    }

    // The resolver already rendered the detail view.
    report(&result, mode, |_| {});
    Ok(())
}

pub async fn handle_list(
    ctx: &AppContext,
    kind: EntityKind,
    mine: bool,
    mode: OutputMode,
) -> Result<()> {
    let result = ctx.wizard(kind).list(mine).await;
    report(&result, mode, |candidates| {
        ctx.renderer.display_list(kind, candidates, false)
    });
    Ok(())
}

pub async fn handle_search(
    ctx: &AppContext,
    kind: EntityKind,
    term: &str,
    mine: bool,
    mode: OutputMode,
) -> Result<()> {
    let result = ctx.wizard(kind).search(term, mine).await;
    report(&result, mode, |candidates| {
        ctx.renderer.display_list(kind, candidates, false)
    });
    Ok(())
}

pub async fn handle_update(
    ctx: &AppContext,
    kind: EntityKind,
    token: &str,
    mode: OutputMode,
) -> Result<()> {
    let result = ctx.wizard(kind).update(token).await;
    if let Some(entity) = &result.value {
        ctx.session_manager.record_access(entity.id).await;
    }

    report(&result, mode, |entity| {
        print_kv("Version", &entity.version.to_string());
    });
    Ok(())
}

pub async fn handle_delete(
    ctx: &AppContext,
    kind: EntityKind,
    token: &str,
    mode: OutputMode,
) -> Result<()> {
    let result = ctx.wizard(kind).delete(token).await;
    report(&result, mode, |_| {});
    Ok(())
}

pub async fn handle_add_dependency(
    ctx: &AppContext,
    kind: EntityKind,
    token: &str,
    mode: OutputMode,
) -> Result<()> {
    let result = ctx.wizard(kind).add_dependency(token).await;
    if let Some(graph) = &result.value {
        ctx.session_manager.record_access(graph.parent_id()).await;
    }

    report(&result, mode, |graph| {
        let rows = graph
            .records()
            .iter()
            .map(|r| vec![r.dependency_type.clone(), r.entity_id.to_string()])
            .collect();
        print_table(&["Type", "Entity Id"], rows);
    });
    Ok(())
}

pub async fn handle_remove_dependency(
    ctx: &AppContext,
    kind: EntityKind,
    token: &str,
    mode: OutputMode,
) -> Result<()> {
    let result = ctx.wizard(kind).remove_dependency(token).await;
    report(&result, mode, |record| {
        print_kv("Removed", &format!("{} {}", record.dependency_type, record.entity_id));
    });
    Ok(())
}

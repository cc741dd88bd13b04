//! # CLI Layer
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Installs the tracing subscriber
//! - Builds the async runtime
//! - Formats output for human consumption
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: Convert shell arguments into typed commands via clap
//! 2. **Context Setup**: Load [`AppConfig`], build the HTTP client and update channels
//! 3. **Dispatch**: Drive the matching view on a current-thread runtime
//! 4. **Output Formatting**: Tables or JSON via `render`
//!
//! Logs go to stderr. `-v` raises the default level to `debug`; `RUST_LOG` overrides both.

use super::render::{render_grid, render_json, render_record};
use super::setup::{Cli, Commands};
use anyhow::{anyhow, Context as _, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use educenterapp::bus::ChannelRegistry;
use educenterapp::config::AppConfig;
use educenterapp::filter::FilterChanged;
use educenterapp::grid::{student_list_grid, ColumnDef, GridOptions};
use educenterapp::locale::StaticLocale;
use educenterapp::model::{Entity, EntityId, LearningType, ReasonForLeaving, Student};
use educenterapp::resource::http::{build_client, Client, RestResource};
use educenterapp::sync::ListSynchronizer;
use educenterapp::views::{StudentArchiveView, StudentDetailView, StudentListView};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }

    let command = cli.command.unwrap_or_default();
    if let Commands::Config = command {
        print!("{}", render_config(&config)?);
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    let ctx = Context::new(config, cli.json)?;
    runtime.block_on(dispatch(&ctx, command))
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "educenter=debug,educenterapp=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Everything a handler needs: settings, one HTTP client, one channel registry.
struct Context {
    config: AppConfig,
    client: Client,
    registry: ChannelRegistry,
    locale: StaticLocale,
    json: bool,
}

impl Context {
    fn new(config: AppConfig, json: bool) -> Result<Self> {
        config.validate()?;
        let client = build_client(config.timeout())?;
        let registry = ChannelRegistry::new(config.app_name.clone());
        let locale = StaticLocale::new(config.language.clone());
        debug!(base_url = %config.base_url, app = %config.app_name, "context ready");
        Ok(Self {
            config,
            client,
            registry,
            locale,
            json,
        })
    }

    fn resource<R: Entity>(&self) -> Result<RestResource<R>> {
        Ok(RestResource::new(
            self.client.clone(),
            &self.config.base_url,
            &self.config.app_name,
        )?)
    }

    fn print_rows<R: Serialize>(
        &self,
        grid: &GridOptions,
        rows: &[R],
        wide: bool,
    ) -> Result<()> {
        let out = if self.json {
            render_json(rows)?
        } else {
            render_grid(grid, rows, wide)?
        };
        print!("{out}");
        Ok(())
    }
}

async fn dispatch(ctx: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Students {
            archive: true,
            filters,
            wide,
            ..
        } => handle_archive(ctx, filters, wide).await,
        Commands::Students {
            as_of: Some(at),
            wide,
            ..
        } => handle_history(ctx, at, wide).await,
        Commands::Students { wide, .. } => handle_list(ctx, wide).await,
        Commands::Student { id } => handle_student(ctx, id).await,
        Commands::Export { file } => handle_export(ctx, &file).await,
        Commands::Import { file } => handle_import(ctx, &file).await,
        Commands::LearningTypes => {
            handle_reference::<LearningType>(ctx, reference_grid(&["id", "name"])).await
        }
        Commands::Reasons => {
            handle_reference::<ReasonForLeaving>(ctx, reference_grid(&["id", "reason"])).await
        }
        Commands::Config => Ok(()),
    }
}

async fn handle_list(ctx: &Context, wide: bool) -> Result<()> {
    let mut view = StudentListView::new(
        ctx.resource::<Student>()?,
        &ctx.registry,
        ctx.config.response_ordering()?,
    );
    view.init(&ctx.locale).await.context("failed to load students")?;
    let rows = view.rows();
    ctx.print_rows(view.grid(), &rows, wide)
}

async fn handle_archive(
    ctx: &Context,
    filters: Vec<(String, String)>,
    wide: bool,
) -> Result<()> {
    let mut view = StudentArchiveView::new(
        ctx.resource::<Student>()?,
        ctx.resource::<LearningType>()?,
        &ctx.config.app_name,
        ctx.config.response_ordering()?,
    );

    if filters.is_empty() {
        view.init(&ctx.locale).await.context("failed to load archive")?;
    } else {
        // Options first; the unfiltered load would be replaced right away.
        if let Err(err) = view.load_learning_types().await {
            warn!(error = %err, "continuing without learning-type options");
        }
        for (column, _) in &filters {
            if view.adapter().fields().field_for(column).is_none() {
                warn!(column = %column, "column is not filterable, ignored");
            }
        }
        let event = FilterChanged::from_terms(filters);
        view.on_filter_changed(&event)
            .await
            .context("failed to load archive")?;
    }
    let rows = view.rows();
    ctx.print_rows(view.grid(), &rows, wide)
}

async fn handle_history(ctx: &Context, at: DateTime<Utc>, wide: bool) -> Result<()> {
    let resource = ctx.resource::<Student>()?;
    let rows = resource
        .history(at)
        .await
        .with_context(|| format!("failed to load students as of {at}"))?;
    ctx.print_rows(&student_list_grid(&ctx.config.app_name), &rows, wide)
}

async fn handle_student(ctx: &Context, id: EntityId) -> Result<()> {
    let view = StudentDetailView::new(
        ctx.resource::<Student>()?,
        &ctx.registry,
        ctx.config.detail_updates()?,
    );
    view.load(id).await?;
    let student = view
        .student()
        .ok_or_else(|| anyhow!("student {id} not loaded"))?;
    let out = if ctx.json {
        render_json(&student)?
    } else {
        render_record(&student)?
    };
    print!("{out}");
    Ok(())
}

async fn handle_export(ctx: &Context, file: &Path) -> Result<()> {
    let bytes = ctx
        .resource::<Student>()?
        .export()
        .await
        .context("failed to export students")?;
    std::fs::write(file, &bytes).with_context(|| format!("failed to write {}", file.display()))?;
    println!("Exported {} bytes to {}", bytes.len(), file.display());
    Ok(())
}

async fn handle_import(ctx: &Context, file: &Path) -> Result<()> {
    let contents =
        std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "students.xls".to_string());
    let results = ctx
        .resource::<Student>()?
        .import(&name, contents)
        .await
        .context("failed to import students")?;
    ctx.print_rows(&import_grid(), &results, false)
}

fn import_grid() -> GridOptions {
    reference_grid(&["success", "message"])
}

async fn handle_reference<R: Entity>(ctx: &Context, grid: GridOptions) -> Result<()> {
    let list: ListSynchronizer<R, _> =
        ListSynchronizer::new(ctx.resource::<R>()?, ctx.config.response_ordering()?);
    list.load_all(None)
        .await
        .with_context(|| format!("failed to load {}", R::PATH))?;
    let rows = list.rows();
    ctx.print_rows(&grid, &rows, false)
}

fn reference_grid(fields: &[&str]) -> GridOptions {
    GridOptions::new(fields.iter().map(|f| ColumnDef::field(f)).collect())
}

fn render_config(config: &AppConfig) -> Result<String> {
    let value = serde_json::to_value(config)?;
    let mut out = String::new();
    if let serde_json::Value::Object(fields) = value {
        for (key, value) in fields {
            out.push_str(&format!("{key} = {value}\n"));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use educenterapp::model::OperationResult;

    #[test]
    fn test_render_config_lists_every_key() {
        let out = render_config(&AppConfig::default()).unwrap();
        assert!(out.contains("base_url = \"http://localhost:8080\""));
        assert!(out.contains("response_ordering = \"latest-applied\""));
        assert!(out.contains("timeout_secs = 30"));
        assert_eq!(out.lines().count(), 6);
    }

    #[test]
    fn test_reference_grid_columns() {
        let grid = reference_grid(&["id", "reason"]);
        let keys: Vec<_> = grid.columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["id", "reason"]);
    }

    #[test]
    fn test_import_grid_renders_results() {
        let results: Vec<OperationResult> = serde_json::from_str(
            r#"[{"success":true,"message":"saved"},{"success":false,"message":"bad email"}]"#,
        )
        .unwrap();
        let out = render_grid(&import_grid(), &results, false).unwrap();
        let out = console::strip_ansi_codes(&out).into_owned();
        assert!(out.lines().next().unwrap().starts_with("success"));
        assert!(out.contains("bad email"));
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn test_context_rejects_bad_ordering() {
        let config = AppConfig {
            response_ordering: "random".into(),
            ..Default::default()
        };
        assert!(Context::new(config, false).is_err());
    }
}

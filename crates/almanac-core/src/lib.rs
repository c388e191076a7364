pub mod calendar;
pub mod catalog;
pub mod category;
pub mod cli;
pub mod config;
pub mod error;
pub mod render;
pub mod resolver;
pub mod snapshot;
pub mod templates;
pub mod window;

use std::ffi::OsString;
use std::io::{
  self,
  Write
};
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use crate::calendar::CalendarValidator;
pub use crate::category::{
  CategoryEdit,
  EditSession,
  SeasonalCategory
};
pub use crate::error::{
  DateError,
  ScheduleWarning
};
pub use crate::resolver::{
  Activation,
  resolve
};
pub use crate::snapshot::ScheduleSnapshot;
pub use crate::window::{
  DateWindow,
  MonthDay
};

pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let clock_date =
    chrono::Local::now().date_naive();
  let mut out = io::stdout().lock();
  run_with(raw_args, clock_date, &mut out)
}

/// Runs one invocation against an explicit
/// clock date, writing command output to
/// `out`.
#[tracing::instrument(skip_all, fields(clock_date = %clock_date))]
pub fn run_with<W: Write>(
  raw_args: Vec<OsString>,
  clock_date: NaiveDate,
  out: &mut W
) -> anyhow::Result<()> {
  let split =
    cli::split_rc_tokens(&raw_args);
  let cli =
    cli::GlobalCli::parse_from(split.args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting almanac"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    split
      .overrides
      .into_iter()
      .chain(cli.rc_overrides)
  );

  let command = match cli.command {
    | Some(command) => command,
    | None => {
      let name = cfg
        .get("default.command")
        .unwrap_or_else(|| {
          "status".to_string()
        });
      debug!(command = %name, "no explicit command, using default");
      cli::Command::from_name(&name)?
    }
  };

  let evaluation =
    cli::Evaluation::resolve(
      cli.today,
      cli.year,
      cfg.reference_year()?,
      clock_date
    );
  let renderer =
    render::Renderer::new(&cfg)?;

  match command {
    | cli::Command::Preview {
      start,
      end,
      id: None,
      json
    } => {
      let session =
        EditSession::new(0, start, end);
      let preview = session.preview(
        evaluation.today,
        evaluation.reference_year
      )?;
      if json {
        renderer
          .print_json(&mut *out, &preview)?;
      } else {
        renderer.print_preview(
          &mut *out, &preview
        )?;
      }
    }
    | cli::Command::Preview {
      start,
      end,
      id: Some(id),
      json
    } => {
      let (catalog, catalog_path) =
        load_catalog(
          &cfg,
          cli.catalog.as_deref()
        )?;
      let category = catalog
        .categories
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| {
          anyhow!(
            "no category with id {id} \
             in {}",
            catalog_path.display()
          )
        })?;

      let mut session =
        EditSession::begin(category);
      debug!(
        category_id = session.category_id(),
        previous_start = %session.start_text(),
        previous_end = %session.end_text(),
        "editing category range"
      );
      session.set_start(start);
      session.set_end(end);

      let edit = session.apply(
        category,
        evaluation.today,
        evaluation.reference_year
      )?;
      if json {
        renderer
          .print_json(&mut *out, &edit)?;
      } else {
        writeln!(
          out,
          "category       {} {}",
          edit.category.id,
          edit.category.name
        )?;
        renderer.print_preview(
          &mut *out,
          &edit.preview
        )?;
      }
    }
    | command => {
      let (catalog, _) = load_catalog(
        &cfg,
        cli.catalog.as_deref()
      )?;
      let snapshot =
        ScheduleSnapshot::build(
          evaluation.today,
          evaluation.reference_year,
          &catalog.categories
        );
      print_report(
        &mut *out,
        &renderer,
        command,
        &snapshot,
        &catalog
      )?;
    }
  }

  out.flush()?;
  info!("done");
  Ok(())
}

fn load_catalog(
  cfg: &config::Config,
  override_path: Option<&Path>
) -> anyhow::Result<(
  catalog::Catalog,
  PathBuf
)> {
  let path =
    config::resolve_catalog_path(
      cfg,
      override_path
    )?;
  let catalog =
    catalog::Catalog::load(&path)
      .with_context(|| {
        format!(
          "failed to load catalog at {}",
          path.display()
        )
      })?;
  Ok((catalog, path))
}

fn print_report<W: Write>(
  out: &mut W,
  renderer: &render::Renderer,
  command: cli::Command,
  snapshot: &ScheduleSnapshot,
  catalog: &catalog::Catalog
) -> anyhow::Result<()> {
  match command {
    | cli::Command::Status { json } => {
      if json {
        renderer
          .print_json(out, snapshot)
      } else {
        renderer
          .print_status(out, snapshot)
      }
    }
    | cli::Command::Check => {
      renderer.print_check(out, snapshot)
    }
    | cli::Command::Templates { json } => {
      let visible =
        templates::visible_templates(
          snapshot,
          &catalog.templates
        );
      if json {
        renderer.print_json(out, &visible)
      } else {
        renderer.print_templates(
          out, snapshot, &visible
        )
      }
    }
    | cli::Command::Preview {
      ..
    } => Err(anyhow!(
      "preview is not a report command"
    ))
  }
}

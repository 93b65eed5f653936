//! `purge` handler.

use owo_colors::Style;
use tabled::Tabled;

use zabtree_core::{Controller, PurgeReport, ServiceRef};

use crate::cli::{GlobalOpts, OutputFormat, PurgeArgs};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

use super::util::{self, paint, plural};

#[derive(Tabled)]
struct DeletedRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&ServiceRef> for DeletedRow {
    fn from(s: &ServiceRef) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
        }
    }
}

fn summary(report: &PurgeReport, color: bool) -> String {
    if report.deleted.is_empty() {
        return paint("no services to delete", Style::new().green(), color);
    }
    format!(
        "{} {} in {}",
        paint("deleted", Style::new().red().bold(), color),
        plural(report.deleted.len(), "top-level service"),
        plural(usize::try_from(report.cycles).unwrap_or(usize::MAX), "cycle"),
    )
}

pub async fn handle(
    args: PurgeArgs,
    profile_name: &str,
    profile: &Profile,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let options = config::purge_options(args.max_stalled);
    let connection = config::resolve_connection(profile_name, profile, global)?;

    if !util::confirm(
        &format!(
            "Delete EVERY IT service on {}? This cannot be undone.",
            connection.url
        ),
        "purge",
        global.yes,
    )? {
        return Ok(());
    }

    let pb = output::spinner("Purging service tree", global.quiet);
    let result = Controller::oneshot(connection, |c| async move { c.purge(&options).await }).await;
    pb.finish_and_clear();
    let report = result?;

    let out = match global.output {
        OutputFormat::Table | OutputFormat::Plain => output::render_list(
            global.output,
            &report.deleted,
            |s| DeletedRow::from(s),
            |s| format!("{}\t{}", s.id, s.name),
        )?,
        format => output::render_single(format, &report, |_| String::new())?,
    };
    output::print_output(&out, global.quiet);
    if !global.quiet {
        eprintln!("{}", summary(&report, output::should_color(global.color)));
    }

    output::write_export(args.export.as_deref(), &report)
}

#[cfg(test)]
mod tests {
    use zabtree_core::ServiceId;

    use super::*;

    #[test]
    fn summary_reports_deleted_roots_and_cycles() {
        let report = PurgeReport {
            cycles: 2,
            deleted: vec![
                ServiceRef {
                    id: ServiceId::from(1),
                    name: "Linux servers".into(),
                },
                ServiceRef {
                    id: ServiceId::from(4),
                    name: "web01 - Web 01".into(),
                },
            ],
        };
        assert_eq!(summary(&report, false), "deleted 2 top-level services in 2 cycles");
        assert_eq!(summary(&PurgeReport::default(), false), "no services to delete");
    }
}

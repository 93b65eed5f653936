//! `populate` handler.

use std::fmt::Write as _;

use owo_colors::Style;
use tabled::{Table, Tabled, settings::Style as TableStyle};

use zabtree_core::{Controller, CreatedNode, NodeLevel, ReconcileReport};

use crate::cli::{GlobalOpts, OutputFormat, PopulateArgs};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

use super::util::{paint, plural};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CreatedRow {
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Parent")]
    parent: String,
}

impl From<&CreatedNode> for CreatedRow {
    fn from(n: &CreatedNode) -> Self {
        Self {
            level: n.level.to_string(),
            id: n.id.to_string(),
            name: n.name.clone(),
            parent: n.parent.as_ref().map(ToString::to_string).unwrap_or_default(),
        }
    }
}

// ── Rendering ───────────────────────────────────────────────────────

/// One-line outcome, e.g. "created 1 host group, 2 hosts, 5 triggers".
fn summary(report: &ReconcileReport, color: bool) -> String {
    let mut out = String::new();
    if report.is_noop() {
        let _ = write!(
            out,
            "{} ({} checked)",
            paint("tree already in sync", Style::new().green(), color),
            plural(report.leaves_seen, "trigger")
        );
    } else {
        let parts: Vec<String> = [
            (NodeLevel::Prefix, "prefix node"),
            (NodeLevel::HostGroup, "host group"),
            (NodeLevel::Host, "host"),
            (NodeLevel::Trigger, "trigger"),
        ]
        .into_iter()
        .filter_map(|(level, noun)| {
            let n = report.created_at(level);
            (n > 0).then(|| plural(n, noun))
        })
        .collect();
        let _ = write!(
            out,
            "{} {}",
            paint("created", Style::new().green().bold(), color),
            parts.join(", ")
        );
    }
    if !report.skipped.is_empty() {
        let _ = write!(
            out,
            "; {}",
            paint(
                format!("skipped {}", plural(report.skipped.len(), "trigger")),
                Style::new().yellow(),
                color
            )
        );
    }
    out
}

fn detail(report: &ReconcileReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Plain => report
            .created
            .iter()
            .map(|n| format!("{}\t{}", n.id, n.name))
            .collect::<Vec<_>>()
            .join("\n"),
        _ if report.created.is_empty() => String::new(),
        _ => {
            let rows: Vec<CreatedRow> = report.created.iter().map(CreatedRow::from).collect();
            Table::new(rows).with(TableStyle::rounded()).to_string()
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: PopulateArgs,
    profile_name: &str,
    profile: &Profile,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let options = config::populate_options(profile, &args)?;
    let connection = config::resolve_connection(profile_name, profile, global)?;

    let pb = output::spinner("Populating service tree", global.quiet);
    let result = Controller::oneshot(connection, |c| async move { c.populate(&options).await }).await;
    pb.finish_and_clear();
    let report = result?;

    for skipped in &report.skipped {
        tracing::debug!(
            trigger = %skipped.trigger_id,
            reason = %skipped.reason,
            "not placed: {}",
            skipped.description
        );
    }

    let out = output::render_single(global.output, &report, |r| detail(r, global.output))?;
    output::print_output(&out, global.quiet);
    if !global.quiet {
        eprintln!("{}", summary(&report, output::should_color(global.color)));
    }

    output::write_export(args.export.as_deref(), &report)
}

#[cfg(test)]
mod tests {
    use zabtree_core::{ServiceId, SkipReason, SkippedLeaf, TriggerId};

    use super::*;

    fn created(level: NodeLevel, id: u64, name: &str) -> CreatedNode {
        CreatedNode {
            level,
            id: ServiceId::from(id),
            name: name.into(),
            parent: None,
        }
    }

    #[test]
    fn summary_counts_each_level() {
        let report = ReconcileReport {
            created: vec![
                created(NodeLevel::HostGroup, 1, "Linux servers"),
                created(NodeLevel::Host, 2, "web01 - Web 01"),
                created(NodeLevel::Trigger, 3, "CPU high on web01"),
                created(NodeLevel::Trigger, 4, "Disk full on web01"),
            ],
            skipped: vec![SkippedLeaf {
                trigger_id: TriggerId::from(9),
                description: "orphan".into(),
                reason: SkipReason::NoHost,
            }],
            leaves_seen: 3,
        };
        assert_eq!(
            summary(&report, false),
            "created 1 host group, 1 host, 2 triggers; skipped 1 trigger"
        );
    }

    #[test]
    fn summary_of_noop_run() {
        let report = ReconcileReport {
            leaves_seen: 4,
            ..ReconcileReport::default()
        };
        assert_eq!(summary(&report, false), "tree already in sync (4 triggers checked)");
        assert!(detail(&report, OutputFormat::Table).is_empty());
    }

    #[test]
    fn plain_detail_lists_ids_and_names() {
        let report = ReconcileReport {
            created: vec![created(NodeLevel::Prefix, 7, "IT")],
            ..ReconcileReport::default()
        };
        assert_eq!(detail(&report, OutputFormat::Plain), "7\tIT");
    }
}

// ── Desired-state projection ──
//
// Turns fetched triggers into the leaves the service tree should contain.
// Lazy and order-preserving: leaves come out in trigger order, which is
// also the order the engine creates nodes in.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::config::ProjectionOptions;
use crate::model::{DesiredLeaf, SkipReason, SkippedLeaf, TriggerRecord};

/// `{MACRO}` or `{MACRO.FIELD}` in a trigger description.
static MACRO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\w+\}|\{\w+\.\w+\}").expect("macro pattern compiles"));

/// Replace every macro in `template` with `host`.
///
/// Macros are not resolved individually: `{HOST.NAME}`, `{HOSTNAME}` and
/// `{ITEM.VALUE}` all become the host's technical name.
pub fn expand_macros<'t>(template: &'t str, host: &str) -> Cow<'t, str> {
    MACRO.replace_all(template, NoExpand(host))
}

/// Synthetic name of the node grouping one host's triggers.
pub fn host_node_name(host: &str, visible_name: &str) -> String {
    format!("{host} - {visible_name}")
}

/// Map triggers to desired leaves.
///
/// Triggers whose raw description lacks the configured filter text are
/// dropped silently. A trigger without a host yields a [`SkippedLeaf`].
pub fn project<'a, I>(
    triggers: I,
    options: ProjectionOptions<'a>,
) -> impl Iterator<Item = Result<DesiredLeaf, SkippedLeaf>> + 'a
where
    I: IntoIterator<Item = TriggerRecord>,
    I::IntoIter: 'a,
{
    triggers
        .into_iter()
        .filter(move |t| {
            options
                .description_filter
                .is_none_or(|needle| t.description.contains(needle))
        })
        .map(move |t| project_one(t, options))
}

fn project_one(
    trigger: TriggerRecord,
    options: ProjectionOptions<'_>,
) -> Result<DesiredLeaf, SkippedLeaf> {
    let Some(host) = trigger.host else {
        return Err(SkippedLeaf {
            trigger_id: trigger.id,
            description: trigger.description,
            reason: SkipReason::NoHost,
        });
    };
    let groups = match options.hostgroup {
        Some(group) => vec![group.to_owned()],
        None => trigger.groups,
    };
    Ok(DesiredLeaf {
        trigger_name: expand_macros(&trigger.description, &host.host).into_owned(),
        host_node_name: host_node_name(&host.host, &host.name),
        groups,
        trigger_id: trigger.id,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::TriggerId;
    use crate::testing::trigger;

    #[test]
    fn substitutes_every_macro_with_technical_host_name() {
        assert_eq!(expand_macros("CPU high on {HOST.NAME}", "web01"), "CPU high on web01");
        assert_eq!(
            expand_macros("{HOSTNAME} lost {ITEM.VALUE} on {HOST.NAME}", "db01"),
            "db01 lost db01 on db01"
        );
    }

    #[test]
    fn template_without_macros_is_unchanged() {
        let out = expand_macros("Disk full", "web01");
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, "Disk full");
        // Nested dots and empty braces are not macros.
        assert_eq!(expand_macros("{A.B.C} {}", "x"), "{A.B.C} {}");
    }

    #[test]
    fn host_names_are_inserted_literally() {
        assert_eq!(expand_macros("down: {HOST.NAME}", "$1web"), "down: $1web");
    }

    #[test]
    fn projects_leaf_with_trigger_groups() {
        let leaves: Vec<_> = project(
            vec![trigger(
                13491,
                "CPU high on {HOST.NAME}",
                Some(("web01", "Web 01")),
                &["Linux servers", "Web"],
            )],
            ProjectionOptions::default(),
        )
        .collect();

        assert_eq!(
            leaves,
            vec![Ok(DesiredLeaf {
                trigger_name: "CPU high on web01".into(),
                host_node_name: "web01 - Web 01".into(),
                groups: vec!["Linux servers".into(), "Web".into()],
                trigger_id: TriggerId::from(13491),
            })]
        );
    }

    #[test]
    fn hostgroup_option_overrides_trigger_groups() {
        let leaf = project(
            vec![trigger(1, "Ping lost", Some(("r1", "Router 1")), &["Network", "Core"])],
            ProjectionOptions {
                hostgroup: Some("Routers"),
                description_filter: None,
            },
        )
        .next();
        let groups = leaf.and_then(Result::ok).map(|l| l.groups);
        assert_eq!(groups, Some(vec!["Routers".to_owned()]));
    }

    #[test]
    fn filter_checks_raw_description() {
        let triggers = vec![
            trigger(1, "CPU high on {HOST.NAME}", Some(("web01", "Web 01")), &["G"]),
            trigger(2, "Disk full on {HOST.NAME}", Some(("web01", "Web 01")), &["G"]),
            // Matches only after substitution, so it is dropped.
            trigger(3, "Reboot of {HOST.NAME}", Some(("CPU-box", "Build box")), &["G"]),
        ];
        let ids: Vec<TriggerId> = project(
            triggers,
            ProjectionOptions {
                hostgroup: None,
                description_filter: Some("CPU"),
            },
        )
        .filter_map(Result::ok)
        .map(|l| l.trigger_id)
        .collect();
        assert_eq!(ids, vec![TriggerId::from(1)]);
    }

    #[test]
    fn trigger_without_host_is_skipped() {
        let items: Vec<_> = project(
            vec![
                trigger(1, "Orphan", None, &["G"]),
                trigger(2, "Fine", Some(("h", "H")), &["G"]),
            ],
            ProjectionOptions::default(),
        )
        .collect();
        assert_eq!(items.len(), 2);
        match &items[0] {
            Err(skip) => assert_eq!(skip.reason, SkipReason::NoHost),
            Ok(leaf) => panic!("expected skip, got {leaf:?}"),
        }
        assert!(items[1].is_ok());
    }
}

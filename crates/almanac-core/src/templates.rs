use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::snapshot::ScheduleSnapshot;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Template {
    pub id: u64,
    pub category_id: u64,
    pub name: String,
    #[serde(default)]
    pub sort_order: i64,
}

/// Templates from every active category, in category display order and then
/// by each template's own sort order.
#[tracing::instrument(skip_all, fields(templates = templates.len()))]
pub fn visible_templates<'a>(
    snapshot: &ScheduleSnapshot,
    templates: &'a [Template],
) -> Vec<&'a Template> {
    let mut visible: Vec<(usize, &Template)> = templates
        .iter()
        .filter_map(|template| {
            let position = snapshot.position(template.category_id)?;
            snapshot
                .is_active(template.category_id)
                .then_some((position, template))
        })
        .collect();

    visible.sort_by(|(pa, a), (pb, b)| {
        pa.cmp(pb)
            .then_with(|| a.sort_order.cmp(&b.sort_order))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });

    debug!(visible = visible.len(), "filtered templates");
    visible.into_iter().map(|(_, template)| template).collect()
}

use crate::classify::classify;
use crate::{DailyGroupKey, DailyGroupValue, DailyGroups, RawHourlyCount, SummaryRow};

/// Groups hourly counts by calendar day and classified browser.
pub fn aggregate(rows: &[RawHourlyCount]) -> DailyGroups {
    aggregate_counted(rows).0
}

/// Same as [`aggregate`], also returning how many rows were discarded as
/// unclassifiable.
///
/// Rows are visited in `(created_at, browser)` order so the mobile flag of a
/// group always comes from its earliest hour, then the smallest header.
pub fn aggregate_counted(rows: &[RawHourlyCount]) -> (DailyGroups, usize) {
    let mut ordered: Vec<&RawHourlyCount> = rows.iter().collect();
    ordered.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.browser.cmp(&b.browser))
    });

    let mut groups = DailyGroups::new();
    let mut discarded = 0usize;
    for row in ordered {
        let browser = classify(&row.browser);
        if browser.is_discarded() {
            discarded += 1;
            continue;
        }
        let day = row.created_at.date();
        let key = DailyGroupKey {
            day,
            family: browser.family.clone(),
            version: browser.version.clone(),
        };
        groups
            .entry(key)
            .and_modify(|value| value.count += row.count)
            .or_insert_with(|| DailyGroupValue {
                count: row.count,
                mobile: browser.mobile,
                day,
                family: browser.family,
                version: browser.version,
            });
    }
    (groups, discarded)
}

pub fn summary_rows(site_id: i64, groups: &DailyGroups) -> Vec<SummaryRow> {
    groups
        .values()
        .map(|value| SummaryRow {
            site_id,
            day: value.day,
            browser: value.family.clone(),
            version: value.version.clone(),
            count: value.count,
            mobile: value.mobile,
        })
        .collect()
}

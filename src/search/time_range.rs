// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Custom date-range `tbs` values

use chrono::NaiveDate;

/// Build a `tbs` value restricting results to a date range.
///
/// The provider expects `cdr:1,cd_min:MM/DD/YYYY,cd_max:MM/DD/YYYY`.
/// Pass the result to [`SearchSettingsBuilder::tbs`].
///
/// [`SearchSettingsBuilder::tbs`]: super::settings::SearchSettingsBuilder::tbs
pub fn tbs_for_date_range(from: NaiveDate, to: NaiveDate) -> String {
    format!(
        "cdr:1,cd_min:{},cd_max:{}",
        from.format("%m/%d/%Y"),
        to.format("%m/%d/%Y")
    )
}

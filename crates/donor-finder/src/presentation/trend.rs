use super::format::parse_amount;
use crate::api::Filing;

/// Revenue movement of one filing against the preceding tax year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevenueChange {
    pub percentage: f64,
    pub is_positive: bool,
    pub amount: f64,
}

impl RevenueChange {
    /// `+50.0%`, `-12.5%`, `0.0%`.
    pub fn label(&self) -> String {
        let sign = if self.percentage > 0.0 { "+" } else { "" };
        format!("{sign}{:.1}%", self.percentage)
    }
}

/// `None` when there is no earlier filing, either revenue is not numeric, or
/// the earlier revenue is zero.
pub fn revenue_change(current: &Filing, previous: Option<&Filing>) -> Option<RevenueChange> {
    let previous = previous?;
    let current_revenue = parse_amount(&current.totrevenue)?;
    let previous_revenue = parse_amount(&previous.totrevenue)?;

    if previous_revenue == 0.0 {
        return None;
    }

    let percentage = (current_revenue - previous_revenue) / previous_revenue * 100.0;
    Some(RevenueChange {
        percentage,
        is_positive: percentage > 0.0,
        amount: current_revenue - previous_revenue,
    })
}

/// Filings newest first, each paired with its change against the next older
/// filing.
pub fn filings_with_trend(filings: &[Filing]) -> Vec<(&Filing, Option<RevenueChange>)> {
    let mut sorted: Vec<&Filing> = filings.iter().collect();
    sorted.sort_by(|a, b| b.tax_prd_yr.cmp(&a.tax_prd_yr));

    sorted
        .iter()
        .enumerate()
        .map(|(idx, filing)| {
            let previous = sorted.get(idx + 1).copied();
            (*filing, revenue_change(filing, previous))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Ein;

    fn filing(id: i64, year: i32, revenue: &str) -> Filing {
        Filing {
            ein: Ein(1),
            tax_prd: i64::from(year) * 100 + 12,
            tax_prd_yr: year,
            formtype: 0,
            pdf_url: None,
            totrevenue: revenue.to_string(),
            totfuncexpns: "0".to_string(),
            totassetsend: "0".to_string(),
            totliabend: "0".to_string(),
            pct_compnsatncurrofcr: "0".to_string(),
            id,
            organization_id: 1,
            created_at: String::new(),
            updated_at: None,
            irs_updated: String::new(),
        }
    }

    #[test]
    fn growth_against_prior_year_is_positive() {
        let filings = vec![filing(1, 2021, "100"), filing(2, 2022, "150")];
        let trend = filings_with_trend(&filings);

        assert_eq!(trend[0].0.tax_prd_yr, 2022);
        let change = trend[0].1.expect("2022 has a prior year");
        assert!(change.is_positive);
        assert_eq!(change.label(), "+50.0%");
        assert_eq!(change.amount, 50.0);

        assert_eq!(trend[1].0.tax_prd_yr, 2021);
        assert!(trend[1].1.is_none(), "earliest filing has no trend");
    }

    #[test]
    fn decline_is_negative() {
        let change = revenue_change(&filing(2, 2023, "70"), Some(&filing(1, 2022, "80")))
            .expect("numeric revenues");
        assert!(!change.is_positive);
        assert_eq!(change.label(), "-12.5%");
    }

    #[test]
    fn zero_or_non_numeric_previous_has_no_trend() {
        assert!(revenue_change(&filing(2, 2023, "70"), Some(&filing(1, 2022, "0"))).is_none());
        assert!(revenue_change(&filing(2, 2023, "70"), Some(&filing(1, 2022, "n/a"))).is_none());
        assert!(revenue_change(&filing(2, 2023, "??"), Some(&filing(1, 2022, "10"))).is_none());
    }
}

use crate::types::{Month, Observance};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ObservanceFilter {
    #[serde(rename = "q")]
    pub keyword: Option<String>,
    pub month: Option<Month>,
}

impl ObservanceFilter {
    pub fn apply(self, mut observances: Vec<Observance>) -> Vec<Observance> {
        if let Some(keyword) = self.keyword {
            let keyword = keyword.to_lowercase();
            observances.retain(|o| o.label.to_lowercase().contains(&keyword));
        }
        if let Some(month) = self.month {
            observances.retain(|o| o.date.month() == month);
        }
        observances.sort_by(|a, b| (a.date, &a.label).cmp(&(b.date, &b.label)));
        observances
    }

    pub fn validate(self) -> Result<Self, String> {
        if self.keyword.as_ref().is_some_and(|k| k.trim().is_empty()) {
            return Err("Search keyword must not be empty".to_string());
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub month: Month,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthStats {
    pub months: Vec<MonthCount>,
    pub total: usize,
}

impl MonthStats {
    pub fn from_observances(observances: &[Observance]) -> MonthStats {
        let months = Month::ALL
            .into_iter()
            .map(|month| MonthCount {
                month,
                count: observances
                    .iter()
                    .filter(|o| o.date.month() == month)
                    .count(),
            })
            .collect();

        MonthStats {
            months,
            total: observances.len(),
        }
    }
}

impl std::fmt::Display for MonthStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nObservances per month:")?;
        for entry in &self.months {
            writeln!(
                f,
                "  {:02} {:<10} {:>4}",
                entry.month.number(),
                entry.month.name(),
                entry.count
            )?;
        }
        writeln!(f, "  Total:        {:>4}", self.total)
    }
}

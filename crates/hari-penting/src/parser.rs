use std::sync::LazyLock;

use crate::types::{Month, Observance, ObservanceDate};

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static RE_CALENDAR_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\s+(.+)$").expect("invalid regex: calendar row"));
static RE_LIST_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})\s+(\w+)\s*(.*)").expect("invalid regex: list entry")
});

static LIST_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul, ol").expect("invalid selector: list"));
static ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("invalid selector: list item"));

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

fn build_observance(day: &str, month: Month, label: &str) -> Option<Observance> {
    let day = day.parse::<u32>().ok()?;
    let date = ObservanceDate::new(day, month)
        .inspect_err(|e| log::debug!("Skipping row: {}", e))
        .ok()?;
    Observance::new(date, label)
        .inspect_err(|e| log::debug!("Skipping row: {}", e))
        .ok()
}

/// One step of the calendar scan.
///
/// A line naming a month together with `year` becomes the new current month
/// and yields nothing. Any other line of the form `<day> <label>` yields a
/// record when a current month is already known.
pub fn scan_line(
    current: Option<Month>,
    line: &str,
    year: i32,
) -> (Option<Month>, Option<Observance>) {
    let line = line.trim();

    if let Some(month) = Month::find_in(line)
        && line.contains(&year.to_string())
    {
        return (Some(month), None);
    }

    let record = current.and_then(|month| {
        let caps = RE_CALENDAR_ROW.captures(line)?;
        build_observance(&caps[1], month, &caps[2])
    });

    (current, record)
}

pub fn parse_calendar_text(text: &str, year: i32) -> Vec<Observance> {
    let (_, records) = text.lines().fold(
        (None, Vec::new()),
        |(current, mut records), line| {
            let (next, record) = scan_line(current, line, year);
            records.extend(record);
            (next, records)
        },
    );

    log::debug!("Parsed {} calendar observances", records.len());
    records
}

fn parse_list_entry(text: &str) -> Option<Observance> {
    let caps = RE_LIST_ENTRY.captures(text)?;
    let month = Month::from_name(&caps[2])?;
    // Observance::new drops year-qualified remainders.
    build_observance(&caps[1], month, &caps[3])
}

/// Extracts observances from the list items of the encyclopedia article.
///
/// Every `li` below every `ul`/`ol` is visited, so items of nested lists are
/// seen once per enclosing list.
pub fn parse_encyclopedia_html(html: &str) -> Vec<Observance> {
    let document = Html::parse_document(html);

    let records: Vec<Observance> = document
        .select(&LIST_SELECTOR)
        .flat_map(|list| list.select(&ITEM_SELECTOR))
        .filter_map(|item| parse_list_entry(elem_text(item).trim()))
        .collect();

    log::debug!("Parsed {} encyclopedia observances", records.len());
    records
}

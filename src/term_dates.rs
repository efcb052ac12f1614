use anyhow::Context;
use chrono::NaiveDate;
use scraper::{Html, Selector};
use serde::Serialize;

use crate::{
    error::CalendarError,
    text_manipulators::{direct_cells, direct_rows, extract_cell_text},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermDates {
    pub term: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Reads the `Term | Start | End` table inside `#year<first_year>`.
pub fn parse_term_dates(html: &str, first_year: i32) -> anyhow::Result<Vec<TermDates>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(&format!("#year{first_year} table"))
        .map_err(|err| anyhow::anyhow!("bad term dates selector: {err}"))?;
    let table = document
        .select(&selector)
        .next()
        .with_context(|| format!("no term dates listed for {first_year}"))?;

    let mut terms = Vec::new();
    for row in direct_rows(table).into_iter().skip(1) {
        let cells: Vec<String> = direct_cells(row).into_iter().map(extract_cell_text).collect();
        let [term, start, end, ..] = cells.as_slice() else {
            continue;
        };
        terms.push(TermDates {
            term: term.clone(),
            start: parse_long_date(start)?,
            end: parse_long_date(end)?,
        });
    }
    Ok(terms)
}

/// `"24 April 2023"`.
fn parse_long_date(raw: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(raw.trim(), "%d %B %Y")
        .map_err(|_| CalendarError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_the_requested_year_only() {
        let html = r#"
<div id="year2021"><table>
  <tr><th>Term</th><th>Start</th><th>End</th></tr>
  <tr><td>Michaelmas</td><td>4 October 2021</td><td>10 December 2021</td></tr>
</table></div>
<div id="year2022"><table>
  <tr><th>Term</th><th>Start</th><th>End</th></tr>
  <tr><td>Michaelmas</td><td>3 October 2022</td><td>9 December 2022</td></tr>
  <tr><td>Easter</td><td>24 April 2023</td><td>23 June 2023</td></tr>
</table></div>"#;

        let terms = parse_term_dates(html, 2022).unwrap();
        assert_eq!(
            terms,
            vec![
                TermDates {
                    term: "Michaelmas".to_string(),
                    start: NaiveDate::from_ymd_opt(2022, 10, 3).unwrap(),
                    end: NaiveDate::from_ymd_opt(2022, 12, 9).unwrap(),
                },
                TermDates {
                    term: "Easter".to_string(),
                    start: NaiveDate::from_ymd_opt(2023, 4, 24).unwrap(),
                    end: NaiveDate::from_ymd_opt(2023, 6, 23).unwrap(),
                },
            ]
        );
        assert!(parse_term_dates(html, 2030).is_err());
    }

    #[test]
    fn rejects_unreadable_dates() {
        assert_eq!(
            parse_long_date("Spring 2023"),
            Err(CalendarError::InvalidDate("Spring 2023".to_string()))
        );
    }
}

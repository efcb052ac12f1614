use scraper::ElementRef;

pub fn extract_text(node: ElementRef) -> String {
    node.text().collect::<String>()
}

/// Cell text with non-breaking spaces removed, so `&nbsp;` cells come out empty.
pub fn extract_cell_text(node: ElementRef) -> String {
    extract_text(node).replace('\u{a0}', " ").trim().to_string()
}

/// `<tr>` children of a table, looking through `thead`/`tbody`/`tfoot` but not
/// into nested tables.
pub fn direct_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|row| row.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

pub fn direct_cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .collect()
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::*;

    #[test]
    fn rows_skip_nested_tables() {
        let html = Html::parse_fragment(
            "<table><tr><td>a</td><td><table><tr><td>inner</td></tr></table></td></tr>\
             <tr><td>&nbsp;</td><td> b </td></tr></table>",
        );
        let selector = Selector::parse("table").unwrap();
        let outer = html.select(&selector).next().unwrap();

        let rows = direct_rows(outer);
        assert_eq!(rows.len(), 2);

        let cells: Vec<_> = direct_cells(rows[1]).into_iter().map(extract_cell_text).collect();
        assert_eq!(cells, vec!["", "b"]);
    }
}

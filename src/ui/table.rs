//! Table output helpers

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};

/// Build a condensed UTF-8 table with the given header and rows
pub fn build_table<H, R, C>(header: &[H], rows: R) -> Table
where
    H: AsRef<str>,
    R: IntoIterator<Item = Vec<C>>,
    C: Into<Cell>,
{
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(|h| Cell::new(h.as_ref())));

    for row in rows {
        table.add_row(row);
    }
    table
}

/// Numbered `# / Name / Codename` selection table
pub fn selection_table<'a, I>(items: I) -> Table
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    build_table(
        &["#", "Name", "Codename"],
        items
            .into_iter()
            .enumerate()
            .map(|(i, (name, code_name))| {
                vec![
                    Cell::new(i + 1),
                    Cell::new(name),
                    Cell::new(code_name),
                ]
            }),
    )
}

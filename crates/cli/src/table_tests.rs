use super::*;

fn render_to_string(table: &Table) -> String {
    let mut buf = Vec::new();
    table.render(&mut buf);
    String::from_utf8(buf).unwrap()
}

#[test]
fn renders_header_and_rows_with_padding() {
    let mut table = Table::plain(vec![Column::left("TOOL"), Column::left("FILE")]);
    table.row(vec!["slither".to_string(), "A.sol".to_string()]);
    table.row(vec!["mythril".to_string(), "B.sol".to_string()]);
    let out = render_to_string(&table);
    assert!(out.contains("TOOL"));
    assert!(out.contains("slither"));
    assert!(out.contains("mythril"));
}

#[test]
fn empty_table_renders_nothing() {
    let table = Table::plain(vec![Column::left("TOOL")]);
    assert_eq!(render_to_string(&table), "");
}

#[test]
fn truncates_cells_past_max_width() {
    let mut table = Table::plain(vec![Column::left("FILE").with_max(4)]);
    table.row(vec!["SomeVeryLongName.sol".to_string()]);
    let out = render_to_string(&table);
    assert!(out.contains("Some"));
    assert!(!out.contains("SomeVeryLongName"));
}

#[test]
fn colored_table_applies_status_color_codes() {
    let mut table = Table::colored(vec![Column::status("STATUS")]);
    table.row(vec!["ok".to_string()]);
    let out = render_to_string(&table);
    assert!(out.contains("\x1b["));
}

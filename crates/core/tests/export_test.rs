//! Tests for the flat CSV table, the nested tree and training entries.

use sectree_core::export::{
    FlatEntry, entries_from_rows, flatten_tree, read_rows, training_entries, tree_from_rows,
};
use sectree_core::normalize::{Normalizer, Session, ShapeRecord, SlideInfo, TableGrid};
use sectree_core::{
    Bounds, CsvExporter, SectionKind, SectionTree, TreeIndex, export_rows, to_csv_string,
};

fn slide_tree() -> SectionTree {
    let mut session = Session::new(SlideInfo::new(3, 960.0, 540.0));
    session
        .push_shape(ShapeRecord::new("1", 96.0, 54.0, 384.0, 100.123).with_text(r#"Say "hi""#))
        .push_shape(ShapeRecord::new("2", 500.0, 300.0, 100.0, 50.0))
        .push_shape_label("1", r#"Quote "A""#)
        .push_text_section("1", 0, 3, "verb");
    Normalizer::default().run(&session)
}

fn entry(index: &str, label: &str) -> FlatEntry {
    FlatEntry::new(TreeIndex::parse(index).unwrap(), label)
}

#[test]
fn test_csv_export() {
    let csv = to_csv_string(&slide_tree()).unwrap();
    insta::assert_snapshot!(csv, @r##"
test_index,index,label,shape_id,section_type,start_char,end_char,cells,text,top,left,right,bottom,width,height,slide_height,slide_width
3,01,"Quote ""A""","[""1""]",individual_shape,,,,"Say ""hi""",54.0,96.0,480.0,154.12,384.0,100.12,540.0,960.0
3,01.01,"verb","[""1""]",text_section,0,3,,"Say",,,,,,,540.0,960.0
3,02,"","[""2""]",individual_shape,,,,,300.0,500.0,600.0,350.0,100.0,50.0,540.0,960.0
"##);
}

#[test]
fn test_csv_reads_back_into_rows() {
    let tree = slide_tree();
    let csv = to_csv_string(&tree).unwrap();
    let rows = read_rows(csv.as_bytes()).unwrap();
    assert_eq!(rows, export_rows(&tree));
    assert_eq!(rows[0].label, r#"Quote "A""#);
    assert_eq!(rows[1].section_type, SectionKind::TextSection);
}

#[test]
fn test_rows_are_sorted_by_index() {
    let mut session = Session::new(SlideInfo::new(1, 960.0, 540.0));
    for i in 0..12 {
        let id = format!("s{i}");
        // Pushed bottom-up so input order differs from index order.
        session.push_shape(ShapeRecord::new(id, 10.0, 500.0 - 40.0 * i as f64, 50.0, 20.0));
    }
    let rows = export_rows(&Normalizer::default().run(&session));
    let indices: Vec<&str> = rows.iter().map(|r| r.index.as_str()).collect();
    let mut sorted = indices.clone();
    sorted.sort();
    assert_eq!(indices, sorted);
    assert_eq!(indices.first(), Some(&"01"));
    assert_eq!(indices.last(), Some(&"12"));
    assert_eq!(rows[0].shape_id[0].as_str(), "s11");
}

#[test]
fn test_table_rows_list_cells() {
    let mut grid = TableGrid::new("T", 1, 2);
    grid.set_cell(0, 0, Some(Bounds::new(100.0, 100.0, 200.0, 150.0)), "a");
    grid.set_cell(0, 1, Some(Bounds::new(100.0, 200.0, 300.0, 150.0)), "b");
    let row = grid.row_section(0, "Header").unwrap();

    let mut session = Session::new(SlideInfo::new(1, 960.0, 540.0));
    session
        .push_shape(ShapeRecord::new("T", 100.0, 100.0, 200.0, 50.0).table())
        .push_shape_label("T", "Prices")
        .push_table(grid)
        .push_table_section(row);

    let csv = to_csv_string(&Normalizer::default().run(&session)).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with(r#"1,01,"Prices","[""T""]",table,"#));
    assert_eq!(
        lines[2],
        r#"1,01.01,"Header","[""T.0.0"", ""T.0.1""]",row,,,"[""0.0"", ""0.1""]","a b",100.0,100.0,300.0,150.0,200.0,50.0,540.0,960.0"#
    );
}

#[test]
fn test_exporter_writes_one_header_for_many_trees() {
    let tree = slide_tree();
    let mut exporter = CsvExporter::new(Vec::new());
    exporter.write_tree(&tree).unwrap();
    exporter.write_tree(&tree).unwrap();
    let out = String::from_utf8(exporter.finish().unwrap()).unwrap();
    assert_eq!(out.lines().filter(|l| l.starts_with("test_index")).count(), 1);
    assert_eq!(out.lines().count(), 7);

    let empty = CsvExporter::new(Vec::new()).finish().unwrap();
    assert!(String::from_utf8(empty).unwrap().starts_with("test_index,index,"));
}

#[test]
fn test_nested_tree() {
    let rows = export_rows(&slide_tree());
    let tree = tree_from_rows(&entries_from_rows(&rows).unwrap());
    insta::assert_snapshot!(serde_json::to_string_pretty(&tree).unwrap(), @r##"
[
  {
    "label": "Quote \"A\"",
    "sections": [
      {
        "label": "verb",
        "sections": []
      }
    ]
  },
  {
    "label": "",
    "sections": []
  }
]
"##);
}

#[test]
fn test_nested_tree_fills_missing_ancestors() {
    let tree = tree_from_rows(&[entry("02", "Footer"), entry("01.02.01", "Deep")]);
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].label, "Section 1");
    assert_eq!(tree[0].sections[0].label, "Section 1.2");
    assert_eq!(tree[0].sections[0].sections[0].label, "Deep");
    assert_eq!(tree[1].label, "Footer");

    // Re-flattening renumbers densely.
    let flat: Vec<(String, String)> = flatten_tree(&tree, 2)
        .into_iter()
        .map(|e| (e.index.to_string(), e.label))
        .collect();
    assert_eq!(
        flat,
        vec![
            ("01".to_string(), "Section 1".to_string()),
            ("01.01".to_string(), "Section 1.2".to_string()),
            ("01.01.01".to_string(), "Deep".to_string()),
            ("02".to_string(), "Footer".to_string()),
        ]
    );
}

#[test]
fn test_nested_tree_orders_indices_numerically() {
    let tree = tree_from_rows(&[entry("10", "ten"), entry("9", "nine"), entry("09.1", "child")]);
    let labels: Vec<&str> = tree.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(labels, vec!["nine", "ten"]);
    assert_eq!(tree[0].sections[0].label, "child");
}

#[test]
fn test_training_entries_are_slide_relative() {
    let rows = export_rows(&slide_tree());
    let entries = training_entries(&rows);
    assert_eq!(entries.len(), 3);

    let shape = &entries[2];
    assert_eq!(shape.index, "02");
    assert_eq!(shape.top, Some(0.556));
    assert_eq!(shape.left, Some(0.521));
    assert_eq!(shape.right, Some(0.625));
    assert_eq!(shape.bottom, Some(0.648));

    // Text sections carry no geometry.
    assert_eq!(entries[1].top, None);

    let mut flat = rows[2].clone();
    flat.slide_height = 0.0;
    let entry = training_entries(&[flat]).remove(0);
    assert_eq!(entry.top, None);
    assert_eq!(entry.left, Some(0.521));
}

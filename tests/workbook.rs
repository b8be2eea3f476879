use serde_json::json;
use trello_xlsx::ToolError;
use trello_xlsx::flatten::{LayoutOptions, build_workbook, group_cards};
use trello_xlsx::io::board::parse_board;
use trello_xlsx::labels::resolve_labels;
use trello_xlsx::model::{Board, CellValue};

fn board(document: serde_json::Value) -> Board {
    parse_board(document).expect("board parsed")
}

fn resolved_board(document: serde_json::Value) -> Board {
    let mut board = board(document);
    resolve_labels(&mut board).expect("labels resolved");
    board
}

fn sample_export() -> serde_json::Value {
    json!({
        "labels": [
            {"id": "lab-urgent", "name": "Urgent", "color": "red"},
            {"id": "lab-blocked", "name": "Blocked", "color": "yellow"}
        ],
        "lists": [
            {"id": "list-todo", "name": "Todo", "closed": false},
            {"id": "list-done", "name": "Done", "closed": false},
            {"id": "list-backlog", "name": "Backlog", "closed": false}
        ],
        "cards": [
            {
                "id": "card-1",
                "idList": "list-todo",
                "name": "Write the report",
                "labels": [{"id": "lab-urgent"}]
            },
            {
                "id": "card-2",
                "idList": "list-todo",
                "name": "File expenses",
                "labels": []
            },
            {
                "id": "card-3",
                "idList": "list-done",
                "name": "Book travel",
                "labels": [{"id": "lab-urgent"}, {"id": "lab-blocked"}]
            }
        ]
    })
}

#[test]
fn sheets_match_populated_lists() {
    let board = resolved_board(sample_export());
    let workbook = build_workbook(&board, LayoutOptions::default()).expect("workbook built");

    let names: Vec<&str> = workbook
        .tables
        .iter()
        .map(|table| table.sheet_name.as_str())
        .collect();
    assert_eq!(names, vec!["Todo", "Done"]);
}

#[test]
fn add_empty_includes_cardless_lists() {
    let board = resolved_board(sample_export());
    let options = LayoutOptions {
        include_empty_lists: true,
        ..LayoutOptions::default()
    };
    let workbook = build_workbook(&board, options).expect("workbook built");

    let names: Vec<&str> = workbook
        .tables
        .iter()
        .map(|table| table.sheet_name.as_str())
        .collect();
    assert_eq!(names, vec!["Todo", "Done", "Backlog"]);

    let backlog = &workbook.tables[2];
    assert!(backlog.columns.is_empty());
    assert!(backlog.rows.is_empty());
}

#[test]
fn cards_group_under_their_list_in_input_order() {
    let board = resolved_board(sample_export());
    let groups = group_cards(&board).expect("cards grouped");

    assert_eq!(groups.len(), 2);
    assert_eq!(groups.get("list-todo").expect("todo group").len(), 2);
    assert_eq!(groups.get("list-done").expect("done group").len(), 1);
    assert!(groups.get("list-backlog").is_none());

    let order: Vec<&str> = groups.iter().map(|(list_id, _)| list_id).collect();
    assert_eq!(order, vec!["list-todo", "list-done"]);

    let todo = groups.get("list-todo").expect("todo group");
    assert_eq!(
        todo[0].get("id"),
        Some(&CellValue::Text("card-1".to_string()))
    );
    assert_eq!(
        todo[1].get("id"),
        Some(&CellValue::Text("card-2".to_string()))
    );
}

#[test]
fn label_cells_collapse_by_count() {
    let board = resolved_board(sample_export());
    let groups = group_cards(&board).expect("cards grouped");

    let todo = groups.get("list-todo").expect("todo group");
    assert_eq!(
        todo[0].get("labels"),
        Some(&CellValue::Text("Urgent".to_string()))
    );
    assert_eq!(todo[1].get("labels"), Some(&CellValue::Empty));

    let done = groups.get("list-done").expect("done group");
    assert_eq!(
        done[0].get("labels"),
        Some(&CellValue::Text("Urgent, Blocked".to_string()))
    );
}

#[test]
fn collection_fields_flatten_to_compact_json() {
    let board = resolved_board(json!({
        "labels": [],
        "lists": [{"id": "list-1", "name": "Todo"}],
        "cards": [{
            "id": "card-1",
            "idList": "list-1",
            "labels": [],
            "checklists": [{"id": "chk-1", "name": "Steps"}],
            "badges": {"votes": 2, "subscribed": true}
        }]
    }));
    let groups = group_cards(&board).expect("cards grouped");
    let card = &groups.get("list-1").expect("group")[0];

    assert_eq!(
        card.get("checklists"),
        Some(&CellValue::Text(
            r#"[{"id":"chk-1","name":"Steps"}]"#.to_string()
        ))
    );
    assert_eq!(
        card.get("badges"),
        Some(&CellValue::Text(
            r#"{"votes":2,"subscribed":true}"#.to_string()
        ))
    );
}

#[test]
fn scalar_fields_keep_their_type() {
    let board = resolved_board(json!({
        "labels": [],
        "lists": [{"id": "list-1", "name": "Todo"}],
        "cards": [{
            "id": "card-1",
            "idList": "list-1",
            "labels": [],
            "pos": 16384.5,
            "closed": false,
            "due": null
        }]
    }));
    let groups = group_cards(&board).expect("cards grouped");
    let card = &groups.get("list-1").expect("group")[0];

    assert_eq!(card.get("pos"), Some(&CellValue::Number(16384.5)));
    assert_eq!(card.get("closed"), Some(&CellValue::Boolean(false)));
    assert_eq!(card.get("due"), Some(&CellValue::Empty));
}

#[test]
fn raw_labels_pass_through_when_resolution_is_off() {
    let board = board(sample_export());
    let groups = group_cards(&board).expect("cards grouped");

    let todo = groups.get("list-todo").expect("todo group");
    assert_eq!(
        todo[0].get("labels"),
        Some(&CellValue::Text(r#"[{"id":"lab-urgent"}]"#.to_string()))
    );
    assert_eq!(
        todo[1].get("labels"),
        Some(&CellValue::Text("[]".to_string()))
    );
}

#[test]
fn label_resolution_is_idempotent() {
    let mut board = board(sample_export());
    resolve_labels(&mut board).expect("first resolution");
    let first = board
        .labels
        .resolved()
        .expect("resolved label set")
        .clone();

    resolve_labels(&mut board).expect("second resolution");
    let second = board.labels.resolved().expect("resolved label set");

    assert_eq!(&first, second);
    assert_eq!(first.get("lab-urgent").map(String::as_str), Some("Urgent"));
}

#[test]
fn list_info_block_mirrors_list_fields() {
    let board = resolved_board(sample_export());
    let options = LayoutOptions {
        include_list_info: true,
        ..LayoutOptions::default()
    };
    let workbook = build_workbook(&board, options).expect("workbook built");

    let info = workbook.tables[0].list_info.as_ref().expect("info block");
    assert_eq!(info.keys, vec!["id", "name", "closed"]);
    assert_eq!(
        info.values,
        vec![
            CellValue::Text("list-todo".to_string()),
            CellValue::Text("Todo".to_string()),
            CellValue::Boolean(false)
        ]
    );
}

#[test]
fn columns_union_in_first_seen_order() {
    let board = resolved_board(json!({
        "labels": [],
        "lists": [{"id": "list-1", "name": "Todo"}],
        "cards": [
            {"id": "card-1", "idList": "list-1", "name": "First", "labels": []},
            {"id": "card-2", "idList": "list-1", "name": "Second", "labels": [], "due": "2019-04-30"}
        ]
    }));
    let workbook = build_workbook(&board, LayoutOptions::default()).expect("workbook built");

    let table = &workbook.tables[0];
    assert_eq!(table.columns, vec!["id", "idList", "name", "labels", "due"]);
    assert_eq!(table.rows[0][4], CellValue::Empty);
    assert_eq!(table.rows[1][4], CellValue::Text("2019-04-30".to_string()));
}

#[test]
fn card_without_id_list_is_fatal() {
    let error = parse_board(json!({
        "labels": [],
        "lists": [{"id": "list-1", "name": "Todo"}],
        "cards": [{"id": "card-1", "name": "Orphan", "labels": []}]
    }))
    .expect_err("missing idList must fail");

    assert!(matches!(
        error,
        ToolError::MissingField { field: "idList", .. }
    ));
}

#[test]
fn unknown_label_reference_is_fatal() {
    let board = resolved_board(json!({
        "labels": [{"id": "lab-1", "name": "Urgent"}],
        "lists": [{"id": "list-1", "name": "Todo"}],
        "cards": [{
            "id": "card-1",
            "idList": "list-1",
            "labels": [{"id": "lab-ghost"}]
        }]
    }));
    let error = group_cards(&board).expect_err("unknown label must fail");

    assert!(matches!(error, ToolError::UnknownLabel { .. }));
}

#[test]
fn card_without_labels_field_is_fatal_only_when_resolving() {
    let export = json!({
        "labels": [],
        "lists": [{"id": "list-1", "name": "Todo"}],
        "cards": [{"id": "card-1", "idList": "list-1", "name": "Bare"}]
    });

    let resolved = resolved_board(export.clone());
    let error = group_cards(&resolved).expect_err("missing labels must fail");
    assert!(matches!(
        error,
        ToolError::MissingField { field: "labels", .. }
    ));

    let raw = board(export);
    assert!(group_cards(&raw).is_ok());
}

#[test]
fn cards_for_unknown_lists_are_grouped_but_never_rendered() {
    let board = resolved_board(json!({
        "labels": [],
        "lists": [{"id": "list-1", "name": "Todo"}],
        "cards": [
            {"id": "card-1", "idList": "list-1", "labels": []},
            {"id": "card-2", "idList": "list-gone", "labels": []}
        ]
    }));

    let groups = group_cards(&board).expect("cards grouped");
    assert!(groups.contains("list-gone"));

    let workbook = build_workbook(&board, LayoutOptions::default()).expect("workbook built");
    assert_eq!(workbook.tables.len(), 1);
    assert_eq!(workbook.tables[0].rows.len(), 1);
}

use pretty_assertions::assert_eq;
use richdoc_engine::dom::build::{Fragment, el, text};
use richdoc_engine::{
    Cmd, CommandError, Dom, Model, ModelError, ModelOptions, Position, Range,
};
use rstest::rstest;

fn model_from(fragment: Fragment) -> Model {
    let mut dom = Dom::new();
    let root = dom.build(&fragment);
    Model::new(dom, root, ModelOptions::default()).unwrap()
}

fn row(cells: &[&str]) -> Fragment {
    el("tr", cells.iter().map(|c| el("td", vec![text(c)])).collect())
}

/// div > table > tbody > [a1 b1 c1, a2 b2 c2]
fn three_by_two() -> Model {
    model_from(el(
        "div",
        vec![el(
            "table",
            vec![el("tbody", vec![row(&["a1", "b1", "c1"]), row(&["a2", "b2", "c2"])])],
        )],
    ))
}

/// Caret inside the text of the cell at column `x`, row `y`.
fn caret_in_cell(model: &mut Model, x: usize, y: usize, offset: usize) {
    let root = model.root();
    let path = vec![0, 0, y, x, 0, offset];
    model.select_range(Range::collapsed_at(Position::from_path(root, path)));
}

#[rstest]
#[case::middle_selects_right_neighbour(1, "c1")]
#[case::last_selects_left_neighbour(2, "b1")]
#[case::first_selects_right_neighbour(0, "b1")]
fn test_remove_column_moves_caret(#[case] x: usize, #[case] selected: &str) {
    let mut model = three_by_two();
    caret_in_cell(&mut model, x, 0, 1);

    model.execute(Cmd::RemoveTableColumn, None).unwrap();

    let tree = model.tree();
    let anchor = model.selection().anchor().unwrap();
    let cell = anchor.parent(tree).unwrap();
    assert!(tree.has_tag(cell, "td"));
    assert_eq!(anchor.parent_offset(), 0);
    let content = tree.children(cell)[0];
    assert_eq!(tree.text_content(content).unwrap(), selected);
}

#[test]
fn test_remove_column_writes_back() {
    let mut model = three_by_two();
    caret_in_cell(&mut model, 1, 0, 0);

    let patch = model.execute(Cmd::RemoveTableColumn, None).unwrap();

    assert_eq!(
        model.to_html(),
        "<div><table><tbody><tr><td>a1</td><td>c1</td></tr>\
         <tr><td>a2</td><td>c2</td></tr></tbody></table></div>"
    );
    assert_eq!(model.selection().anchor().unwrap().path(), &[0, 0, 0, 1, 0]);
    // The caret lands in the cell element, before its text
    let anchor = patch.new_selection.anchor.unwrap();
    assert!(patch.new_selection.is_collapsed());
    assert_eq!(anchor.offset, 0);
    assert_eq!(model.dom().tag(anchor.node), Some("td"));
    assert_eq!(model.dom().text_content(anchor.node), "c1");
}

#[test]
fn test_removing_the_only_column_removes_the_table() {
    let mut model = model_from(el(
        "div",
        vec![
            el("p", vec![text("before")]),
            el("table", vec![el("tbody", vec![row(&["only"])])]),
        ],
    ));
    let root = model.root();
    model.select_range(Range::collapsed_at(Position::from_path(
        root,
        vec![1, 0, 0, 0, 0, 2],
    )));

    model.execute(Cmd::RemoveTableColumn, None).unwrap();

    assert_eq!(model.to_html(), "<div><p>before</p></div>");
    assert_eq!(model.selection().anchor().unwrap().path(), &[1]);
}

#[test]
fn test_insert_row_below() {
    let mut model = three_by_two();
    caret_in_cell(&mut model, 1, 0, 1);

    model
        .execute(Cmd::InsertTableRow { above: false }, None)
        .unwrap();

    assert_eq!(
        model.to_html(),
        "<div><table><tbody><tr><td>a1</td><td>b1</td><td>c1</td></tr>\
         <tr><td></td><td></td><td></td></tr>\
         <tr><td>a2</td><td>b2</td><td>c2</td></tr></tbody></table></div>"
    );
    assert_eq!(
        model.selection().anchor().unwrap().path(),
        &[0, 0, 0, 1, 0, 1]
    );
}

#[test]
fn test_insert_row_above_keeps_caret_in_its_cell() {
    let mut model = three_by_two();
    caret_in_cell(&mut model, 1, 1, 2);

    model.execute(Cmd::InsertTableRow { above: true }, None).unwrap();

    let tree = model.tree();
    let anchor = model.selection().anchor().unwrap();
    assert_eq!(anchor.path(), &[0, 0, 2, 1, 0, 2]);
    assert_eq!(tree.text_content(anchor.parent(tree).unwrap()).unwrap(), "b2");
    assert_eq!(
        richdoc_engine::editing::table::dimensions(tree, tree.children(model.root())[0]),
        (3, 3)
    );
}

#[test]
fn test_table_commands_outside_a_table() {
    let mut model = model_from(el("div", vec![el("p", vec![text("no table")])]));
    let root = model.root();
    model.select_range(Range::collapsed_at(Position::from_path(root, vec![0, 0, 1])));

    let result = model.execute(Cmd::InsertTableRow { above: true }, None);
    assert!(matches!(
        result,
        Err(CommandError::Model(ModelError::NotInCell))
    ));

    model.set_selection(Default::default());
    let result = model.execute(Cmd::RemoveTableColumn, None);
    assert!(matches!(
        result,
        Err(CommandError::Model(ModelError::MisbehavedSelection))
    ));
}

use pretty_assertions::assert_eq;
use richdoc_engine::dom::build::{el, text};
use richdoc_engine::{
    Cmd, CommandError, Dom, Model, ModelOptions, Position, PropertyState, Range, Selection,
    TextProperty,
};

fn markdown(source: &str) -> Model {
    Model::from_markdown(source, ModelOptions::default()).unwrap()
}

fn select(model: &mut Model, start: &[usize], end: &[usize]) {
    let root = model.root();
    model.select_range(Range::from_paths(root, start.to_vec(), end.to_vec()).unwrap());
}

fn bold_state(model: &Model) -> PropertyState {
    model
        .selection()
        .text_property_state(model.tree(), TextProperty::Bold)
}

#[test]
fn test_toggle_bold_on_part_of_a_paragraph() {
    let mut model = markdown("Hello world");
    select(&mut model, &[0, 0, 0], &[0, 0, 5]);
    assert_eq!(bold_state(&model), PropertyState::Disabled);

    let bold = |enabled| Cmd::SetTextProperty {
        property: TextProperty::Bold,
        enabled,
    };
    model.execute(bold(true), None).unwrap();
    assert_eq!(model.to_html(), "<div><p><strong>Hello</strong> world</p></div>");
    assert_eq!(bold_state(&model), PropertyState::Enabled);

    select(&mut model, &[0, 0, 0], &[0, 1, 6]);
    assert_eq!(bold_state(&model), PropertyState::Unknown);

    model.execute(bold(false), None).unwrap();
    assert_eq!(model.to_html(), "<div><p>Hello world</p></div>");
    assert_eq!(bold_state(&model), PropertyState::Disabled);
}

#[test]
fn test_marks_nest_by_priority() {
    let mut model = markdown("*styled*");
    select(&mut model, &[0, 0, 0], &[0, 0, 6]);

    model
        .execute(
            Cmd::SetTextProperty {
                property: TextProperty::Bold,
                enabled: true,
            },
            None,
        )
        .unwrap();

    // Italic outranks bold, whichever was applied first
    assert_eq!(model.to_html(), "<div><p><em><strong>styled</strong></em></p></div>");
}

#[test]
fn test_property_with_selection_override() {
    let mut model = markdown("abc");
    let root = model.root();
    let range = Range::from_paths(root, vec![0, 0, 1], vec![0, 0, 2]).unwrap();

    model
        .execute(
            Cmd::SetTextProperty {
                property: TextProperty::Strikethrough,
                enabled: true,
            },
            Some(Selection::from_range(range)),
        )
        .unwrap();

    assert_eq!(model.to_html(), "<div><p>a<s>b</s>c</p></div>");
}

#[test]
fn test_insert_and_delete_backward() {
    let mut model = markdown("Hello");
    let root = model.root();
    model.select_range(Range::collapsed_at(Position::from_path(root, vec![0, 0, 5])));

    model
        .execute(
            Cmd::InsertText {
                text: "!!".to_string(),
            },
            None,
        )
        .unwrap();
    assert_eq!(model.to_html(), "<div><p>Hello!!</p></div>");
    assert_eq!(model.selection().anchor().unwrap().path(), &[0, 0, 7]);

    model.execute(Cmd::DeleteBackward, None).unwrap();
    assert_eq!(model.to_html(), "<div><p>Hello!</p></div>");
    assert_eq!(model.selection().anchor().unwrap().path(), &[0, 0, 6]);
}

#[test]
fn test_insert_text_replaces_a_range() {
    let mut model = markdown("Hello world");
    select(&mut model, &[0, 0, 6], &[0, 0, 11]);

    model
        .execute(
            Cmd::InsertText {
                text: "there".to_string(),
            },
            None,
        )
        .unwrap();

    assert_eq!(model.to_html(), "<div><p>Hello there</p></div>");
}

#[test]
fn test_delete_backward_crosses_element_boundaries() {
    let mut model = markdown("one\n\ntwo");
    let root = model.root();
    model.select_range(Range::collapsed_at(Position::from_path(root, vec![1, 0, 0])));

    model.execute(Cmd::DeleteBackward, None).unwrap();

    assert_eq!(model.to_html(), "<div><p>on</p><p>two</p></div>");
    assert_eq!(model.selection().anchor().unwrap().path(), &[0, 0, 2]);
}

#[test]
fn test_delete_backward_removes_a_void() {
    let mut dom = Dom::new();
    let root = dom.build(&el(
        "div",
        vec![el("p", vec![text("a"), el("br", vec![]), text("b")])],
    ));
    let mut model = Model::new(dom, root, ModelOptions::default()).unwrap();
    let root = model.root();
    model.select_range(Range::collapsed_at(Position::from_path(root, vec![0, 2, 0])));

    model.execute(Cmd::DeleteBackward, None).unwrap();

    assert_eq!(model.to_html(), "<div><p>ab</p></div>");
    assert_eq!(model.selection().anchor().unwrap().path(), &[0, 1]);
}

#[test]
fn test_undo_restores_document_and_selection() {
    let mut model = markdown("Hello");
    let root = model.root();
    let caret = Range::collapsed_at(Position::from_path(root, vec![0, 0, 2]));
    model.select_range(caret.clone());

    assert!(!model.can_execute(&Cmd::Undo));
    model.save_snapshot();
    model
        .execute(
            Cmd::InsertText {
                text: "--".to_string(),
            },
            None,
        )
        .unwrap();
    assert_eq!(model.to_html(), "<div><p>He--llo</p></div>");

    let patch = model.execute(Cmd::Undo, None).unwrap();
    assert_eq!(model.to_html(), "<div><p>Hello</p></div>");
    assert_eq!(model.selection().last_range(), Some(&caret));
    assert_eq!(patch.version, model.version());

    assert!(matches!(
        model.execute(Cmd::Undo, None),
        Err(CommandError::NotExecutable("undo"))
    ));
}

#[test]
fn test_history_limit_drops_oldest() {
    let options = ModelOptions {
        history_limit: 2,
        ..ModelOptions::default()
    };
    let mut model = Model::from_markdown("x", options).unwrap();
    for _ in 0..5 {
        model.save_snapshot();
    }
    assert_eq!(model.undo_depth(), 2);
}

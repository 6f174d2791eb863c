use pretty_assertions::assert_eq;
use richdoc_engine::dom::build::{el, text};
use richdoc_engine::model::DirtyFlags;
use richdoc_engine::{Dom, Model, ModelOptions, Position};

fn mixed_document() -> Model {
    let mut dom = Dom::new();
    let root = dom.build(&el(
        "div",
        vec![
            el(
                "p",
                vec![
                    text("plain "),
                    el("strong", vec![el("em", vec![text("both")])]),
                    text(" tail"),
                ],
            ),
            el(
                "table",
                vec![el(
                    "tbody",
                    vec![el(
                        "tr",
                        vec![el("td", vec![text("a")]), el("td", vec![text("b")])],
                    )],
                )],
            ),
            el("ul", vec![el("li", vec![text("item")])]),
        ],
    ));
    Model::new(dom, root, ModelOptions::default()).unwrap()
}

#[test]
fn test_read_collapses_wrappers_into_marks() {
    let model = mixed_document();
    let lines = model.outline().unwrap().lines();
    assert_eq!(
        lines,
        vec![
            "<div>",
            "  <p>",
            "    \"plain \"",
            "    \"both\" [bold, italic]",
            "    \" tail\"",
            "  <table>",
            "    <tbody>",
            "      <tr>",
            "        <td>",
            "          \"a\"",
            "        <td>",
            "          \"b\"",
            "  <ul>",
            "    <li>",
            "      \"item\"",
        ]
    );
}

#[test]
fn test_full_rewrite_renests_marks_by_priority() {
    let mut model = mixed_document();
    let root = model.root();

    model
        .change(|m| {
            m.tree_mut().mark_subtree_dirty(root, DirtyFlags::NEW);
            Ok(None)
        })
        .unwrap();

    assert_eq!(
        model.to_html(),
        "<div><p>plain <em><strong>both</strong></em> tail</p>\
         <table><tbody><tr><td>a</td><td>b</td></tr></tbody></table>\
         <ul><li>item</li></ul></div>"
    );

    // Writing again reads back to the same tree
    let before = model.outline();
    model.read(false).unwrap();
    assert_eq!(model.outline(), before);
}

#[test]
fn test_markdown_outline() {
    let model = Model::from_markdown(
        "# Title\n\nSome *stress* here.\n\n- one\n- two\n",
        ModelOptions::default(),
    )
    .unwrap();

    insta::assert_snapshot!(model.outline().unwrap().lines().join("\n"), @r#"
    <div>
      <h1>
        "Title"
      <p>
        "Some "
        "stress" [italic]
        " here."
      <ul>
        <li>
          "one"
        <li>
          "two"
    "#);
}

#[test]
fn test_empty_elements_read_without_children() {
    let mut dom = Dom::new();
    let root = dom.build(&el(
        "div",
        vec![el("p", vec![]), el("p", vec![text("   ")])],
    ));
    let model = Model::new(dom, root, ModelOptions::default()).unwrap();
    let tree = model.tree();

    let paragraphs = tree.children(model.root());
    assert_eq!(paragraphs.len(), 2);
    assert!(paragraphs.iter().all(|p| tree.children(*p).is_empty()));
}

#[test]
fn test_untouched_siblings_keep_their_views() {
    let mut model = Model::from_markdown("first\n\nsecond", ModelOptions::default()).unwrap();
    let root = model.root();
    let (first, second) = {
        let children = model.tree().children(root);
        (children[0], children[1])
    };
    let first_view = model.model_to_view(first).unwrap().view_root;
    let second_view = model.model_to_view(second).unwrap().view_root;

    model
        .change(|m| {
            let at = Position::from_path(root, vec![0, 0, 5]);
            m.insert_text(&at, "!")?;
            Ok(None)
        })
        .unwrap();

    assert_eq!(model.to_html(), "<div><p>first!</p><p>second</p></div>");
    assert_eq!(model.model_to_view(first).unwrap().view_root, first_view);
    assert_eq!(model.model_to_view(second).unwrap().view_root, second_view);

    let dom = model.dom();
    assert_eq!(dom.node(first_view).unwrap().dirty(), DirtyFlags::CONTENT);
    assert!(dom.node(second_view).unwrap().dirty().is_clean());
    assert!(model.tree().dirtiness(first).is_clean());
}

#[test]
fn test_view_lookups_follow_wrappers() {
    let model = mixed_document();
    let tree = model.tree();
    let p = tree.children(model.root())[0];
    let both = tree.children(p)[1];

    let view = model.model_to_view(both).unwrap();
    assert_eq!(model.dom().tag(view.view_root), Some("strong"));
    assert_eq!(model.dom().text(view.content_root), Some("both"));
    assert_eq!(model.view_to_model(view.content_root).unwrap(), both);
    assert_eq!(model.view_to_model(view.view_root).unwrap(), both);
}

fn shared_wrapper_document() -> Model {
    let mut dom = Dom::new();
    let root = dom.build(&el(
        "div",
        vec![el(
            "p",
            vec![
                text("x "),
                el("strong", vec![text("a"), el("em", vec![text("b")])]),
            ],
        )],
    ));
    Model::new(dom, root, ModelOptions::default()).unwrap()
}

const SHARED_WRAPPER_HTML: &str =
    "<div><p>x! <strong>a</strong><em><strong>b</strong></em></p></div>";

#[test]
fn test_editing_next_to_a_shared_wrapper_writes_it_once() {
    let mut model = shared_wrapper_document();
    let root = model.root();

    model
        .change(|m| {
            m.insert_text(&Position::from_path(root, vec![0, 0, 1]), "!")?;
            Ok(None)
        })
        .unwrap();
    assert_eq!(model.to_html(), SHARED_WRAPPER_HTML);

    // Same markup as writing everything from scratch
    model
        .change(|m| {
            m.tree_mut().mark_subtree_dirty(root, DirtyFlags::NEW);
            Ok(None)
        })
        .unwrap();
    assert_eq!(model.to_html(), SHARED_WRAPPER_HTML);
}

#[test]
fn test_writing_a_text_inside_a_shared_wrapper() {
    let mut model = shared_wrapper_document();
    let root = model.root();
    let p = model.tree().children(root)[0];
    let a = model.tree().children(p)[1];

    model
        .change(|m| {
            m.tree_mut().mark_dirty(a, DirtyFlags::CONTENT)?;
            Ok(Some(a))
        })
        .unwrap();

    assert_eq!(
        model.to_html(),
        "<div><p>x <strong>a</strong><em><strong>b</strong></em></p></div>"
    );
}

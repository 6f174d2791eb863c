use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use richdoc_config::Config;
use richdoc_engine::dom::{is_block_tag, markdown};
use richdoc_engine::model::components::{PLACEHOLDER, component_props};
use richdoc_engine::model::default_specs;
use richdoc_engine::walker::{accept_text_and_void, global_text_offset, global_text_offset_to_path};
use richdoc_engine::writers::xml::to_debug_string;
use richdoc_engine::{
    Cmd, Dom, MarkSpec, Model, ModelOptions, NodeId, Position, PropertyState, Props, Selection,
    TextProperty, Tree, TreeWalker,
};
use std::{env, io::stdout, path::Path, path::PathBuf, process};

/// Engine options from the persisted config: built-in marks first, then any
/// extra marks the user declared.
fn model_options(config: &Config) -> ModelOptions {
    let mut marks = default_specs();
    marks.extend(config.marks.iter().map(|mark| {
        let tags: Vec<&str> = mark.tags.iter().map(String::as_str).collect();
        MarkSpec::new(&mark.name, &tags, mark.priority)
    }));
    ModelOptions {
        convert_whitespace: config.convert_whitespace,
        history_limit: config.history_limit,
        marks,
        ..ModelOptions::default()
    }
}

fn open_document(path: &Path, options: ModelOptions) -> Result<Model> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut dom = Dom::new();
    let root = markdown::from_markdown_bytes(&mut dom, &bytes)
        .with_context(|| format!("{} is not valid UTF-8", path.display()))?;
    Model::new(dom, root, options)
        .with_context(|| format!("Failed to read {} into a document", path.display()))
}

struct App {
    title: String,
    model: Model,
    /// Caret ends as global text offsets; voids count as one.
    anchor: usize,
    focus: usize,
    status: String,
    /// Tree pane shows the debug markup instead of the outline.
    show_markup: bool,
}

impl App {
    fn new(title: String, model: Model) -> Self {
        let mut app = Self {
            title,
            model,
            anchor: 0,
            focus: 0,
            status: String::new(),
            show_markup: false,
        };
        app.push_selection();
        app
    }

    fn text_len(&self) -> usize {
        let tree = self.model.tree();
        let root = self.model.root();
        let end = Position::from_path(root, vec![tree.node_len(root)]);
        global_text_offset(tree, &end).unwrap_or(0)
    }

    fn position_at(&self, offset: usize) -> Result<Position> {
        let root = self.model.root();
        let path = global_text_offset_to_path(self.model.tree(), root, offset)?;
        Ok(Position::from_path(root, path))
    }

    fn selection_at_offsets(&self) -> Result<Selection> {
        let mut selection = Selection::new();
        selection.set_anchor(self.position_at(self.anchor)?)?;
        selection.set_focus(self.position_at(self.focus)?)?;
        Ok(selection)
    }

    /// Copies the caret offsets into the model selection.
    fn push_selection(&mut self) {
        match self.selection_at_offsets() {
            Ok(selection) => self.model.set_selection(selection),
            Err(err) => {
                log::warn!("Could not place caret at {}: {err:#}", self.focus);
                self.model.set_selection(Selection::new());
            }
        }
    }

    /// Reads the caret offsets back after a command moved the selection.
    fn pull_selection(&mut self) {
        let tree = self.model.tree();
        let selection = self.model.selection();
        let offset = |position: Option<&Position>| {
            position.and_then(|position| global_text_offset(tree, position).ok())
        };
        match (offset(selection.anchor()), offset(selection.focus())) {
            (Some(anchor), Some(focus)) => {
                self.anchor = anchor;
                self.focus = focus;
            }
            _ => {
                self.focus = self.focus.min(self.text_len());
                self.anchor = self.focus;
            }
        }
    }

    fn move_caret(&mut self, forward: bool, extend: bool) {
        self.focus = if forward {
            (self.focus + 1).min(self.text_len())
        } else {
            self.focus.saturating_sub(1)
        };
        if !extend {
            self.anchor = self.focus;
        }
        self.push_selection();
    }

    fn run(&mut self, cmd: Cmd, undoable: bool) {
        let name = cmd.name();
        if undoable && self.model.can_execute(&cmd) {
            self.model.save_snapshot();
        }
        match self.model.execute(cmd, None) {
            Ok(patch) => self.status = format!("{name} (version {})", patch.version),
            Err(err) => self.status = format!("{name}: {err}"),
        }
        self.pull_selection();
        self.push_selection();
    }

    fn toggle(&mut self, property: TextProperty) {
        let state = self
            .model
            .selection()
            .text_property_state(self.model.tree(), property);
        self.run(
            Cmd::SetTextProperty {
                property,
                enabled: state != PropertyState::Enabled,
            },
            true,
        );
    }

    /// Returns false when the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Char('q') if ctrl => return false,
            KeyCode::Tab => self.show_markup = !self.show_markup,
            KeyCode::Left => self.move_caret(false, shift),
            KeyCode::Right => self.move_caret(true, shift),
            KeyCode::Backspace => self.run(Cmd::DeleteBackward, true),
            KeyCode::Char('z') if ctrl => self.run(Cmd::Undo, false),
            KeyCode::Char('b') if ctrl => self.toggle(TextProperty::Bold),
            KeyCode::Char('e') if ctrl => self.toggle(TextProperty::Italic),
            KeyCode::Char('u') if ctrl => self.toggle(TextProperty::Underline),
            KeyCode::Char('s') if ctrl => self.toggle(TextProperty::Strikethrough),
            KeyCode::Char('l') if ctrl => self.run(Cmd::RemoveList, true),
            KeyCode::Char('r') if ctrl => self.run(Cmd::InsertTableRow { above: false }, true),
            KeyCode::Char('t') if ctrl => self.run(Cmd::InsertTableRow { above: true }, true),
            KeyCode::Char('d') if ctrl => self.run(Cmd::RemoveTableColumn, true),
            KeyCode::Char('p') if ctrl => self.run(
                Cmd::InsertComponent {
                    name: PLACEHOLDER.to_string(),
                    props: Props::new(),
                },
                true,
            ),
            KeyCode::Char(c) if !ctrl => self.run(
                Cmd::InsertText {
                    text: c.to_string(),
                },
                true,
            ),
            _ => {}
        }
        true
    }

    fn outline_lines(&self) -> Vec<Line<'static>> {
        if self.show_markup {
            let markup = to_debug_string(self.model.tree(), self.model.marks(), self.model.root())
                .unwrap_or_else(|err| format!("Error writing markup: {err}"));
            return vec![Line::from(markup)];
        }
        self.model
            .outline()
            .map(|outline| outline.lines().into_iter().map(Line::from).collect())
            .unwrap_or_default()
    }

    /// The document as styled text, one line per block, caret reversed and
    /// the selection highlighted.
    fn document_lines(&self) -> Vec<Line<'static>> {
        let tree = self.model.tree();
        let (from, to) = (self.anchor.min(self.focus), self.anchor.max(self.focus));
        let caret = |style: Style, offset: usize| {
            let style = if (from..to).contains(&offset) {
                style.bg(Color::Blue)
            } else {
                style
            };
            if offset == self.focus {
                style.add_modifier(Modifier::REVERSED)
            } else {
                style
            }
        };

        let mut lines = Vec::new();
        let mut spans: Vec<Span<'static>> = Vec::new();
        let mut block: Option<NodeId> = None;
        let mut offset = 0;
        for leaf in TreeWalker::subtree(tree, self.model.root(), accept_text_and_void, false) {
            let leaf_block = tree
                .ancestors(leaf)
                .find(|node| tree.tag(*node).is_some_and(is_block_tag));
            if block.is_some() && leaf_block != block {
                lines.push(Line::from(std::mem::take(&mut spans)));
            }
            block = leaf_block;

            if tree.is_void(leaf) {
                let tag = tree.tag(leaf).unwrap_or("void");
                let (marker, color) = match self.model.components().spec_for_node(tree, leaf) {
                    Some(spec) => {
                        let props = component_props(tree, leaf).unwrap_or_default();
                        (format!("[{}]", (spec.render)(&props)), Color::Cyan)
                    }
                    None if tag == "br" => ("↵".to_string(), Color::DarkGray),
                    None => (tag.to_string(), Color::DarkGray),
                };
                let style = caret(Style::default().fg(color), offset);
                spans.push(Span::styled(marker, style));
                if tag == "br" {
                    lines.push(Line::from(std::mem::take(&mut spans)));
                }
                offset += 1;
                continue;
            }

            let style = mark_style(tree, leaf);
            for ch in tree.text_content(leaf).unwrap_or_default().chars() {
                spans.push(Span::styled(ch.to_string(), caret(style, offset)));
                offset += 1;
            }
        }
        if self.focus >= offset {
            spans.push(Span::styled(" ", caret(Style::default(), offset)));
        }
        lines.push(Line::from(spans));
        lines
    }

    fn property_summary(&self) -> String {
        let selection = self.model.selection();
        let tree = self.model.tree();
        TextProperty::ALL
            .iter()
            .map(|property| {
                let state = match selection.text_property_state(tree, *property) {
                    PropertyState::Enabled => "on",
                    PropertyState::Disabled => "off",
                    PropertyState::Unknown => "?",
                };
                format!("{}:{state}", property.mark_name())
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn mark_style(tree: &Tree, text: NodeId) -> Style {
    [
        (TextProperty::Bold, Modifier::BOLD),
        (TextProperty::Italic, Modifier::ITALIC),
        (TextProperty::Underline, Modifier::UNDERLINED),
        (TextProperty::Strikethrough, Modifier::CROSSED_OUT),
    ]
    .into_iter()
    .filter(|(property, _)| tree.has_mark(text, property.mark_name()))
    .fold(Style::default(), |style, (_, modifier)| {
        style.add_modifier(modifier)
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };
    log::debug!("Config path: {}", config_path.display());

    let document_path: Option<PathBuf> = match args.len() {
        1 => config.document_path.clone(),
        2 => Some(PathBuf::from(&args[1])),
        _ => {
            eprintln!("Usage: {} [markdown-file]", args[0]);
            process::exit(1);
        }
    };

    let options = model_options(&config);
    let (title, model) = match &document_path {
        Some(path) => (path.display().to_string(), open_document(path, options)?),
        None => ("untitled".to_string(), Model::empty(options)?),
    };
    let mut app = App::new(title, model);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    // The edited document, as markup
    println!("{}", app.model.to_html());

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && !app.handle_key(key)
        {
            return Ok(());
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)].as_ref())
        .split(rows[0]);

    let outline = Paragraph::new(app.outline_lines())
        .block(Block::default().borders(Borders::ALL).title("Tree"))
        .wrap(Wrap { trim: false });
    f.render_widget(outline, panes[0]);

    let content = Paragraph::new(app.document_lines())
        .block(Block::default().borders(Borders::ALL).title(app.title.clone()))
        .wrap(Wrap { trim: false });
    f.render_widget(content, panes[1]);

    let help = Paragraph::new(vec![
        Line::from(vec![
            Span::raw(format!(
                "v{} | undo {} | {} | ",
                app.model.version(),
                app.model.undo_depth(),
                app.property_summary()
            )),
            Span::styled(app.status.clone(), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(
            "Esc: Quit | Tab: Tree/markup | ←/→ (+Shift): Move | ^B/^E/^U/^S: Bold/Italic/Underline/Strike | \
             ^L: Remove list | ^R/^T: Row below/above | ^D: Remove column | ^P: Placeholder | ^Z: Undo",
        ),
    ])
    .block(Block::default());
    f.render_widget(help, rows[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use richdoc_config::MarkConfig;

    fn app(source: &str) -> App {
        let model = Model::from_markdown(source, ModelOptions::default()).unwrap();
        App::new("test".to_string(), model)
    }

    fn shift_right(app: &mut App, times: usize) {
        for _ in 0..times {
            app.move_caret(true, true);
        }
    }

    #[test]
    fn test_model_options_append_configured_marks() {
        let config = Config {
            history_limit: 3,
            marks: vec![MarkConfig {
                name: "highlight".to_string(),
                tags: vec!["mark".to_string()],
                priority: 50,
            }],
            ..Config::default()
        };

        let options = model_options(&config);

        assert_eq!(options.history_limit, 3);
        assert_eq!(options.marks.len(), 5);
        assert_eq!(options.marks[4].render_tag, "mark");
    }

    #[test]
    fn test_caret_movement_is_clamped() {
        let mut app = app("ab\n\ncd");
        assert_eq!(app.text_len(), 4);

        app.move_caret(false, false);
        assert_eq!((app.anchor, app.focus), (0, 0));

        for _ in 0..10 {
            app.move_caret(true, false);
        }
        assert_eq!((app.anchor, app.focus), (4, 4));
        assert_eq!(app.model.selection().anchor().unwrap().path(), &[1, 0, 2]);
    }

    #[test]
    fn test_toggle_bold_on_a_shift_selection() {
        let mut app = app("hello");
        app.move_caret(true, false);
        shift_right(&mut app, 3);

        app.toggle(TextProperty::Bold);

        assert_eq!(app.model.to_html(), "<div><p>h<strong>ell</strong>o</p></div>");
        assert_eq!((app.anchor, app.focus), (1, 4));
        assert_eq!(app.property_summary(), "bold:on italic:off underline:off strikethrough:off");

        app.run(Cmd::Undo, false);
        assert_eq!(app.model.to_html(), "<div><p>hello</p></div>");
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut app = app("ab");
        app.move_caret(true, false);

        app.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert_eq!(app.model.to_html(), "<div><p>axb</p></div>");
        assert_eq!(app.focus, 2);

        app.handle_key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(app.model.to_html(), "<div><p>ab</p></div>");
        assert_eq!(app.focus, 1);
        assert!(!app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
    }

    #[test]
    fn test_document_lines_split_blocks() {
        let app = app("one\n\ntwo");
        let lines: Vec<String> = app
            .document_lines()
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_ctrl_p_inserts_a_placeholder() {
        let mut app = app("ab");
        app.move_caret(true, false);

        app.handle_key(KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL));

        let lines: Vec<String> = app
            .document_lines()
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(lines, vec!["a[placeholder]b"]);
        assert!(app.status.starts_with("insert-component"));
    }
}

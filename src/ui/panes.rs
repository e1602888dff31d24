//! Rendering logic for each TUI pane

use crate::trace::TraceEvent;
use crate::ui::theme::DEFAULT_THEME;

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

/// Simple syntax highlighting for one line of source
fn highlight_source_line(line: &str) -> Line<'_> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // Line comments swallow the rest of the line
        if c == '/' && i + 1 < chars.len() && chars[i + 1] == '/' {
            if !current_word.is_empty() {
                spans.push(word_span(current_word.clone()));
                current_word.clear();
            }
            spans.push(Span::styled(
                line[i..].to_string(),
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            break;
        }

        if !c.is_alphanumeric() && c != '_' {
            if !current_word.is_empty() {
                spans.push(word_span(current_word.clone()));
                current_word.clear();
            }

            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };
            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    if !current_word.is_empty() {
        spans.push(word_span(current_word));
    }

    Line::from(spans)
}

fn word_span(word: String) -> Span<'static> {
    let style = match word.as_str() {
        "int" | "float" | "double" | "char" | "void" => {
            Style::default().fg(DEFAULT_THEME.type_name)
        }
        "while" | "return" | "if" | "else" | "for" | "do" | "break" | "continue" | "struct"
        | "union" | "enum" => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        _ if word.chars().all(|c| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ => Style::default().fg(DEFAULT_THEME.fg),
    };
    Span::styled(word, style)
}

fn pane_block(title: &str, is_focused: bool) -> Block<'_> {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Render the source code pane with the traced statement's line highlighted
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source_code: &str,
    current_line: usize,
    is_focused: bool,
    scroll_offset: &mut usize,
    target_line_row: &mut Option<usize>,
) {
    let block = pane_block(" Source ", is_focused);

    let lines: Vec<&str> = source_code.lines().collect();
    let total_lines = lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    // Keep the highlighted line at a fixed visual row while stepping
    if target_line_row.is_none() {
        *target_line_row = Some(visible_height / 2);
    }
    let target_row = target_line_row
        .unwrap_or(0)
        .min(visible_height.saturating_sub(1));
    *target_line_row = Some(target_row);

    if current_line > 0 && current_line <= total_lines {
        let target_line_idx = current_line.saturating_sub(1);
        *scroll_offset = target_line_idx.saturating_sub(target_row);
        if total_lines > visible_height {
            *scroll_offset = (*scroll_offset).min(total_lines - visible_height);
        } else {
            *scroll_offset = 0;
        }
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current = line_num == current_line;

            let (num_style, content_bg) = if is_current {
                (
                    Style::default()
                        .fg(DEFAULT_THEME.secondary)
                        .add_modifier(Modifier::BOLD),
                    Style::default().bg(DEFAULT_THEME.current_line_bg),
                )
            } else {
                (Style::default().fg(DEFAULT_THEME.comment), Style::default())
            };

            let mut content_line = highlight_source_line(line);
            if is_current {
                for span in &mut content_line.spans {
                    span.style = span.style.patch(content_bg);
                }
            }

            let mut final_spans = vec![Span::styled(format!("{:4} ", line_num), num_style)];
            final_spans.extend(content_line.spans);
            Line::from(final_spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}

/// Render the binding table pane: one `name |-> value` row per entry
pub fn render_bindings_pane(
    frame: &mut Frame,
    area: Rect,
    event: Option<&TraceEvent>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Bindings ", is_focused);

    let items: Vec<ListItem> = match event {
        Some(event) if !event.bindings.is_empty() => event
            .bindings
            .iter()
            .map(|(name, value)| {
                let value_style = if value == "?" {
                    Style::default().fg(DEFAULT_THEME.uninit)
                } else {
                    Style::default().fg(DEFAULT_THEME.number)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(name.clone(), Style::default().fg(DEFAULT_THEME.fg)),
                    Span::styled(" |-> ", Style::default().fg(DEFAULT_THEME.comment)),
                    Span::styled(value.clone(), value_style),
                ]))
            })
            .collect(),
        _ => vec![ListItem::new(Span::styled(
            "(no bindings)",
            Style::default().fg(DEFAULT_THEME.comment),
        ))],
    };

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let max_scroll = items.len().saturating_sub(visible_height);
    *scroll_offset = (*scroll_offset).min(max_scroll);

    let visible: Vec<ListItem> = items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible).block(block), area);
}

/// Render the scope stack pane as a box diagram, top at the first box
pub fn render_scope_pane(
    frame: &mut Frame,
    area: Rect,
    event: Option<&TraceEvent>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Scope Stack ", is_focused);

    let mut lines: Vec<Line> = Vec::new();
    match event {
        Some(event) if !event.scope_names.is_empty() => {
            let rule = Span::styled(
                "+----------------+",
                Style::default().fg(DEFAULT_THEME.comment),
            );
            for name in &event.scope_names {
                let display = match event.bindings.iter().find(|(n, _)| n == name) {
                    Some((_, value)) => format!("{} = {}", name, value),
                    None => name.clone(),
                };
                lines.push(Line::from(rule.clone()));
                lines.push(Line::from(vec![
                    Span::styled("| ", Style::default().fg(DEFAULT_THEME.comment)),
                    Span::styled(
                        format!("{:<14}", display),
                        Style::default().fg(DEFAULT_THEME.fg),
                    ),
                    Span::styled(" |", Style::default().fg(DEFAULT_THEME.comment)),
                ]));
            }
            lines.push(Line::from(rule));
        }
        _ => lines.push(Line::from(Span::styled(
            "(empty)",
            Style::default().fg(DEFAULT_THEME.comment),
        ))),
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let max_scroll = lines.len().saturating_sub(visible_height);
    *scroll_offset = (*scroll_offset).min(max_scroll);

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(Paragraph::new(visible).block(block), area);
}

/// Render the trace pane: executed statements up to the current step, then
/// any diagnostics from the run
pub fn render_trace_pane(
    frame: &mut Frame,
    area: Rect,
    events: &[TraceEvent],
    diagnostics: &[String],
    position: usize,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Trace ", is_focused);

    let mut lines: Vec<Line> = Vec::new();
    for (index, event) in events.iter().enumerate().take(position + 1) {
        let mut spans = vec![Span::styled(
            format!("{:3}  ", index + 1),
            Style::default().fg(DEFAULT_THEME.comment),
        )];
        let label = event.iteration_label();
        if !label.is_empty() {
            spans.push(Span::styled(
                format!("[{}] ", label),
                Style::default().fg(DEFAULT_THEME.iteration),
            ));
        }
        let statement_style = if index == position {
            Style::default()
                .fg(DEFAULT_THEME.secondary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(DEFAULT_THEME.fg)
        };
        spans.push(Span::styled(event.statement.clone(), statement_style));
        lines.push(Line::from(spans));
    }
    for diagnostic in diagnostics {
        lines.push(Line::from(Span::styled(
            format!("! {}", diagnostic),
            Style::default().fg(DEFAULT_THEME.error),
        )));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "(nothing executed)",
            Style::default().fg(DEFAULT_THEME.comment),
        )));
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let max_scroll = lines.len().saturating_sub(visible_height);
    // usize::MAX requests "pin to bottom"
    *scroll_offset = (*scroll_offset).min(max_scroll);

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(Paragraph::new(visible).block(block), area);
}

/// Render the one-line status bar at the bottom
pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    status_message: &str,
    position: usize,
    total_steps: usize,
    is_playing: bool,
) {
    let step_display = if total_steps == 0 {
        " Step 0/0 ".to_string()
    } else {
        format!(" Step {}/{} ", position + 1, total_steps)
    };
    let play_indicator = if is_playing { "▶ " } else { "" };

    let line = Line::from(vec![
        Span::styled(
            step_display,
            Style::default()
                .fg(DEFAULT_THEME.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{}{}", play_indicator, status_message),
            Style::default().fg(DEFAULT_THEME.fg),
        ),
        Span::styled(
            "  ←/→ step | space play | enter end | backspace start | tab focus | q quit",
            Style::default().fg(DEFAULT_THEME.comment),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Left), area);
}

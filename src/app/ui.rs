use iced::widget::text::Wrapping;
use iced::widget::{
    button, column, container, mouse_area, pick_list, row, scrollable, text, text_editor,
    text_input, Column,
};
use iced::{Alignment, Background, Border, Color, Element, Fill, Font, Length, Padding, Theme};

use crate::review::{Issue, Language, ReviewResult, Severity};

use super::markers::{self, MarkerHighlighter};
use super::state::{Message, State};
use super::style::{
    btn_ghost, btn_primary, divider, editor_style, glass_container, score_badge, severity_color,
    text_input as style_text_input, COL_BG, COL_DANGER, COL_MUTED, COL_SUCCESS, COL_TEXT,
};

pub(super) fn view(state: &State) -> Element<'_, Message> {
    let header = row![
        text("Critiq")
            .size(24)
            .font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..Default::default()
            })
            .style(|_t| iced::widget::text::Style {
                color: Some(COL_TEXT),
            }),
        iced::widget::Space::new().width(Fill),
        button(text("⚙ Settings").size(14))
            .on_press(Message::OpenSettings)
            .padding(Padding::new(8.0))
            .style(btn_ghost),
    ]
    .align_y(Alignment::Center)
    .padding(Padding::new(20.0));

    let (status_text, status_color) = status_line(state);

    let status_bar = row![
        text(status_text)
            .size(12)
            .style(move |_t| iced::widget::text::Style {
                color: Some(status_color),
            }),
        text(" · ").size(12).style(|_t| iced::widget::text::Style {
            color: Some(COL_MUTED),
        }),
        text("Ctrl+Enter submits")
            .size(12)
            .style(|_t| iced::widget::text::Style {
                color: Some(COL_MUTED),
            }),
    ]
    .align_y(Alignment::Center)
    .padding(Padding::new(12.0));

    let main = row![editor_pane(state), results_sidebar(state)]
        .spacing(20)
        .height(Fill)
        .width(Fill)
        .padding(Padding::from([0.0, 20.0]));

    let root = column![header, main, status_bar]
        .width(Fill)
        .height(Fill)
        .spacing(0)
        .align_x(Alignment::Start);

    let base =
        container(root)
            .width(Fill)
            .height(Fill)
            .style(|_theme| iced::widget::container::Style {
                background: Some(Background::Color(COL_BG)),
                text_color: Some(COL_TEXT),
                ..Default::default()
            });

    if state.show_settings {
        settings_modal(base.into(), state)
    } else {
        base.into()
    }
}

fn status_line(state: &State) -> (String, Color) {
    if let Some(error) = &state.error {
        (error.clone(), COL_DANGER)
    } else if state.is_loading {
        ("Reviewing...".to_string(), COL_MUTED)
    } else if let Some(result) = &state.result {
        // Hovering an issue card surfaces its marker message
        if let Some(index) = state.hovered_issue {
            let marks = markers::build_markers(&result.issues, &state.reviewed_code);
            if let Some(marker) = marks.get(index) {
                return (marker.message.clone(), COL_TEXT);
            }
        }

        if result.issues.is_empty() {
            ("No issues found".to_string(), COL_SUCCESS)
        } else {
            (format!("{} issue(s)", result.issues.len()), COL_MUTED)
        }
    } else {
        ("Ready".to_string(), COL_MUTED)
    }
}

fn editor_pane(state: &State) -> Element<'_, Message> {
    let toolbar = row![
        text("Source")
            .size(14)
            .style(|_t| iced::widget::text::Style {
                color: Some(COL_MUTED),
            }),
        iced::widget::Space::new().width(Fill),
        pick_list(
            Language::ALL,
            Some(state.language),
            Message::LanguageSelected
        )
        .text_size(13)
        .padding(Padding::from([6.0, 12.0])),
        button(text(if state.is_loading { "Reviewing..." } else { "Review" }).size(13))
            .on_press(Message::SubmitPressed)
            .padding(Padding::from([6.0, 16.0]))
            .style(btn_primary),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let code = state.editor.text();

    // Markers stay anchored to the reviewed snapshot; once the text diverges
    // the editor falls back to plain syntax highlighting.
    let annotated = match &state.result {
        Some(result)
            if !state.is_loading && !result.issues.is_empty() && code == state.reviewed_code =>
        {
            Some(result)
        }
        _ => None,
    };

    let editor: Element<'_, Message> = if let Some(result) = annotated {
        let settings = markers::highlight_settings(&result.issues, &code, state.hovered_issue);

        text_editor(&state.editor)
            .placeholder("Paste code to review...")
            .on_action(Message::EditorAction)
            .highlight_with::<MarkerHighlighter>(settings, markers::to_format)
            .height(Fill)
            .padding(16)
            .size(15)
            .font(Font::MONOSPACE)
            .style(editor_style)
            .into()
    } else {
        text_editor(&state.editor)
            .placeholder("Paste code to review...")
            .on_action(Message::EditorAction)
            .highlight(
                state.language.syntax_token(),
                iced::highlighter::Theme::SolarizedDark,
            )
            .height(Fill)
            .padding(16)
            .size(15)
            .font(Font::MONOSPACE)
            .style(editor_style)
            .into()
    };

    column![toolbar, editor]
        .spacing(12)
        .width(Length::FillPortion(3))
        .height(Fill)
        .into()
}

fn results_sidebar(state: &State) -> Element<'_, Message> {
    let mut header_row = row![text("Review").size(18).style(|_t| {
        iced::widget::text::Style {
            color: Some(COL_TEXT),
        }
    })]
    .align_y(Alignment::Center)
    .spacing(10);

    if !state.is_loading {
        if let Some(score) = state.result.as_ref().and_then(|r| r.score) {
            header_row = header_row.push(iced::widget::Space::new().width(Fill));
            header_row = header_row.push(
                container(text(format!("{}/100", score)).size(14))
                    .padding(Padding::from([4.0, 12.0]))
                    .style(score_badge),
            );
        }
    }

    let header = column![
        header_row,
        container(iced::widget::Space::new().height(1.0))
            .width(Fill)
            .style(divider),
    ]
    .spacing(16);

    let body: Element<'_, Message> = if state.is_loading {
        container(
            text("Reviewing...")
                .size(14)
                .style(|_t| iced::widget::text::Style {
                    color: Some(COL_MUTED),
                }),
        )
        .center_x(Fill)
        .center_y(Fill)
        .height(Fill)
        .into()
    } else if let Some(result) = &state.result {
        populated(result, state)
    } else {
        container(
            text("Paste some code and press Review\nto see issues here.")
                .align_x(Alignment::Center)
                .size(14)
                .style(|_t| iced::widget::text::Style {
                    color: Some(COL_MUTED),
                }),
        )
        .center_x(Fill)
        .center_y(Fill)
        .height(Fill)
        .into()
    };

    container(column![header, body].spacing(16))
        .width(Length::FillPortion(2))
        .height(Fill)
        .padding(Padding::new(20.0))
        .style(glass_container)
        .into()
}

fn populated<'a>(result: &'a ReviewResult, state: &'a State) -> Element<'a, Message> {
    let mut content = Column::new().spacing(16);

    if let Some(summary) = &result.summary {
        content = content.push(
            container(
                text(summary)
                    .size(13)
                    .wrapping(Wrapping::WordOrGlyph)
                    .style(|_t| iced::widget::text::Style {
                        color: Some(COL_TEXT),
                    }),
            )
            .padding(Padding::new(12.0))
            .width(Fill)
            .style(|_theme: &Theme| iced::widget::container::Style {
                background: Some(Background::Color(Color {
                    a: 0.05,
                    ..Color::WHITE
                })),
                border: Border {
                    radius: 12.0.into(),
                    ..Default::default()
                },
                ..Default::default()
            }),
        );
    }

    if result.issues.is_empty() {
        content = content.push(
            container(
                text("No issues found.\nNice work!")
                    .align_x(Alignment::Center)
                    .size(14)
                    .style(|_t| iced::widget::text::Style {
                        color: Some(COL_SUCCESS),
                    }),
            )
            .center_x(Fill)
            .padding(Padding::new(16.0)),
        );
    } else {
        // Arrival order, never re-sorted
        content = result
            .issues
            .iter()
            .enumerate()
            .fold(content, |col, (index, issue)| {
                let hovered = state.hovered_issue == Some(index);

                let card = mouse_area(issue_card(issue, hovered))
                    .on_enter(Message::HoverIssue(index))
                    .on_exit(Message::ClearHoverIssue);

                col.push(card)
            });
    }

    scrollable(container(content).padding(Padding::new(4.0)))
        .height(Fill)
        .into()
}

fn issue_card(issue: &Issue, hovered: bool) -> Element<'_, Message> {
    let color = severity_color(issue.severity);

    let heading = row![
        text(severity_icon(issue.severity))
            .size(13)
            .style(move |_t| iced::widget::text::Style { color: Some(color) }),
        text(format!("Line {}", issue.line))
            .size(13)
            .style(|_t| iced::widget::text::Style {
                color: Some(COL_TEXT),
            }),
        text(issue.severity.label())
            .size(12)
            .style(move |_t| iced::widget::text::Style { color: Some(color) }),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let message = text(&issue.message)
        .size(13)
        .wrapping(Wrapping::WordOrGlyph)
        .style(|_t| iced::widget::text::Style {
            color: Some(COL_MUTED),
        });

    let mut card = column![heading, message].spacing(8);

    if let Some(suggestion) = &issue.suggestion {
        card = card.push(
            text(suggestion)
                .size(13)
                .wrapping(Wrapping::WordOrGlyph)
                .style(|_t| iced::widget::text::Style {
                    color: Some(COL_SUCCESS),
                }),
        );
    }

    container(card)
        .width(Fill)
        .padding(Padding::new(14.0))
        .style(move |_theme| {
            let alpha = if hovered { 0.1 } else { 0.04 };
            iced::widget::container::Style {
                background: Some(Background::Color(Color {
                    a: alpha,
                    ..Color::WHITE
                })),
                border: Border {
                    color: Color {
                        a: 0.1,
                        ..Color::WHITE
                    },
                    width: 1.0,
                    radius: 12.0.into(),
                },
                ..Default::default()
            }
        })
        .into()
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "●",
        Severity::Warning => "▲",
        Severity::Info => "ℹ",
        Severity::Unknown => "○",
    }
}

fn settings_modal<'a>(base: Element<'a, Message>, state: &'a State) -> Element<'a, Message> {
    use iced::widget::stack;

    let content = column![
        text("Settings")
            .size(22)
            .style(|_t| iced::widget::text::Style {
                color: Some(COL_TEXT),
            }),
        text("Backend URL")
            .size(14)
            .style(|_t| iced::widget::text::Style {
                color: Some(COL_TEXT),
            }),
        text_input("http://127.0.0.1:3000", &state.temp_backend_url)
            .on_input(Message::TempBackendUrlChanged)
            .style(style_text_input),
        iced::widget::Space::new().height(8.0),
        row![
            button(text("Cancel"))
                .on_press(Message::CloseSettings)
                .padding(Padding::from([8.0, 16.0]))
                .style(btn_ghost),
            iced::widget::Space::new().width(Fill),
            button(text("Save Settings"))
                .on_press(Message::SaveSettings)
                .padding(Padding::from([8.0, 16.0]))
                .style(btn_primary),
        ]
        .align_y(Alignment::Center)
        .spacing(12),
    ]
    .spacing(16);

    let overlay = container(
        container(content)
            .padding(Padding::new(24.0))
            .style(glass_container)
            .width(450)
            .height(Length::Shrink),
    )
    .width(Fill)
    .height(Fill)
    .center_x(Fill)
    .center_y(Fill)
    .style(|_theme| iced::widget::container::Style {
        background: Some(Background::Color(Color { a: 0.8, ..COL_BG })),
        ..Default::default()
    });

    stack![base, overlay].into()
}

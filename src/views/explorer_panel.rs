use crate::app::App;
use crate::explorer::{window, RowExtents, DEFAULT_OVERSCAN};
use crate::message::Message;
use crate::model::TagRow;
use crate::utils::truncate_value;
use crate::views::stats_panel;
use iced::widget::text::Wrapping;
use iced::widget::{
    button, column, container, row, scrollable, text, text_input, Column, Space,
};
use iced::{Alignment, Element, Length};

pub const TAG_ROW_HEIGHT: f32 = 28.0;

pub fn tag_table_id() -> scrollable::Id {
    scrollable::Id::new("tag-table")
}

pub fn explorer_panel(app: &App) -> Element<'_, Message> {
    let left = container(scrollable(record_list(app)))
        .padding(16)
        .width(Length::FillPortion(2));

    let right_content: Element<'_, Message> = if app.stats_open {
        stats_panel(app)
    } else {
        tag_table(app)
    };
    let right = container(right_content)
        .padding(16)
        .width(Length::FillPortion(5));

    row![left, right]
        .spacing(16)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn record_list(app: &App) -> Column<'_, Message> {
    let mut list = column![
        text("Records").size(20),
        button(text("Select Folder").size(14)).on_press(Message::PickTagRoot),
    ];

    if let Some(folder) = &app.settings.tag_root_folder {
        list = list.push(
            text(folder.display().to_string())
                .size(12)
                .wrapping(Wrapping::Word),
        );
    }

    if app.records_loading {
        return list.push(text("Loading records…").size(14)).spacing(6);
    }
    if app.records.is_empty() {
        return list.push(text("No records loaded").size(14)).spacing(6);
    }

    app.records
        .iter()
        .enumerate()
        .fold(list, |list, (index, record)| {
            let is_selected = app.selected_record == Some(index);
            let label = if is_selected {
                format!("▶ {}", record.file_name)
            } else {
                record.file_name.clone()
            };
            list.push(
                button(text(label).size(14).width(Length::Fill))
                    .on_press(Message::SelectRecord(index)),
            )
        })
        .spacing(6)
}

fn tag_table(app: &App) -> Element<'_, Message> {
    let filter_input = text_input("Filter by name, value or hex tag number", &app.filter)
        .on_input(Message::FilterChanged)
        .padding(8);

    let stats_ready = !app.pins().is_empty() && app.settings.tag_root_folder.is_some();
    let stats_button = button(text("Pinned Stats").size(14))
        .on_press_maybe(stats_ready.then_some(Message::OpenStats));

    let header = row![filter_input, stats_button]
        .spacing(12)
        .align_y(Alignment::Center);

    if app.rows.is_empty() {
        let hint = if app.selected_record.is_some() {
            "Loading tags…"
        } else {
            "Select a record to inspect its tags"
        };
        return column![header, text(hint).size(14)].spacing(12).into();
    }

    let heading = row![
        text("Pin").width(Length::Fixed(36.0)),
        text("Tag").width(Length::FillPortion(1)),
        text("VR").width(Length::Fixed(48.0)),
        text("Name").width(Length::FillPortion(2)),
        text("Value").width(Length::FillPortion(4)),
    ]
    .spacing(12);

    // Only the rows overlapping the viewport (plus overscan) are built;
    // spacers stand in for the rest of the list.
    let extents = RowExtents::uniform(app.view.len(), TAG_ROW_HEIGHT);
    let win = window(
        &extents,
        app.tag_scroll.offset,
        app.tag_scroll.viewport,
        DEFAULT_OVERSCAN,
    );

    let mut table = column![];
    if win.leading > 0.0 {
        table = table.push(Space::with_height(Length::Fixed(win.leading)));
    }
    for tag_row in &app.view[win.range.clone()] {
        table = table.push(view_row(tag_row, app.pins().contains(tag_row.id)));
    }
    if win.trailing > 0.0 {
        table = table.push(Space::with_height(Length::Fixed(win.trailing)));
    }

    let body = scrollable(table)
        .id(tag_table_id())
        .on_scroll(Message::TagTableScrolled)
        .height(Length::Fill);

    column![header, heading, body].spacing(8).into()
}

fn view_row(tag_row: &TagRow, pinned: bool) -> Element<'_, Message> {
    let pin_label = if pinned { "★" } else { "☆" };

    container(
        row![
            button(text(pin_label).size(14))
                .padding(0)
                .on_press(Message::TogglePin(tag_row.id)),
            text(tag_row.id.to_string())
                .size(14)
                .width(Length::FillPortion(1)),
            text(&tag_row.vr).size(14).width(Length::Fixed(48.0)),
            text(&tag_row.name).size(14).width(Length::FillPortion(2)),
            text(truncate_value(&tag_row.value))
                .size(14)
                .width(Length::FillPortion(4)),
        ]
        .spacing(12)
        .align_y(Alignment::Center),
    )
    .height(Length::Fixed(TAG_ROW_HEIGHT))
    .into()
}

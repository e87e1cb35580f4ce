use crate::app::App;
use crate::message::Message;
use crate::model::TagDetails;
use crate::utils::{format_percentage, format_ratio, truncate_value};
use iced::widget::text::Wrapping;
use iced::widget::{button, column, progress_bar, row, scrollable, text};
use iced::{Alignment, Element, Length};

pub fn stats_panel(app: &App) -> Element<'_, Message> {
    let header = row![
        text("Pinned Tag Statistics").size(20).width(Length::Fill),
        button(text("Back to tags").size(14)).on_press(Message::CloseStats),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    if app.stats_loading {
        let (fraction, label) = match app.progress.tag_scan() {
            Some(scan) => (
                scan.fraction(),
                format!("Scanning {}", format_ratio(scan.current, scan.total)),
            ),
            None => (0.0, "Scanning…".to_string()),
        };
        return column![
            header,
            row![
                progress_bar(0.0..=1.0, fraction).width(Length::FillPortion(3)),
                text(label).size(14).width(Length::FillPortion(1)),
            ]
            .spacing(12)
            .align_y(Alignment::Center),
        ]
        .spacing(12)
        .into();
    }

    if let Some(details) = &app.tag_details {
        return column![header, details_view(details)].spacing(12).into();
    }

    let Some(stats) = &app.stats else {
        return column![header, text("No statistics loaded").size(14)]
            .spacing(12)
            .into();
    };

    let mut list = column![].spacing(20);
    for stat in stats {
        let mut block = column![row![
            text(format!("{}  {}", stat.id, stat.name))
                .size(16)
                .width(Length::Fill),
            text(format!("{} records", stat.total)).size(12),
            button(text("Details").size(12)).on_press(Message::ShowTagDetails(stat.id)),
        ]
        .spacing(12)
        .align_y(Alignment::Center)]
        .spacing(6);

        if stat.shares.is_empty() {
            block = block.push(text("No values observed").size(12));
        }
        for share in &stat.shares {
            block = block.push(
                row![
                    text(truncate_value(&share.value))
                        .size(12)
                        .width(Length::FillPortion(3)),
                    progress_bar(0.0..=100.0, share.percentage as f32)
                        .height(Length::Fixed(12.0))
                        .width(Length::FillPortion(2)),
                    text(format!(
                        "{} ({})",
                        share.count,
                        format_percentage(share.percentage)
                    ))
                    .size(12)
                    .width(Length::FillPortion(1)),
                ]
                .spacing(12)
                .align_y(Alignment::Center),
            );
        }
        list = list.push(block);
    }

    column![header, scrollable(list).height(Length::Fill)]
        .spacing(12)
        .into()
}

fn details_view(details: &TagDetails) -> Element<'_, Message> {
    let mut list = column![row![
        text(format!("{}  {}", details.id, details.name))
            .size(16)
            .width(Length::Fill),
        button(text("Back to statistics").size(14)).on_press(Message::CloseTagDetails),
    ]
    .spacing(12)
    .align_y(Alignment::Center)]
    .spacing(12);

    for value in &details.values {
        let mut block = column![row![
            text(truncate_value(&value.value)).size(14).width(Length::Fill),
            text(format!("{} files", value.count)).size(12),
        ]
        .spacing(12)]
        .spacing(2);

        for file in &value.files {
            block = block.push(text(file).size(11).wrapping(Wrapping::Word));
        }
        list = list.push(block);
    }

    scrollable(list).height(Length::Fill).into()
}

use crate::app::App;
use crate::message::Message;
use crate::model::{LogEntry, ProgressEvent};
use crate::pipeline::{RunState, StageKind};
use crate::utils::format_ratio;
use iced::widget::text::Wrapping;
use iced::widget::{
    button, checkbox, column, progress_bar, row, scrollable, text, text_input, Column,
};
use iced::{Alignment, Element, Length};
use std::path::{Path, PathBuf};

pub fn pipeline_panel(app: &App) -> Element<'_, Message> {
    let form = &app.form;

    let folders = column![
        folder_row(
            "Input folder",
            &app.settings.input_folder,
            Message::PickInputFolder,
        ),
        folder_row(
            "Output folder",
            &app.settings.output_folder,
            Message::PickOutputFolder,
        ),
    ]
    .spacing(8);

    let stages = row![
        checkbox("Anonymize", form.anonymize_enabled).on_toggle(Message::SetAnonymizeEnabled),
        checkbox("Convert to PNG", form.convert_enabled).on_toggle(Message::SetConvertEnabled),
    ]
    .spacing(24);

    let mut options = column![].spacing(8);
    if form.anonymize_enabled {
        options = options.push(
            text_input(
                "Tags to anonymize, e.g. 0010,0010; 0010,0020",
                &form.tags_input,
            )
            .on_input(Message::TagsInputChanged)
            .padding(8),
        );
        options = options.push(
            text_input("Replacement value", &form.replacement)
                .on_input(Message::ReplacementChanged)
                .padding(8),
        );
    }
    if form.convert_enabled {
        options = options.push(
            row![
                checkbox("Skip Excel metadata", form.skip_excel)
                    .on_toggle(Message::SetSkipExcel),
                checkbox("Flatten output folders", form.flatten).on_toggle(Message::SetFlatten),
            ]
            .spacing(24),
        );
    }

    let running = app.run_state.is_running();
    let start_label = if running { "Running…" } else { "Start Run" };
    let start = button(text(start_label).size(14))
        .on_press_maybe((!running).then_some(Message::StartPipeline));

    let mut panel = column![folders, stages, options, start].spacing(16);

    if let Some(status) = status_line(app.run_state) {
        panel = panel.push(text(status).size(14));
    }

    if app.run_state != RunState::Idle {
        let mut stage_rows = column![].spacing(8);
        if form.anonymize_enabled
            || app.progress.stage_progress(StageKind::Anonymization).is_some()
        {
            stage_rows = stage_rows.push(stage_row(
                "Anonymization",
                app.progress.stage_progress(StageKind::Anonymization),
            ));
        }
        if form.convert_enabled
            || app.progress.stage_progress(StageKind::Conversion).is_some()
        {
            stage_rows = stage_rows.push(stage_row(
                "Conversion",
                app.progress.stage_progress(StageKind::Conversion),
            ));
        }
        panel = panel.push(stage_rows);
    }

    if let Some(run) = &app.run {
        if let Some(report) = &run.anonymization {
            panel = panel.push(report_block(
                "Anonymization report",
                report.total,
                report.successful,
                report.failed,
                report.skipped,
                &report.failed_files,
                &report.skipped_files,
                &report.output_folder,
            ));
        }
        if let Some(report) = &run.conversion {
            panel = panel.push(report_block(
                "Conversion report",
                report.total,
                report.successful,
                report.failed,
                report.skipped,
                &report.failed_files,
                &report.skipped_files,
                &report.output_folder,
            ));
        }
    }

    if !app.progress.log().is_empty() {
        let log = app
            .progress
            .log()
            .iter()
            .fold(column![].spacing(2), |log, entry| log.push(log_row(entry)));
        panel = panel.push(
            column![
                text(format!("Log ({} entries)", app.progress.log().len())).size(16),
                scrollable(log).height(Length::Fixed(220.0)),
            ]
            .spacing(6),
        );
    }

    scrollable(panel).height(Length::Fill).into()
}

fn folder_row<'a>(
    label: &'a str,
    current: &'a Option<PathBuf>,
    on_pick: Message,
) -> Element<'a, Message> {
    let shown = current
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "not selected".to_string());

    row![
        button(text(label).size(14)).on_press(on_pick),
        text(shown).size(12).wrapping(Wrapping::Word),
    ]
    .spacing(12)
    .align_y(Alignment::Center)
    .into()
}

fn status_line(state: RunState) -> Option<&'static str> {
    match state {
        RunState::Idle => None,
        RunState::Anonymizing => Some("Anonymization in progress"),
        RunState::Converting => Some("Conversion in progress"),
        RunState::Complete => Some("Run complete"),
        RunState::Failed => Some("Run failed"),
    }
}

fn stage_row<'a>(label: &'a str, progress: Option<&'a ProgressEvent>) -> Element<'a, Message> {
    match progress {
        Some(event) => row![
            text(label).size(14).width(Length::Fixed(110.0)),
            progress_bar(0.0..=1.0, event.fraction())
                .height(Length::Fixed(12.0))
                .width(Length::FillPortion(3)),
            text(format!(
                "{}  {} [{}]",
                format_ratio(event.current, event.total),
                event.file_name,
                event.status.label()
            ))
            .size(12)
            .width(Length::FillPortion(2)),
        ]
        .spacing(12)
        .align_y(Alignment::Center)
        .into(),
        None => row![
            text(label).size(14).width(Length::Fixed(110.0)),
            text("waiting").size(12),
        ]
        .spacing(12)
        .align_y(Alignment::Center)
        .into(),
    }
}

#[allow(clippy::too_many_arguments)]
fn report_block<'a>(
    title: &'a str,
    total: usize,
    successful: usize,
    failed: usize,
    skipped: usize,
    failed_files: &'a [String],
    skipped_files: &'a [String],
    output_folder: &'a Path,
) -> Column<'a, Message> {
    let mut block = column![
        text(title).size(16),
        text(format!(
            "Total {total} · Successful {successful} · Failed {failed} · Skipped {skipped}"
        ))
        .size(12),
        text(format!("Output: {}", output_folder.display())).size(12),
    ]
    .spacing(4);

    if !failed_files.is_empty() {
        block = block.push(
            text(format!("Failed: {}", failed_files.join(", ")))
                .size(12)
                .wrapping(Wrapping::Word),
        );
    }
    if !skipped_files.is_empty() {
        block = block.push(
            text(format!("Skipped: {}", skipped_files.join(", ")))
                .size(12)
                .wrapping(Wrapping::Word),
        );
    }

    block
}

fn log_row(entry: &LogEntry) -> Element<'_, Message> {
    let marker = if entry.success { "✔" } else { "✖" };

    row![
        text(marker).size(12).width(Length::Fixed(20.0)),
        text(&entry.file_name)
            .size(12)
            .width(Length::FillPortion(2)),
        text(&entry.status).size(12).width(Length::FillPortion(1)),
        text(&entry.message)
            .size(12)
            .width(Length::FillPortion(3))
            .wrapping(Wrapping::Word),
    ]
    .spacing(8)
    .into()
}

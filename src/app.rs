use crate::components::workbench_mode_toggle;
use crate::explorer::{derive_view, summarize, RankedTagStat};
use crate::gateway::{AnonymizeSpec, ConvertSpec, EngineGateway};
use crate::message::Message;
use crate::model::{
    parse_tag_list, FileDescriptor, PinSet, PipelineRun, TagDetails, TagRow, WorkbenchMode,
    DEFAULT_PINS,
};
use crate::pipeline::{run_pipeline, PipelineError, PipelineRequest, ProgressAggregator, RunState};
use crate::settings::{Settings, SettingsStore};
use crate::views::{explorer_panel, pipeline_panel, tag_table_id};
use iced::widget::scrollable::{self, AbsoluteOffset};
use iced::widget::text::Wrapping;
use iced::widget::{button, column, row, text};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::AsyncFileDialog;
use std::path::PathBuf;
use std::sync::Arc;

const APP_TITLE: &str = "Dicomforge";

pub fn run(gateway: Arc<dyn EngineGateway>) -> iced::Result {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .try_init();

    iced::application(APP_TITLE, App::update, App::view)
        .theme(App::theme)
        .run_with(move || App::boot(gateway.clone(), SettingsStore::default_location()))
}

#[derive(Debug, Clone, Copy)]
pub struct ScrollState {
    pub offset: f32,
    pub viewport: f32,
}

impl Default for ScrollState {
    fn default() -> Self {
        // Until the first scroll event reports real bounds, assume a
        // generous viewport so the initial window is not starved.
        Self {
            offset: 0.0,
            viewport: 600.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineForm {
    pub anonymize_enabled: bool,
    pub convert_enabled: bool,
    pub tags_input: String,
    pub replacement: String,
    pub skip_excel: bool,
    pub flatten: bool,
}

impl Default for PipelineForm {
    fn default() -> Self {
        let tags_input = DEFAULT_PINS
            .iter()
            .map(|id| format!("{:04x},{:04x}", id.group, id.element))
            .collect::<Vec<_>>()
            .join("; ");

        Self {
            anonymize_enabled: true,
            convert_enabled: true,
            tags_input,
            replacement: "ANONYMIZED".to_string(),
            skip_excel: false,
            flatten: false,
        }
    }
}

pub struct App {
    gateway: Arc<dyn EngineGateway>,
    store: SettingsStore,
    pub(crate) settings: Settings,
    pub(crate) mode: WorkbenchMode,

    // Tag explorer
    pub(crate) records: Vec<FileDescriptor>,
    pub(crate) records_loading: bool,
    pub(crate) selected_record: Option<usize>,
    pub(crate) rows: Vec<TagRow>,
    pub(crate) filter: String,
    pub(crate) view: Vec<TagRow>,
    pub(crate) tag_scroll: ScrollState,
    pub(crate) stats_open: bool,
    pub(crate) stats_loading: bool,
    pub(crate) stats: Option<Vec<RankedTagStat>>,
    pub(crate) tag_details: Option<TagDetails>,
    scan_events: Option<iced::task::Handle>,

    // Pipeline
    pub(crate) form: PipelineForm,
    pub(crate) run_state: RunState,
    pub(crate) progress: ProgressAggregator,
    pub(crate) run: Option<PipelineRun>,
    run_events: Option<iced::task::Handle>,

    pub(crate) last_error: Option<String>,
    pub(crate) notice: Option<String>,
}

impl App {
    fn boot(gateway: Arc<dyn EngineGateway>, store: SettingsStore) -> (Self, Task<Message>) {
        let settings = store.load();
        let mut app = Self {
            gateway,
            store,
            settings,
            mode: WorkbenchMode::default(),
            records: Vec::new(),
            records_loading: false,
            selected_record: None,
            rows: Vec::new(),
            filter: String::new(),
            view: Vec::new(),
            tag_scroll: ScrollState::default(),
            stats_open: false,
            stats_loading: false,
            stats: None,
            tag_details: None,
            scan_events: None,
            form: PipelineForm::default(),
            run_state: RunState::default(),
            progress: ProgressAggregator::default(),
            run: None,
            run_events: None,
            last_error: None,
            notice: None,
        };

        let task = match app.settings.tag_root_folder.clone() {
            Some(folder) => app.load_records(folder),
            None => Task::none(),
        };
        (app, task)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SetMode(mode) => {
                if self.mode != mode {
                    self.mode = mode;
                }
                Task::none()
            }
            Message::DismissError => {
                self.last_error = None;
                self.notice = None;
                Task::none()
            }

            Message::PickTagRoot => Task::perform(
                pick_folder(self.settings.tag_root_folder.clone()),
                Message::TagRootPicked,
            ),
            Message::TagRootPicked(Some(folder)) => {
                self.settings.tag_root_folder = Some(folder.clone());
                self.store.save(&self.settings);
                self.records.clear();
                self.selected_record = None;
                self.rows.clear();
                self.view.clear();
                self.notice = None;
                self.load_records(folder)
            }
            Message::TagRootPicked(None) => Task::none(),
            Message::RecordsLoaded(result) => {
                self.records_loading = false;
                match result {
                    Ok(records) => {
                        if records.is_empty() {
                            self.notice =
                                Some("The selected folder contains no DICOM records".to_string());
                        }
                        self.records = records;
                    }
                    Err(err) => self.last_error = Some(err.to_string()),
                }
                Task::none()
            }
            Message::SelectRecord(index) => {
                if index >= self.records.len() {
                    return Task::none();
                }
                self.selected_record = Some(index);
                self.rows.clear();
                self.view.clear();

                let file = self.records[index].file_path.clone();
                let gateway = self.gateway.clone();
                Task::perform(
                    async move { gateway.tags(&file).await },
                    move |result| Message::TagsLoaded(index, result),
                )
            }
            Message::TagsLoaded(index, result) => {
                // A slow response for a record the user has already left.
                if self.selected_record != Some(index) {
                    return Task::none();
                }
                match result {
                    Ok(rows) => {
                        self.rows = rows;
                        self.refresh_view();
                        self.tag_scroll.offset = 0.0;
                        scrollable::scroll_to(tag_table_id(), AbsoluteOffset { x: 0.0, y: 0.0 })
                    }
                    Err(err) => {
                        self.last_error = Some(err.to_string());
                        Task::none()
                    }
                }
            }
            Message::FilterChanged(filter) => {
                self.filter = filter;
                self.refresh_view();
                Task::none()
            }
            Message::TogglePin(id) => {
                self.settings.pinned_tags.toggle(id);
                self.store.save(&self.settings);
                self.refresh_view();
                Task::none()
            }
            Message::TagTableScrolled(viewport) => {
                let offset = viewport.absolute_offset();
                self.tag_scroll = ScrollState {
                    offset: offset.y,
                    viewport: viewport.bounds().height,
                };
                Task::none()
            }

            Message::OpenStats => {
                let Some(folder) = self.settings.tag_root_folder.clone() else {
                    self.notice = Some("Select a tag folder first".to_string());
                    return Task::none();
                };
                let ids = self.settings.pinned_tags.ids();
                if ids.is_empty() {
                    self.notice = Some("Pin at least one tag first".to_string());
                    return Task::none();
                }

                self.stats_open = true;
                self.stats_loading = true;
                self.stats = None;
                self.tag_details = None;

                let events = self.subscribe_scan_events();
                let gateway = self.gateway.clone();
                let fetch = Task::perform(
                    async move { gateway.pinned_tag_stats(&folder, &ids).await },
                    Message::StatsLoaded,
                );
                Task::batch([events, fetch])
            }
            Message::StatsLoaded(result) => {
                self.abort_scan_events();
                self.stats_loading = false;
                // The view may have been dismantled while the scan ran.
                if !self.stats_open {
                    return Task::none();
                }
                match result {
                    Ok(stats) => self.stats = Some(summarize(stats)),
                    Err(err) => {
                        self.stats_open = false;
                        self.last_error = Some(err.to_string());
                    }
                }
                Task::none()
            }
            Message::CloseStats => {
                // Histograms are not retained past the view's lifetime.
                self.abort_scan_events();
                self.stats_open = false;
                self.stats_loading = false;
                self.stats = None;
                self.tag_details = None;
                Task::none()
            }
            Message::ShowTagDetails(id) => {
                let Some(folder) = self.settings.tag_root_folder.clone() else {
                    return Task::none();
                };
                self.tag_details = None;
                self.stats_loading = true;

                let events = self.subscribe_scan_events();
                let gateway = self.gateway.clone();
                let fetch = Task::perform(
                    async move { gateway.tag_details(&folder, id).await },
                    Message::TagDetailsLoaded,
                );
                Task::batch([events, fetch])
            }
            Message::TagDetailsLoaded(result) => {
                self.abort_scan_events();
                self.stats_loading = false;
                match result {
                    Ok(details) => self.tag_details = Some(details),
                    Err(err) => self.last_error = Some(err.to_string()),
                }
                Task::none()
            }
            Message::CloseTagDetails => {
                self.tag_details = None;
                Task::none()
            }

            Message::PickInputFolder => Task::perform(
                pick_folder(self.settings.input_folder.clone()),
                Message::InputFolderPicked,
            ),
            Message::InputFolderPicked(Some(folder)) => {
                self.settings.input_folder = Some(folder);
                self.store.save(&self.settings);
                Task::none()
            }
            Message::InputFolderPicked(None) => Task::none(),
            Message::PickOutputFolder => Task::perform(
                pick_folder(self.settings.output_folder.clone()),
                Message::OutputFolderPicked,
            ),
            Message::OutputFolderPicked(Some(folder)) => {
                self.settings.output_folder = Some(folder);
                self.store.save(&self.settings);
                Task::none()
            }
            Message::OutputFolderPicked(None) => Task::none(),

            Message::SetAnonymizeEnabled(enabled) => {
                self.form.anonymize_enabled = enabled;
                Task::none()
            }
            Message::SetConvertEnabled(enabled) => {
                self.form.convert_enabled = enabled;
                Task::none()
            }
            Message::TagsInputChanged(input) => {
                self.form.tags_input = input;
                Task::none()
            }
            Message::ReplacementChanged(replacement) => {
                self.form.replacement = replacement;
                Task::none()
            }
            Message::SetSkipExcel(skip) => {
                self.form.skip_excel = skip;
                Task::none()
            }
            Message::SetFlatten(flatten) => {
                self.form.flatten = flatten;
                Task::none()
            }

            Message::StartPipeline => {
                let request = match self.build_request() {
                    Ok(request) => request,
                    Err(message) => {
                        self.last_error = Some(message);
                        return Task::none();
                    }
                };
                if let Err(err) = self.run_state.begin(&request) {
                    self.last_error = Some(err.to_string());
                    return Task::none();
                }

                self.progress.reset();
                self.run = None;
                self.last_error = None;

                let (events, handle) =
                    Task::run(self.gateway.events(), Message::Engine).abortable();
                self.run_events = Some(handle);

                let gateway = self.gateway.clone();
                let work = Task::perform(
                    run_pipeline(gateway, request),
                    Message::PipelineFinished,
                );
                Task::batch([events, work])
            }
            Message::PipelineFinished(result) => {
                if let Some(handle) = self.run_events.take() {
                    handle.abort();
                }
                match result {
                    Ok(run) => {
                        self.run_state.complete();
                        self.run = Some(run);
                    }
                    Err(err) => {
                        self.run_state.fail();
                        self.last_error = Some(err.to_string());
                    }
                }
                Task::none()
            }

            Message::Engine(event) => {
                if let Some(stage) = self.progress.apply(event) {
                    self.run_state.observe_stage(stage);
                }
                Task::none()
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let body: Element<'_, Message> = match self.mode {
            WorkbenchMode::Explorer => explorer_panel(self),
            WorkbenchMode::Pipeline => pipeline_panel(self),
        };

        let mut content = column![workbench_mode_toggle(self.mode), body]
            .spacing(16)
            .height(Length::Fill);

        if let Some(notice) = &self.notice {
            content = content.push(text(notice).size(14));
        }
        if let Some(error) = &self.last_error {
            content = content.push(
                row![
                    text(error)
                        .size(14)
                        .wrapping(Wrapping::Word)
                        .width(Length::Fill),
                    button(text("Dismiss").size(14)).on_press(Message::DismissError),
                ]
                .spacing(12)
                .align_y(Alignment::Center),
            );
        }

        content.padding(20).into()
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    pub(crate) fn pins(&self) -> &PinSet {
        &self.settings.pinned_tags
    }

    fn refresh_view(&mut self) {
        self.view = derive_view(&self.rows, &self.settings.pinned_tags, &self.filter);
    }

    fn load_records(&mut self, folder: PathBuf) -> Task<Message> {
        self.records_loading = true;
        let gateway = self.gateway.clone();
        Task::perform(
            async move { gateway.list_file_descriptors(&folder).await },
            Message::RecordsLoaded,
        )
    }

    fn subscribe_scan_events(&mut self) -> Task<Message> {
        self.abort_scan_events();
        let (task, handle) = Task::run(self.gateway.events(), Message::Engine).abortable();
        self.scan_events = Some(handle);
        task
    }

    fn abort_scan_events(&mut self) {
        if let Some(handle) = self.scan_events.take() {
            handle.abort();
        }
    }

    /// Assembles the pipeline request from the form, rejecting malformed tag
    /// input and missing folders before anything reaches the engine.
    fn build_request(&self) -> Result<PipelineRequest, String> {
        let form = &self.form;
        if !form.anonymize_enabled && !form.convert_enabled {
            return Err(PipelineError::NoStagesRequested.to_string());
        }

        let input = self
            .settings
            .input_folder
            .clone()
            .ok_or_else(|| "Select an input folder first".to_string())?;
        let output = self
            .settings
            .output_folder
            .clone()
            .ok_or_else(|| "Select an output folder first".to_string())?;

        let anonymize = if form.anonymize_enabled {
            let tags = parse_tag_list(&form.tags_input).map_err(|err| err.to_string())?;
            Some(AnonymizeSpec {
                input: input.clone(),
                output: output.clone(),
                tags,
                replacement: form.replacement.trim().to_string(),
            })
        } else {
            None
        };

        let convert = form.convert_enabled.then(|| ConvertSpec {
            input,
            output,
            skip_excel: form.skip_excel,
            flatten: form.flatten,
        });

        Ok(PipelineRequest { anonymize, convert })
    }
}

async fn pick_folder(start: Option<PathBuf>) -> Option<PathBuf> {
    let mut dialog = AsyncFileDialog::new();
    if let Some(start) = start {
        dialog = dialog.set_directory(start);
    }
    dialog
        .pick_folder()
        .await
        .map(|handle| handle.path().to_path_buf())
}

use dicomforge::gateway::OfflineGateway;

pub fn main() -> iced::Result {
    // The engine backend is wired in by the hosting build; without one the
    // workbench runs in offline mode and surfaces engine calls as errors.
    dicomforge::app::run(OfflineGateway::shared())
}

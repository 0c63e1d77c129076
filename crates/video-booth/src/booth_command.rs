/// Commands sent to the booth controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoothCommand {
    /// Leave the idle screen.
    Start,
    /// Submit the registration form.
    SubmitRegistration {
        /// Registrant name.
        name: String,
        /// Registrant email.
        email: String,
        /// Registrant phone.
        phone: String,
    },
    /// End the recording before the time limit.
    StopRecording,
    /// Discard the take and record again.
    Retake,
    /// Accept the preview and upload it.
    Upload,
    /// Back to the idle screen.
    Home,
    /// Log the current view.
    Status,
    /// Open the settings endpoint in a browser.
    OpenSettings,
    /// Stop the booth.
    Shutdown,
}

/// Errors surfaced to the user or the supervisor carry a short bracketed
/// code so log lines can be grepped without matching on message text.
pub trait CodedError: std::error::Error {
    fn code(&self) -> &str;
}

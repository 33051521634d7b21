use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Failed to send email: {0}")]
    Send(#[from] reqwest::Error),

    #[error("Mail relay rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Reminder scheduling requires a running tokio runtime")]
    NoRuntime,
}

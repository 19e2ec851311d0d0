pub mod http;
pub mod sendmail;

pub use http::HttpTransport;
pub use sendmail::SendmailMailer;

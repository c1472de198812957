pub mod composer;
pub mod log;
pub mod mailjet;

pub use composer::ComposedEmail;
pub use composer::EmailComposer;
pub use log::LogEmailSender;
pub use mailjet::MailjetEmailSender;

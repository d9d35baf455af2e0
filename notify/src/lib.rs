pub mod alert;
pub mod channel;
pub mod dispatcher;
pub mod errors;
pub mod format;
pub mod telegram;

pub use alert::{Alert, Direction, MaintenanceAlert, MoveAlert, MoveKind, Severity};
pub use channel::{MAX_MESSAGE_LEN, NotificationChannel, split_message};
pub use dispatcher::{AlertDispatcher, DispatchReport};
pub use errors::NotifyError;
pub use telegram::TelegramChannel;

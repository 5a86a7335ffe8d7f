pub mod email;
pub mod person;
pub mod phone;
pub mod remote_contact;

pub use email::email_key;
pub use person::Person;
pub use phone::{format_national, normalize_phone};
pub use remote_contact::RemoteContact;

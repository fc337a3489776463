mod email_job;
mod email_template;
mod template_data;

pub use email_job::*;
pub use email_template::*;
pub use template_data::*;

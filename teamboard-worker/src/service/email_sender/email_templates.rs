use super::Error;
use email_jobs::EmailTemplate;
use handlebars::Handlebars;
use std::{path::Path, str::FromStr};

///
/// Handlebars templates of every [EmailTemplate], rendered in strict mode
///
pub struct EmailTemplates {
    handlebars: Handlebars<'static>,
}

impl EmailTemplates {
    ///
    /// Loads `<directory>/<template name>` for every template
    ///
    pub fn load(directory: &Path) -> Result<Self, Error> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);

        for template in EmailTemplate::ALL {
            let name = template.as_ref();
            handlebars.register_template_file(name, directory.join(name))?;
            tracing::debug!(template = name, "registered template");
        }

        Ok(Self { handlebars })
    }

    pub fn render(&self, template_name: &str, data: &serde_json::Value) -> Result<String, Error> {
        let template = EmailTemplate::from_str(template_name)
            .map_err(|_| Error::UnknownTemplate(template_name.to_string()))?;

        Ok(self.handlebars.render(template.as_ref(), data)?)
    }
}

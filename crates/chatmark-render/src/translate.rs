//! Label translation for section headers

/// Header shown while a tool call runs
pub const EXECUTING: &str = "Executing **{{NAME}}**...";

/// Header shown once a tool call has finished
pub const VIEW_RESULT: &str = "View Result from **{{NAME}}**";

/// Looks up a label by key and fills in `{{PARAM}}` placeholders
pub trait Translator {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String;
}

impl<F> Translator for F
where
    F: Fn(&str, &[(&str, &str)]) -> String,
{
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        self(key, params)
    }
}

/// Uses the key itself as the label
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTranslator;

impl Translator for DefaultTranslator {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        interpolate(key, params)
    }
}

/// Replace each `{{NAME}}` in `template` with its value from `params`
///
/// Unknown placeholders are left as written.
pub fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    params
        .iter()
        .fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{{{name}}}}}"), value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_labels() {
        let translator = DefaultTranslator;
        assert_eq!(
            translator.translate(EXECUTING, &[("NAME", "get_weather")]),
            "Executing **get_weather**..."
        );
        assert_eq!(
            translator.translate(VIEW_RESULT, &[("NAME", "search")]),
            "View Result from **search**"
        );
    }

    #[test]
    fn test_unknown_placeholder_kept() {
        assert_eq!(interpolate("{{A}} and {{B}}", &[("A", "1")]), "1 and {{B}}");
    }

    #[test]
    fn test_closure_translator() {
        let german = |key: &str, params: &[(&str, &str)]| {
            let template = match key {
                EXECUTING => "Führe **{{NAME}}** aus...",
                other => other,
            };
            interpolate(template, params)
        };
        assert_eq!(
            german.translate(EXECUTING, &[("NAME", "bash")]),
            "Führe **bash** aus..."
        );
    }
}

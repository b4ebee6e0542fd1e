use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"));

/// Replace every `{key}` with its value from `data`. Unknown keys render as an
/// empty string and are reported with a warning. Values are inserted verbatim.
pub fn render(template: &str, data: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match data.get(&caps[1]) {
            Some(value) => value.clone(),
            None => {
                log::warn!("No value for placeholder {{{}}} in template", &caps[1]);
                String::new()
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn data(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn replaces_every_known_placeholder() {
        let rendered = render(
            "Dear {employeeName}, your request {requestType} was rejected by {approverName}.",
            &data(&[
                ("employeeName", "Carol"),
                ("requestType", "LEAVE"),
                ("approverName", "Manager X"),
            ]),
        );

        assert_eq!(
            rendered,
            "Dear Carol, your request LEAVE was rejected by Manager X."
        );
    }

    #[test]
    fn missing_keys_become_empty() {
        let rendered = render("Hi {name}, see {missing}!", &data(&[("name", "Dan")]));
        assert_eq!(rendered, "Hi Dan, see !");
    }

    #[test]
    fn repeated_placeholders_and_plain_braces() {
        let rendered = render("{a}-{a} { a } {}", &data(&[("a", "x")]));
        assert_eq!(rendered, "x-x { a } {}");
    }

    #[test]
    fn values_are_not_re_expanded() {
        let rendered = render("{a}", &data(&[("a", "{b}"), ("b", "nope")]));
        assert_eq!(rendered, "{b}");
    }
}

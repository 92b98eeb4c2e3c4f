/// Expand `${NAME}` references in raw config text from the process environment.
///
/// References to unset variables are kept verbatim so the parser reports them.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated reference: copy the remainder untouched.
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        match lookup(name).filter(|_| !name.is_empty()) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_var() {
        let lookup = |name: &str| match name {
            "SALESFORCE_TEST_VAR" => Some("hello".to_string()),
            _ => None,
        };
        assert_eq!(
            substitute_env_with("client_id = \"${SALESFORCE_TEST_VAR}\"", lookup),
            "client_id = \"hello\""
        );
    }

    #[test]
    fn leaves_unknown_var() {
        let lookup = |_: &str| None;
        assert_eq!(
            substitute_env_with("${SERVICEGENIUS_UNSET_XYZ}", lookup),
            "${SERVICEGENIUS_UNSET_XYZ}"
        );
    }

    #[test]
    fn unterminated_reference_is_literal() {
        let lookup = |_: &str| Some("x".to_string());
        assert_eq!(
            substitute_env_with("login_url = \"${LOGIN", lookup),
            "login_url = \"${LOGIN"
        );
    }

    #[test]
    fn empty_name_is_literal() {
        let lookup = |_: &str| Some("x".to_string());
        assert_eq!(substitute_env_with("a${}b", lookup), "a${}b");
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(substitute_env("plain text"), "plain text");
    }
}

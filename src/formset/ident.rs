// Identifier scheme shared with server-side form binding. The `{index}` token is the only part
// that ever changes; everything else is copied verbatim.

pub fn field_name(namespace: &str, index: usize, role: &str) -> String {
    format!("{namespace}-{index}-{role}")
}

pub fn field_id(id_prefix: &str, namespace: &str, index: usize, role: &str) -> String {
    format!("{id_prefix}{}", field_name(namespace, index, role))
}

pub fn delete_trigger_id(namespace: &str, position: usize) -> String {
    format!("{namespace}-delete-{position}")
}

pub fn container_id(namespace: &str, position: usize) -> String {
    format!("{namespace}-block-{position}")
}

pub fn bound_container_id(namespace: &str, index: usize) -> String {
    format!("{namespace}-bound-{index}")
}

pub fn management_name(namespace: &str, key: &str) -> String {
    format!("{namespace}-{key}")
}

/// Pattern matching a delete trigger of `namespace`; group 1 is the position.
pub fn trigger_pattern(namespace: &str) -> String {
    format!(r"^{}-delete-(\d+)$", regex::escape(namespace))
}

/// Swap the `{namespace}-{from}-` token of an attribute for `{namespace}-{to}-`.
///
/// Only the first occurrence is touched, so a namespace that itself contains digits is safe.
/// Attributes without the token come back unchanged.
pub fn reindex_attr(attr: &str, namespace: &str, from: usize, to: usize) -> String {
    let token = format!("{namespace}-{from}-");
    attr.replacen(&token, &format!("{namespace}-{to}-"), 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn reindex_touches_only_the_namespaced_token() {
        assert_eq!(
            reindex_attr("id_education_set-2-start_date", "education_set", 2, 7),
            "id_education_set-7-start_date"
        );
        // a bare "2" elsewhere must survive
        assert_eq!(
            reindex_attr("set2-2-field2", "set2", 2, 5),
            "set2-5-field2"
        );
        assert_eq!(reindex_attr("unrelated", "set2", 2, 5), "unrelated");
    }

    #[test]
    fn trigger_pattern_escapes_namespace() {
        let re = Regex::new(&trigger_pattern("a.b")).unwrap();
        assert!(re.is_match("a.b-delete-3"));
        assert!(!re.is_match("axb-delete-3"));
        assert!(!re.is_match("a.b-delete-"));
        assert_eq!(&re.captures("a.b-delete-12").unwrap()[1], "12");
    }
}

/// Turn free text into a `to_tsquery` expression matching any of its terms.
///
/// Only alphanumeric runs survive, so the result never carries tsquery
/// operators supplied by the client. Returns `None` when nothing searchable
/// remains.
pub fn text_query(raw: &str) -> Option<String> {
    let terms: Vec<String> = raw
        .split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(|term| term.to_lowercase())
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" | "))
    }
}

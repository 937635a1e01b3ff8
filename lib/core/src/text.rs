/// Title-case a display name: the first letter of every alphabetic run is
/// uppercased and the rest lowercased. Non-letters (spaces, digits,
/// punctuation) start a new run, so "st. xavier's" becomes "St. Xavier'S".
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

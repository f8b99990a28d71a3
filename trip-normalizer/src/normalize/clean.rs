//! Label text cleaning.
//!
//! Feed headsigns read like "Mainline to City Hall via Memorial". Riders are
//! shown only the destination part, with common street words abbreviated.
//! All cleaning functions are idempotent.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref KEEP_TO: Regex = Regex::new(r"(?i)^.*\bto\s+(.+?)(?:\s+via\s.*)?$").unwrap();
    static ref VIA_TAIL: Regex = Regex::new(r"(?i)\s+via\s.*$").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref STREET_TYPES: Vec<(Regex, &'static str)> = [
        ("avenue", "Ave"),
        ("boulevard", "Blvd"),
        ("court", "Ct"),
        ("crescent", "Cres"),
        ("drive", "Dr"),
        ("gardens", "Gdns"),
        ("highway", "Hwy"),
        ("park", "Pk"),
        ("place", "Pl"),
        ("road", "Rd"),
        ("street", "St"),
        ("terrace", "Terr"),
    ]
    .into_iter()
    .map(|(word, abbr)| (word_regex(word), abbr))
    .collect();
    static ref ORDINALS: Vec<(Regex, &'static str)> = [
        ("first", "1st"),
        ("second", "2nd"),
        ("third", "3rd"),
        ("fourth", "4th"),
        ("fifth", "5th"),
        ("sixth", "6th"),
        ("seventh", "7th"),
        ("eighth", "8th"),
        ("ninth", "9th"),
        ("tenth", "10th"),
    ]
    .into_iter()
    .map(|(word, num)| (word_regex(word), num))
    .collect();
}

fn word_regex(word: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{word}\b")).unwrap()
}

/// Clean a raw trip headsign into the label shown to riders.
pub fn clean_headsign(headsign: &str) -> String {
    let text = remove_points(headsign);
    let text = collapse_whitespace(&text);
    let text = keep_to_and_remove_via(&text);
    let text = if is_uppercase_only(&text) {
        text.to_lowercase()
    } else {
        text
    };
    let text = clean_street_types(&text);
    let text = clean_numbers(&text);
    clean_label(&text)
}

/// Clean a stop name; destination extraction does not apply to stops.
pub fn clean_stop_name(name: &str) -> String {
    let text = clean_street_types(name);
    let text = clean_numbers(&text);
    clean_label(&text)
}

/// Clean a feed route long name.
pub fn clean_route_long_name(name: &str) -> String {
    clean_label(&name.to_lowercase())
}

/// Keep the text after the last "to", dropping any "via ..." tail.
pub fn keep_to_and_remove_via(text: &str) -> String {
    let kept = match KEEP_TO.captures(text) {
        Some(caps) => caps[1].to_string(),
        None => text.to_string(),
    };
    VIA_TAIL.replace(&kept, "").into_owned()
}

pub fn clean_street_types(text: &str) -> String {
    replace_words(text, &STREET_TYPES)
}

pub fn clean_numbers(text: &str) -> String {
    replace_words(text, &ORDINALS)
}

pub fn remove_points(text: &str) -> String {
    text.replace('.', "")
}

/// Collapse whitespace, trim, and capitalize the first letter of each word.
pub fn clean_label(text: &str) -> String {
    capitalize_words(&collapse_whitespace(text))
}

fn replace_words(text: &str, table: &[(Regex, &'static str)]) -> String {
    table
        .iter()
        .fold(text.to_string(), |acc, (re, replacement)| {
            re.replace_all(&acc, *replacement).into_owned()
        })
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// True if the text has letters and none of them are lower-case.
fn is_uppercase_only(text: &str) -> bool {
    let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(|c| !c.is_lowercase())
}

fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = matches!(c, ' ' | '-' | '/' | '(');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_destination() {
        assert_eq!(clean_headsign("Mainline to City Hall"), "City Hall");
        assert_eq!(clean_headsign("Crosstown to Westfort"), "Westfort");
        assert_eq!(clean_headsign("3M Memorial to Jumbo Gardens"), "Jumbo Gdns");
        assert_eq!(clean_headsign("3M Memorial to County Park"), "County Pk");
    }

    #[test]
    fn drops_via_tail() {
        assert_eq!(
            clean_headsign("Mainline to City Hall via Memorial"),
            "City Hall"
        );
        assert_eq!(clean_headsign("Intercity via Memorial"), "Intercity");
    }

    #[test]
    fn last_to_wins() {
        assert_eq!(clean_headsign("Route to Hall to Waterfront"), "Waterfront");
    }

    #[test]
    fn to_inside_words_is_ignored() {
        assert_eq!(clean_headsign("Toronto Street"), "Toronto St");
        assert_eq!(clean_headsign("Victoria to Toronto St"), "Toronto St");
    }

    #[test]
    fn removes_points() {
        assert_eq!(clean_headsign("Jumbo to Sherwood Dr."), "Sherwood Dr");
        assert_eq!(clean_headsign("Hudson to Shuniah St."), "Shuniah St");
    }

    #[test]
    fn lowercases_shouting() {
        assert_eq!(clean_headsign("MAINLINE TO CURRENT RIVER"), "Current River");
        assert_eq!(clean_headsign("MEMORIAL PARK"), "Memorial Pk");
    }

    #[test]
    fn ordinals() {
        assert_eq!(clean_headsign("Arthur to Fifth Avenue"), "5th Ave");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean_headsign("  Mainline   to  City   Hall "), "City Hall");
    }

    #[test]
    fn empty_headsign() {
        assert_eq!(clean_headsign(""), "");
    }

    #[test]
    fn stop_names_keep_to() {
        assert_eq!(clean_stop_name("Road to Nowhere"), "Rd To Nowhere");
        assert_eq!(clean_stop_name("25th Side Road & Rosslyn"), "25th Side Rd & Rosslyn");
    }

    #[test]
    fn route_long_names() {
        assert_eq!(clean_route_long_name("MAINLINE"), "Mainline");
        assert_eq!(clean_route_long_name("john-jumbo"), "John-Jumbo");
        assert_eq!(clean_route_long_name("east  end"), "East End");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn words() -> impl Strategy<Value = String> {
        proptest::collection::vec(
            proptest::sample::select(vec![
                "to", "TO", "via", "Via", "Street", "PARK", "first", "Mainline", "City", "Hall",
                "St.", "a", "B", "Jumbo", "Gardens", "-", "x.y", "  ",
            ]),
            0..8,
        )
        .prop_map(|w| w.join(" "))
    }

    proptest! {
        /// Cleaning an already clean headsign changes nothing
        #[test]
        fn headsign_cleaning_idempotent(s in words()) {
            let once = clean_headsign(&s);
            prop_assert_eq!(clean_headsign(&once), once.clone());
        }

        #[test]
        fn label_cleaning_idempotent(s in "[a-zA-Z \\-]{0,20}") {
            let once = clean_label(&s);
            prop_assert_eq!(clean_label(&once), once.clone());
        }
    }
}

use scraper::{ElementRef, Selector};

/// Collapse runs of whitespace, including hard line wraps, to single spaces.
pub fn clean_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn inner_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

pub fn first_text(element: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(inner_text)
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_collapses_wraps() {
        assert_eq!(
            clean_text("  A drifter\n   wanders out\tof the desert. "),
            "A drifter wanders out of the desert."
        );
        assert_eq!(clean_text(" \n "), "");
    }
}

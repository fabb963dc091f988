//! Turning a result card's rendered text into a typed record.

use serde::{Deserialize, Serialize};

/// One visible profile summary scraped off a results page.
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub name: String,
    /// Role or headline, best effort.
    pub about: Option<String>,
    pub location: Option<String>,
    pub profile_url: Option<String>,
}

/// Derives a record from a card's inner text and its collected link hrefs.
///
/// Cards render as stacked lines: name first, location last, role above
/// the location. Cards with fewer than three non-empty lines fall back to
/// the first whitespace token as the name; text with no token at all
/// yields no record.
pub fn parse_container(text: &str, links: &[String]) -> Option<ProfileRecord> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let (name, about, location) = if lines.len() >= 3 {
        (
            lines[0].to_string(),
            Some(lines[lines.len() - 2].to_string()),
            Some(lines[lines.len() - 1].to_string()),
        )
    } else {
        let token = text.split_whitespace().next()?;
        (token.to_string(), None, None)
    };

    Some(ProfileRecord {
        name,
        about,
        location,
        profile_url: links.first().cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacked_card_maps_first_and_last_lines() {
        let text = "Priya Sharma\nView Priya Sharma's profile\nSoftware Engineer at Initech\nBengaluru";
        let links = vec!["https://www.linkedin.com/in/priya".to_string()];
        let record = parse_container(text, &links).unwrap();
        assert_eq!(record.name, "Priya Sharma");
        assert_eq!(record.about.as_deref(), Some("Software Engineer at Initech"));
        assert_eq!(record.location.as_deref(), Some("Bengaluru"));
        assert_eq!(
            record.profile_url.as_deref(),
            Some("https://www.linkedin.com/in/priya")
        );
    }

    #[test]
    fn exactly_three_lines_still_split() {
        let record = parse_container("Ada\nStaff Engineer\nLondon", &[]).unwrap();
        assert_eq!(record.name, "Ada");
        assert_eq!(record.about.as_deref(), Some("Staff Engineer"));
        assert_eq!(record.location.as_deref(), Some("London"));
    }

    #[test]
    fn blank_lines_are_dropped_before_counting() {
        let record = parse_container("  Ada  \n\n   \nStaff Engineer\n\nLondon\n", &[]).unwrap();
        assert_eq!(record.name, "Ada");
        assert_eq!(record.location.as_deref(), Some("London"));
    }

    #[test]
    fn sparse_card_falls_back_to_first_token() {
        let record = parse_container("Jane", &[]).unwrap();
        assert_eq!(record.name, "Jane");
        assert_eq!(record.about, None);
        assert_eq!(record.location, None);
        assert_eq!(record.profile_url, None);
    }

    #[test]
    fn two_lines_use_the_raw_first_token() {
        let record = parse_container("Jane Doe\nVerified", &[]).unwrap();
        assert_eq!(record.name, "Jane");
        assert_eq!(record.about, None);
    }

    #[test]
    fn whitespace_only_text_yields_nothing() {
        assert_eq!(parse_container("", &[]), None);
        assert_eq!(parse_container("   \n  \n", &[]), None);
    }

    #[test]
    fn first_link_becomes_the_profile_url() {
        let links = vec![
            "https://www.linkedin.com/in/ada".to_string(),
            "https://www.linkedin.com/company/initech".to_string(),
        ];
        let record = parse_container("Ada\nStaff Engineer\nLondon", &links).unwrap();
        assert_eq!(
            record.profile_url.as_deref(),
            Some("https://www.linkedin.com/in/ada")
        );
    }
}

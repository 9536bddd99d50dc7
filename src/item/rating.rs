/// Highest rating the catalog uses
pub const MAX_RATING: u8 = 5;

const RATING_WORDS: [(&str, u8); 5] = [
    ("One", 1),
    ("Two", 2),
    ("Three", 3),
    ("Four", 4),
    ("Five", 5),
];

/// Maps a rating class token to a number of stars
///
/// The token is split on whitespace and the first word found in the
/// vocabulary `One`..`Five` wins. Anything else, including an absent token,
/// is a silent 0.
///
/// # Examples
///
/// ```
/// use shelf_crawler::item::normalize_rating;
///
/// assert_eq!(normalize_rating(Some("star-rating Three")), 3);
/// assert_eq!(normalize_rating(Some("star-rating")), 0);
/// assert_eq!(normalize_rating(None), 0);
/// ```
pub fn normalize_rating(token: Option<&str>) -> u8 {
    let Some(token) = token else {
        return 0;
    };

    token
        .split_whitespace()
        .find_map(|word| {
            RATING_WORDS
                .iter()
                .find(|(name, _)| *name == word)
                .map(|(_, stars)| *stars)
        })
        .unwrap_or(0)
}

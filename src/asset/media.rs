//! Media query grouping.
//!
//! Merges every top-level `@media` block with an identical query into one
//! block and moves the groups after all other rules, mobile-first:
//!
//! 1. `min-width` queries, ascending width
//! 2. `max-width` queries, descending width
//! 3. everything else, in first-seen order

use std::sync::OnceLock;

use lightningcss::media_query::MediaList;
use lightningcss::rules::CssRule;
use lightningcss::rules::media::MediaRule;
use lightningcss::stylesheet::{PrinterOptions, StyleSheet};
use lightningcss::traits::ToCss;
use regex::Regex;
use rustc_hash::FxHashMap;

/// Sort key of a media query.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Order {
    MinWidth(f64),
    MaxWidth(f64),
    Other,
}

impl Order {
    fn of(query: &str) -> Self {
        static MIN: OnceLock<Regex> = OnceLock::new();
        static MAX: OnceLock<Regex> = OnceLock::new();
        let min = MIN.get_or_init(|| {
            Regex::new(r"min-width\s*:\s*([0-9.]+)px|width\s*>=?\s*([0-9.]+)px").unwrap()
        });
        let max = MAX.get_or_init(|| {
            Regex::new(r"max-width\s*:\s*([0-9.]+)px|width\s*<=?\s*([0-9.]+)px").unwrap()
        });

        let px = |re: &Regex| {
            re.captures(query).and_then(|c| {
                c.get(1)
                    .or_else(|| c.get(2))
                    .and_then(|m| m.as_str().parse::<f64>().ok())
            })
        };

        if let Some(w) = px(min) {
            Self::MinWidth(w)
        } else if let Some(w) = px(max) {
            Self::MaxWidth(w)
        } else {
            Self::Other
        }
    }

    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self, other) {
            (Self::MinWidth(a), Self::MinWidth(b)) => a.total_cmp(b),
            (Self::MaxWidth(a), Self::MaxWidth(b)) => b.total_cmp(a),
            (Self::Other, Self::Other) => Ordering::Equal,
            _ => self.rank().cmp(&other.rank()),
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::MinWidth(_) => 0,
            Self::MaxWidth(_) => 1,
            Self::Other => 2,
        }
    }
}

fn query_key(query: &MediaList<'_>) -> String {
    query
        .to_css_string(PrinterOptions::default())
        .unwrap_or_default()
}

/// Group identical media queries in place. Returns the number of groups.
pub fn group_media_queries(stylesheet: &mut StyleSheet<'_>) -> usize {
    let rules = std::mem::take(&mut stylesheet.rules.0);

    let mut rest = Vec::with_capacity(rules.len());
    let mut groups: Vec<(String, MediaRule<'_>)> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();

    for rule in rules {
        match rule {
            CssRule::Media(media) => {
                let key = query_key(&media.query);
                match index.get(&key) {
                    Some(&i) => groups[i].1.rules.0.extend(media.rules.0),
                    None => {
                        index.insert(key.clone(), groups.len());
                        groups.push((key, media));
                    }
                }
            }
            other => rest.push(other),
        }
    }

    // Stable: equal keys keep first-seen order
    groups.sort_by(|(a, _), (b, _)| Order::of(a).cmp(&Order::of(b)));

    let count = groups.len();
    rest.extend(groups.into_iter().map(|(_, media)| CssRule::Media(media)));
    stylesheet.rules.0 = rest;
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightningcss::stylesheet::ParserOptions;

    fn grouped(css: &str) -> String {
        let mut sheet = StyleSheet::parse(css, ParserOptions::default()).unwrap();
        group_media_queries(&mut sheet);
        sheet
            .to_css(PrinterOptions {
                minify: true,
                ..PrinterOptions::default()
            })
            .unwrap()
            .code
    }

    #[test]
    fn test_identical_queries_merged() {
        let css = "@media (min-width: 768px) { .a { color: red } }\n\
                   .b { color: blue }\n\
                   @media (min-width: 768px) { .c { color: green } }";
        let out = grouped(css);
        assert_eq!(out.matches("@media").count(), 1);
        assert!(out.find(".b").unwrap() < out.find("@media").unwrap());
        assert!(out.find(".a").unwrap() < out.find(".c").unwrap());
    }

    #[test]
    fn test_mobile_first_order() {
        let css = "@media print { .printable { color: red } }\n\
                   @media (max-width: 600px) { .small { color: red } }\n\
                   @media (min-width: 1200px) { .wide { color: red } }\n\
                   @media (max-width: 900px) { .medium { color: red } }\n\
                   @media (min-width: 480px) { .tablet { color: red } }";
        let out = grouped(css);
        let pos = |s: &str| out.find(s).unwrap();
        assert!(pos(".tablet") < pos(".wide"));
        assert!(pos(".wide") < pos(".medium"));
        assert!(pos(".medium") < pos(".small"));
        assert!(pos(".small") < pos(".printable"));
    }

    #[test]
    fn test_order_classification() {
        assert_eq!(Order::of("(min-width: 768px)"), Order::MinWidth(768.0));
        assert_eq!(Order::of("(width >= 768px)"), Order::MinWidth(768.0));
        assert_eq!(Order::of("(max-width: 600px)"), Order::MaxWidth(600.0));
        assert_eq!(Order::of("(width <= 600px)"), Order::MaxWidth(600.0));
        assert_eq!(Order::of("print"), Order::Other);
    }

    #[test]
    fn test_no_media_untouched() {
        let mut sheet = StyleSheet::parse(".a{color:red}", ParserOptions::default()).unwrap();
        assert_eq!(group_media_queries(&mut sheet), 0);
        assert_eq!(sheet.rules.0.len(), 1);
    }
}

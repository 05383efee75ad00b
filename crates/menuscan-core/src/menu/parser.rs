//! Price line parser.
//!
//! Scans OCR text for "name, whitespace, digits" runs. Matching is
//! leftmost-first and non-overlapping:
//!
//! - a name starts at a word character and extends lazily, never across a
//!   newline;
//! - it ends before the first whitespace run that is directly followed by a
//!   digit (that run may span lines);
//! - the price is the digit run after it.
//!
//! With decimal prices enabled a `.` or `,` followed by digits extends the
//! price and the separator is normalized to `.`.

use tracing::debug;

use crate::models::config::ParserConfig;
use crate::models::menu_item::ParsedItem;

/// Menu line parser.
#[derive(Debug, Clone)]
pub struct MenuLineParser {
    decimal_prices: bool,
}

impl MenuLineParser {
    /// Create a parser with decimal prices enabled.
    pub fn new() -> Self {
        Self {
            decimal_prices: true,
        }
    }

    /// Create a parser from configuration.
    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new().with_decimal_prices(config.decimal_prices)
    }

    /// Enable or disable decimal price support.
    pub fn with_decimal_prices(mut self, enabled: bool) -> Self {
        self.decimal_prices = enabled;
        self
    }

    /// Extract every (name, price) pair, in order of appearance.
    pub fn parse(&self, text: &str) -> Vec<ParsedItem> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let byte_at = |i: usize| chars.get(i).map_or(text.len(), |&(b, _)| b);

        let mut items = Vec::new();
        let mut pos = 0;

        while pos < chars.len() {
            if !is_word(chars[pos].1) {
                pos += 1;
                continue;
            }

            let start = pos;
            let word_end = skip_while(&chars, start, is_word);

            match self.find_price(&chars, word_end) {
                Some(m) => {
                    let name = &text[byte_at(start)..byte_at(m.name_end)];
                    let mut price = text[byte_at(m.price_start)..byte_at(m.price_end)].to_string();
                    if let Some(sep) = m.separator {
                        price = price.replacen(sep, ".", 1);
                    }
                    items.push(ParsedItem::new(name, price));
                    pos = m.price_end;
                }
                None => pos = word_end,
            }
        }

        debug!("Parsed {} menu item(s)", items.len());
        items
    }

    /// Find the first price reachable from `from` without crossing a newline
    /// in the name part.
    fn find_price(&self, chars: &[(usize, char)], from: usize) -> Option<PriceMatch> {
        let mut cursor = from;

        while cursor < chars.len() {
            let c = chars[cursor].1;

            if c.is_whitespace() {
                let digits_start = skip_while(chars, cursor, char::is_whitespace);
                if digits_start < chars.len() && chars[digits_start].1.is_ascii_digit() {
                    let (price_end, separator) = self.scan_price(chars, digits_start);
                    return Some(PriceMatch {
                        name_end: cursor,
                        price_start: digits_start,
                        price_end,
                        separator,
                    });
                }
            }

            if c == '\n' {
                return None;
            }
            cursor += 1;
        }

        None
    }

    /// Scan a digit run starting at `start`, with an optional decimal part.
    ///
    /// Only ASCII `0-9` count as price digits, while names accept any
    /// Unicode alphanumeric (see [`is_word`]). Other numeral systems, such
    /// as Arabic-Indic `٣`, never form a price.
    fn scan_price(&self, chars: &[(usize, char)], start: usize) -> (usize, Option<char>) {
        let is_digit = |c: char| c.is_ascii_digit();
        let end = skip_while(chars, start, is_digit);

        if self.decimal_prices
            && end + 1 < chars.len()
            && matches!(chars[end].1, '.' | ',')
            && chars[end + 1].1.is_ascii_digit()
        {
            return (skip_while(chars, end + 1, is_digit), Some(chars[end].1));
        }

        (end, None)
    }
}

impl Default for MenuLineParser {
    fn default() -> Self {
        Self::new()
    }
}

struct PriceMatch {
    name_end: usize,
    price_start: usize,
    price_end: usize,
    separator: Option<char>,
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn skip_while(chars: &[(usize, char)], from: usize, pred: impl Fn(char) -> bool) -> usize {
    let mut i = from;
    while i < chars.len() && pred(chars[i].1) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;
    use pretty_assertions::assert_eq;
    use regex::Regex;

    lazy_static! {
        static ref LINE_PATTERN: Regex = Regex::new(r"(\w+.*?)\s+(\d+)").unwrap();
    }

    fn pairs(items: &[ParsedItem]) -> Vec<(&str, &str)> {
        items.iter().map(|i| (i.name.as_str(), i.price.as_str())).collect()
    }

    fn integer_parser() -> MenuLineParser {
        MenuLineParser::new().with_decimal_prices(false)
    }

    #[test]
    fn test_one_item_per_line() {
        let items = MenuLineParser::new().parse("Burger 12\nFries 5");
        assert_eq!(pairs(&items), vec![("Burger", "12"), ("Fries", "5")]);
    }

    #[test]
    fn test_two_items_on_one_line() {
        let items = MenuLineParser::new().parse("Club Sandwich 9 Soda 3");
        assert_eq!(pairs(&items), vec![("Club Sandwich", "9"), ("Soda", "3")]);
    }

    #[test]
    fn test_name_keeps_leaders_and_punctuation() {
        let items = MenuLineParser::new().parse("Fish & Chips ..... 14");
        assert_eq!(pairs(&items), vec![("Fish & Chips .....", "14")]);
    }

    #[test]
    fn test_price_on_next_line() {
        let items = MenuLineParser::new().parse("Soup of the day\n  7");
        assert_eq!(pairs(&items), vec![("Soup of the day", "7")]);
    }

    #[test]
    fn test_name_does_not_span_lines() {
        let items = MenuLineParser::new().parse("Desserts\nApple Pie 6");
        assert_eq!(pairs(&items), vec![("Apple Pie", "6")]);
    }

    #[test]
    fn test_digits_in_name_split_the_item() {
        let items = MenuLineParser::new().parse("Combo 2 Large 11");
        assert_eq!(pairs(&items), vec![("Combo", "2"), ("Large", "11")]);
    }

    #[test]
    fn test_leading_digit_word() {
        let items = MenuLineParser::new().parse("7 Up 3");
        assert_eq!(pairs(&items), vec![("7 Up", "3")]);
    }

    #[test]
    fn test_glued_currency_symbol_prevents_match() {
        let items = MenuLineParser::new().parse("Burger $12");
        assert!(items.is_empty());
    }

    #[test]
    fn test_currency_after_space_is_dropped() {
        let items = MenuLineParser::new().parse("Burger 12$");
        assert_eq!(pairs(&items), vec![("Burger", "12")]);
    }

    #[test]
    fn test_decimal_prices() {
        let items = MenuLineParser::new().parse("Latte 3.50\nTea 2,80\nWater 1.");
        assert_eq!(
            pairs(&items),
            vec![("Latte", "3.50"), ("Tea", "2.80"), ("Water", "1")]
        );
    }

    #[test]
    fn test_decimals_disabled_truncate() {
        let items = integer_parser().parse("Latte 3.50\nTea 2");
        assert_eq!(pairs(&items), vec![("Latte", "3"), ("Tea", "2")]);
    }

    #[test]
    fn test_unicode_names() {
        let items = MenuLineParser::new().parse("Crème brûlée 8\nPâté 6");
        assert_eq!(pairs(&items), vec![("Crème brûlée", "8"), ("Pâté", "6")]);
    }

    #[test]
    fn test_no_items() {
        assert!(MenuLineParser::new().parse("").is_empty());
        assert!(MenuLineParser::new().parse("Welcome to our restaurant").is_empty());
        assert!(MenuLineParser::new().parse("   \n\n  ").is_empty());
    }

    #[test]
    fn test_agrees_with_line_pattern() {
        let samples = [
            "Burger 12\nFries 5",
            "Club Sandwich 9 Soda 3",
            "STARTERS\nGarlic bread 4\nBruschetta (2 pcs) 6\n\nMAINS\nSteak 24",
            "Pizza Margherita ......... 11\nPizza 4 Formaggi 13",
            "Latte 3.50 Espresso 2",
            "Burger $12\nNachos  \t 7 extra",
            "  -- 5\nSalad\n9\nWrap _ 8",
            "a 1 b 2 c 3",
            "no prices here\nnone at all",
            "Item\n\n 42 Thing 7x 3",
        ];

        let parser = integer_parser();
        for sample in samples {
            let expected: Vec<(&str, &str)> = LINE_PATTERN
                .captures_iter(sample)
                .map(|c| (c.get(1).unwrap().as_str(), c.get(2).unwrap().as_str()))
                .collect();
            let items = parser.parse(sample);
            assert_eq!(pairs(&items), expected, "sample: {:?}", sample);
        }
    }

    #[test]
    fn test_non_ascii_digits_are_not_prices() {
        let parser = MenuLineParser::new();

        assert!(parser.parse("Chai \u{0663}").is_empty());
        assert_eq!(
            parser.parse("Chai \u{0663}\nKahwa 4"),
            vec![ParsedItem::new("Kahwa", "4")]
        );
    }
}

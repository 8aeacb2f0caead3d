// File: ./src/model/format.rs
// Daily note date formats (moment-style tokens such as `YYYY-MM-DD` or
// `YYYY-[W]WW`) compiled into anchored regular expressions.
use chrono::{Datelike, NaiveDate, Weekday};
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Year,
    YearShort,
    MonthName,
    MonthShort,
    Month2,
    Month,
    DayOfYear3,
    DayOfYear,
    Day2,
    DayOrdinal,
    Day,
    WeekdayName,
    WeekdayShort,
    WeekdayMin,
    WeekdayNum,
    IsoWeek2,
    IsoWeek,
    Week2,
    Week,
}

// Within one letter family the longer token must come first,
// otherwise `D` would eat the first character of `DD`.
const TOKENS: &[(&str, Token)] = &[
    ("YYYY", Token::Year),
    ("YY", Token::YearShort),
    ("MMMM", Token::MonthName),
    ("MMM", Token::MonthShort),
    ("MM", Token::Month2),
    ("M", Token::Month),
    ("DDDD", Token::DayOfYear3),
    ("DDD", Token::DayOfYear),
    ("DD", Token::Day2),
    ("Do", Token::DayOrdinal),
    ("D", Token::Day),
    ("dddd", Token::WeekdayName),
    ("ddd", Token::WeekdayShort),
    ("dd", Token::WeekdayMin),
    ("d", Token::WeekdayNum),
    ("WW", Token::IsoWeek2),
    ("W", Token::IsoWeek),
    ("ww", Token::Week2),
    ("w", Token::Week),
];

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const WEEKDAYS: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

impl Token {
    fn pattern(&self) -> String {
        match self {
            Token::Year => r"(\d{4})".to_string(),
            Token::YearShort | Token::Month2 | Token::Day2 => r"(\d{2})".to_string(),
            Token::IsoWeek2 | Token::Week2 => r"(\d{2})".to_string(),
            Token::Month | Token::Day | Token::IsoWeek | Token::Week => r"(\d{1,2})".to_string(),
            Token::DayOfYear3 => r"(\d{3})".to_string(),
            Token::DayOfYear => r"(\d{1,3})".to_string(),
            Token::DayOrdinal => r"(\d{1,2})(?:st|nd|rd|th)".to_string(),
            Token::WeekdayNum => r"([0-6])".to_string(),
            Token::MonthName => format!("((?i:{}))", MONTHS.join("|")),
            Token::MonthShort => format!("((?i:{}))", abbreviations(&MONTHS, 3).join("|")),
            Token::WeekdayName => format!("((?i:{}))", WEEKDAYS.join("|")),
            Token::WeekdayShort => format!("((?i:{}))", abbreviations(&WEEKDAYS, 3).join("|")),
            Token::WeekdayMin => format!("((?i:{}))", abbreviations(&WEEKDAYS, 2).join("|")),
        }
    }

    fn render(&self, date: NaiveDate) -> String {
        match self {
            Token::Year => date.format("%Y").to_string(),
            Token::YearShort => date.format("%y").to_string(),
            Token::MonthName => date.format("%B").to_string(),
            Token::MonthShort => date.format("%b").to_string(),
            Token::Month2 => date.format("%m").to_string(),
            Token::Month => date.month().to_string(),
            Token::DayOfYear3 => date.format("%j").to_string(),
            Token::DayOfYear => date.ordinal().to_string(),
            Token::Day2 => date.format("%d").to_string(),
            Token::DayOrdinal => ordinal(date.day()),
            Token::Day => date.day().to_string(),
            Token::WeekdayName => date.format("%A").to_string(),
            Token::WeekdayShort => date.format("%a").to_string(),
            Token::WeekdayMin => date.format("%a").to_string().chars().take(2).collect(),
            Token::WeekdayNum => date.weekday().num_days_from_sunday().to_string(),
            Token::IsoWeek2 | Token::Week2 => format!("{:02}", date.iso_week().week()),
            Token::IsoWeek | Token::Week => date.iso_week().week().to_string(),
        }
    }
}

fn abbreviations(names: &[&str], len: usize) -> Vec<String> {
    names.iter().map(|n| n[..len].to_string()).collect()
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Token(Token),
}

/// Splits a format into literals and tokens, honoring `[...]` escapes.
fn lex(format: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut rest = format;

    while let Some(c) = rest.chars().next() {
        if c == '['
            && let Some(close) = rest.find(']')
        {
            pieces.push(Piece::Literal(rest[1..close].to_string()));
            rest = &rest[close + 1..];
            continue;
        }

        if let Some((name, token)) = TOKENS.iter().find(|(name, _)| rest.starts_with(name)) {
            pieces.push(Piece::Token(*token));
            rest = &rest[name.len()..];
            continue;
        }

        pieces.push(Piece::Literal(c.to_string()));
        rest = &rest[c.len_utf8()..];
    }
    pieces
}

/// Converts a date format into an anchored regular expression source.
/// Literal characters are escaped; unknown tokens pass through as literals.
pub fn to_pattern(format: &str) -> String {
    let mut pattern = String::from("^");
    for piece in lex(format) {
        match piece {
            Piece::Literal(text) => pattern.push_str(&regex::escape(&text)),
            Piece::Token(token) => pattern.push_str(&token.pattern()),
        }
    }
    pattern.push('$');
    pattern
}

/// A compiled daily note format.
#[derive(Debug, Clone)]
pub struct DateFormat {
    format: String,
    pieces: Vec<Piece>,
    captures: Vec<Token>,
    regex: Regex,
}

impl DateFormat {
    pub fn new(format: &str) -> Result<Self, regex::Error> {
        let pieces = lex(format);
        let captures = pieces
            .iter()
            .filter_map(|p| match p {
                Piece::Token(t) => Some(*t),
                Piece::Literal(_) => None,
            })
            .collect();
        let regex = Regex::new(&to_pattern(format))?;
        Ok(Self {
            format: format.to_string(),
            pieces,
            captures,
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.format
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// Parses a date out of a name matching this format.
    ///
    /// Needs year + month + day, year + day of year, or year + week.
    /// Weekday tokens only matter for the week form (defaults to Monday).
    pub fn parse(&self, name: &str) -> Option<NaiveDate> {
        let caps = self.regex.captures(name)?;

        let mut year = None;
        let mut month = None;
        let mut day = None;
        let mut day_of_year = None;
        let mut week = None;
        let mut weekday = None;

        for (idx, token) in self.captures.iter().enumerate() {
            let value = caps.get(idx + 1)?.as_str();
            match token {
                Token::Year => year = value.parse::<i32>().ok(),
                Token::YearShort => {
                    let yy = value.parse::<i32>().ok()?;
                    year = Some(if yy > 68 { 1900 + yy } else { 2000 + yy });
                }
                Token::MonthName | Token::MonthShort => {
                    let lower = value.to_lowercase();
                    month = MONTHS
                        .iter()
                        .position(|m| m.starts_with(&lower))
                        .map(|i| i as u32 + 1);
                }
                Token::Month2 | Token::Month => month = value.parse().ok(),
                Token::DayOfYear3 | Token::DayOfYear => day_of_year = value.parse().ok(),
                Token::Day2 | Token::DayOrdinal | Token::Day => day = value.parse().ok(),
                Token::WeekdayName | Token::WeekdayShort | Token::WeekdayMin => {
                    let lower = value.to_lowercase();
                    weekday = WEEKDAYS
                        .iter()
                        .position(|d| d.starts_with(&lower))
                        .and_then(|i| weekday_from_sunday(i as u32));
                }
                Token::WeekdayNum => weekday = value.parse().ok().and_then(weekday_from_sunday),
                Token::IsoWeek2 | Token::IsoWeek | Token::Week2 | Token::Week => {
                    week = value.parse().ok()
                }
            }
        }

        let year = year?;
        if let (Some(m), Some(d)) = (month, day) {
            return NaiveDate::from_ymd_opt(year, m, d);
        }
        if let Some(doy) = day_of_year {
            return NaiveDate::from_yo_opt(year, doy);
        }
        if let Some(w) = week {
            return NaiveDate::from_isoywd_opt(year, w, weekday.unwrap_or(Weekday::Mon));
        }
        None
    }

    /// Renders `date` in this format (the inverse of `parse`).
    pub fn format(&self, date: NaiveDate) -> String {
        self.pieces
            .iter()
            .map(|p| match p {
                Piece::Literal(text) => text.clone(),
                Piece::Token(token) => token.render(date),
            })
            .collect()
    }
}

fn weekday_from_sunday(n: u32) -> Option<Weekday> {
    match n {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}
